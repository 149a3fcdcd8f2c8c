use drop_bomb::DropBomb;
use fidel_syntax::{Arena, Builder, GreenNode, SyntaxKind, SyntaxSet};
use fidel_tokenizer::{Token, Tokenizer};

/// Event-producing recursive-descent driver.
///
/// Grammar functions push exactly one event per slot of the node they are
/// building: a token, a nested node, a Missing placeholder, or an absent
/// optional slot. The events are turned into a green tree by
/// [`Parser::build_tree`].
pub(crate) struct Parser<'a> {
    arena: Arena,
    text: &'a str,
    tokenizer: Tokenizer<'a>,
    events: Vec<Event>,
    depth: u32,
    nesting_exhausted: bool,
}

/// How deeply expressions may nest before the parser stops descending.
const MAX_NESTING: u32 = 256;

impl<'a> Parser<'a> {
    pub(crate) fn new(arena: Arena, text: &'a str) -> Self {
        Self {
            arena,
            text,
            tokenizer: Tokenizer::new(text),
            events: Vec::new(),
            depth: 0,
            nesting_exhausted: false,
        }
    }

    /// Claims one level of nesting. Returns `false` once the limit has been
    /// reached; from then on every claim fails until
    /// [`Parser::recover_nesting`] runs.
    pub(crate) fn enter_nesting(&mut self) -> bool {
        if self.nesting_exhausted {
            return false;
        }
        if self.depth >= MAX_NESTING {
            tracing::debug!(
                at = ?self.tokenizer.peek().kind_range.start(),
                "nesting limit reached"
            );
            self.nesting_exhausted = true;
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave_nesting(&mut self, levels: u32) {
        debug_assert!(self.depth >= levels);
        self.depth -= levels;
    }

    pub(crate) fn nesting_exhausted(&self) -> bool {
        self.nesting_exhausted
    }

    /// After the nesting limit was hit, wraps everything up to `recovery` in
    /// an `UNEXPECTED` node and lets parsing descend again.
    pub(crate) fn recover_nesting(&mut self, recovery: &SyntaxSet) {
        if std::mem::take(&mut self.nesting_exhausted)
            && !self.at(SyntaxKind::EOF)
            && !self.at_any(recovery)
        {
            self.unexpected(recovery);
        }
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.tokenizer.peek().kind
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn at_any(&self, kinds: &SyntaxSet) -> bool {
        kinds.contains(self.peek_kind())
    }

    /// Consumes the current token. Does nothing at the end of input.
    pub(crate) fn advance(&mut self) {
        if self.at(SyntaxKind::EOF) {
            return;
        }

        let token = self.tokenizer.next_token();
        self.events.push(Event::Token(token));
    }

    /// Consumes the final `EOF` token, which carries the trailing trivia of
    /// the file.
    pub(crate) fn finish_input(&mut self) {
        debug_assert!(self.at(SyntaxKind::EOF));
        let token = self.tokenizer.next_token();
        self.events.push(Event::Token(token));
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Fills a required token slot, with a Missing placeholder if the current
    /// token does not match.
    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.missing(kind);
        false
    }

    /// Fills an optional token slot, leaving it absent if the current token
    /// does not match.
    pub(crate) fn eat_or_absent(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.absent();
        false
    }

    pub(crate) fn missing(&mut self, kind: SyntaxKind) {
        self.missing_marker(kind);
    }

    /// Pushes a Missing placeholder that can still be wrapped with
    /// [`CompletedMarker::precede`].
    pub(crate) fn missing_marker(&mut self, kind: SyntaxKind) -> CompletedMarker {
        tracing::debug!(
            expected = ?kind,
            found = ?self.peek_kind(),
            at = ?self.tokenizer.peek().kind_range.start(),
            "inserting missing placeholder"
        );
        let pos = self.events.len() as u32;
        self.events.push(Event::Missing { kind, forward_parent: None });
        CompletedMarker::new(pos)
    }

    pub(crate) fn absent(&mut self) {
        self.events.push(Event::Absent);
    }

    /// Wraps the current token, and every following token up to `recovery`
    /// or the end of input, in an `UNEXPECTED` node.
    ///
    /// Always consumes at least one token unless already at the end of
    /// input.
    pub(crate) fn unexpected(&mut self, recovery: &SyntaxSet) {
        debug_assert!(!self.at(SyntaxKind::EOF), "nothing left to wrap");
        let m = self.start();
        let start = self.tokenizer.peek().kind_range.start();
        let mut count = 0usize;
        loop {
            self.advance();
            count += 1;
            if self.at(SyntaxKind::EOF) || self.at_any(recovery) {
                break;
            }
        }
        tracing::debug!(?start, count, "wrapped unexpected tokens");
        m.complete(self, SyntaxKind::UNEXPECTED);
    }

    /// Fills an optional `UNEXPECTED` slot with the tokens before `recovery`,
    /// or leaves it absent when there are none.
    pub(crate) fn unexpected_until(&mut self, recovery: &SyntaxSet) {
        if self.at(SyntaxKind::EOF) || self.at_any(recovery) {
            self.absent();
        } else {
            self.unexpected(recovery);
        }
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len() as u32;
        self.events.push(Event::TOMBSTONE);
        Marker::new(pos)
    }

    pub(crate) fn build_tree(self) -> GreenNode {
        let Parser { arena, text, mut events, .. } = self;
        let mut builder = Builder::new(arena);
        let mut forward_parents = Vec::new();

        for i in 0..events.len() {
            match std::mem::replace(&mut events[i], Event::TOMBSTONE) {
                Event::Start { kind: SyntaxKind::TOMBSTONE, .. } => {}
                Event::Start { kind, forward_parent } => {
                    forward_parents.push(kind);
                    collect_forward_parents(&mut events, i, forward_parent, &mut forward_parents);

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                    }
                }
                Event::Missing { kind, forward_parent } => {
                    collect_forward_parents(&mut events, i, forward_parent, &mut forward_parents);

                    for kind in forward_parents.drain(..).rev() {
                        builder.start_node(kind);
                    }
                    builder.missing(kind);
                }
                Event::Absent => {
                    builder.absent();
                }
                Event::Finish => {
                    builder.finish_node();
                }
                Event::Token(token) => {
                    let text = &text[token.full_range()];
                    builder.token(
                        token.kind,
                        text,
                        token.leading.pieces(),
                        token.trailing.pieces(),
                    );
                }
            }
        }

        builder.finish()
    }
}

/// Follows the `forward_parent` chain starting at event `i`, tombstoning
/// every visited start event and collecting its kind, innermost first.
fn collect_forward_parents(
    events: &mut [Event],
    i: usize,
    forward_parent: Option<u32>,
    kinds: &mut Vec<SyntaxKind>,
) {
    let mut idx = i;
    let mut fp = forward_parent;
    while let Some(fwd) = fp {
        idx += fwd as usize;

        fp = match std::mem::replace(&mut events[idx], Event::TOMBSTONE) {
            Event::Start { kind, forward_parent } => {
                if kind != SyntaxKind::TOMBSTONE {
                    kinds.push(kind);
                }
                forward_parent
            }
            _ => unreachable!(),
        };
    }
}

enum Event {
    Start { kind: SyntaxKind, forward_parent: Option<u32> },
    Token(Token),
    Missing { kind: SyntaxKind, forward_parent: Option<u32> },
    Absent,
    Finish,
}

impl Event {
    const TOMBSTONE: Self = Self::Start { kind: SyntaxKind::TOMBSTONE, forward_parent: None };
}

pub(crate) struct Marker {
    position: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: u32) -> Self {
        Self { position: pos, bomb: DropBomb::new("Marker must be completed") }
    }

    pub(crate) fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();

        match &mut p.events[self.position as usize] {
            Event::Start { kind: slot, .. } => {
                *slot = kind;
            }
            _ => unreachable!(),
        }

        p.events.push(Event::Finish);
        CompletedMarker::new(self.position)
    }
}

pub(crate) struct CompletedMarker {
    pos: u32,
}

impl CompletedMarker {
    fn new(pos: u32) -> Self {
        Self { pos }
    }

    /// Starts a node that will become the parent of this one.
    pub(crate) fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.start();

        match &mut p.events[self.pos as usize] {
            Event::Start { forward_parent, .. } | Event::Missing { forward_parent, .. } => {
                *forward_parent = Some(new_pos.position - self.pos);
            }
            _ => unreachable!(),
        }

        new_pos
    }
}
