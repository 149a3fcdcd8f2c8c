//! Position-independent, immutable tree storage.
//!
//! Green elements know their kind, their children and their width, but not
//! where they are. The same green node may appear at many offsets, in many
//! trees, at the same time.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc as SharedStr;

use text_size::TextSize;
use triomphe::Arc;

use crate::{GreenTrivia, NodeOrToken, SyntaxKind};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Content of a single child slot; `None` is an absent optional slot.
pub type Slot = Option<GreenElement>;

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn width(&self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.width(),
            NodeOrToken::Token(token) => token.width(),
        }
    }

    pub fn presence(&self) -> Presence {
        match self {
            NodeOrToken::Node(node) => node.presence(),
            NodeOrToken::Token(token) => token.presence(),
        }
    }

    pub fn is_missing(&self) -> bool {
        self.presence() == Presence::Missing
    }

    pub fn has_error(&self) -> bool {
        match self {
            NodeOrToken::Node(node) => node.has_error(),
            NodeOrToken::Token(token) => token.is_missing(),
        }
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NodeOrToken::Node(a), NodeOrToken::Node(b)) => a.ptr_eq(b),
            (NodeOrToken::Token(a), NodeOrToken::Token(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub(crate) fn addr(&self) -> usize {
        match self {
            NodeOrToken::Node(node) => node.addr(),
            NodeOrToken::Token(token) => token.addr(),
        }
    }

    pub(crate) fn write_text(&self, buf: &mut String) {
        match self {
            NodeOrToken::Node(node) => node.write_text(buf),
            NodeOrToken::Token(token) => buf.push_str(token.text()),
        }
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        NodeOrToken::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        NodeOrToken::Token(token)
    }
}

/// Whether an element was actually parsed or stands in for a required one.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Presence {
    #[default]
    Present,
    Missing,
}

#[derive(Eq, Hash, PartialEq)]
pub(crate) struct GreenTokenData {
    pub(crate) kind: SyntaxKind,
    pub(crate) presence: Presence,
    /// Leading trivia, token text and trailing trivia.
    pub(crate) text: SharedStr<str>,
    pub(crate) leading: GreenTrivia,
    pub(crate) trailing: GreenTrivia,
}

/// Immutable leaf: kind, text and attached trivia.
#[derive(Clone)]
pub struct GreenToken(pub(crate) Arc<GreenTokenData>);

impl GreenToken {
    pub(crate) fn alloc(data: GreenTokenData) -> Self {
        debug_assert!(
            data.leading.len() + data.trailing.len() <= TextSize::of(&*data.text),
            "trivia is longer than the token text"
        );
        debug_assert!(
            data.presence == Presence::Present || data.text.is_empty(),
            "missing tokens have no text"
        );
        Self(Arc::new(data))
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    #[inline]
    pub fn presence(&self) -> Presence {
        self.0.presence
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.0.presence == Presence::Missing
    }

    /// Full text, trivia included.
    #[inline]
    pub fn text(&self) -> &str {
        &self.0.text
    }

    /// Text without leading and trailing trivia.
    pub fn text_trimmed(&self) -> &str {
        let start: usize = self.0.leading.len().into();
        let end = self.0.text.len() - usize::from(self.0.trailing.len());
        &self.0.text[start..end]
    }

    pub fn leading_trivia(&self) -> &GreenTrivia {
        &self.0.leading
    }

    pub fn trailing_trivia(&self) -> &GreenTrivia {
        &self.0.trailing
    }

    pub fn leading_trivia_text(&self) -> &str {
        &self.0.text[..usize::from(self.0.leading.len())]
    }

    pub fn trailing_trivia_text(&self) -> &str {
        &self.0.text[self.0.text.len() - usize::from(self.0.trailing.len())..]
    }

    #[inline]
    pub fn width(&self) -> TextSize {
        TextSize::of(&*self.0.text)
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).addr()
    }

    /// `true` if no other handle shares this token.
    #[inline]
    pub(crate) fn is_unique(&self) -> bool {
        self.0.is_unique()
    }
}

impl PartialEq for GreenToken {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Eq for GreenToken {}

impl Hash for GreenToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenToken")
            .field("kind", &self.kind())
            .field("presence", &self.presence())
            .field("text", &self.text())
            .finish()
    }
}

impl fmt::Display for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Eq, PartialEq)]
pub(crate) struct GreenNodeData {
    pub(crate) kind: SyntaxKind,
    pub(crate) presence: Presence,
    pub(crate) width: TextSize,
    pub(crate) has_error: bool,
    pub(crate) slots: Box<[Slot]>,
}

/// Immutable interior node: kind and an ordered sequence of slots.
#[derive(Clone)]
pub struct GreenNode(pub(crate) Arc<GreenNodeData>);

impl GreenNode {
    pub(crate) fn alloc(kind: SyntaxKind, presence: Presence, slots: Box<[Slot]>) -> Self {
        let width = slots.iter().flatten().map(GreenElement::width).sum();
        let has_error = presence == Presence::Missing
            || kind == SyntaxKind::UNEXPECTED
            || slots.iter().flatten().any(GreenElement::has_error);
        Self(Arc::new(GreenNodeData { kind, presence, width, has_error, slots }))
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    #[inline]
    pub fn presence(&self) -> Presence {
        self.0.presence
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.0.presence == Presence::Missing
    }

    /// Total text length, trivia included. Computed once at construction.
    #[inline]
    pub fn width(&self) -> TextSize {
        self.0.width
    }

    /// `true` if this node or any descendant is Missing or Unexpected.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.0.has_error
    }

    #[inline]
    pub fn slots(&self) -> &[Slot] {
        &self.0.slots
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.0.slots.len()
    }

    #[inline]
    #[track_caller]
    pub fn slot(&self, index: usize) -> Option<&GreenElement> {
        self.0.slots[index].as_ref()
    }

    /// Present children, skipping absent slots.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = &GreenElement> + '_ {
        self.0.slots.iter().flatten()
    }

    /// Offset of slot `index` relative to the start of this node.
    #[track_caller]
    pub fn slot_offset(&self, index: usize) -> TextSize {
        self.0.slots[..index].iter().flatten().map(GreenElement::width).sum()
    }

    /// Serializes the subtree back into text.
    pub fn text(&self) -> String {
        let mut buf = String::with_capacity(usize::from(self.width()));
        self.write_text(&mut buf);
        buf
    }

    pub(crate) fn write_text(&self, buf: &mut String) {
        for token in self.tokens() {
            buf.push_str(token.text());
        }
    }

    /// Tokens of the subtree in text order, Missing ones included.
    pub fn tokens(&self) -> impl Iterator<Item = &GreenToken> + '_ {
        let mut stack = vec![self.0.slots.iter()];
        std::iter::from_fn(move || {
            while let Some(top) = stack.last_mut() {
                match top.next() {
                    Some(Some(NodeOrToken::Token(token))) => return Some(token),
                    Some(Some(NodeOrToken::Node(node))) => stack.push(node.0.slots.iter()),
                    Some(None) => {}
                    None => {
                        stack.pop();
                    }
                }
            }
            None
        })
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).addr()
    }

    /// `true` if no other handle shares this node.
    #[inline]
    pub(crate) fn is_unique(&self) -> bool {
        self.0.is_unique()
    }
}

impl Drop for GreenNodeData {
    // Children are released from a work list. Dropping them recursively
    // would use one stack frame per level of the tree.
    fn drop(&mut self) {
        let mut stack = take_child_nodes(&mut self.slots);
        while let Some(mut node) = stack.pop() {
            if let Some(data) = Arc::get_mut(&mut node.0) {
                stack.extend(take_child_nodes(&mut data.slots));
            }
        }
    }
}

fn take_child_nodes(slots: &mut Box<[Slot]>) -> Vec<GreenNode> {
    std::mem::take(slots)
        .into_vec()
        .into_iter()
        .filter_map(|slot| slot?.into_node())
        .collect()
}

impl PartialEq for GreenNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Eq for GreenNode {}

impl Hash for GreenNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.kind.hash(state);
        self.0.presence.hash(state);
        self.0.width.hash(state);
        self.0.slots.hash(state);
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("presence", &self.presence())
            .field("width", &self.width())
            .field("slots", &self.slots())
            .finish()
    }
}

impl fmt::Display for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tokens().try_for_each(|token| f.write_str(token.text()))
    }
}

#[cfg(test)]
mod tests {
    use crate::SyntaxKind::*;
    use crate::{Arena, ArenaConfig};

    #[test]
    fn deep_trees_print_and_drop_without_recursion() {
        let arena = Arena::with_config(ArenaConfig { max_cached_children: 0, dedup_tokens: false });
        let mut expr = arena.make_node(NAME_EXPR, [Some(arena.token(IDENT, "x").into())]);
        for _ in 0..100_000 {
            let minus = arena.punct(MINUS);
            expr = arena.make_node(PREFIX_EXPR, [Some(minus.into()), Some(expr.into())]);
        }

        let text = expr.text();
        assert_eq!(text.len(), 100_001);
        assert!(text.ends_with("-x"));
        assert_eq!(expr.to_string(), text);
        assert_eq!(expr.tokens().count(), 100_001);
        drop(expr);
    }

    #[test]
    fn tokens_skip_absent_slots() {
        let arena = Arena::new();
        let decl = arena.make_node(
            LET_DECL,
            [Some(arena.token(LET_KW, "let ").into()), Some(arena.missing(IDENT)), None, None],
        );
        let texts: Vec<_> = decl.tokens().map(|token| (token.kind(), token.text())).collect();
        assert_eq!(texts, [(LET_KW, "let "), (IDENT, "")]);
    }
}
