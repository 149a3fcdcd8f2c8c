//! Shared allocator for green elements.
//!
//! The arena interns token text and hash-conses tokens and small nodes, so two
//! calls with equal inputs hand back the same allocation. Child identity is
//! what nodes are keyed by, which keeps lookups shallow.
//!
//! Cached entries are strong references. Entries that only the cache still
//! holds are dropped by [`Arena::collect_garbage`].

use std::hash::{BuildHasher, Hash};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::{HashSet, HashTable};
use rustc_hash::FxBuildHasher;

use crate::green::{GreenNodeData, GreenTokenData};
use crate::layout::Layout;
use crate::{
    GreenElement, GreenNode, GreenToken, GreenTrivia, NodeOrToken, Presence, Slot, SyntaxKind,
    TriviaPiece,
};

/// Tuning knobs for an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Nodes with at most this many slots are deduplicated. `0` disables node
    /// caching.
    pub max_cached_children: usize,
    /// Intern token text and deduplicate tokens.
    pub dedup_tokens: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self { max_cached_children: 3, dedup_tokens: true }
    }
}

/// Counters describing what an arena currently holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub interned_strings: usize,
    pub cached_tokens: usize,
    pub cached_nodes: usize,
}

/// Reference-counted owner of interned text and cached green elements.
///
/// Cloning is cheap and yields a handle to the same arena. The arena lives
/// until the last handle, including the ones retained by tree roots, is
/// dropped.
#[derive(Clone, Default)]
pub struct Arena(Arc<ArenaInner>);

#[derive(Default)]
struct ArenaInner {
    config: ArenaConfig,
    cache: Mutex<Cache>,
}

/// Below this many entries the cache is never swept automatically.
const MIN_SWEEP_LEN: usize = 512;

#[derive(Default)]
struct Cache {
    strings: HashSet<Arc<str>, FxBuildHasher>,
    tokens: HashTable<GreenToken>,
    nodes: HashTable<GreenNode>,
    /// Entries left by the last sweep.
    survivors: usize,
}

impl Cache {
    fn len(&self) -> usize {
        self.strings.len() + self.tokens.len() + self.nodes.len()
    }

    fn sweep(&mut self) -> usize {
        let before = self.len();
        // Dropping a node can leave the cache as the only owner of its
        // children, so nodes are swept until nothing changes.
        loop {
            let len = self.nodes.len();
            self.nodes.retain(|node| !node.is_unique());
            if self.nodes.len() == len {
                break;
            }
        }
        self.tokens.retain(|token| !token.is_unique());
        self.strings.retain(|text| Arc::strong_count(text) > 1);

        self.survivors = self.len();
        before - self.survivors
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("config", &self.0.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ArenaConfig) -> Self {
        Self(Arc::new(ArenaInner { config, cache: Mutex::default() }))
    }

    pub fn config(&self) -> ArenaConfig {
        self.0.config
    }

    pub fn stats(&self) -> ArenaStats {
        let cache = self.cache();
        ArenaStats {
            interned_strings: cache.strings.len(),
            cached_tokens: cache.tokens.len(),
            cached_nodes: cache.nodes.len(),
        }
    }

    /// Drops every cached token, node and string that no tree refers to any
    /// more. Returns the number of entries dropped.
    ///
    /// Elements still in use keep their identity, so later allocations of
    /// equal content keep sharing them.
    pub fn collect_garbage(&self) -> usize {
        let mut cache = self.cache();
        let dropped = cache.sweep();
        tracing::debug!(dropped, survivors = cache.survivors, "collected arena garbage");
        dropped
    }

    /// Runs [`Arena::collect_garbage`] once the cache has grown to twice the
    /// size the previous collection left behind.
    pub fn maybe_collect_garbage(&self) -> usize {
        let mut cache = self.cache();
        if cache.len() <= (2 * cache.survivors).max(MIN_SWEEP_LEN) {
            return 0;
        }
        let dropped = cache.sweep();
        tracing::debug!(dropped, survivors = cache.survivors, "collected arena garbage");
        dropped
    }

    /// Returns `true` if both handles refer to the same arena.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn cache(&self) -> MutexGuard<'_, Cache> {
        self.0.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Allocates a token.
    ///
    /// `text` is the full token text: leading trivia, the token itself and
    /// trailing trivia, whose lengths are given by the piece lists.
    pub fn make_token(
        &self,
        kind: SyntaxKind,
        text: &str,
        leading: &[TriviaPiece],
        trailing: &[TriviaPiece],
        presence: Presence,
    ) -> GreenToken {
        debug_assert!(kind.is_token(), "{kind:?} is not a token kind");
        let leading = GreenTrivia::new(leading);
        let trailing = GreenTrivia::new(trailing);

        if !self.0.config.dedup_tokens {
            return GreenToken::alloc(GreenTokenData {
                kind,
                presence,
                text: text.into(),
                leading,
                trailing,
            });
        }

        let hash = FxBuildHasher.hash_one((kind, presence, text, &leading, &trailing));
        let mut cache = self.cache();
        if let Some(token) = cache.tokens.find(hash, |token| {
            token.0.kind == kind
                && token.0.presence == presence
                && *token.0.text == *text
                && token.0.leading == leading
                && token.0.trailing == trailing
        }) {
            return token.clone();
        }

        let text = cache.strings.get_or_insert_with(text, |text: &str| Arc::from(text)).clone();
        let token = GreenToken::alloc(GreenTokenData { kind, presence, text, leading, trailing });
        tracing::trace!(?kind, text = token.text(), "allocated token");
        cache.tokens.insert_unique(hash, token.clone(), |token| {
            FxBuildHasher.hash_one((
                token.0.kind,
                token.0.presence,
                &*token.0.text,
                &token.0.leading,
                &token.0.trailing,
            ))
        });
        token
    }

    /// Allocates a present token without trivia.
    pub fn token(&self, kind: SyntaxKind, text: &str) -> GreenToken {
        self.make_token(kind, text, &[], &[], Presence::Present)
    }

    /// Allocates a present token spelled the only way `kind` can be spelled.
    ///
    /// Panics if the kind has no fixed spelling.
    #[track_caller]
    pub fn punct(&self, kind: SyntaxKind) -> GreenToken {
        let text = kind.fixed_text().unwrap_or_else(|| panic!("{kind:?} has no fixed text"));
        self.token(kind, text)
    }

    /// Zero-width placeholder for a required token.
    pub fn missing_token(&self, kind: SyntaxKind) -> GreenToken {
        self.make_token(kind, "", &[], &[], Presence::Missing)
    }

    /// Allocates a present node.
    pub fn make_node(&self, kind: SyntaxKind, slots: impl IntoIterator<Item = Slot>) -> GreenNode {
        self.alloc_node(kind, Presence::Present, slots.into_iter().collect())
    }

    /// Zero-width placeholder for a required node; all of its slots are absent.
    pub fn missing_node(&self, kind: SyntaxKind) -> GreenNode {
        debug_assert!(kind.is_node(), "{kind:?} is not a node kind");
        let arity = match kind.layout() {
            Layout::Fixed(slots) => slots.len(),
            Layout::Token | Layout::Collection(_) => 0,
        };
        self.alloc_node(kind, Presence::Missing, vec![None; arity].into_boxed_slice())
    }

    /// Missing placeholder of whichever flavor `kind` is.
    pub fn missing(&self, kind: SyntaxKind) -> GreenElement {
        if kind.is_token() {
            NodeOrToken::Token(self.missing_token(kind))
        } else {
            NodeOrToken::Node(self.missing_node(kind))
        }
    }

    /// Wraps input that fits no slot so it survives verbatim.
    pub fn unexpected(&self, elements: impl IntoIterator<Item = GreenElement>) -> GreenNode {
        self.make_node(SyntaxKind::UNEXPECTED, elements.into_iter().map(Some))
    }

    pub(crate) fn alloc_node(
        &self,
        kind: SyntaxKind,
        presence: Presence,
        slots: Box<[Slot]>,
    ) -> GreenNode {
        if slots.len() > self.0.config.max_cached_children {
            return GreenNode::alloc(kind, presence, slots);
        }

        let hash = node_hash(kind, presence, &slots);
        let mut cache = self.cache();
        if let Some(node) = cache.nodes.find(hash, |node| {
            node.0.kind == kind && node.0.presence == presence && same_slots(&node.0.slots, &slots)
        }) {
            return node.clone();
        }

        let node = GreenNode::alloc(kind, presence, slots);
        tracing::trace!(?kind, width = ?node.width(), "allocated node");
        cache.nodes.insert_unique(hash, node.clone(), |node: &GreenNode| {
            let GreenNodeData { kind, presence, slots, .. } = &*node.0;
            node_hash(*kind, *presence, slots)
        });
        node
    }
}

fn node_hash(kind: SyntaxKind, presence: Presence, slots: &[Slot]) -> u64 {
    let mut hasher = FxBuildHasher.build_hasher();
    kind.hash(&mut hasher);
    presence.hash(&mut hasher);
    for slot in slots {
        slot.as_ref().map(GreenElement::addr).hash(&mut hasher);
    }
    std::hash::Hasher::finish(&hasher)
}

fn same_slots(lhs: &[Slot], rhs: &[Slot]) -> bool {
    lhs.len() == rhs.len()
        && lhs.iter().zip(rhs).all(|pair| match pair {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        })
}
