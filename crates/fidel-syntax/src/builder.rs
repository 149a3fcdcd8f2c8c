//! Incremental builder for green trees.

use crate::{Arena, GreenNode, Layout, NodeOrToken, Presence, Slot, SyntaxKind, TriviaPiece};

/// Builds a green tree from a flat stream of parser events.
///
/// Every slot of a node is pushed in order: present elements through
/// [`Builder::token`] and nested nodes, placeholders through
/// [`Builder::missing`], unset optional slots through [`Builder::absent`].
pub struct Builder {
    arena: Arena,
    opened: Vec<(SyntaxKind, usize)>,
    children: Vec<Slot>,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `Builder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 128;
const DEFAULT_CHILDREN_LEN: usize = 1024;

impl Builder {
    pub fn new(arena: Arena) -> Self {
        Self {
            arena,
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            children: Vec::with_capacity(DEFAULT_CHILDREN_LEN),
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        debug_assert!(kind.is_node(), "{kind:?} is not a node kind");
        self.opened.push((kind, self.children.len()));
    }

    /// Finishes the most recently started node.
    #[track_caller]
    pub fn finish_node(&mut self) {
        let Some((kind, first_child)) = self.opened.pop() else {
            panic!("no opened nodes");
        };
        if let Layout::Fixed(slots) = kind.layout() {
            debug_assert_eq!(
                self.children.len() - first_child,
                slots.len(),
                "{kind:?} was built with the wrong number of slots"
            );
        }
        let node = self.arena.make_node(kind, self.children.drain(first_child..));
        self.children.push(Some(node.into()));
    }

    /// Adds a present token whose `text` includes its trivia.
    pub fn token(
        &mut self,
        kind: SyntaxKind,
        text: &str,
        leading: &[TriviaPiece],
        trailing: &[TriviaPiece],
    ) {
        let token = self.arena.make_token(kind, text, leading, trailing, Presence::Present);
        self.children.push(Some(token.into()));
    }

    /// Fills the next slot with a Missing placeholder of `kind`.
    pub fn missing(&mut self, kind: SyntaxKind) {
        self.children.push(Some(self.arena.missing(kind)));
    }

    /// Leaves the next slot empty.
    pub fn absent(&mut self) {
        self.children.push(None);
    }

    /// Finishes building and returns the root node.
    #[track_caller]
    pub fn finish(mut self) -> GreenNode {
        assert!(self.opened.is_empty(), "unfinished nodes: {:?}", self.opened);
        let mut children = std::mem::take(&mut self.children);
        assert_eq!(children.len(), 1, "expected exactly one root");
        match children.pop().flatten() {
            Some(NodeOrToken::Node(root)) => root,
            _ => panic!("the root must be a node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyntaxKind::*;
    use crate::TriviaPieceKind;

    #[test]
    fn builds_nested_nodes() {
        let mut builder = Builder::new(Arena::new());
        builder.start_node(TYPE_ANNOTATION);
        builder.token(COLON, ": ", &[], &[TriviaPiece::new(TriviaPieceKind::Whitespace, 1.into())]);
        builder.start_node(TYPE_NAME);
        builder.token(IDENT, "Int", &[], &[]);
        builder.finish_node();
        builder.finish_node();
        let root = builder.finish();

        assert_eq!(root.kind(), TYPE_ANNOTATION);
        assert_eq!(root.text(), ": Int");
        assert!(!root.has_error());
    }

    #[test]
    fn missing_and_absent_slots() {
        let mut builder = Builder::new(Arena::new());
        builder.start_node(RETURN_CLAUSE);
        builder.token(ARROW, "->", &[], &[]);
        builder.missing(TYPE_NAME);
        builder.finish_node();
        let root = builder.finish();

        assert_eq!(root.slot_count(), 2);
        assert!(root.slot(1).is_some_and(|ty| ty.is_missing()));
        assert!(root.has_error());
    }

    #[test]
    #[should_panic = "you should call `Builder::finish()`"]
    fn unfinished_builder_panics() {
        let mut builder = Builder::new(Arena::new());
        builder.start_node(SOURCE_FILE);
    }
}
