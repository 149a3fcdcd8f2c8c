//! Persistent edits.
//!
//! Nothing here mutates a tree. Every edit allocates replacements for the
//! edited node and its ancestors and reuses every other child by reference.

use std::ops::Range;

use crate::{
    Arena, GreenElement, GreenNode, GreenToken, Layout, Presence, Slot, SyntaxNode, SyntaxToken,
};

impl GreenNode {
    /// Returns a copy of this node with slot `index` replaced.
    ///
    /// Clearing a required slot stores a Missing placeholder of the slot's
    /// declared kind, clearing an optional one leaves it absent. On
    /// collections, clearing a slot removes the member.
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn replace_slot(&self, arena: &Arena, index: usize, slot: Slot) -> Self {
        assert!(
            index < self.slot_count(),
            "slot index {index} is out of range for {:?} with {} slots",
            self.kind(),
            self.slot_count()
        );
        let specs = match self.kind().layout() {
            Layout::Collection(_) => {
                return self.splice_slots(arena, index..index + 1, slot.map(Some));
            }
            Layout::Fixed(specs) => specs,
            Layout::Token => &[],
        };

        let slot = match (slot, specs.get(index)) {
            (Some(element), _) => Some(element),
            (None, Some(spec)) if !spec.optional => Some(arena.missing(spec.placeholder)),
            (None, _) => None,
        };

        let mut presence = self.presence();
        let mut slots: Vec<Slot> = self.slots().to_vec();
        if presence == Presence::Missing && slot.as_ref().is_some_and(|it| !it.is_missing()) {
            // The placeholder turns into a real node; its remaining required
            // slots become placeholders in turn.
            presence = Presence::Present;
            for (slot, spec) in slots.iter_mut().zip(specs) {
                if slot.is_none() && !spec.optional {
                    *slot = Some(arena.missing(spec.placeholder));
                }
            }
        }
        slots[index] = slot;

        tracing::trace!(kind = ?self.kind(), index, "replaced slot");
        arena.alloc_node(self.kind(), presence, slots.into_boxed_slice())
    }

    /// Returns a copy of this node with the slots in `range` replaced by
    /// `replacement`, which may have a different length.
    ///
    /// Panics if `range` is out of bounds.
    #[track_caller]
    pub fn splice_slots(
        &self,
        arena: &Arena,
        range: Range<usize>,
        replacement: impl IntoIterator<Item = Slot>,
    ) -> Self {
        assert!(
            range.start <= range.end && range.end <= self.slot_count(),
            "slot range {range:?} is out of bounds for {:?} with {} slots",
            self.kind(),
            self.slot_count()
        );
        let replacement: Vec<Slot> = replacement.into_iter().collect();
        if let Some(members) = self.kind().layout().members() {
            debug_assert!(
                replacement
                    .iter()
                    .all(|slot| slot.as_ref().is_some_and(|it| members.contains(it.kind()))),
                "{:?} only accepts {members:?}",
                self.kind()
            );
        }

        let mut slots = Vec::with_capacity(self.slot_count() - range.len() + replacement.len());
        slots.extend_from_slice(&self.slots()[..range.start]);
        slots.extend(replacement);
        slots.extend_from_slice(&self.slots()[range.end..]);

        tracing::trace!(kind = ?self.kind(), ?range, len = slots.len(), "spliced slots");
        arena.alloc_node(self.kind(), Presence::Present, slots.into_boxed_slice())
    }
}

impl SyntaxNode {
    /// Replaces slot `index` and rebuilds every ancestor up to the root.
    ///
    /// Returns the edited node positioned inside the new tree.
    #[track_caller]
    pub fn replace_child(&self, arena: &Arena, index: usize, slot: Slot) -> Self {
        let green = self.green().replace_slot(arena, index, slot);
        self.replace_with(arena, green)
    }

    /// Replaces this whole subtree with `green` and rebuilds every ancestor
    /// up to the root.
    ///
    /// Returns the replacement positioned inside the new tree.
    pub fn replace_with(&self, arena: &Arena, green: GreenNode) -> Self {
        match (self.parent(), self.index_in_parent()) {
            (Some(parent), Some(index)) => {
                let parent = parent.replace_child(arena, index, Some(green.clone().into()));
                Self::new_child(parent, index, self.text_offset(), green)
            }
            _ => Self::new_root(arena.clone(), green),
        }
    }
}

impl SyntaxToken {
    /// Replaces this token and rebuilds every ancestor up to the root.
    pub fn replace_with(&self, arena: &Arena, green: GreenToken) -> Self {
        let index = self.index_in_parent();
        let slot = Some(GreenElement::from(green.clone()));
        let parent = self.parent().replace_child(arena, index, slot);
        Self::new(parent, index, self.text_offset(), green)
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;
    use crate::SyntaxKind::*;
    use crate::fixtures::{SOURCE, sample_tree};
    use crate::{NodeOrToken, TriviaPiece, TriviaPieceKind, validate};

    #[test]
    fn unedited_siblings_are_shared() {
        let root = sample_tree();
        let arena = root.arena();
        let binary = root.descendants().find(|node| node.kind() == BINARY_EXPR).unwrap();
        let three = arena.make_node(LITERAL_EXPR, [Some(arena.token(INT_NUMBER, "3").into())]);

        let edited = binary.replace_child(&arena, 2, Some(three.into()));

        for index in [0, 1] {
            let before = binary.green().slot(index).unwrap();
            let after = edited.green().slot(index).unwrap();
            assert!(before.ptr_eq(after));
        }
        let old_items = root.child_node(0).unwrap();
        let new_items = edited.root().child_node(0).unwrap();
        assert!(old_items.green().slot(1).unwrap().ptr_eq(new_items.green().slot(1).unwrap()));
        assert!(root.child(1).unwrap().green().ptr_eq(&edited.root().child(1).unwrap().green()));

        assert_eq!(edited.root().text(), "let x = 1 + 3\nlet y = f(a, b, c)\n");
        assert_eq!(root.text(), SOURCE);
        assert_eq!(edited.text_range(), binary.text_range());
    }

    #[test]
    fn clearing_a_required_slot_leaves_a_placeholder() {
        let root = sample_tree();
        let arena = root.arena();
        let binary = root.descendants().find(|node| node.kind() == BINARY_EXPR).unwrap();

        let edited = binary.replace_child(&arena, 2, None);
        let rhs = edited.child_node(2).unwrap();

        assert_eq!(rhs.kind(), MISSING_EXPR);
        assert!(rhs.is_missing());
        assert_eq!(edited.slot_count(), 3);
        assert_eq!(edited.text(), "1 + ");
        assert!(edited.root().has_error());
        assert_eq!(validate(&edited.root()), Ok(()));
    }

    #[test]
    fn clearing_an_optional_slot_removes_it() {
        let root = sample_tree();
        let arena = root.arena();
        let let_decl = root.descendants().find(|node| node.kind() == LET_DECL).unwrap();

        let edited = let_decl.replace_child(&arena, 3, None);

        assert!(edited.child(3).is_none());
        assert_eq!(edited.slot_count(), 4);
        assert_eq!(edited.root().text(), "let x \nlet y = f(a, b, c)\n");
        assert!(!edited.root().has_error());
    }

    #[test]
    fn filling_a_missing_node_makes_it_present() {
        let arena = Arena::new();
        let block = arena.missing_node(CODE_BLOCK);

        let edited = block.replace_slot(&arena, 0, Some(arena.punct(L_BRACE).into()));

        assert_eq!(edited.presence(), Presence::Present);
        assert!(edited.slot(1).is_some_and(GreenElement::is_missing));
        assert!(edited.slot(2).is_some_and(GreenElement::is_missing));
        assert_eq!(edited.text(), "{");
    }

    #[test]
    fn replacing_a_token() {
        let root = sample_tree();
        let arena = root.arena();
        let name = root.tokens().find(|token| token.text_trimmed() == "y").unwrap();

        let space = TriviaPiece::new(TriviaPieceKind::Whitespace, 1.into());
        let value = arena.make_token(IDENT, "value ", &[], &[space], Presence::Present);
        let renamed = name.replace_with(&arena, value);

        assert_eq!(renamed.text_range(), text_size::TextRange::new(18.into(), 24.into()));
        assert_eq!(renamed.parent().root().text(), "let x = 1 + 2\nlet value = f(a, b, c)\n");
        let dump = format!("{:#?}", renamed.parent());
        expect![[r#"
            LET_DECL@13..36
              let_kw: LET_KW@13..18 "\nlet "
              name: IDENT@18..24 "value "
              initializer: INITIALIZER_CLAUSE@24..36
                eq: EQ@24..26 "= "
                value: CALL_EXPR@26..36
                  callee: NAME_EXPR@26..27
                    name: IDENT@26..27 "f"
                  args: ARG_CLAUSE@27..36
                    l_paren: L_PAREN@27..28 "("
                    args: ARG_LIST@28..35
                      [0]: ARG@28..31
                        value: NAME_EXPR@28..29
                          name: IDENT@28..29 "a"
                        trailing_comma: COMMA@29..31 ", "
                      [1]: ARG@31..34
                        value: NAME_EXPR@31..32
                          name: IDENT@31..32 "b"
                        trailing_comma: COMMA@32..34 ", "
                      [2]: ARG@34..35
                        value: NAME_EXPR@34..35
                          name: IDENT@34..35 "c"
                    r_paren: R_PAREN@35..36 ")"
        "#]]
        .assert_eq(&dump);
    }

    #[test]
    fn concurrent_edits_are_independent() {
        let root = sample_tree();
        let arena = root.arena();
        let items = root.child_node(0).unwrap();

        let edits: Vec<SyntaxNode> = std::thread::scope(|scope| {
            let first = scope.spawn(|| items.replace_child(&arena, 0, None).root());
            let second = scope.spawn(|| items.replace_child(&arena, 1, None).root());
            vec![first.join().unwrap(), second.join().unwrap()]
        });

        assert_eq!(edits[0].text(), "\nlet y = f(a, b, c)\n");
        assert_eq!(edits[1].text(), "let x = 1 + 2\n");
        assert_eq!(root.text(), SOURCE);
        let NodeOrToken::Node(kept) = edits[0].descend(&items.path()).unwrap() else { panic!() };
        assert_eq!(kept.slot_count(), 1);
    }
}
