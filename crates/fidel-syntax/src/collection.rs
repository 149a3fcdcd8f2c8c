//! Ordered-container view of collection nodes.

use std::iter::FusedIterator;

use text_size::TextSize;

use crate::syntax::SyntaxElementChildren;
use crate::{Arena, GreenElement, SyntaxElement, SyntaxNode, SyntaxSet};

/// A positioned collection node (`ITEM_LIST`, `PARAM_LIST`, `UNEXPECTED`, ...)
/// seen as a sequence of members.
///
/// Edits are persistent: each returns a new collection positioned in a new
/// tree, and leaves `self` untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SyntaxCollection(pub(crate) SyntaxNode);

/// Opaque position inside a [`SyntaxCollection`].
///
/// Carries the member's offset so that access through it does not need to
/// sum the widths of the preceding members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionIndex {
    index: usize,
    offset: TextSize,
}

impl CollectionIndex {
    pub fn index(self) -> usize {
        self.index
    }
}

impl SyntaxCollection {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        node.kind().is_collection().then_some(Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    /// Kinds the members of this collection may have.
    pub fn member_kinds(&self) -> SyntaxSet {
        self.0.kind().layout().members().unwrap_or(SyntaxSet::EMPTY)
    }

    pub fn len(&self) -> usize {
        self.0.slot_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<SyntaxElement> {
        if index < self.len() { self.0.child(index) } else { None }
    }

    pub fn first(&self) -> Option<SyntaxElement> {
        self.get(0)
    }

    pub fn last(&self) -> Option<SyntaxElement> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    pub fn start_index(&self) -> CollectionIndex {
        CollectionIndex { index: 0, offset: self.0.text_offset() }
    }

    pub fn end_index(&self) -> CollectionIndex {
        CollectionIndex { index: self.len(), offset: self.0.text_range().end() }
    }

    /// Panics if `index` is the end index.
    #[track_caller]
    pub fn index_after(&self, index: CollectionIndex) -> CollectionIndex {
        assert!(index.index < self.len(), "cannot advance past the end index");
        let width = self.member(index.index).width();
        CollectionIndex { index: index.index + 1, offset: index.offset + width }
    }

    /// Panics if `index` is the start index.
    #[track_caller]
    pub fn index_before(&self, index: CollectionIndex) -> CollectionIndex {
        assert!(index.index > 0, "cannot move before the start index");
        let width = self.member(index.index - 1).width();
        CollectionIndex { index: index.index - 1, offset: index.offset - width }
    }

    /// Panics if `index` is the end index.
    #[track_caller]
    pub fn get_at(&self, index: CollectionIndex) -> SyntaxElement {
        let green = self.member(index.index);
        SyntaxElement::new(&self.0, index.index, index.offset, green)
    }

    pub fn iter(&self) -> CollectionIter {
        CollectionIter { inner: self.0.children_with_tokens(), remaining: self.len() }
    }

    #[track_caller]
    fn member(&self, index: usize) -> &GreenElement {
        match self.0.green().slot(index) {
            Some(member) => member,
            None => panic!("{:?} has an absent member at {index}", self.0.kind()),
        }
    }

    /// Appends `element` at the end.
    pub fn appending(&self, arena: &Arena, element: GreenElement) -> Self {
        let len = self.len();
        self.splice(arena, len, len, Some(element))
    }

    /// Inserts `element` at the start.
    pub fn prepending(&self, arena: &Arena, element: GreenElement) -> Self {
        self.splice(arena, 0, 0, Some(element))
    }

    /// Inserts `element` so that it ends up at `index`.
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn inserting(&self, arena: &Arena, index: usize, element: GreenElement) -> Self {
        self.splice(arena, index, index, Some(element))
    }

    /// Removes the member at `index`.
    ///
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn removing(&self, arena: &Arena, index: usize) -> Self {
        assert!(index < self.len(), "index {index} is out of range for length {}", self.len());
        self.splice(arena, index, index + 1, None)
    }

    /// Replaces the member at `index` with `element`.
    ///
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn replacing(&self, arena: &Arena, index: usize, element: GreenElement) -> Self {
        assert!(index < self.len(), "index {index} is out of range for length {}", self.len());
        self.splice(arena, index, index + 1, Some(element))
    }

    #[track_caller]
    fn splice(
        &self,
        arena: &Arena,
        start: usize,
        end: usize,
        element: Option<GreenElement>,
    ) -> Self {
        let green = self.0.green().splice_slots(arena, start..end, element.map(Some));
        Self(self.0.replace_with(arena, green))
    }
}

impl IntoIterator for &SyntaxCollection {
    type Item = SyntaxElement;
    type IntoIter = CollectionIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the members of a [`SyntaxCollection`].
#[derive(Clone)]
pub struct CollectionIter {
    inner: SyntaxElementChildren,
    remaining: usize,
}

impl Iterator for CollectionIter {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.inner.next()?;
        self.remaining -= 1;
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for CollectionIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        let next = self.inner.next_back()?;
        self.remaining -= 1;
        Some(next)
    }
}

impl ExactSizeIterator for CollectionIter {}

impl FusedIterator for CollectionIter {}
