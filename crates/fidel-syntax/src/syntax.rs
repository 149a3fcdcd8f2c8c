//! Positioned view over green trees.
//!
//! A `SyntaxNode` pairs a green node with its absolute offset and the view it
//! was reached from. Views are created while navigating and dropped with the
//! caller; green nodes never point back at them, so no ownership cycle can
//! form. Two views over the same green node at different offsets are
//! unrelated values.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use text_size::{TextRange, TextSize};

use crate::layout::{Layout, SlotLabel};
use crate::{
    Arena, GreenElement, GreenNode, GreenToken, NodeOrToken, Presence, SyntaxKind, TokenAtOffset,
    WalkEvent,
};

/// Node or token element inside a positioned tree.
pub type SyntaxElement = NodeOrToken<SyntaxNode, SyntaxToken>;

/// Positioned node handle.
#[derive(Clone)]
pub struct SyntaxNode(Arc<NodeData>);

struct NodeData {
    green: GreenNode,
    offset: TextSize,
    link: Link,
}

enum Link {
    /// Roots keep the arena that built them alive.
    Root(Arena),
    Child { parent: SyntaxNode, index: u32 },
}

impl SyntaxNode {
    /// Creates the root view of a tree.
    pub fn new_root(arena: Arena, green: GreenNode) -> Self {
        Self(Arc::new(NodeData { green, offset: TextSize::new(0), link: Link::Root(arena) }))
    }

    pub(crate) fn new_child(
        parent: Self,
        index: usize,
        offset: TextSize,
        green: GreenNode,
    ) -> Self {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        Self(Arc::new(NodeData { green, offset, link: Link::Child { parent, index } }))
    }

    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.0.green
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.0.green.kind()
    }

    #[inline]
    pub fn presence(&self) -> Presence {
        self.0.green.presence()
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.0.green.is_missing()
    }

    #[inline]
    pub fn has_error(&self) -> bool {
        self.0.green.has_error()
    }

    #[inline]
    pub fn text_offset(&self) -> TextSize {
        self.0.offset
    }

    #[inline]
    pub fn width(&self) -> TextSize {
        self.0.green.width()
    }

    /// Range covered by this node, trivia included.
    #[inline]
    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.0.offset, self.0.green.width())
    }

    /// Range with the leading trivia of the first token and the trailing
    /// trivia of the last token removed.
    pub fn trimmed_range(&self) -> TextRange {
        let mut tokens = self.tokens().filter(|token| !token.text_trimmed().is_empty());
        let Some(first) = tokens.next() else {
            return TextRange::empty(self.text_offset());
        };
        let last = tokens.last().unwrap_or_else(|| first.clone());
        TextRange::new(first.trimmed_range().start(), last.trimmed_range().end())
    }

    /// Serialized text of the subtree.
    pub fn text(&self) -> String {
        self.0.green.text()
    }

    #[inline]
    pub fn parent(&self) -> Option<Self> {
        match &self.0.link {
            Link::Root(_) => None,
            Link::Child { parent, .. } => Some(parent.clone()),
        }
    }

    #[inline]
    pub fn index_in_parent(&self) -> Option<usize> {
        match &self.0.link {
            Link::Root(_) => None,
            Link::Child { index, .. } => Some(*index as usize),
        }
    }

    /// Returns an iterator of ancestors starting from this node.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + use<> {
        std::iter::successors(Some(self.clone()), Self::parent)
    }

    pub fn root(&self) -> Self {
        self.ancestors().last().unwrap_or_else(|| self.clone())
    }

    /// The arena retained by the root of this tree.
    pub fn arena(&self) -> Arena {
        let mut node = self.clone();
        loop {
            let parent = match &node.0.link {
                Link::Root(arena) => return arena.clone(),
                Link::Child { parent, .. } => parent.clone(),
            };
            node = parent;
        }
    }

    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.0.green.slot_count()
    }

    /// Returns the element in slot `index`, or `None` if the slot is absent.
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn child(&self, index: usize) -> Option<SyntaxElement> {
        let green = self.0.green.slot(index)?;
        let offset = self.0.offset + self.0.green.slot_offset(index);
        Some(SyntaxElement::new(self, index, offset, green))
    }

    #[track_caller]
    pub fn child_node(&self, index: usize) -> Option<Self> {
        self.child(index)?.into_node()
    }

    #[track_caller]
    pub fn child_token(&self, index: usize) -> Option<SyntaxToken> {
        self.child(index)?.into_token()
    }

    /// Every slot, absent ones included.
    pub fn slots(&self) -> SyntaxSlots {
        SyntaxSlots { parent: self.clone(), index: 0, offset: self.0.offset }
    }

    /// Present children, nodes and tokens.
    pub fn children_with_tokens(&self) -> SyntaxElementChildren {
        SyntaxElementChildren {
            parent: self.clone(),
            front: 0,
            front_offset: self.0.offset,
            back: self.slot_count(),
            back_offset: self.text_range().end(),
        }
    }

    /// Present child nodes.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = Self> + use<> {
        self.children_with_tokens().filter_map(SyntaxElement::into_node)
    }

    pub fn first_child_or_token(&self) -> Option<SyntaxElement> {
        self.children_with_tokens().next()
    }

    pub fn last_child_or_token(&self) -> Option<SyntaxElement> {
        self.children_with_tokens().next_back()
    }

    /// First token of the subtree in source order, Missing tokens included.
    pub fn first_token(&self) -> Option<SyntaxToken> {
        self.children_with_tokens().find_map(|child| match child {
            NodeOrToken::Node(node) => node.first_token(),
            NodeOrToken::Token(token) => Some(token),
        })
    }

    /// Last token of the subtree in source order, Missing tokens included.
    pub fn last_token(&self) -> Option<SyntaxToken> {
        self.children_with_tokens().rev().find_map(|child| match child {
            NodeOrToken::Node(node) => node.last_token(),
            NodeOrToken::Token(token) => Some(token),
        })
    }

    /// All tokens of the subtree in source order.
    pub fn tokens(&self) -> impl Iterator<Item = SyntaxToken> + use<> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEvent::Enter(NodeOrToken::Token(token)) => Some(token),
            _ => None,
        })
    }

    pub fn descendants(&self) -> impl Iterator<Item = Self> + use<> {
        self.preorder().filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }

    pub fn descendants_with_tokens(&self) -> impl Iterator<Item = SyntaxElement> + use<> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEvent::Enter(element) => Some(element),
            WalkEvent::Leave(_) => None,
        })
    }

    /// Returns a preorder iterator over nodes.
    pub fn preorder(&self) -> Preorder {
        Preorder { inner: PreorderWithTokens::new(self.clone()) }
    }

    /// Returns a preorder iterator over nodes and tokens.
    pub fn preorder_with_tokens(&self) -> PreorderWithTokens {
        PreorderWithTokens::new(self.clone())
    }

    /// Returns the token at the given offset, if any.
    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        let range = self.text_range();
        if range.is_empty() || !(range.start() <= offset && offset <= range.end()) {
            return TokenAtOffset::None;
        }

        let mut children = self.children_with_tokens().filter(|child| {
            let child_range = child.text_range();
            !child_range.is_empty()
                && child_range.start() <= offset
                && offset <= child_range.end()
        });

        let Some(left) = children.next() else { return TokenAtOffset::None };
        let Some(right) = children.next() else { return left.token_at_offset(offset) };

        let left = left.token_at_offset(offset).left_biased();
        let right = right.token_at_offset(offset).right_biased();
        match (left, right) {
            (Some(left), Some(right)) => TokenAtOffset::Between(left, right),
            (Some(single), None) | (None, Some(single)) => TokenAtOffset::Single(single),
            (None, None) => TokenAtOffset::None,
        }
    }

    /// Returns the smallest element that fully covers `range`.
    pub fn covering_element(&self, range: TextRange) -> SyntaxElement {
        let mut result = SyntaxElement::Node(self.clone());
        loop {
            let NodeOrToken::Node(node) = &result else { return result };
            let child = node.children_with_tokens().find(|child| {
                let child_range = child.text_range();
                child_range.contains_range(range) && (!child_range.is_empty() || range.is_empty())
            });
            match child {
                Some(child) => result = child,
                None => return result,
            }
        }
    }

    /// Index path from the root down to this node.
    pub fn path(&self) -> SyntaxPath {
        let mut indices: Vec<u32> = self
            .ancestors()
            .filter_map(|node| match &node.0.link {
                Link::Root(_) => None,
                Link::Child { index, .. } => Some(*index),
            })
            .collect();
        indices.reverse();
        SyntaxPath(indices.into_boxed_slice())
    }

    /// Follows `path` downwards from this node.
    pub fn descend(&self, path: &SyntaxPath) -> Option<SyntaxElement> {
        let mut element = SyntaxElement::Node(self.clone());
        for &index in path.indices() {
            let node = element.into_node()?;
            if index as usize >= node.slot_count() {
                return None;
            }
            element = node.child(index as usize)?;
        }
        Some(element)
    }

    /// Labeled slot contents, for tools that do not know the grammar.
    pub fn describe_children(&self) -> Vec<(SlotLabel, Option<SyntaxElement>)> {
        let specs = self.kind().layout();
        self.slots()
            .enumerate()
            .map(|(index, slot)| {
                let label = match specs {
                    Layout::Fixed(specs) => {
                        specs.get(index).map_or(SlotLabel::Member(index), |spec| {
                            SlotLabel::Field(spec.label)
                        })
                    }
                    Layout::Token | Layout::Collection(_) => SlotLabel::Member(index),
                };
                (label, slot)
            })
            .collect()
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        self.0.green.ptr_eq(&other.0.green)
            && self.0.offset == other.0.offset
            && match (&self.0.link, &other.0.link) {
                (Link::Root(a), Link::Root(b)) => a.ptr_eq(b),
                (
                    Link::Child { parent: a, index: i },
                    Link::Child { parent: b, index: j },
                ) => i == j && a == b,
                _ => false,
            }
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.green.addr().hash(state);
        self.0.offset.hash(state);
    }
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.green, f)
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            let mut buf = String::new();
            crate::debug::dump_node(self, 0, &mut buf);
            f.write_str(&buf)
        } else {
            write!(f, "{:?}@{:?}", self.kind(), self.text_range())
        }
    }
}

/// Positioned token handle.
#[derive(Clone)]
pub struct SyntaxToken {
    parent: SyntaxNode,
    index: u32,
    offset: TextSize,
    green: GreenToken,
}

impl SyntaxToken {
    pub(crate) fn new(
        parent: SyntaxNode,
        index: usize,
        offset: TextSize,
        green: GreenToken,
    ) -> Self {
        Self { parent, index: u32::try_from(index).unwrap_or(u32::MAX), offset, green }
    }

    #[inline]
    pub fn green(&self) -> &GreenToken {
        &self.green
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    #[inline]
    pub fn presence(&self) -> Presence {
        self.green.presence()
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.green.is_missing()
    }

    /// Token text including trivia.
    #[inline]
    pub fn text(&self) -> &str {
        self.green.text()
    }

    /// Token text excluding trivia.
    #[inline]
    pub fn text_trimmed(&self) -> &str {
        self.green.text_trimmed()
    }

    pub fn leading_trivia_text(&self) -> &str {
        self.green.leading_trivia_text()
    }

    pub fn trailing_trivia_text(&self) -> &str {
        self.green.trailing_trivia_text()
    }

    #[inline]
    pub fn text_offset(&self) -> TextSize {
        self.offset
    }

    /// Range including attached trivia.
    #[inline]
    pub fn text_range(&self) -> TextRange {
        TextRange::at(self.offset, self.green.width())
    }

    /// Range excluding trivia.
    pub fn trimmed_range(&self) -> TextRange {
        let range = self.text_range();
        TextRange::new(
            range.start() + self.green.leading_trivia().len(),
            range.end() - self.green.trailing_trivia().len(),
        )
    }

    #[inline]
    pub fn parent(&self) -> SyntaxNode {
        self.parent.clone()
    }

    #[inline]
    pub fn index_in_parent(&self) -> usize {
        self.index as usize
    }

    /// Returns an iterator of parent nodes, starting from the immediate parent.
    pub fn parent_ancestors(&self) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.parent.ancestors()
    }

    pub fn path(&self) -> SyntaxPath {
        let mut indices = self.parent.path().0.into_vec();
        indices.push(self.index);
        SyntaxPath(indices.into_boxed_slice())
    }

    /// Next token in source order, Missing tokens included.
    pub fn next_token(&self) -> Option<Self> {
        let mut element = SyntaxElement::Token(self.clone());
        loop {
            if let Some(sibling) = element.next_sibling_or_token() {
                match sibling {
                    NodeOrToken::Token(token) => return Some(token),
                    NodeOrToken::Node(node) => match node.first_token() {
                        Some(token) => return Some(token),
                        None => element = NodeOrToken::Node(node),
                    },
                }
            } else {
                element = NodeOrToken::Node(element.parent()?);
            }
        }
    }

    /// Previous token in source order, Missing tokens included.
    pub fn prev_token(&self) -> Option<Self> {
        let mut element = SyntaxElement::Token(self.clone());
        loop {
            if let Some(sibling) = element.prev_sibling_or_token() {
                match sibling {
                    NodeOrToken::Token(token) => return Some(token),
                    NodeOrToken::Node(node) => match node.last_token() {
                        Some(token) => return Some(token),
                        None => element = NodeOrToken::Node(node),
                    },
                }
            } else {
                element = NodeOrToken::Node(element.parent()?);
            }
        }
    }
}

impl PartialEq for SyntaxToken {
    fn eq(&self, other: &Self) -> bool {
        self.green.ptr_eq(&other.green)
            && self.offset == other.offset
            && self.index == other.index
            && self.parent == other.parent
    }
}

impl Eq for SyntaxToken {}

impl Hash for SyntaxToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.green.addr().hash(state);
        self.offset.hash(state);
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())?;
        if self.is_missing() { f.write_str(" missing") } else { write!(f, " {:?}", self.text()) }
    }
}

impl SyntaxElement {
    pub(crate) fn new(
        parent: &SyntaxNode,
        index: usize,
        offset: TextSize,
        green: &GreenElement,
    ) -> Self {
        match green {
            NodeOrToken::Node(node) => {
                let node = SyntaxNode::new_child(parent.clone(), index, offset, node.clone());
                NodeOrToken::Node(node)
            }
            NodeOrToken::Token(token) => {
                NodeOrToken::Token(SyntaxToken::new(parent.clone(), index, offset, token.clone()))
            }
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }

    pub fn trimmed_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.trimmed_range(),
            NodeOrToken::Token(token) => token.trimmed_range(),
        }
    }

    pub fn is_missing(&self) -> bool {
        match self {
            NodeOrToken::Node(node) => node.is_missing(),
            NodeOrToken::Token(token) => token.is_missing(),
        }
    }

    pub fn green(&self) -> GreenElement {
        match self {
            NodeOrToken::Node(node) => NodeOrToken::Node(node.green().clone()),
            NodeOrToken::Token(token) => NodeOrToken::Token(token.green().clone()),
        }
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        match self {
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => Some(token.parent()),
        }
    }

    pub fn index_in_parent(&self) -> Option<usize> {
        match self {
            NodeOrToken::Node(node) => node.index_in_parent(),
            NodeOrToken::Token(token) => Some(token.index_in_parent()),
        }
    }

    pub fn path(&self) -> SyntaxPath {
        match self {
            NodeOrToken::Node(node) => node.path(),
            NodeOrToken::Token(token) => token.path(),
        }
    }

    pub fn next_sibling_or_token(&self) -> Option<Self> {
        let parent = self.parent()?;
        let index = self.index_in_parent()?;
        let end = self.text_range().end();
        (index + 1..parent.slot_count()).find_map(|next| {
            let green = parent.green().slot(next)?;
            Some(Self::new(&parent, next, end, green))
        })
    }

    pub fn prev_sibling_or_token(&self) -> Option<Self> {
        let parent = self.parent()?;
        let index = self.index_in_parent()?;
        let start = self.text_range().start();
        (0..index).rev().find_map(|prev| {
            let green = parent.green().slot(prev)?;
            Some(Self::new(&parent, prev, start - green.width(), green))
        })
    }

    fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        match self {
            NodeOrToken::Node(node) => node.token_at_offset(offset),
            NodeOrToken::Token(token) => TokenAtOffset::Single(token.clone()),
        }
    }
}

impl From<SyntaxNode> for SyntaxElement {
    fn from(node: SyntaxNode) -> Self {
        NodeOrToken::Node(node)
    }
}

impl From<SyntaxToken> for SyntaxElement {
    fn from(token: SyntaxToken) -> Self {
        NodeOrToken::Token(token)
    }
}

/// Index path from a root to an element.
///
/// Unique per element within one tree, so it doubles as an identity key.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyntaxPath(Box<[u32]>);

impl SyntaxPath {
    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

/// Iterator over every slot of a node, absent ones as `None`.
#[derive(Clone)]
pub struct SyntaxSlots {
    parent: SyntaxNode,
    index: usize,
    offset: TextSize,
}

impl Iterator for SyntaxSlots {
    type Item = Option<SyntaxElement>;

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.parent.green().slots();
        if self.index >= slots.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;
        let Some(green) = &slots[index] else { return Some(None) };
        let offset = self.offset;
        self.offset += green.width();
        Some(Some(SyntaxElement::new(&self.parent, index, offset, green)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.parent.slot_count() - self.index;
        (len, Some(len))
    }
}

impl ExactSizeIterator for SyntaxSlots {}

/// Iterator over the present children of a node.
#[derive(Clone)]
pub struct SyntaxElementChildren {
    parent: SyntaxNode,
    front: usize,
    front_offset: TextSize,
    back: usize,
    back_offset: TextSize,
}

impl Iterator for SyntaxElementChildren {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            let index = self.front;
            self.front += 1;
            if let Some(green) = self.parent.green().slot(index) {
                let offset = self.front_offset;
                self.front_offset += green.width();
                return Some(SyntaxElement::new(&self.parent, index, offset, green));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.back - self.front))
    }
}

impl DoubleEndedIterator for SyntaxElementChildren {
    fn next_back(&mut self) -> Option<Self::Item> {
        while self.front < self.back {
            self.back -= 1;
            let index = self.back;
            if let Some(green) = self.parent.green().slot(index) {
                self.back_offset -= green.width();
                return Some(SyntaxElement::new(&self.parent, index, self.back_offset, green));
            }
        }
        None
    }
}

/// Preorder traversal over nodes.
#[derive(Clone)]
pub struct Preorder {
    inner: PreorderWithTokens,
}

impl Preorder {
    /// Skips the current subtree during traversal.
    pub fn skip_subtree(&mut self) {
        self.inner.skip_subtree();
    }
}

impl Iterator for Preorder {
    type Item = WalkEvent<SyntaxNode>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find_map(|event| match event {
            WalkEvent::Enter(NodeOrToken::Node(node)) => Some(WalkEvent::Enter(node)),
            WalkEvent::Leave(NodeOrToken::Node(node)) => Some(WalkEvent::Leave(node)),
            WalkEvent::Enter(NodeOrToken::Token(_)) | WalkEvent::Leave(NodeOrToken::Token(_)) => {
                None
            }
        })
    }
}

/// Preorder traversal over nodes and tokens.
#[derive(Clone)]
pub struct PreorderWithTokens {
    stack: Vec<(SyntaxNode, SyntaxElementChildren)>,
    root: Option<SyntaxNode>,
    pending_leave: Option<SyntaxToken>,
}

impl PreorderWithTokens {
    fn new(start: SyntaxNode) -> Self {
        Self { stack: Vec::with_capacity(32), root: Some(start), pending_leave: None }
    }

    /// Skips the children of the node that was entered last.
    pub fn skip_subtree(&mut self) {
        if let Some((_, children)) = self.stack.last_mut() {
            children.front = children.back;
        }
    }
}

impl Iterator for PreorderWithTokens {
    type Item = WalkEvent<SyntaxElement>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending_leave.take() {
            return Some(WalkEvent::Leave(NodeOrToken::Token(token)));
        }
        let Some((_, active_node)) = self.stack.last_mut() else {
            let root = self.root.take()?;
            self.stack.push((root.clone(), root.children_with_tokens()));
            return Some(WalkEvent::Enter(NodeOrToken::Node(root)));
        };
        match active_node.next() {
            Some(NodeOrToken::Node(child)) => {
                self.stack.push((child.clone(), child.children_with_tokens()));
                Some(WalkEvent::Enter(NodeOrToken::Node(child)))
            }
            Some(NodeOrToken::Token(token)) => {
                self.pending_leave = Some(token.clone());
                Some(WalkEvent::Enter(NodeOrToken::Token(token)))
            }
            None => {
                let (exited, _) = self.stack.pop()?;
                Some(WalkEvent::Leave(NodeOrToken::Node(exited)))
            }
        }
    }
}
