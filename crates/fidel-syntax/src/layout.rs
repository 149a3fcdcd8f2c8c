//! Per-kind slot layouts.
//!
//! A node's children are a fixed sequence of slots, one per grammar field, or
//! (for collections) a homogeneous sequence of members. The layout table is
//! what lets the generic tree code decide what "nothing" means for a slot and
//! lets tooling label children without knowing the grammar.

use std::fmt;

use crate::{SyntaxKind, SyntaxSet};

/// Shape of the children of a given [`SyntaxKind`].
#[derive(Clone, Copy, Debug)]
pub enum Layout {
    /// Leaf kind, no children.
    Token,
    /// One slot per grammar field.
    Fixed(&'static [SlotSpec]),
    /// Any number of members whose kinds are in the set.
    Collection(SyntaxSet),
}

impl Layout {
    /// Returns the slot specs of a fixed layout, or an empty slice.
    pub fn slots(self) -> &'static [SlotSpec] {
        match self {
            Layout::Fixed(slots) => slots,
            Layout::Token | Layout::Collection(_) => &[],
        }
    }

    /// Returns the permitted member kinds of a collection layout.
    pub fn members(self) -> Option<SyntaxSet> {
        match self {
            Layout::Collection(members) => Some(members),
            Layout::Token | Layout::Fixed(_) => None,
        }
    }
}

/// Declaration of a single slot.
#[derive(Clone, Copy, Debug)]
pub struct SlotSpec {
    pub label: &'static str,
    /// Kinds allowed to occupy the slot when present.
    pub accepts: SyntaxSet,
    /// Kind of the Missing placeholder for a required slot.
    pub placeholder: SyntaxKind,
    pub optional: bool,
}

impl SlotSpec {
    pub const fn required(label: &'static str, kind: SyntaxKind) -> Self {
        Self { label, accepts: SyntaxSet::new([kind]), placeholder: kind, optional: false }
    }

    pub const fn optional(label: &'static str, kind: SyntaxKind) -> Self {
        Self { label, accepts: SyntaxSet::new([kind]), placeholder: kind, optional: true }
    }

    pub const fn one_of(label: &'static str, accepts: SyntaxSet, placeholder: SyntaxKind) -> Self {
        Self { label, accepts, placeholder, optional: false }
    }

    pub const fn expr(label: &'static str) -> Self {
        Self::one_of(label, crate::syntax_kind::EXPR, SyntaxKind::MISSING_EXPR)
    }

    pub const fn optional_expr(label: &'static str) -> Self {
        Self { optional: true, ..Self::expr(label) }
    }

    pub const fn unexpected(label: &'static str) -> Self {
        Self::optional(label, SyntaxKind::UNEXPECTED)
    }
}

/// Label of a child as reported by `describe_children`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotLabel {
    Field(&'static str),
    Member(usize),
}

impl fmt::Display for SlotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotLabel::Field(name) => f.write_str(name),
            SlotLabel::Member(index) => write!(f, "[{index}]"),
        }
    }
}
