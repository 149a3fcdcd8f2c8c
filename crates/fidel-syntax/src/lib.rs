//! Lossless, error-tolerant syntax trees with structural sharing.
//!
//! Green nodes are immutable, position independent and shared between trees.
//! Positioned `SyntaxNode`/`SyntaxToken` handles are created on demand while
//! navigating. Parse errors live in the tree as Missing placeholders and
//! `UNEXPECTED` nodes, so every tree serializes back to its exact source text.

mod arena;
/// Typed views over the raw syntax tree.
pub mod ast;
mod builder;
mod collection;
mod debug;
mod edit;
#[cfg(test)]
mod fixtures;
mod green;
mod layout;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod trivia;
mod utility_types;
mod validate;

/// Shared allocator for green elements.
pub use arena::{Arena, ArenaConfig, ArenaStats};
/// Incremental builder for green trees.
pub use builder::Builder;
/// Ordered-container view of collection nodes.
pub use collection::{CollectionIndex, CollectionIter, SyntaxCollection};
/// Immutable, position independent tree storage.
pub use green::{GreenElement, GreenNode, GreenToken, Presence, Slot};
/// Per-kind slot layouts.
pub use layout::{Layout, SlotLabel, SlotSpec};
/// Positioned view over green trees.
pub use syntax::{
    Preorder, PreorderWithTokens, SyntaxElement, SyntaxElementChildren, SyntaxNode, SyntaxPath,
    SyntaxSlots, SyntaxToken,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::{BINARY_OPERATORS, EXPR, SyntaxKind};
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
/// Trivia pieces attached to tokens.
pub use trivia::{GreenTrivia, TriviaPiece, TriviaPieceKind};
pub use utility_types::{NodeOrToken, TokenAtOffset, WalkEvent};
/// Full-scan structural validation.
pub use validate::{ValidationError, validate};
