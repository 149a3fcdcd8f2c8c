//! Error-tolerant parser for the demo grammar.
//!
//! Parsing never fails: anything the grammar cannot place ends up in the tree
//! as a Missing placeholder or an `UNEXPECTED` node, and [`diagnostics`]
//! reports them afterwards.

use fidel_errors::Diagnostic;
use fidel_syntax::ast::{self, Node as _};
use fidel_syntax::{Arena, SyntaxNode};

mod diagnostics;
mod grammar;
mod parser;
#[cfg(test)]
mod tests;

pub use diagnostics::diagnostics;

/// The result of parsing a source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parse {
    root: SyntaxNode,
}

impl Parse {
    pub fn syntax_node(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn tree(&self) -> ast::SourceFile {
        ast::SourceFile::cast(self.root.clone())
            .unwrap_or_else(|| unreachable!("the parser always produces a source file"))
    }

    pub fn has_errors(&self) -> bool {
        self.root.has_error()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        diagnostics(&self.root)
    }
}

/// Parses `text` into a tree allocated in `arena`.
///
/// The tree's text is always exactly `text`.
pub fn parse(arena: &Arena, text: &str) -> Parse {
    let _span = tracing::debug_span!("parse", len = text.len()).entered();
    let mut parser = parser::Parser::new(arena.clone(), text);
    grammar::items::source_file(&mut parser);
    Parse { root: SyntaxNode::new_root(arena.clone(), parser.build_tree()) }
}
