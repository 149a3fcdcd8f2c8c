use fidel_syntax::SyntaxKind::*;
use fidel_syntax::SyntaxSet;

mod exprs;
pub(crate) mod items;
mod types;

/// Tokens that start a top-level item.
const ITEM_FIRST: SyntaxSet = SyntaxSet::new([FUNC_KW, LET_KW]);

/// Tokens that start an expression.
const EXPR_FIRST: SyntaxSet = SyntaxSet::new([IDENT, INT_NUMBER, L_PAREN, MINUS]);
