//! Hand-built trees for unit tests.

use crate::SyntaxKind::{self, *};
use crate::{Arena, Builder, SyntaxNode, TriviaPiece, TriviaPieceKind};

pub(crate) const SOURCE: &str = "let x = 1 + 2\nlet y = f(a, b, c)\n";

/// Builds the tree of [`SOURCE`].
pub(crate) fn sample_tree() -> SyntaxNode {
    let arena = Arena::new();
    let mut b = Builder::new(arena.clone());
    b.start_node(SOURCE_FILE);
    b.start_node(ITEM_LIST);

    b.start_node(LET_DECL);
    token(&mut b, LET_KW, "let ");
    token(&mut b, IDENT, "x ");
    b.absent();
    b.start_node(INITIALIZER_CLAUSE);
    token(&mut b, EQ, "= ");
    b.start_node(BINARY_EXPR);
    literal(&mut b, "1 ");
    token(&mut b, PLUS, "+ ");
    literal(&mut b, "2");
    b.finish_node();
    b.finish_node();
    b.finish_node();

    b.start_node(LET_DECL);
    token(&mut b, LET_KW, "\nlet ");
    token(&mut b, IDENT, "y ");
    b.absent();
    b.start_node(INITIALIZER_CLAUSE);
    token(&mut b, EQ, "= ");
    b.start_node(CALL_EXPR);
    name(&mut b, "f");
    b.start_node(ARG_CLAUSE);
    token(&mut b, L_PAREN, "(");
    b.start_node(ARG_LIST);
    for (arg, comma) in [("a", Some(", ")), ("b", Some(", ")), ("c", None)] {
        b.start_node(ARG);
        name(&mut b, arg);
        match comma {
            Some(comma) => token(&mut b, COMMA, comma),
            None => b.absent(),
        }
        b.finish_node();
    }
    b.finish_node();
    token(&mut b, R_PAREN, ")");
    b.finish_node();
    b.finish_node();
    b.finish_node();
    b.finish_node();

    b.finish_node();
    token(&mut b, EOF, "\n");
    b.finish_node();
    SyntaxNode::new_root(arena, b.finish())
}

fn literal(b: &mut Builder, text: &str) {
    b.start_node(LITERAL_EXPR);
    token(b, INT_NUMBER, text);
    b.finish_node();
}

fn name(b: &mut Builder, text: &str) {
    b.start_node(NAME_EXPR);
    token(b, IDENT, text);
    b.finish_node();
}

/// Adds a token, splitting surrounding whitespace off as trivia.
pub(crate) fn token(b: &mut Builder, kind: SyntaxKind, text: &str) {
    let rest = text.trim_start();
    let content = rest.trim_end();
    let leading = pieces(&text[..text.len() - rest.len()]);
    let trailing = pieces(&rest[content.len()..]);
    b.token(kind, text, &leading, &trailing);
}

fn pieces(trivia: &str) -> Vec<TriviaPiece> {
    trivia
        .chars()
        .map(|c| {
            let kind =
                if c == '\n' { TriviaPieceKind::Newline } else { TriviaPieceKind::Whitespace };
            TriviaPiece::new(kind, 1.into())
        })
        .collect()
}
