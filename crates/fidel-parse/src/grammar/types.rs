use fidel_syntax::SyntaxKind::*;

use crate::parser::Parser;

pub(crate) fn type_name(p: &mut Parser<'_>) {
    if p.at(IDENT) {
        let m = p.start();
        p.advance();
        m.complete(p, TYPE_NAME);
    } else {
        p.missing(TYPE_NAME);
    }
}

pub(crate) fn annotation(p: &mut Parser<'_>) {
    debug_assert_eq!(p.peek_kind(), COLON);
    let m = p.start();
    p.advance();
    type_name(p);
    m.complete(p, TYPE_ANNOTATION);
}

pub(crate) fn return_clause(p: &mut Parser<'_>) {
    debug_assert_eq!(p.peek_kind(), ARROW);
    let m = p.start();
    p.advance();
    type_name(p);
    m.complete(p, RETURN_CLAUSE);
}
