use fidel_syntax::SyntaxKind::*;
use fidel_syntax::SyntaxSet;

use super::{ITEM_FIRST, exprs, types};
use crate::parser::Parser;

/// Where stray tokens between a function name and its parameters end.
const PARAMS_RECOVERY: SyntaxSet = SyntaxSet::new([L_PAREN, ARROW, L_BRACE, FUNC_KW, LET_KW]);

/// Where stray tokens inside a parameter clause end.
const R_PAREN_RECOVERY: SyntaxSet = SyntaxSet::new([R_PAREN, ARROW, L_BRACE, FUNC_KW, LET_KW]);

pub(crate) fn source_file(p: &mut Parser<'_>) {
    let m = p.start();

    let items = p.start();
    while !p.at(EOF) {
        item(p);
        p.recover_nesting(&ITEM_FIRST);
    }
    items.complete(p, ITEM_LIST);

    p.finish_input();
    m.complete(p, SOURCE_FILE);
}

fn item(p: &mut Parser<'_>) {
    match p.peek_kind() {
        FUNC_KW => func_decl(p),
        LET_KW => let_decl(p),
        _ => p.unexpected(&ITEM_FIRST),
    }
}

fn func_decl(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();
    p.expect(IDENT);
    p.unexpected_until(&PARAMS_RECOVERY);

    if p.at(L_PAREN) {
        param_clause(p);
    } else {
        p.missing(PARAM_CLAUSE);
    }

    if p.at(ARROW) {
        types::return_clause(p);
    } else {
        p.absent();
    }

    if p.at(L_BRACE) {
        exprs::code_block(p);
    } else {
        p.missing(CODE_BLOCK);
    }

    m.complete(p, FUNC_DECL);
}

fn param_clause(p: &mut Parser<'_>) {
    debug_assert_eq!(p.peek_kind(), L_PAREN);
    let m = p.start();
    p.advance();

    let params = p.start();
    while p.at(IDENT) {
        if !param(p) {
            break;
        }
    }
    params.complete(p, PARAM_LIST);

    p.unexpected_until(&R_PAREN_RECOVERY);
    p.expect(R_PAREN);
    m.complete(p, PARAM_CLAUSE);
}

/// Returns whether the parameter ended with a comma.
fn param(p: &mut Parser<'_>) -> bool {
    let m = p.start();
    p.advance();
    p.expect(COLON);
    types::type_name(p);
    let comma = p.eat_or_absent(COMMA);
    m.complete(p, PARAM);
    comma
}

pub(super) fn let_decl(p: &mut Parser<'_>) {
    debug_assert_eq!(p.peek_kind(), LET_KW);
    let m = p.start();
    p.advance();
    p.expect(IDENT);

    if p.at(COLON) {
        types::annotation(p);
    } else {
        p.absent();
    }

    if p.at(EQ) {
        let initializer = p.start();
        p.advance();
        exprs::expr(p);
        initializer.complete(p, INITIALIZER_CLAUSE);
    } else {
        p.absent();
    }

    m.complete(p, LET_DECL);
}
