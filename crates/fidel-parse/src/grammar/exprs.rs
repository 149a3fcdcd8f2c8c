use fidel_syntax::SyntaxKind::{self, *};
use fidel_syntax::SyntaxSet;

use super::{EXPR_FIRST, items};
use crate::parser::{CompletedMarker, Parser};

/// Tokens that close a code block, whether or not the `}` is there.
const BLOCK_END: SyntaxSet = SyntaxSet::new([R_BRACE, FUNC_KW]);

/// Where stray tokens inside a code block end.
const STMT_RECOVERY: SyntaxSet =
    SyntaxSet::new([LET_KW, RETURN_KW, R_BRACE, FUNC_KW]).union(&EXPR_FIRST);

/// Where the rest of an overly nested statement ends.
const NESTING_RECOVERY: SyntaxSet = SyntaxSet::new([LET_KW, RETURN_KW, R_BRACE, FUNC_KW]);

pub(crate) fn code_block(p: &mut Parser<'_>) {
    debug_assert_eq!(p.peek_kind(), L_BRACE);
    let m = p.start();
    p.advance();

    let stmts = p.start();
    while !p.at(EOF) && !p.at_any(&BLOCK_END) {
        stmt(p);
        p.recover_nesting(&NESTING_RECOVERY);
    }
    stmts.complete(p, STMT_LIST);

    p.expect(R_BRACE);
    m.complete(p, CODE_BLOCK);
}

fn stmt(p: &mut Parser<'_>) {
    match p.peek_kind() {
        LET_KW => items::let_decl(p),
        RETURN_KW => {
            let m = p.start();
            p.advance();
            if p.at_any(&EXPR_FIRST) {
                expr(p);
            } else {
                p.absent();
            }
            m.complete(p, RETURN_STMT);
        }
        kind if EXPR_FIRST.contains(kind) => {
            let m = p.start();
            expr(p);
            m.complete(p, EXPR_STMT);
        }
        _ => p.unexpected(&STMT_RECOVERY),
    }
}

/// Fills an expression slot. Never fails: without an expression to parse,
/// this leaves a `MISSING_EXPR` placeholder.
pub(crate) fn expr(p: &mut Parser<'_>) -> CompletedMarker {
    expr_bp(p, 0)
}

fn expr_bp(p: &mut Parser<'_>, min_bp: u8) -> CompletedMarker {
    let mut lhs = prefix_expr(p);
    let mut links = 0;

    while let Some(bp) = binding_power(p.peek_kind()) {
        if bp <= min_bp || !p.enter_nesting() {
            break;
        }
        links += 1;

        let m = lhs.precede(p);
        p.advance();
        expr_bp(p, bp);
        lhs = m.complete(p, BINARY_EXPR);
    }

    p.leave_nesting(links);
    lhs
}

fn binding_power(kind: SyntaxKind) -> Option<u8> {
    match kind {
        PLUS | MINUS => Some(1),
        STAR | SLASH => Some(2),
        _ => None,
    }
}

/// Past the nesting limit the operand is left Missing and the tokens that
/// would have filled it are wrapped by the enclosing item or statement.
fn prefix_expr(p: &mut Parser<'_>) -> CompletedMarker {
    if !p.enter_nesting() {
        return p.missing_marker(MISSING_EXPR);
    }

    let lhs = if p.at(MINUS) {
        let m = p.start();
        p.advance();
        prefix_expr(p);
        m.complete(p, PREFIX_EXPR)
    } else {
        postfix_expr(p)
    };

    p.leave_nesting(1);
    lhs
}

fn postfix_expr(p: &mut Parser<'_>) -> CompletedMarker {
    let mut m = primary_expr(p);
    let mut calls = 0;

    while p.at(L_PAREN) && p.enter_nesting() {
        calls += 1;
        let call = m.precede(p);
        arg_clause(p);
        m = call.complete(p, CALL_EXPR);
    }

    p.leave_nesting(calls);
    m
}

fn primary_expr(p: &mut Parser<'_>) -> CompletedMarker {
    match p.peek_kind() {
        INT_NUMBER => {
            let m = p.start();
            p.advance();
            m.complete(p, LITERAL_EXPR)
        }
        IDENT => {
            let m = p.start();
            p.advance();
            m.complete(p, NAME_EXPR)
        }
        L_PAREN => {
            let m = p.start();
            p.advance();
            expr(p);
            p.expect(R_PAREN);
            m.complete(p, PAREN_EXPR)
        }
        _ => p.missing_marker(MISSING_EXPR),
    }
}

fn arg_clause(p: &mut Parser<'_>) {
    debug_assert_eq!(p.peek_kind(), L_PAREN);
    let m = p.start();
    p.advance();

    let args = p.start();
    while (p.at(COMMA) || p.at_any(&EXPR_FIRST)) && !p.nesting_exhausted() {
        let arg = p.start();
        expr(p);
        let comma = p.eat_or_absent(COMMA);
        arg.complete(p, ARG);
        if !comma {
            break;
        }
    }
    args.complete(p, ARG_LIST);

    p.expect(R_PAREN);
    m.complete(p, ARG_CLAUSE);
}
