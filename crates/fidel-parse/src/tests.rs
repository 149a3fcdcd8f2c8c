use std::fs;
use std::path::{Path, PathBuf};

use expect_test::expect;
use fidel_errors::DiagnosticId;
use fidel_syntax::ast::{Expr, Item, Node as _, Stmt};
use fidel_syntax::{
    Arena, SyntaxKind, SyntaxNode, SyntaxPath, TriviaPiece, TriviaPieceKind, validate,
};
use text_size::TextSize;

use crate::parse;

/// Inputs in `test_data/` that must parse without errors.
const VALID: &[&str] = &["crlf", "functions", "lets", "trailing_trivia"];

#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct TestCase {
    input: PathBuf,
    text: String,
}

impl TestCase {
    fn list() -> Vec<Self> {
        let test_data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data");

        let mut cases = fs::read_dir(&test_data_dir)
            .unwrap_or_else(|err| {
                panic!("Cannot read directory {}: {err}", test_data_dir.display())
            })
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? == "fidel" {
                    let text = fs::read_to_string(&path).ok()?;
                    Some(Self { input: path, text })
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        cases.sort();
        cases
    }

    fn name(&self) -> &str {
        self.input.file_stem().and_then(|stem| stem.to_str()).unwrap_or_default()
    }
}

/// Every Missing element and `UNEXPECTED` node, by position in the tree.
fn markers(root: &SyntaxNode) -> Vec<(SyntaxPath, SyntaxKind, bool)> {
    root.descendants_with_tokens()
        .filter(|element| element.is_missing() || element.kind() == SyntaxKind::UNEXPECTED)
        .map(|element| (element.path(), element.kind(), element.is_missing()))
        .collect()
}

fn check_fidelity(arena: &Arena, text: &str) {
    let root = parse(arena, text).syntax_node().clone();

    assert_eq!(root.text(), text);
    assert_eq!(root.text_range().end(), TextSize::of(text));
    if let Err(err) = validate(&root) {
        panic!("{err} in {text:?}");
    }

    let respaced = respaced(&root);
    let reparsed = parse(arena, &respaced).syntax_node().clone();
    assert_eq!(reparsed.text(), respaced);
    assert_eq!(markers(&reparsed), markers(&root), "markers moved in {respaced:?}");
}

/// The text of `root` with every whitespace trivia piece doubled.
fn respaced(root: &SyntaxNode) -> String {
    let mut text = String::new();
    for token in root.tokens() {
        let green = token.green();
        push_respaced(&mut text, green.leading_trivia_text(), green.leading_trivia().pieces());
        text.push_str(token.text_trimmed());
        push_respaced(&mut text, green.trailing_trivia_text(), green.trailing_trivia().pieces());
    }
    text
}

fn push_respaced(buf: &mut String, mut trivia: &str, pieces: &[TriviaPiece]) {
    for piece in pieces {
        let (piece_text, rest) = trivia.split_at(usize::from(piece.len));
        buf.push_str(piece_text);
        if piece.kind == TriviaPieceKind::Whitespace {
            buf.push_str(piece_text);
        }
        trivia = rest;
    }
}

fn dump(text: &str) -> String {
    format!("{:#?}", parse(&Arena::new(), text).syntax_node())
}

#[test]
fn corpus_round_trips() {
    let cases = TestCase::list();
    assert!(!cases.is_empty());
    let arena = Arena::new();

    for case in &cases {
        check_fidelity(&arena, &case.text);

        let parse = parse(&arena, &case.text);
        let valid = VALID.contains(&case.name());
        assert_eq!(!parse.has_errors(), valid, "{}", case.input.display());
        assert_eq!(parse.diagnostics().is_empty(), valid, "{}", case.input.display());
    }
}

#[test]
fn every_prefix_round_trips() {
    let arena = Arena::new();

    for case in TestCase::list() {
        for (end, _) in case.text.char_indices() {
            check_fidelity(&arena, &case.text[..end]);
        }
        check_fidelity(&arena, &case.text);
    }
}

#[test]
fn odd_inputs_round_trip() {
    let arena = Arena::new();
    let texts = ["", " ", "\n", "\0", "\r", "//", "-", "->", "func", "(((", ")))", "}{", "let let"];
    for text in texts {
        check_fidelity(&arena, text);
    }
}

#[test]
fn respacing_doubles_whitespace_only() {
    let root = parse(&Arena::new(), "let x = 1 // one\n\tf( 2)").syntax_node().clone();
    assert_eq!(respaced(&root), "let  x  =  1  // one\n\t\tf(  2)");
}

#[test]
fn deep_nesting_round_trips() {
    const DEPTH: usize = 5000;
    let arena = Arena::new();
    let texts = [
        format!("let x = {}", "(".repeat(DEPTH)),
        format!("let x = {}1{}", "(".repeat(DEPTH), ")".repeat(DEPTH)),
        format!("let x = {}1", "-".repeat(DEPTH)),
        format!("let x = 1{}", " + 1".repeat(DEPTH)),
        format!("let x = f{}", "()".repeat(DEPTH)),
        format!("let x = {}", "f(".repeat(DEPTH)),
        format!("func f() {{\n  return {}1\n}}\n", "-(".repeat(DEPTH)),
    ];

    for text in &texts {
        check_fidelity(&arena, text);
        let parse = parse(&arena, text);
        assert!(parse.has_errors(), "{}", &text[..16]);
        assert!(!parse.diagnostics().is_empty(), "{}", &text[..16]);
    }
}

#[test]
fn parsing_resumes_after_deep_nesting() {
    let nested = "-(".repeat(5000);
    let text = format!("func f() {{\n  return {nested}1\n  let y = 2\n}}\nlet z = 3\n");
    let parse = parse(&Arena::new(), &text);
    assert_eq!(parse.syntax_node().text(), text);

    let items = parse.tree().items().unwrap();
    assert_eq!(items.len(), 2);

    let Some(Item::Func(f)) = items.get(0) else { panic!() };
    let body = f.body().unwrap();
    assert!(!body.r_brace().unwrap().is_missing());
    let kinds: Vec<_> = body.stmts().unwrap().iter().map(|stmt| stmt.syntax().kind()).collect();
    assert_eq!(kinds, [SyntaxKind::RETURN_STMT, SyntaxKind::UNEXPECTED, SyntaxKind::LET_DECL]);

    let Some(Item::Let(z)) = items.get(1) else { panic!() };
    assert!(!z.syntax().has_error());
}

#[test]
fn moderate_nesting_parses_cleanly() {
    let arena = Arena::new();
    let texts = [
        format!("let x = {}1{}", "(".repeat(200), ")".repeat(200)),
        format!("let x = {}1", "-".repeat(200)),
        format!("let x = 1{}", " * 2 + 1".repeat(100)),
        format!("let x = f{}", "(1)".repeat(200)),
    ];

    for text in &texts {
        check_fidelity(&arena, text);
        assert!(!parse(&arena, text).has_errors(), "{}", &text[..16]);
    }
}

#[test]
fn unclosed_parameter_clause() {
    let parse = parse(&Arena::new(), "func f(");
    assert_eq!(parse.syntax_node().text(), "func f(");

    let Some(Item::Func(func)) = parse.tree().items().and_then(|items| items.get(0)) else {
        panic!("expected a function");
    };
    let r_paren = func.params().and_then(|params| params.r_paren()).unwrap();
    assert!(r_paren.is_missing());
    assert_eq!(r_paren.text(), "");

    expect![[r#"
        SOURCE_FILE@0..7
          items: ITEM_LIST@0..7
            [0]: FUNC_DECL@0..7
              func_kw: FUNC_KW@0..5 "func "
              name: IDENT@5..6 "f"
              params: PARAM_CLAUSE@6..7
                l_paren: L_PAREN@6..7 "("
                params: PARAM_LIST@7..7
                r_paren: R_PAREN@7..7 missing
              body: CODE_BLOCK@7..7 missing
          eof: EOF@7..7 ""
    "#]]
    .assert_eq(&format!("{:#?}", parse.syntax_node()));
}

#[test]
fn missing_operand() {
    let parse = parse(&Arena::new(), "let x = 1 +");
    assert_eq!(parse.syntax_node().text(), "let x = 1 +");

    let ids: Vec<_> = parse.diagnostics().iter().map(|it| it.id().as_str()).collect();
    assert_eq!(ids, ["missing-expression-after-operator"]);
    assert_eq!(ids, [DiagnosticId::MissingExpressionAfterOperator.as_str()]);

    expect![[r#"
        SOURCE_FILE@0..11
          items: ITEM_LIST@0..11
            [0]: LET_DECL@0..11
              let_kw: LET_KW@0..4 "let "
              name: IDENT@4..6 "x "
              initializer: INITIALIZER_CLAUSE@6..11
                eq: EQ@6..8 "= "
                value: BINARY_EXPR@8..11
                  lhs: LITERAL_EXPR@8..10
                    value: INT_NUMBER@8..10 "1 "
                  op: PLUS@10..11 "+"
                  rhs: MISSING_EXPR@11..11 missing
          eof: EOF@11..11 ""
    "#]]
    .assert_eq(&format!("{:#?}", parse.syntax_node()));
}

#[test]
fn multiplication_binds_tighter() {
    expect![[r#"
        SOURCE_FILE@0..17
          items: ITEM_LIST@0..17
            [0]: LET_DECL@0..17
              let_kw: LET_KW@0..4 "let "
              name: IDENT@4..6 "x "
              initializer: INITIALIZER_CLAUSE@6..17
                eq: EQ@6..8 "= "
                value: BINARY_EXPR@8..17
                  lhs: LITERAL_EXPR@8..10
                    value: INT_NUMBER@8..10 "1 "
                  op: MINUS@10..12 "- "
                  rhs: BINARY_EXPR@12..17
                    lhs: LITERAL_EXPR@12..14
                      value: INT_NUMBER@12..14 "2 "
                    op: STAR@14..16 "* "
                    rhs: LITERAL_EXPR@16..17
                      value: INT_NUMBER@16..17 "3"
          eof: EOF@17..17 ""
    "#]]
    .assert_eq(&dump("let x = 1 - 2 * 3"));
}

fn initializer(text: &str) -> Expr {
    let parse = parse(&Arena::new(), text);
    let Some(Item::Let(decl)) = parse.tree().items().and_then(|items| items.get(0)) else {
        panic!("expected a let declaration in {text:?}");
    };
    decl.initializer().and_then(|it| it.value()).unwrap()
}

#[test]
fn binary_operators_are_left_associative() {
    let Expr::Binary(outer) = initializer("let x = 1 - 2 - 3") else { panic!() };
    assert!(matches!(outer.lhs(), Some(Expr::Binary(_))));
    assert!(matches!(outer.rhs(), Some(Expr::Literal(_))));
    assert_eq!(outer.lhs().unwrap().syntax().text(), "1 - 2 ");
}

#[test]
fn calls_and_prefixes() {
    let Expr::Binary(sum) = initializer("let x = -f(1)(2) + (3)") else { panic!() };
    let Some(Expr::Prefix(neg)) = sum.lhs() else { panic!() };
    let Some(Expr::Call(call)) = neg.operand() else { panic!() };
    assert!(matches!(call.callee(), Some(Expr::Call(_))));
    assert!(matches!(sum.rhs(), Some(Expr::Paren(_))));
}

#[test]
fn missing_left_operand() {
    let Expr::Binary(product) = initializer("let x = * 2") else { panic!() };
    let Some(Expr::Missing(lhs)) = product.lhs() else { panic!() };
    assert!(lhs.syntax().is_missing());
    assert_eq!(product.syntax().text(), "* 2");
}

#[test]
fn empty_arguments_are_missing_expressions() {
    let Expr::Call(call) = initializer("let x = f(, 1)") else { panic!() };
    let args = call.args().and_then(|clause| clause.args()).unwrap();
    assert_eq!(args.len(), 2);
    assert!(matches!(args.get(0).and_then(|arg| arg.value()), Some(Expr::Missing(_))));
    assert!(args.get(0).and_then(|arg| arg.trailing_comma()).is_some());
}

#[test]
fn stray_tokens_before_closing_paren() {
    let parse = parse(&Arena::new(), "func f(a: Int b c) {}");
    let Some(Item::Func(func)) = parse.tree().items().and_then(|items| items.get(0)) else {
        panic!("expected a function");
    };
    let params = func.params().unwrap();

    assert_eq!(params.params().unwrap().len(), 1);
    assert_eq!(params.unexpected_before_r_paren().unwrap().syntax().text(), "b c");
    assert!(!params.r_paren().unwrap().is_missing());
}

#[test]
fn unclosed_block_stops_at_next_function() {
    let parse = parse(&Arena::new(), "func f() {\n  let x = 1\nfunc g() {}");
    let items = parse.tree().items().unwrap();
    assert_eq!(items.len(), 2);

    let Some(Item::Func(f)) = items.get(0) else { panic!() };
    let body = f.body().unwrap();
    assert!(body.r_brace().unwrap().is_missing());
    assert_eq!(body.stmts().unwrap().len(), 1);
    assert!(matches!(body.stmts().unwrap().get(0), Some(Stmt::Let(_))));

    let Some(Item::Func(g)) = items.get(1) else { panic!() };
    assert!(!g.syntax().has_error());
}

#[test]
fn removing_the_middle_argument_shares_the_others() {
    let Expr::Call(call) = initializer("let v = f(a, b, c)") else { panic!() };
    let arena = call.syntax().arena();
    let args = call.args().and_then(|clause| clause.args()).unwrap();

    let removed = args.removing(&arena, 1);

    assert_eq!(removed.len(), 2);
    let before = args.collection();
    let after = removed.collection();
    assert!(after.get(0).unwrap().green().ptr_eq(&before.get(0).unwrap().green()));
    assert!(after.get(1).unwrap().green().ptr_eq(&before.get(2).unwrap().green()));
    assert_eq!(removed.syntax().root().text(), "let v = f(a, c)");
}

#[test]
fn parsing_is_deterministic_across_threads() {
    let arena = Arena::new();
    let text = "func f(a: Int) {\n  return a +\n}\n";

    let roots: Vec<SyntaxNode> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| parse(&arena, text).syntax_node().clone()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    for root in &roots {
        assert_eq!(root.green(), roots[0].green());
        assert_eq!(root.text(), text);
    }
}

#[test]
fn recovery_is_traced() {
    let subscriber = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        check_fidelity(&Arena::new(), "func ) f( -> {");
    });
}
