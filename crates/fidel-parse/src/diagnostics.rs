//! Diagnostics derived from the fidelity markers of a parsed tree.
//!
//! Contextual rules run first and claim the markers they explain. The
//! generic Missing/Unexpected rules then report whatever is left.

use fidel_errors::{Diagnostic, DiagnosticId, DiagnosticSink};
use fidel_syntax::SyntaxKind::{self, *};
use fidel_syntax::{NodeOrToken, SyntaxElement, SyntaxNode, WalkEvent};

type Rule = fn(&SyntaxElement) -> Option<(DiagnosticId, String)>;

const CONTEXTUAL_RULES: &[Rule] =
    &[missing_operand, unclosed_delimiter, missing_code_block, top_level_code];

/// Reports every Missing and Unexpected marker under `root`, ordered by
/// position.
pub fn diagnostics(root: &SyntaxNode) -> Vec<Diagnostic> {
    let markers = fidelity_markers(root);
    let mut sink = DiagnosticSink::new();

    for marker in &markers {
        if let Some((id, message)) = CONTEXTUAL_RULES.iter().find_map(|rule| rule(marker)) {
            sink.report(id, message, marker.clone());
        }
    }

    for marker in &markers {
        if !sink.is_handled(marker) {
            let (id, message) = generic(marker);
            sink.report(id, message, marker.clone());
        }
    }

    sink.finish()
}

/// Missing elements and `UNEXPECTED` nodes, in preorder.
///
/// Subtrees without errors are skipped, and so is the inside of every
/// marker.
fn fidelity_markers(root: &SyntaxNode) -> Vec<SyntaxElement> {
    let mut markers = Vec::new();
    let mut preorder = root.preorder();

    while let Some(event) = preorder.next() {
        let WalkEvent::Enter(node) = event else { continue };
        if !node.has_error() {
            preorder.skip_subtree();
            continue;
        }
        if node.is_missing() || node.kind() == UNEXPECTED {
            markers.push(NodeOrToken::Node(node));
            preorder.skip_subtree();
            continue;
        }
        markers.extend(
            node.children_with_tokens()
                .filter_map(NodeOrToken::into_token)
                .filter(|token| token.is_missing())
                .map(NodeOrToken::Token),
        );
    }

    markers
}

fn missing_operand(marker: &SyntaxElement) -> Option<(DiagnosticId, String)> {
    let NodeOrToken::Node(node) = marker else { return None };
    if !node.is_missing() || node.kind() != MISSING_EXPR {
        return None;
    }
    let parent = node.parent()?;
    let op = match (parent.kind(), node.index_in_parent()?) {
        (BINARY_EXPR, 2) | (PREFIX_EXPR, 1) => {
            let op_index = if parent.kind() == BINARY_EXPR { 1 } else { 0 };
            parent.child_token(op_index)?
        }
        _ => return None,
    };
    Some((
        DiagnosticId::MissingExpressionAfterOperator,
        format!("expected an expression after `{}`", op.text_trimmed()),
    ))
}

fn unclosed_delimiter(marker: &SyntaxElement) -> Option<(DiagnosticId, String)> {
    let NodeOrToken::Token(token) = marker else { return None };
    let open = match token.kind() {
        R_PAREN => L_PAREN,
        R_BRACE => L_BRACE,
        _ => return None,
    };
    let opening = token.parent().child_token(0)?;
    if opening.kind() != open || opening.is_missing() {
        return None;
    }
    Some((
        DiagnosticId::MissingClosingDelimiter,
        format!(
            "expected {} to close the {} at {:?}",
            describe(token.kind()),
            describe(open),
            opening.trimmed_range().start()
        ),
    ))
}

fn missing_code_block(marker: &SyntaxElement) -> Option<(DiagnosticId, String)> {
    let NodeOrToken::Node(node) = marker else { return None };
    if !node.is_missing() || node.kind() != CODE_BLOCK {
        return None;
    }
    let func = node.parent().filter(|parent| parent.kind() == FUNC_DECL)?;
    let message = match func.child_token(1).filter(|name| !name.is_missing()) {
        Some(name) => format!("function `{}` has no body", name.text_trimmed()),
        None => "function has no body".to_owned(),
    };
    Some((DiagnosticId::MissingCodeBlock, message))
}

fn top_level_code(marker: &SyntaxElement) -> Option<(DiagnosticId, String)> {
    let NodeOrToken::Node(node) = marker else { return None };
    if node.kind() != UNEXPECTED || node.parent()?.kind() != ITEM_LIST {
        return None;
    }
    Some((
        DiagnosticId::ExtraneousTopLevelCode,
        format!("`{}` is not allowed at the top level", trimmed_text(node)),
    ))
}

fn generic(marker: &SyntaxElement) -> (DiagnosticId, String) {
    match marker {
        NodeOrToken::Token(token) => {
            (DiagnosticId::MissingToken, format!("expected {}", describe(token.kind())))
        }
        NodeOrToken::Node(node) if node.kind() == UNEXPECTED => {
            (DiagnosticId::UnexpectedText, format!("unexpected `{}`", trimmed_text(node)))
        }
        NodeOrToken::Node(node) if node.kind() == MISSING_EXPR => {
            (DiagnosticId::MissingExpression, "expected an expression".to_owned())
        }
        NodeOrToken::Node(node) => {
            (DiagnosticId::MissingNode, format!("expected {}", describe(node.kind())))
        }
    }
}

fn describe(kind: SyntaxKind) -> String {
    match kind.fixed_text() {
        Some(text) => format!("`{text}`"),
        None => kind.describe().to_owned(),
    }
}

fn trimmed_text(node: &SyntaxNode) -> String {
    let text = node.text();
    let range = node.trimmed_range() - node.text_offset();
    text[range].to_owned()
}

#[cfg(test)]
mod tests {
    use fidel_syntax::Arena;

    use super::*;

    fn check(text: &str) -> Vec<(DiagnosticId, String, String)> {
        let root = crate::parse(&Arena::new(), text).syntax_node().clone();
        diagnostics(&root)
            .into_iter()
            .map(|it| (it.id(), format!("{:?}", it.range()), it.message().to_owned()))
            .collect()
    }

    fn ids(text: &str) -> Vec<DiagnosticId> {
        check(text).into_iter().map(|(id, ..)| id).collect()
    }

    #[test]
    fn valid_input_has_no_diagnostics() {
        assert!(check("func f(a: Int) -> Int {\n  return a * 2\n}\nlet x = f(1)\n").is_empty());
    }

    #[test]
    fn missing_operand_after_binary_operator() {
        assert_eq!(
            check("let x = 1 +"),
            [(
                DiagnosticId::MissingExpressionAfterOperator,
                "11..11".to_owned(),
                "expected an expression after `+`".to_owned()
            )]
        );
    }

    #[test]
    fn same_condition_same_id() {
        assert_eq!(ids("let x = 1 +"), ids("let long_name = (2) *   \n"));
        assert_eq!(ids("let y = -"), [DiagnosticId::MissingExpressionAfterOperator]);
    }

    #[test]
    fn unclosed_parameter_clause() {
        assert_eq!(
            check("func f("),
            [
                (
                    DiagnosticId::MissingClosingDelimiter,
                    "7..7".to_owned(),
                    "expected `)` to close the `(` at 6".to_owned()
                ),
                (
                    DiagnosticId::MissingCodeBlock,
                    "7..7".to_owned(),
                    "function `f` has no body".to_owned()
                ),
            ]
        );
    }

    #[test]
    fn generic_rules_cover_the_rest() {
        assert_eq!(
            ids("let = 1"),
            [DiagnosticId::MissingToken],
            "the name is a plain missing token"
        );
        assert_eq!(ids("let x = "), [DiagnosticId::MissingExpression]);
        assert_eq!(ids("func f(a) {}"), [DiagnosticId::MissingToken, DiagnosticId::MissingNode]);
    }

    #[test]
    fn unexpected_text() {
        assert_eq!(
            check("func f() {\n  ) let x = 1\n}"),
            [(
                DiagnosticId::UnexpectedText,
                "13..14".to_owned(),
                "unexpected `)`".to_owned()
            )]
        );
        assert_eq!(
            check("let x = 1\n2 3"),
            [(
                DiagnosticId::ExtraneousTopLevelCode,
                "10..13".to_owned(),
                "`2 3` is not allowed at the top level".to_owned()
            )]
        );
    }
}
