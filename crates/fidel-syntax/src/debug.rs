use std::fmt::Write as _;

use crate::{NodeOrToken, SyntaxNode};

/// Writes an indented dump of `node`, one labeled line per present slot.
pub(crate) fn dump_node(node: &SyntaxNode, indent: usize, buf: &mut String) {
    _ = write!(buf, "{:?}@{:?}", node.kind(), node.text_range());
    if node.is_missing() {
        buf.push_str(" missing");
    }
    buf.push('\n');

    for (label, child) in node.describe_children() {
        let Some(child) = child else { continue };
        _ = write!(buf, "{:width$}{label}: ", "", width = indent + 2);
        match child {
            NodeOrToken::Node(child) => dump_node(&child, indent + 2, buf),
            NodeOrToken::Token(token) => {
                _ = writeln!(buf, "{token:?}");
            }
        }
    }
}
