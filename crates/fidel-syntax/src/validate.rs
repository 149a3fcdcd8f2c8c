//! Full-scan structural validation, for test suites.

use text_size::{TextRange, TextSize};

use crate::{GreenElement, Layout, NodeOrToken, SyntaxKind, SyntaxNode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{kind:?}@{range:?} has {found} slots but its layout declares {expected}")]
    Arity { kind: SyntaxKind, range: TextRange, expected: usize, found: usize },
    #[error("required slot `{label}` of {kind:?}@{range:?} is absent")]
    AbsentRequiredSlot { kind: SyntaxKind, label: &'static str, range: TextRange },
    #[error("slot `{label}` of {kind:?}@{range:?} holds {found:?}")]
    UnexpectedSlotKind {
        kind: SyntaxKind,
        label: &'static str,
        found: SyntaxKind,
        range: TextRange,
    },
    #[error("{kind:?}@{range:?} holds a {found:?} member at {index}")]
    UnexpectedMember { kind: SyntaxKind, index: usize, found: SyntaxKind, range: TextRange },
    #[error("{kind:?}@{range:?} has an absent member at {index}")]
    AbsentMember { kind: SyntaxKind, index: usize, range: TextRange },
    #[error("missing {kind:?} at {range:?} is not zero-width")]
    MissingWithText { kind: SyntaxKind, range: TextRange },
    #[error("{kind:?}@{range:?} has width {cached:?} but its children add up to {actual:?}")]
    WidthMismatch { kind: SyntaxKind, range: TextRange, cached: TextSize, actual: TextSize },
}

/// Checks every node under `root` against the layout table.
///
/// Returns the first violation in preorder.
pub fn validate(root: &SyntaxNode) -> Result<(), ValidationError> {
    for node in root.descendants() {
        validate_node(&node)?;
        for token in node.children_with_tokens().filter_map(NodeOrToken::into_token) {
            if token.is_missing() && !token.text().is_empty() {
                return Err(ValidationError::MissingWithText {
                    kind: token.kind(),
                    range: token.text_range(),
                });
            }
        }
    }
    Ok(())
}

fn validate_node(node: &SyntaxNode) -> Result<(), ValidationError> {
    let green = node.green();
    let kind = node.kind();
    let range = node.text_range();

    let actual: TextSize = green.children().map(GreenElement::width).sum();
    if actual != green.width() {
        return Err(ValidationError::WidthMismatch { kind, range, cached: green.width(), actual });
    }
    if node.is_missing() && !range.is_empty() {
        return Err(ValidationError::MissingWithText { kind, range });
    }

    match kind.layout() {
        Layout::Token => {}
        Layout::Collection(members) => {
            for (index, slot) in green.slots().iter().enumerate() {
                let Some(member) = slot else {
                    return Err(ValidationError::AbsentMember { kind, index, range });
                };
                if !members.contains(member.kind()) {
                    return Err(ValidationError::UnexpectedMember {
                        kind,
                        index,
                        found: member.kind(),
                        range,
                    });
                }
            }
        }
        Layout::Fixed(specs) => {
            if specs.len() != green.slot_count() {
                return Err(ValidationError::Arity {
                    kind,
                    range,
                    expected: specs.len(),
                    found: green.slot_count(),
                });
            }
            for (spec, slot) in specs.iter().zip(green.slots()) {
                match slot {
                    // Missing nodes keep their arity but fill nothing.
                    None if spec.optional || node.is_missing() => {}
                    None => {
                        return Err(ValidationError::AbsentRequiredSlot {
                            kind,
                            label: spec.label,
                            range,
                        });
                    }
                    Some(child) if !spec.accepts.contains(child.kind()) => {
                        return Err(ValidationError::UnexpectedSlotKind {
                            kind,
                            label: spec.label,
                            found: child.kind(),
                            range,
                        });
                    }
                    Some(_) => {}
                }
            }
        }
    }
    Ok(())
}
