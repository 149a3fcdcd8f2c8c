use std::fmt::{self, Display};

pub use annotate_snippets::Renderer;
use annotate_snippets::{Level, Snippet};
use fidel_syntax::{SyntaxElement, SyntaxPath};
use rustc_hash::FxHashSet;
pub use text_size::TextRange;

/// Stable identifier of a diagnosable condition.
///
/// The identifier depends only on the kind of condition. Message text may
/// differ between two diagnostics sharing an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticId {
    MissingToken,
    MissingNode,
    MissingExpression,
    MissingExpressionAfterOperator,
    MissingClosingDelimiter,
    MissingCodeBlock,
    UnexpectedText,
    ExtraneousTopLevelCode,
}

impl DiagnosticId {
    pub const ALL: [Self; 8] = [
        Self::MissingToken,
        Self::MissingNode,
        Self::MissingExpression,
        Self::MissingExpressionAfterOperator,
        Self::MissingClosingDelimiter,
        Self::MissingCodeBlock,
        Self::UnexpectedText,
        Self::ExtraneousTopLevelCode,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingToken => "missing-token",
            Self::MissingNode => "missing-node",
            Self::MissingExpression => "missing-expression",
            Self::MissingExpressionAfterOperator => "missing-expression-after-operator",
            Self::MissingClosingDelimiter => "missing-closing-delimiter",
            Self::MissingCodeBlock => "missing-code-block",
            Self::UnexpectedText => "unexpected-text",
            Self::ExtraneousTopLevelCode => "extraneous-top-level-code",
        }
    }

    pub fn from_name(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|it| it.as_str() == id)
    }
}

impl Display for DiagnosticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message about a Missing or Unexpected marker in a tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    id: DiagnosticId,
    message: String,
    anchor: SyntaxElement,
}

impl Diagnostic {
    pub fn new(id: DiagnosticId, message: impl Into<String>, anchor: SyntaxElement) -> Self {
        Self { id, message: message.into(), anchor }
    }

    pub fn id(&self) -> DiagnosticId {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The marker this diagnostic is about.
    pub fn anchor(&self) -> &SyntaxElement {
        &self.anchor
    }

    /// Range of the anchor without its surrounding trivia. Empty for Missing
    /// anchors.
    pub fn range(&self) -> TextRange {
        self.anchor.trimmed_range()
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).id(self.id.as_str()).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range().into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

/// Collects diagnostics and remembers which markers already have one.
///
/// Markers are identified by their index path from the root, so a specific
/// rule can claim a marker and keep a generic rule from reporting it again.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    handled: FxHashSet<SyntaxPath>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic and marks its anchor as handled.
    pub fn report(&mut self, id: DiagnosticId, message: impl Into<String>, anchor: SyntaxElement) {
        self.handled.insert(anchor.path());
        self.diagnostics.push(Diagnostic::new(id, message, anchor));
    }

    /// Marks `element` as handled without reporting anything.
    ///
    /// Returns `false` if it already was.
    pub fn mark_handled(&mut self, element: &SyntaxElement) -> bool {
        self.handled.insert(element.path())
    }

    pub fn is_handled(&self, element: &SyntaxElement) -> bool {
        self.handled.contains(&element.path())
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the diagnostics ordered by position.
    pub fn finish(self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics;
        diagnostics.sort_by_key(|diagnostic| {
            let range = diagnostic.range();
            (range.start(), range.end(), diagnostic.id)
        });
        diagnostics
    }
}
