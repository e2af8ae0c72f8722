//! Diagnostics produced while binding symbols and types.
//!
//! Binding never aborts on the first problem: a pass records a [`Diagnostic`]
//! and substitutes an error marker (see `symbind_binder::Type::Error`) so later
//! passes keep making progress. The CLI reporter renders these at the end of a
//! run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::span::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// The kind of binding failure, independent of where it occurred.
///
/// Kept separate from the human-readable message so the CLI and tests can
/// match on it without parsing text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A name did not resolve in any enclosing scope or on the classpath.
    SymbolNotFound,
    /// A single-type-import or static-import name resolved to more than
    /// one unrelated declaration.
    AmbiguousImport,
    /// A class participates in an `extends`/`implements` cycle.
    CyclicHierarchy,
    /// A type variable's bound could not be resolved to a class or interface.
    BadTypeParameterBound,
    /// A `final` field initializer referenced in a constant-expression
    /// context is not a compile-time constant.
    NotConstant,
    /// A compile-time constant expression has the wrong type, or an
    /// operation overflowed/divided by zero in a way the host language
    /// treats as a hard error during constant folding.
    InvalidConstantExpression,
    /// A type-use annotation could not be placed unambiguously onto a
    /// qualified type name.
    AmbiguousTypeAnnotation,
    /// A `.class` file on the classpath could not be parsed.
    MalformedClassFile,
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::SymbolNotFound => "SB001",
            DiagnosticKind::AmbiguousImport => "SB002",
            DiagnosticKind::CyclicHierarchy => "SB003",
            DiagnosticKind::BadTypeParameterBound => "SB004",
            DiagnosticKind::NotConstant => "SB005",
            DiagnosticKind::InvalidConstantExpression => "SB006",
            DiagnosticKind::AmbiguousTypeAnnotation => "SB007",
            DiagnosticKind::MalformedClassFile => "SB008",
        }
    }
}

/// A single diagnostic, attributable to a source file and span.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub file: String,
    pub span: Span,
    pub message: String,
    pub related: Vec<RelatedInfo>,
}

/// A secondary location attached to a diagnostic, e.g. the other class in a
/// hierarchy cycle, or the two competing imports behind an ambiguity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInfo {
    pub file: String,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, file: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            kind,
            file: file.into(),
            span,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn warning(kind: DiagnosticKind, file: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            kind,
            file: file.into(),
            span,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn with_related(mut self, file: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        self.related.push(RelatedInfo {
            file: file.into(),
            span,
            message: message.into(),
        });
        self
    }
}

/// An accumulator threaded through the binding passes.
///
/// Mirrors the "collect, don't abort" discipline the passes rely on: a pass
/// takes `&mut DiagnosticSink`, never `Result`, because a single malformed
/// declaration must not stop the rest of the compilation unit from binding.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        DiagnosticSink::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_reports_errors_but_not_warnings_only() {
        let mut sink = DiagnosticSink::new();
        sink.push(Diagnostic::warning(
            DiagnosticKind::AmbiguousTypeAnnotation,
            "A.java",
            Span::new(0, 1),
            "test",
        ));
        assert!(!sink.has_errors());
        sink.push(Diagnostic::error(
            DiagnosticKind::SymbolNotFound,
            "A.java",
            Span::new(2, 3),
            "test",
        ));
        assert!(sink.has_errors());
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn related_info_is_attached() {
        let diag = Diagnostic::error(
            DiagnosticKind::CyclicHierarchy,
            "A.java",
            Span::new(0, 5),
            "cycle",
        )
        .with_related("B.java", Span::new(0, 5), "via here");
        assert_eq!(diag.related.len(), 1);
    }
}
