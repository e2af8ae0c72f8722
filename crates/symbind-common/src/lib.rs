//! Common types shared across the binder, classfile reader, AST, and CLI
//! crates: string interning, source spans, and diagnostics.

pub mod diagnostics;
pub mod interner;
pub mod line_index;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, RelatedInfo, Severity};
pub use interner::{Atom, Interner, SharedInterner};
pub use line_index::{LineCol, LineIndex};
pub use span::{ByteSpan, Span, SpanBuilder, Spanned};
