//! Renders [`Diagnostic`]s to the terminal, tsc-style: one line per
//! diagnostic with a severity-colored prefix, optionally followed by related
//! locations.

use colored::Colorize;
use rustc_hash::FxHashMap;
use symbind_common::{Diagnostic, LineIndex, Severity};

/// Line/column lookup for every source file a diagnostic might reference,
/// built once per run from whatever raw source text is available under
/// `--source-root`. A file with no text on disk falls back to a byte span.
#[derive(Default)]
pub struct SourceMap {
    indices: FxHashMap<String, LineIndex>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap::default()
    }

    /// Read `source_root/file` and index it for line/column lookups, if it
    /// exists. Safe to call for files that were never materialized on disk
    /// (e.g. a synthetic `package-info` unit) — those just fall back.
    pub fn load(&mut self, source_root: Option<&std::path::Path>, file: &str) {
        if self.indices.contains_key(file) {
            return;
        }
        let Some(root) = source_root else { return };
        if let Ok(text) = std::fs::read_to_string(root.join(file)) {
            self.indices.insert(file.to_string(), LineIndex::new(&text));
        }
    }

    fn position(&self, file: &str, span: symbind_common::Span) -> String {
        match self.indices.get(file) {
            Some(index) => {
                let start = index.span_start(span);
                format!("{}:{}", start.line, start.column)
            }
            None => format!("{}..{}", span.start, span.end),
        }
    }
}

/// Print every diagnostic to stderr, returning the count at error severity.
pub fn report(diagnostics: &[Diagnostic], source_map: &SourceMap) -> usize {
    let mut errors = 0;
    for diag in diagnostics {
        let position = source_map.position(&diag.file, diag.span);
        let (label, code) = match diag.severity {
            Severity::Error => {
                errors += 1;
                ("error".red().bold(), diag.kind.code().red())
            }
            Severity::Warning => ("warning".yellow().bold(), diag.kind.code().yellow()),
        };
        eprintln!("{}:{}: {} {}: {}", diag.file, position, label, code, diag.message);
        for related in &diag.related {
            let related_position = source_map.position(&related.file, related.span);
            eprintln!("  {}:{}: {} {}", related.file, related_position, "note:".dimmed(), related.message);
        }
    }
    errors
}
