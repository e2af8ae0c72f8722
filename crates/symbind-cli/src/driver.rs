//! Loads pre-parsed compilation units and a classpath, runs the binder, and
//! reports the result.
//!
//! Parsing source text into [`CompUnit`] is out of scope for this crate (see
//! `symbind-ast`'s own docs) — the CLI consumes units already serialized to
//! JSON by whatever front-end produced them.

use std::fs;

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use symbind_ast::CompUnit;
use symbind_binder::symbol::ClassSymbol;
use symbind_binder::{BindResult, Bound, ClasspathConfig};
use symbind_common::Interner;
use tracing::info;

use crate::args::CliArgs;
use crate::reporter::{self, SourceMap};

pub fn run(args: &CliArgs) -> Result<()> {
    let units = load_units(&args.units)?;
    info!(count = units.len(), "loaded compilation units");

    let classpath = ClasspathConfig {
        boot: args.bootclasspath.clone(),
        classpath: args.classpath.clone(),
    };

    let BindResult { bound, diagnostics, interner } = symbind_binder::bind(&units, &classpath).context("binding failed")?;
    info!(classes = bound.len(), diagnostics = diagnostics.len(), "bind complete");

    let mut source_map = SourceMap::new();
    for diag in &diagnostics {
        source_map.load(args.source_root.as_deref(), &diag.file);
        for related in &diag.related {
            source_map.load(args.source_root.as_deref(), &related.file);
        }
    }
    let error_count = reporter::report(&diagnostics, &source_map);

    if args.summary {
        print_summary(&bound, &interner);
    }

    let failing = if args.errors_only { error_count } else { diagnostics.len() };
    if failing > 0 {
        bail!("bind finished with {error_count} error(s) across {} class(es)", bound.len());
    }
    Ok(())
}

fn load_units(paths: &[std::path::PathBuf]) -> Result<Vec<CompUnit>> {
    paths
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {} as a compilation unit", path.display()))
        })
        .collect()
}

/// `binary/name/Class: N field(s), M method(s), extends Superclass`.
fn print_summary(bound: &FxHashMap<ClassSymbol, Bound>, interner: &Interner) {
    let mut names: Vec<&ClassSymbol> = bound.keys().collect();
    names.sort_by_key(|s| interner.resolve(s.0));

    for symbol in names {
        let class = &bound[symbol];
        let name = interner.resolve(symbol.0);
        let superclass = class.superclass.map(|s| interner.resolve(s.0)).unwrap_or("-");
        println!(
            "{name}: {} field(s), {} method(s), {} superinterface(s), extends {superclass}",
            class.fields.len(),
            class.methods.len(),
            class.superinterfaces.len(),
        );
    }
}
