//! Shared named-type resolution (§4.3), used by both the hierarchy and type
//! passes: walk a dotted/nested `TypeRef::Named` path down to a class symbol.

use rustc_hash::FxHashMap;
use symbind_ast::TypeRefSegment;

use crate::scope::{ScopeLookup, ScopeStack};
use crate::stage::SourceBound;
use crate::symbol::ClassSymbol;

/// Resolves a `Named` type reference's path to a class symbol.
///
/// The first segment is looked up through the full scope chain. If that
/// fails, the whole dotted path is retried against the top-level index as a
/// fully-qualified name (covers names the unit never imported). Any
/// segments left over past the first resolved symbol are walked as nested
/// member-class lookups against declared (not yet inherited — the
/// hierarchy isn't bound at this point) member classes.
pub fn resolve_named_path(
    segments: &[TypeRefSegment],
    scope_stack: &ScopeStack,
    source_bound: &FxHashMap<ClassSymbol, SourceBound>,
) -> Option<ClassSymbol> {
    let (mut current, mut rest) = match segments.split_first() {
        Some((head, rest)) => match scope_stack.resolve_simple(&head.name) {
            ScopeLookup::Found(sym) => (sym, rest),
            ScopeLookup::Ambiguous => return None,
            ScopeLookup::Absent => {
                let names: Vec<String> = segments.iter().map(|s| s.name.clone()).collect();
                let lookup = scope_stack.resolve_qualified(&names)?;
                let remaining_len = lookup.remaining.len();
                (lookup.symbol, &segments[segments.len() - remaining_len..])
            }
        },
        None => return None,
    };

    while let Some((head, tail)) = rest.split_first() {
        let entity = source_bound.get(&current)?;
        let member = entity.member_classes.iter().find(|(name, _)| name == &head.name)?;
        current = member.1;
        rest = tail;
    }

    Some(current)
}
