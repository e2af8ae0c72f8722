//! Per-unit name resolution order (§4.3): single-type imports, enclosing
//! members, same-package classes, on-demand imports, the implicit root
//! import, then the top-level index — first hit wins, wildcard imports are
//! ambiguous on clash.

use rustc_hash::FxHashMap;

use crate::symbol::ClassSymbol;
use crate::top_level_index::TopLevelIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeLookup {
    Found(ClassSymbol),
    /// Two wildcard sources supplied the same short name.
    Ambiguous,
    Absent,
}

/// A simple short-name -> symbol mapping, e.g. one package's top-level
/// scope, or one class's declared+inherited member-class map.
pub type Scope = FxHashMap<String, ClassSymbol>;

/// Resolution context for a single compilation unit, built once by
/// `PackageBoundPass` and consulted by every later name lookup in that unit.
pub struct ScopeStack<'a> {
    pub single_type_imports: &'a FxHashMap<String, ClassSymbol>,
    /// Innermost enclosing class's members first; declared and inherited
    /// member classes are merged into the same map by the caller since
    /// inherited member visibility already required a bound hierarchy.
    pub enclosing_member_scopes: Vec<&'a Scope>,
    pub same_package: Option<&'a Scope>,
    pub on_demand_scopes: Vec<&'a Scope>,
    pub root_import_scope: Option<&'a Scope>,
    pub top_level_index: &'a TopLevelIndex,
}

impl<'a> ScopeStack<'a> {
    pub fn resolve_simple(&self, name: &str) -> ScopeLookup {
        if let Some(&sym) = self.single_type_imports.get(name) {
            return ScopeLookup::Found(sym);
        }
        for scope in &self.enclosing_member_scopes {
            if let Some(&sym) = scope.get(name) {
                return ScopeLookup::Found(sym);
            }
        }
        if let Some(scope) = self.same_package {
            if let Some(&sym) = scope.get(name) {
                return ScopeLookup::Found(sym);
            }
        }
        match wildcard_lookup(&self.on_demand_scopes, name) {
            ScopeLookup::Absent => {}
            other => return other,
        }
        if let Some(scope) = self.root_import_scope {
            if let Some(&sym) = scope.get(name) {
                return ScopeLookup::Found(sym);
            }
        }
        ScopeLookup::Absent
    }

    /// Resolve a dotted qualified path against the top-level index as the
    /// final fallback (rule 6).
    pub fn resolve_qualified(&self, segments: &[String]) -> Option<ClassSymbol> {
        self.top_level_index.lookup(segments).map(|r| r.symbol)
    }
}

fn wildcard_lookup(scopes: &[&Scope], name: &str) -> ScopeLookup {
    let mut found: Option<ClassSymbol> = None;
    for scope in scopes {
        if let Some(&sym) = scope.get(name) {
            match found {
                None => found = Some(sym),
                Some(existing) if existing == sym => {}
                Some(_) => return ScopeLookup::Ambiguous,
            }
        }
    }
    match found {
        Some(sym) => ScopeLookup::Found(sym),
        None => ScopeLookup::Absent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symbind_common::Interner;

    fn sym(i: &mut Interner, name: &str) -> ClassSymbol {
        ClassSymbol(i.intern(name))
    }

    #[test]
    fn single_type_import_beats_same_package() {
        let mut interner = Interner::new();
        let imported = sym(&mut interner, "other/Foo");
        let local = sym(&mut interner, "here/Foo");

        let mut single: FxHashMap<String, ClassSymbol> = FxHashMap::default();
        single.insert("Foo".into(), imported);
        let mut package: Scope = FxHashMap::default();
        package.insert("Foo".into(), local);

        let index = TopLevelIndex::new();
        let stack = ScopeStack {
            single_type_imports: &single,
            enclosing_member_scopes: vec![],
            same_package: Some(&package),
            on_demand_scopes: vec![],
            root_import_scope: None,
            top_level_index: &index,
        };
        assert_eq!(stack.resolve_simple("Foo"), ScopeLookup::Found(imported));
    }

    #[test]
    fn clashing_wildcards_are_ambiguous() {
        let mut interner = Interner::new();
        let a = sym(&mut interner, "a/Util");
        let b = sym(&mut interner, "b/Util");
        let single = FxHashMap::default();
        let mut scope_a: Scope = FxHashMap::default();
        scope_a.insert("Util".into(), a);
        let mut scope_b: Scope = FxHashMap::default();
        scope_b.insert("Util".into(), b);

        let index = TopLevelIndex::new();
        let stack = ScopeStack {
            single_type_imports: &single,
            enclosing_member_scopes: vec![],
            same_package: None,
            on_demand_scopes: vec![&scope_a, &scope_b],
            root_import_scope: None,
            top_level_index: &index,
        };
        assert_eq!(stack.resolve_simple("Util"), ScopeLookup::Ambiguous);
    }

    #[test]
    fn same_wildcard_symbol_twice_is_not_ambiguous() {
        let mut interner = Interner::new();
        let a = sym(&mut interner, "a/Util");
        let single = FxHashMap::default();
        let mut scope_a: Scope = FxHashMap::default();
        scope_a.insert("Util".into(), a);

        let index = TopLevelIndex::new();
        let stack = ScopeStack {
            single_type_imports: &single,
            enclosing_member_scopes: vec![],
            same_package: None,
            on_demand_scopes: vec![&scope_a, &scope_a],
            root_import_scope: None,
            top_level_index: &index,
        };
        assert_eq!(stack.resolve_simple("Util"), ScopeLookup::Found(a));
    }
}
