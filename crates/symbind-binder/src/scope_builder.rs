//! Resolves a unit's raw `PackageBound` import lists (dotted paths) into
//! the [`Scope`] maps a [`ScopeStack`] composes over.

use rustc_hash::FxHashMap;

use crate::passes::package_bound::ROOT_NAMESPACE;
use crate::scope::Scope;
use crate::stage::{PackageBound, SourceBound};
use crate::symbol::ClassSymbol;
use crate::top_level_index::TopLevelIndex;

/// Import scopes resolved once per unit and shared by every name lookup
/// against classes declared in that unit.
pub struct ResolvedImports {
    pub single_type: FxHashMap<String, crate::symbol::ClassSymbol>,
    pub on_demand: Vec<Scope>,
    pub same_package: Option<Scope>,
    pub root: Option<Scope>,
}

pub fn build(package_bound: &PackageBound, index: &TopLevelIndex) -> ResolvedImports {
    let mut single_type = FxHashMap::default();
    for (name, path) in package_bound.single_type_imports.iter() {
        // A single-type import naming a nested class (`import a.Outer.Inner;`)
        // is not walked past the outer symbol here; see DESIGN.md.
        if let Some(lookup) = index.lookup(path) {
            single_type.insert(name.clone(), lookup.symbol);
        }
    }

    let on_demand = package_bound
        .on_demand_type_imports
        .iter()
        .filter_map(|path| index.lookup_package(path))
        .cloned()
        .collect();

    let same_package = index.lookup_package(&package_bound.package).cloned();
    let root_path: Vec<String> = ROOT_NAMESPACE.iter().map(|s| s.to_string()).collect();
    let root = index.lookup_package(&root_path).cloned();

    ResolvedImports {
        single_type,
        on_demand,
        same_package,
        root,
    }
}

/// Declared member-class scopes for `symbol`'s enclosing chain, innermost
/// first. Inherited member classes are added later once a hierarchy is
/// available (TypePass); the hierarchy pass itself only sees declared ones.
pub fn enclosing_member_scopes(symbol: ClassSymbol, source_bound: &FxHashMap<ClassSymbol, SourceBound>) -> Vec<Scope> {
    let mut scopes = Vec::new();
    let mut current = source_bound.get(&symbol).and_then(|s| s.enclosing);
    while let Some(enclosing) = current {
        if let Some(entity) = source_bound.get(&enclosing) {
            let scope: Scope = entity.member_classes.iter().cloned().collect();
            scopes.push(scope);
            current = entity.enclosing;
        } else {
            break;
        }
    }
    scopes
}
