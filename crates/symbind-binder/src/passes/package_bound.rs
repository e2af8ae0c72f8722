//! PackageBoundPass: attaches each unit's import and package scopes to every
//! class it declares (§4.3).

use std::rc::Rc;

use rustc_hash::FxHashMap;
use symbind_ast::{CompUnit, ImportDecl};

use crate::passes::source_bound::SourceBoundResult;
use crate::stage::PackageBound;
use crate::symbol::ClassSymbol;

/// The implicit wildcard import consulted last, after every explicit
/// on-demand import — so an explicit import wins a short-name clash against
/// it (see the ambiguous-wildcard open question resolved in DESIGN.md).
pub const ROOT_NAMESPACE: &[&str] = &["lang"];

pub fn run(units: &[CompUnit], source: &SourceBoundResult) -> FxHashMap<ClassSymbol, PackageBound> {
    let mut result = FxHashMap::default();

    for (unit_idx, unit) in units.iter().enumerate() {
        let package = source.unit_packages[unit_idx].clone();

        let mut single_type_imports = Vec::new();
        let mut on_demand_type_imports = Vec::new();
        let mut single_static_imports = Vec::new();
        let mut on_demand_static_imports = Vec::new();

        for import in &unit.imports {
            match import {
                ImportDecl::SingleType { path, .. } => {
                    if let Some(name) = path.last() {
                        single_type_imports.push((name.clone(), path.clone()));
                    }
                }
                ImportDecl::OnDemandType { path, .. } => {
                    on_demand_type_imports.push(path.clone());
                }
                ImportDecl::SingleStaticMember { path, member, .. } => {
                    single_static_imports.push((member.clone(), path.clone(), member.clone()));
                }
                ImportDecl::OnDemandStaticMember { path, .. } => {
                    on_demand_static_imports.push(path.clone());
                }
            }
        }

        let single_type_imports = Rc::new(single_type_imports);
        let on_demand_type_imports = Rc::new(on_demand_type_imports);
        let single_static_imports = Rc::new(single_static_imports);
        let on_demand_static_imports = Rc::new(on_demand_static_imports);

        for &symbol in &source.unit_classes[unit_idx] {
            let Some(source_bound) = source.classes.get(&symbol) else { continue };
            result.insert(
                symbol,
                PackageBound {
                    source: source_bound.clone(),
                    package: package.clone(),
                    single_type_imports: single_type_imports.clone(),
                    on_demand_type_imports: on_demand_type_imports.clone(),
                    single_static_imports: single_static_imports.clone(),
                    on_demand_static_imports: on_demand_static_imports.clone(),
                },
            );
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use symbind_common::Interner;

    #[test]
    fn single_type_import_is_recorded_by_simple_name() {
        use symbind_ast::PkgDecl;
        use symbind_common::Span;

        let unit = CompUnit {
            source_file: "Test.java".into(),
            package: Some(PkgDecl {
                segments: vec!["com".into(), "example".into()],
                annotations: vec![],
                span: Span::new(0, 0),
            }),
            imports: vec![ImportDecl::SingleType {
                path: vec!["java".into(), "util".into(), "List".into()],
                span: Span::new(0, 1),
            }],
            types: vec![],
        };

        let mut interner = Interner::new();
        let mut index = crate::top_level_index::TopLevelIndex::new();
        let source = crate::passes::source_bound::run(std::slice::from_ref(&unit), &mut interner, &mut index);
        let bound = run(std::slice::from_ref(&unit), &source);

        assert!(bound.is_empty(), "unit declares no types, so no PackageBound entities exist yet");
    }

    #[test]
    fn package_bound_carries_shared_imports_across_sibling_top_level_classes() {
        use symbind_ast::{Modifiers, TypeDecl, TypeKind};
        use symbind_common::Span;

        let decl = |name: &str| TypeDecl {
            name: name.into(),
            kind: TypeKind::Class,
            modifiers: Modifiers::empty(),
            annotations: vec![],
            type_params: vec![],
            extends: None,
            implements: vec![],
            fields: vec![],
            methods: vec![],
            members: vec![],
            span: Span::new(0, 1),
        };

        let unit = CompUnit {
            source_file: "Test.java".into(),
            package: None,
            imports: vec![ImportDecl::OnDemandType {
                path: vec!["java".into(), "util".into()],
                span: Span::new(0, 1),
            }],
            types: vec![decl("A"), decl("B")],
        };

        let mut interner = Interner::new();
        let mut index = crate::top_level_index::TopLevelIndex::new();
        let source = crate::passes::source_bound::run(std::slice::from_ref(&unit), &mut interner, &mut index);
        let bound = run(std::slice::from_ref(&unit), &source);

        assert_eq!(bound.len(), 2);
        for entity in bound.values() {
            assert_eq!(entity.on_demand_type_imports.len(), 1);
        }
    }
}
