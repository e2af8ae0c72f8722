//! SourceBoundPass (§4.4): assigns class symbols to every declared type,
//! eagerly, in a single traversal.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use symbind_ast::{AnnotationUse, CompUnit, Modifiers, TypeDecl, TypeKind};
use symbind_common::Interner;

use crate::decl_ref::DeclRef;
use crate::stage::SourceBound;
use crate::symbol::{ClassSymbol, Origin};
use crate::top_level_index::TopLevelIndex;

pub struct SourceBoundResult {
    pub classes: FxHashMap<ClassSymbol, SourceBound>,
    pub decl_refs: FxHashMap<ClassSymbol, DeclRef>,
    /// Symbols synthesized for a unit's annotated package declaration;
    /// their annotations live here since there's no `TypeDecl` to point at.
    pub package_info_annotations: FxHashMap<ClassSymbol, Vec<AnnotationUse>>,
    /// Every top-level symbol (including synthetic `package-info`) declared
    /// by each unit, in unit order.
    pub unit_classes: Vec<Vec<ClassSymbol>>,
    pub unit_packages: Vec<Vec<String>>,
}

pub fn run(units: &[CompUnit], interner: &mut Interner, index: &mut TopLevelIndex) -> SourceBoundResult {
    let mut classes = FxHashMap::default();
    let mut decl_refs = FxHashMap::default();
    let mut package_info_annotations = FxHashMap::default();
    let mut unit_classes = Vec::with_capacity(units.len());
    let mut unit_packages = Vec::with_capacity(units.len());

    for (unit_idx, unit) in units.iter().enumerate() {
        let package = unit.package.as_ref().map(|p| p.segments.clone()).unwrap_or_default();
        unit_packages.push(package.clone());
        let mut top_level = Vec::new();

        for (type_idx, decl) in unit.types.iter().enumerate() {
            let decl_ref = DeclRef::top_level(unit_idx, type_idx);
            let symbol = bind_type_decl(
                decl,
                &package,
                None,
                &decl_ref,
                unit.source_file.as_str(),
                interner,
                index,
                &mut classes,
                &mut decl_refs,
            );
            top_level.push(symbol);
        }

        if let Some(pkg) = &unit.package {
            if !pkg.annotations.is_empty() {
                let binary_name = canonical_name(&package, "package-info");
                let symbol = ClassSymbol(interner.intern(&binary_name));
                index.insert(&package, "package-info", symbol, Origin::Source);
                classes.insert(
                    symbol,
                    SourceBound {
                        symbol,
                        enclosing: None,
                        kind: TypeKind::Interface,
                        modifiers: Modifiers::SYNTHETIC,
                        member_classes: SmallVec::new(),
                        source_file: unit.source_file.as_str().into(),
                        span: pkg.span,
                    },
                );
                package_info_annotations.insert(symbol, pkg.annotations.clone());
                top_level.push(symbol);
            }
        }

        unit_classes.push(top_level);
    }

    SourceBoundResult {
        classes,
        decl_refs,
        package_info_annotations,
        unit_classes,
        unit_packages,
    }
}

#[allow(clippy::too_many_arguments)]
fn bind_type_decl(
    decl: &TypeDecl,
    package: &[String],
    enclosing: Option<ClassSymbol>,
    decl_ref: &DeclRef,
    source_file: &str,
    interner: &mut Interner,
    index: &mut TopLevelIndex,
    classes: &mut FxHashMap<ClassSymbol, SourceBound>,
    decl_refs: &mut FxHashMap<ClassSymbol, DeclRef>,
) -> ClassSymbol {
    let binary_name = match enclosing {
        None => canonical_name(package, &decl.name),
        Some(owner) => format!("{}${}", interner.resolve(owner.0), decl.name),
    };
    let symbol = ClassSymbol(interner.intern(&binary_name));
    decl_refs.insert(symbol, decl_ref.clone());

    if enclosing.is_none() {
        index.insert(package, &decl.name, symbol, Origin::Source);
    }

    // Types declared inside an interface or annotation are implicitly public.
    let parent_is_interface_like = enclosing
        .and_then(|e| classes.get(&e))
        .map(|p| matches!(p.kind, TypeKind::Interface | TypeKind::Annotation))
        .unwrap_or(false);
    let mut modifiers = decl.modifiers;
    if parent_is_interface_like {
        modifiers |= Modifiers::PUBLIC;
    }

    let mut member_classes: SmallVec<[(String, ClassSymbol); 4]> = SmallVec::new();
    for (member_idx, member) in decl.members.iter().enumerate() {
        let member_decl_ref = decl_ref.nested(member_idx);
        let member_symbol = bind_type_decl(
            member,
            package,
            Some(symbol),
            &member_decl_ref,
            source_file,
            interner,
            index,
            classes,
            decl_refs,
        );
        member_classes.push((member.name.clone(), member_symbol));
    }

    classes.insert(
        symbol,
        SourceBound {
            symbol,
            enclosing,
            kind: decl.kind,
            modifiers,
            member_classes,
            source_file: source_file.into(),
            span: decl.span,
        },
    );
    symbol
}

fn canonical_name(package: &[String], leaf: &str) -> String {
    if package.is_empty() {
        leaf.to_owned()
    } else {
        format!("{}/{}", package.join("/"), leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symbind_ast::{ImportDecl, PkgDecl};
    use symbind_common::Span;

    fn unit_with(types: Vec<TypeDecl>, package: Option<Vec<&str>>) -> CompUnit {
        CompUnit {
            source_file: "Test.java".into(),
            package: package.map(|segs| PkgDecl {
                segments: segs.into_iter().map(str::to_owned).collect(),
                annotations: vec![],
                span: Span::new(0, 0),
            }),
            imports: Vec::<ImportDecl>::new(),
            types,
        }
    }

    fn decl(name: &str, members: Vec<TypeDecl>) -> TypeDecl {
        TypeDecl {
            name: name.into(),
            kind: TypeKind::Class,
            modifiers: Modifiers::empty(),
            annotations: vec![],
            type_params: vec![],
            extends: None,
            implements: vec![],
            fields: vec![],
            methods: vec![],
            members,
            span: Span::new(0, 1),
        }
    }

    #[test]
    fn nested_classes_get_dollar_qualified_symbols() {
        let inner_most = decl("InnerMost", vec![]);
        let inner = decl("Inner", vec![inner_most]);
        let test = decl("Test", vec![inner]);
        let unit = unit_with(vec![test], None);

        let mut interner = Interner::new();
        let mut index = TopLevelIndex::new();
        let result = run(std::slice::from_ref(&unit), &mut interner, &mut index);

        let names: Vec<&str> = result.classes.keys().map(|s| interner.resolve(s.0)).collect();
        assert!(names.contains(&"Test"));
        assert!(names.contains(&"Test$Inner"));
        assert!(names.contains(&"Test$Inner$InnerMost"));
    }

    #[test]
    fn annotated_package_synthesizes_package_info() {
        use symbind_ast::AnnotationUse;
        let mut interner = Interner::new();
        let mut index = TopLevelIndex::new();
        let mut unit = unit_with(vec![], Some(vec!["com", "example"]));
        unit.package.as_mut().unwrap().annotations.push(AnnotationUse {
            path: vec!["Anno".into()],
            arguments: vec![],
            span: Span::new(0, 1),
        });

        let result = run(std::slice::from_ref(&unit), &mut interner, &mut index);
        let pkg_info_sym = *result.unit_classes[0].last().unwrap();
        let entity = &result.classes[&pkg_info_sym];
        assert_eq!(entity.kind, TypeKind::Interface);
        assert!(entity.modifiers.contains(Modifiers::SYNTHETIC));
        assert_eq!(result.package_info_annotations[&pkg_info_sym].len(), 1);
    }

    #[test]
    fn types_inside_interface_are_implicitly_public() {
        let inner = decl("Inner", vec![]);
        let mut outer = decl("Outer", vec![inner]);
        outer.kind = TypeKind::Interface;
        let unit = unit_with(vec![outer], None);

        let mut interner = Interner::new();
        let mut index = TopLevelIndex::new();
        let result = run(std::slice::from_ref(&unit), &mut interner, &mut index);
        let inner_sym = result
            .classes
            .keys()
            .find(|s| interner.resolve(s.0) == "Outer$Inner")
            .copied()
            .unwrap();
        assert!(result.classes[&inner_sym].modifiers.contains(Modifiers::PUBLIC));
    }
}
