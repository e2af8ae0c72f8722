//! TypeAnnotationDisambiguator (§4.8): splits the annotations gathered by
//! [`crate::passes::type_pass`] on each declaration-or-type position into a
//! declaration-annotation bucket and a type-annotation bucket, following the
//! annotation type's own `@Target` meta-annotation.
//!
//! Source order within each bucket is preserved; an annotation whose target
//! set can't be determined (unresolved annotation type, or a source
//! annotation type carrying no `@Target` at all) defaults to
//! declaration-annotation and raises a diagnostic.

use rustc_hash::FxHashMap;
use symbind_common::{Diagnostic, DiagnosticKind, DiagnosticSink, Interner};

use crate::stage::{ResolvedAnnotation, TypeBound};
use crate::symbol::{ClassSymbol, FieldSymbol, MethodSymbol};

const TYPE_USE: &str = "TYPE_USE";

#[derive(Clone, Debug, Default)]
pub struct SplitAnnotations {
    pub declaration: Vec<ResolvedAnnotation>,
    pub type_use: Vec<ResolvedAnnotation>,
}

#[derive(Default)]
pub struct TypeAnnotationResult {
    pub class: FxHashMap<ClassSymbol, SplitAnnotations>,
    pub fields: FxHashMap<FieldSymbol, SplitAnnotations>,
    pub methods: FxHashMap<MethodSymbol, SplitAnnotations>,
}

pub fn run(type_bounds: &FxHashMap<ClassSymbol, TypeBound>, interner: &Interner, sink: &mut DiagnosticSink) -> TypeAnnotationResult {
    let mut result = TypeAnnotationResult::default();

    for (&class, tb) in type_bounds {
        let split = split_all(&tb.annotations, type_bounds, interner, &tb.header.package_bound.source.source_file, sink);
        result.class.insert(class, split);

        for field in &tb.fields {
            let split = split_all(&field.annotations, type_bounds, interner, &tb.header.package_bound.source.source_file, sink);
            result.fields.insert(field.symbol, split);
        }
        for method in &tb.methods {
            let split = split_all(&method.annotations, type_bounds, interner, &tb.header.package_bound.source.source_file, sink);
            result.methods.insert(method.symbol, split);
        }
    }

    result
}

fn split_all(
    annotations: &[ResolvedAnnotation],
    type_bounds: &FxHashMap<ClassSymbol, TypeBound>,
    interner: &Interner,
    source_file: &str,
    sink: &mut DiagnosticSink,
) -> SplitAnnotations {
    let mut split = SplitAnnotations::default();
    for ann in annotations {
        match target_kinds(ann.symbol, type_bounds, interner) {
            Some(targets) => {
                let has_type_use = targets.iter().any(|t| t == TYPE_USE);
                let has_declaration = targets.iter().any(|t| t != TYPE_USE);
                if has_declaration || (!has_type_use && !has_declaration) {
                    split.declaration.push(ann.clone());
                }
                if has_type_use {
                    split.type_use.push(ann.clone());
                }
            }
            None => {
                split.declaration.push(ann.clone());
                sink.push(Diagnostic::warning(
                    DiagnosticKind::AmbiguousTypeAnnotation,
                    source_file.to_string(),
                    ann.span,
                    "annotation target set could not be determined; defaulting to declaration-annotation",
                ));
            }
        }
    }
    split
}

/// The `@Target` element-type names declared on `annotation_class`, if it's
/// a source annotation type carrying a `@Target` meta-annotation. `None`
/// means "couldn't be determined" (classpath annotation type, or a source
/// one with no resolvable `@Target` argument) — the caller defaults to
/// declaration-annotation and diagnoses.
fn target_kinds(annotation_class: ClassSymbol, type_bounds: &FxHashMap<ClassSymbol, TypeBound>, interner: &Interner) -> Option<Vec<String>> {
    let tb = type_bounds.get(&annotation_class)?;
    let target_ann = tb.annotations.iter().find(|a| {
        type_bounds
            .get(&a.symbol)
            .map(|t| matches!(t.header.package_bound.source.kind, symbind_ast::TypeKind::Annotation))
            .unwrap_or(false)
            && simple_name(a.symbol, interner) == "Target"
    })?;
    let (_, value) = target_ann.arguments.first()?;
    Some(element_type_names(value))
}

fn simple_name(symbol: ClassSymbol, interner: &Interner) -> &str {
    interner.resolve(symbol.0).rsplit(['$', '/']).next().unwrap_or_default()
}

fn element_type_names(value: &crate::stage::AnnotationArgValue) -> Vec<String> {
    use crate::stage::AnnotationArgValue::*;
    match value {
        Array(items) => items.iter().flat_map(element_type_names).collect(),
        Unevaluated(expr) => unevaluated_names(expr),
        _ => Vec::new(),
    }
}

fn unevaluated_names(expr: &symbind_ast::Expr) -> Vec<String> {
    match expr {
        symbind_ast::Expr::FieldRef { path, .. } => path.last().cloned().into_iter().collect(),
        symbind_ast::Expr::ArrayInit { elements, .. } => elements.iter().flat_map(unevaluated_names).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{AnnotationArgValue, HeaderBound, PackageBound, SourceBound, Type, TypeBoundField};
    use crate::symbol::FieldSymbol;
    use smallvec::smallvec;
    use symbind_ast::{Expr, Modifiers, TypeKind};
    use symbind_common::Span;
    use std::rc::Rc;

    fn class(interner: &mut Interner, name: &str) -> ClassSymbol {
        ClassSymbol(interner.intern(name))
    }

    fn empty_type_bound(source: SourceBound, annotations: Vec<ResolvedAnnotation>) -> TypeBound {
        TypeBound {
            header: HeaderBound {
                package_bound: PackageBound {
                    source,
                    package: vec![],
                    single_type_imports: Default::default(),
                    on_demand_type_imports: Default::default(),
                    single_static_imports: Default::default(),
                    on_demand_static_imports: Default::default(),
                },
                superclass: None,
                superinterfaces: vec![],
                type_params: vec![],
                cyclic_hierarchy: false,
            },
            type_param_bounds: vec![],
            fields: vec![],
            methods: vec![],
            annotations,
        }
    }

    fn source(symbol: ClassSymbol, kind: TypeKind, file: &str) -> SourceBound {
        SourceBound {
            symbol,
            enclosing: None,
            kind,
            modifiers: Modifiers::empty(),
            member_classes: Default::default(),
            source_file: Rc::from(file),
            span: Span::dummy(),
        }
    }

    /// A `@Target(TYPE_USE)` annotation type, grounded on the same `@Target`
    /// lookup `target_kinds` performs: a source annotation type named
    /// `Target` whose own first annotation argument names the element type.
    #[test]
    fn type_use_only_annotation_lands_only_in_the_type_annotation_bucket() {
        let mut interner = Interner::new();
        let target_class = class(&mut interner, "java/lang/annotation/Target");
        let anno_class = class(&mut interner, "pkg/Anno");
        let test_class = class(&mut interner, "pkg/Test");
        let field_name = interner.intern("xs");

        let mut type_bounds = FxHashMap::default();

        let target_ann = ResolvedAnnotation {
            symbol: target_class,
            arguments: vec![("value".into(), AnnotationArgValue::Unevaluated(Expr::FieldRef { path: smallvec!["TYPE_USE".to_string()], span: Span::dummy() }))],
            span: Span::dummy(),
        };
        type_bounds.insert(target_class, empty_type_bound(source(target_class, TypeKind::Annotation, "Target.java"), vec![]));

        let anno_tb = empty_type_bound(source(anno_class, TypeKind::Annotation, "Anno.java"), vec![target_ann]);
        type_bounds.insert(anno_class, anno_tb);

        let field_annotation = ResolvedAnnotation { symbol: anno_class, arguments: vec![], span: Span::new(5, 10) };
        let mut test_tb = empty_type_bound(source(test_class, TypeKind::Class, "Test.java"), vec![]);
        test_tb.fields.push(TypeBoundField {
            symbol: FieldSymbol { owner: test_class, name: field_name },
            modifiers: Modifiers::empty(),
            ty: Type::Primitive { kind: crate::stage::PrimitiveKind::Int, annotations: vec![] },
            annotations: vec![field_annotation],
            initializer: None,
            span: Span::dummy(),
        });
        type_bounds.insert(test_class, test_tb);

        let mut sink = DiagnosticSink::new();
        let result = run(&type_bounds, &interner, &mut sink);

        assert!(sink.is_empty(), "target set was determinable; no fallback diagnostic expected");
        let field_symbol = FieldSymbol { owner: test_class, name: field_name };
        let split = &result.fields[&field_symbol];
        assert!(split.declaration.is_empty(), "a TYPE_USE-only annotation must not land in the declaration bucket");
        assert_eq!(split.type_use.len(), 1);
    }

    /// An annotation type with no resolvable `@Target` defaults to the
    /// declaration bucket and raises a diagnostic, per the fallback rule.
    #[test]
    fn unresolvable_target_defaults_to_declaration_and_warns() {
        let mut interner = Interner::new();
        let anno_class = class(&mut interner, "pkg/Plain");
        let test_class = class(&mut interner, "pkg/Test");

        let mut type_bounds = FxHashMap::default();
        type_bounds.insert(anno_class, empty_type_bound(source(anno_class, TypeKind::Annotation, "Plain.java"), vec![]));

        let class_annotation = ResolvedAnnotation { symbol: anno_class, arguments: vec![], span: Span::dummy() };
        let test_tb = empty_type_bound(source(test_class, TypeKind::Class, "Test.java"), vec![class_annotation]);
        type_bounds.insert(test_class, test_tb);

        let mut sink = DiagnosticSink::new();
        let result = run(&type_bounds, &interner, &mut sink);

        let split = &result.class[&test_class];
        assert_eq!(split.declaration.len(), 1);
        assert!(split.type_use.is_empty());
        assert_eq!(sink.len(), 1);
    }
}
