//! Wires the monotone pass sequence together: parsed units and classpath
//! archives in, a bound class graph and diagnostics out.
//!
//! ```text
//! units -> SourceBoundPass -> PackageBoundPass -> HierarchyPass -> TypePass
//!       -> ConstantEvaluator (fields, then annotation arguments)
//!       -> TypeAnnotationDisambiguator -> Canonicalizer -> Bound
//! ```
//!
//! Source symbols always win a short-name clash over boot classes, which in
//! turn win over ordinary classpath classes — enforced by registering each
//! [`ClassPathBinder`] with the [`TopLevelIndex`] in that order (see the
//! index's own priority-insertion contract).

use std::cell::RefCell;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use symbind_ast::CompUnit;
use symbind_classfile::{ClassFileError, ClasspathSet};
use symbind_common::{Diagnostic, DiagnosticSink, Interner};

use crate::classpath_bind::ClassPathBinder;
use crate::environment::{CompoundEnvironment, Environment};
use crate::passes::{canonicalize, constant_eval, hierarchy, package_bound, source_bound, type_annotation, type_pass};
use crate::stage::{Bound, BoundField, BoundMethod, ConstValue, HeaderBound, ResolvedAnnotation};
use crate::symbol::{ClassSymbol, FieldSymbol, Origin};
use crate::top_level_index::TopLevelIndex;

/// Roots for the boot and ordinary classpaths, each a directory tree of
/// `.class` files (see [`symbind_classfile::ClasspathEntry`]).
#[derive(Clone, Debug, Default)]
pub struct ClasspathConfig {
    pub boot: Vec<PathBuf>,
    pub classpath: Vec<PathBuf>,
}

pub struct BindResult {
    pub bound: FxHashMap<ClassSymbol, Bound>,
    pub diagnostics: Vec<Diagnostic>,
    /// The interner backing every symbol in `bound`, so callers can render
    /// canonical names without reaching into pass-private state.
    pub interner: Interner,
}

pub fn bind(units: &[CompUnit], classpath: &ClasspathConfig) -> Result<BindResult, ClassFileError> {
    let interner = RefCell::new(Interner::new());
    let mut index = TopLevelIndex::new();
    let mut sink = DiagnosticSink::new();

    let source = source_bound::run(units, &mut interner.borrow_mut(), &mut index);

    let boot_binder = ClassPathBinder::new(ClasspathSet::open(&classpath.boot)?, Origin::Boot);
    boot_binder.register_with_index(&mut index, &mut interner.borrow_mut());
    let classpath_binder = ClassPathBinder::new(ClasspathSet::open(&classpath.classpath)?, Origin::Classpath);
    classpath_binder.register_with_index(&mut index, &mut interner.borrow_mut());

    let package_bound = package_bound::run(units, &source);

    let boot_header_env = hierarchy::ClasspathHeaderEnvironment::new(&boot_binder, &index, &interner);
    let classpath_header_env = hierarchy::ClasspathHeaderEnvironment::new(&classpath_binder, &index, &interner);
    let boot_header_ref: &dyn Environment<ClassSymbol, HeaderBound> = &boot_header_env;
    let classpath_header_ref: &dyn Environment<ClassSymbol, HeaderBound> = &classpath_header_env;
    let header_env = CompoundEnvironment::new(vec![boot_header_ref, classpath_header_ref]);

    let hierarchy_result = hierarchy::run(
        units,
        &package_bound,
        &source.classes,
        &source.decl_refs,
        &index,
        &header_env,
        &interner,
        &mut sink,
    );

    let type_bounds = type_pass::run(
        units,
        &hierarchy_result.headers,
        &source.classes,
        &source.decl_refs,
        &index,
        &mut interner.borrow_mut(),
        &mut sink,
    );

    let boot_const_env = constant_eval::ClasspathConstantEnvironment::new(&boot_binder, &index, &interner);
    let classpath_const_env = constant_eval::ClasspathConstantEnvironment::new(&classpath_binder, &index, &interner);
    let boot_const_ref: &dyn Environment<FieldSymbol, Option<ConstValue>> = &boot_const_env;
    let classpath_const_ref: &dyn Environment<FieldSymbol, Option<ConstValue>> = &classpath_const_env;
    let const_env = CompoundEnvironment::new(vec![boot_const_ref, classpath_const_ref]);

    let field_constants = constant_eval::run(&type_bounds, &index, &interner, &const_env);
    let type_bounds = constant_eval::evaluate_annotations(&type_bounds, &interner, &index, &field_constants, &const_env);

    let splits = type_annotation::run(&type_bounds, &interner.borrow(), &mut sink);
    let type_bounds = canonicalize::run(&type_bounds, &source.classes);

    let bound = assemble(&type_bounds, &splits, &field_constants, &source.classes, &interner.borrow());

    Ok(BindResult {
        bound,
        diagnostics: sink.into_vec(),
        interner: interner.into_inner(),
    })
}

fn assemble(
    type_bounds: &FxHashMap<ClassSymbol, crate::stage::TypeBound>,
    splits: &type_annotation::TypeAnnotationResult,
    field_constants: &FxHashMap<FieldSymbol, Option<ConstValue>>,
    source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>,
    interner: &Interner,
) -> FxHashMap<ClassSymbol, Bound> {
    let mut result = FxHashMap::default();

    for (&class, tb) in type_bounds {
        let class_split = splits.class.get(&class).cloned().unwrap_or_default();

        let fields = tb
            .fields
            .iter()
            .map(|f| {
                let split = splits.fields.get(&f.symbol).cloned().unwrap_or_default();
                let mut modifiers = f.modifiers;
                if carries_deprecated(&split.declaration, interner) {
                    modifiers |= symbind_ast::Modifiers::DEPRECATED;
                }
                BoundField {
                    symbol: f.symbol,
                    modifiers,
                    ty: f.ty.clone(),
                    declaration_annotations: split.declaration,
                    type_annotations: split.type_use,
                    const_value: field_constants.get(&f.symbol).cloned().flatten(),
                    span: f.span,
                }
            })
            .collect();

        let methods = tb
            .methods
            .iter()
            .map(|m| {
                let split = splits.methods.get(&m.symbol).cloned().unwrap_or_default();
                let mut modifiers = m.modifiers;
                if carries_deprecated(&split.declaration, interner) {
                    modifiers |= symbind_ast::Modifiers::DEPRECATED;
                }
                BoundMethod {
                    symbol: m.symbol,
                    modifiers,
                    return_type: m.return_type.clone(),
                    return_type_annotations: split.type_use,
                    declaration_annotations: split.declaration,
                    params: m.params.clone(),
                    thrown: m.thrown.clone(),
                    span: m.span,
                }
            })
            .collect();

        let mut modifiers = tb.header.package_bound.source.modifiers;
        if carries_deprecated(&class_split.declaration, interner) {
            modifiers |= symbind_ast::Modifiers::DEPRECATED;
        }

        result.insert(
            class,
            Bound {
                symbol: class,
                enclosing: tb.header.package_bound.source.enclosing,
                kind: tb.header.package_bound.source.kind,
                modifiers,
                superclass: tb.header.superclass,
                superinterfaces: tb.header.superinterfaces.clone(),
                type_params: tb.header.type_params.clone(),
                fields,
                methods,
                declaration_annotations: class_split.declaration,
                type_annotations: class_split.type_use,
                inner_class_chain: enclosing_chain(class, source_bound),
            },
        );
    }

    result
}

/// Whether any of `annotations` names the `Deprecated` annotation type —
/// matched by simple name, the same way `type_annotation`'s `@Target`
/// lookup resolves an annotation type without needing a fully qualified
/// name.
fn carries_deprecated(annotations: &[ResolvedAnnotation], interner: &Interner) -> bool {
    annotations.iter().any(|a| simple_name(a.symbol, interner) == "Deprecated")
}

fn simple_name(symbol: ClassSymbol, interner: &Interner) -> &str {
    interner.resolve(symbol.0).rsplit(['$', '/']).next().unwrap_or_default()
}

/// Outermost-first enclosing chain, including `class` itself — the shape
/// the inner-classes attribute wants (see E1).
fn enclosing_chain(class: ClassSymbol, source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>) -> Vec<ClassSymbol> {
    let mut chain = vec![class];
    let mut current = source_bound.get(&class).and_then(|s| s.enclosing);
    while let Some(enclosing) = current {
        chain.push(enclosing);
        current = source_bound.get(&enclosing).and_then(|s| s.enclosing);
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use symbind_ast::{FieldDecl, Modifiers, PkgDecl, TypeDecl, TypeKind, TypeRef};
    use symbind_common::Span;

    fn empty_classpath() -> ClasspathConfig {
        ClasspathConfig::default()
    }

    fn int_type() -> TypeRef {
        TypeRef::Primitive {
            kind: symbind_ast::PrimitiveKind::Int,
            annotations: vec![],
            span: Span::dummy(),
        }
    }

    /// A top-level class with a nested class and a `final int` constant
    /// field, run end to end: exercises every pass and the final assembly.
    #[test]
    fn binds_nested_class_and_constant_field() {
        let inner = TypeDecl {
            name: "Inner".into(),
            kind: TypeKind::Class,
            modifiers: Modifiers::empty(),
            annotations: vec![],
            type_params: vec![],
            extends: None,
            implements: vec![],
            fields: vec![],
            methods: vec![],
            members: vec![],
            span: Span::new(20, 40),
        };

        let outer = TypeDecl {
            name: "Outer".into(),
            kind: TypeKind::Class,
            modifiers: Modifiers::PUBLIC,
            annotations: vec![],
            type_params: vec![],
            extends: None,
            implements: vec![],
            fields: vec![FieldDecl {
                name: "LIMIT".into(),
                modifiers: Modifiers::FINAL,
                annotations: vec![],
                ty: int_type(),
                initializer: Some(symbind_ast::Expr::IntLit(10, Span::dummy())),
                span: Span::new(5, 19),
            }],
            methods: vec![],
            members: vec![inner],
            span: Span::new(0, 41),
        };

        let unit = CompUnit {
            source_file: "Outer.java".into(),
            package: Some(PkgDecl {
                segments: vec!["pkg".into()],
                annotations: vec![],
                span: Span::dummy(),
            }),
            imports: vec![],
            types: vec![outer],
        };

        let result = bind(std::slice::from_ref(&unit), &empty_classpath()).expect("empty classpath opens cleanly");
        assert!(!result.diagnostics.iter().any(|d| d.severity == symbind_common::Severity::Error));

        assert_eq!(result.bound.len(), 2, "Outer and Outer$Inner both bound");

        let outer_bound = result
            .bound
            .values()
            .find(|b| b.enclosing.is_none())
            .expect("Outer has no enclosing class");
        assert_eq!(outer_bound.inner_class_chain.len(), 1);
        assert_eq!(outer_bound.fields.len(), 1);
        assert_eq!(outer_bound.fields[0].const_value, Some(ConstValue::Int(10)));

        let inner_bound = result
            .bound
            .values()
            .find(|b| b.enclosing.is_some())
            .expect("Inner has an enclosing class");
        assert_eq!(inner_bound.inner_class_chain.len(), 2);
    }

    /// Binding the same units twice, fresh each time, produces the same
    /// shape of result — no hidden global state leaks between invocations.
    #[test]
    fn binding_the_same_units_twice_is_idempotent() {
        let unit = CompUnit {
            source_file: "Plain.java".into(),
            package: Some(PkgDecl {
                segments: vec!["pkg".into()],
                annotations: vec![],
                span: Span::dummy(),
            }),
            imports: vec![],
            types: vec![TypeDecl {
                name: "Plain".into(),
                kind: TypeKind::Class,
                modifiers: Modifiers::PUBLIC,
                annotations: vec![],
                type_params: vec![],
                extends: None,
                implements: vec![],
                fields: vec![FieldDecl {
                    name: "LIMIT".into(),
                    modifiers: Modifiers::FINAL,
                    annotations: vec![],
                    ty: int_type(),
                    initializer: Some(symbind_ast::Expr::IntLit(7, Span::dummy())),
                    span: Span::new(5, 19),
                }],
                methods: vec![],
                members: vec![],
                span: Span::new(0, 20),
            }],
        };

        let first = bind(std::slice::from_ref(&unit), &empty_classpath()).expect("binds cleanly");
        let second = bind(std::slice::from_ref(&unit), &empty_classpath()).expect("binds cleanly");

        assert_eq!(first.bound.len(), second.bound.len());
        assert_eq!(first.diagnostics.len(), second.diagnostics.len());

        let first_field = first.bound.values().next().unwrap().fields[0].const_value;
        let second_field = second.bound.values().next().unwrap().fields[0].const_value;
        assert_eq!(first_field, second_field);
        assert_eq!(first_field, Some(ConstValue::Int(7)));
    }
}
