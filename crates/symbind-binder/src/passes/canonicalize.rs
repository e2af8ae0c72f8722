//! Canonicalizer (§4.9): rewrites every class-typed reference so each
//! enclosing segment names the class that actually *declares* that nesting
//! level, rather than whatever class the reference happened to be resolved
//! through via inherited member-class visibility.
//!
//! `Outer.Inner` used inside `Outer`, where `Inner` is only visible there
//! because it's inherited from one of `Outer`'s supertypes, canonicalizes to
//! the chain that actually encloses `Inner`'s declaration. Raw uses (no type
//! arguments anywhere in the chain) stay raw; a segment with no generic
//! parameters at its level carries empty type arguments.

use rustc_hash::FxHashMap;

use crate::stage::{AnnotationArgValue, ClassTypeSegment, ResolvedAnnotation, Type, TypeBound};
use crate::symbol::ClassSymbol;

pub fn run(type_bounds: &FxHashMap<ClassSymbol, TypeBound>, source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>) -> FxHashMap<ClassSymbol, TypeBound> {
    let mut result = FxHashMap::default();
    for (&class, tb) in type_bounds {
        let mut tb = tb.clone();

        for (_, bounds) in &mut tb.type_param_bounds {
            for b in bounds {
                *b = canonicalize_type(b, source_bound);
            }
        }
        for field in &mut tb.fields {
            field.ty = canonicalize_type(&field.ty, source_bound);
            for ann in &mut field.annotations {
                canonicalize_annotation(ann, source_bound);
            }
        }
        for method in &mut tb.methods {
            method.return_type = canonicalize_type(&method.return_type, source_bound);
            for param in &mut method.params {
                param.ty = canonicalize_type(&param.ty, source_bound);
            }
            for thrown in &mut method.thrown {
                *thrown = canonicalize_type(thrown, source_bound);
            }
            for ann in &mut method.annotations {
                canonicalize_annotation(ann, source_bound);
            }
        }
        for ann in &mut tb.annotations {
            canonicalize_annotation(ann, source_bound);
        }

        result.insert(class, tb);
    }
    result
}

fn canonicalize_annotation(ann: &mut ResolvedAnnotation, source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>) {
    for (_, value) in &mut ann.arguments {
        canonicalize_arg_value(value, source_bound);
    }
}

fn canonicalize_arg_value(value: &mut AnnotationArgValue, source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>) {
    match value {
        AnnotationArgValue::ClassLiteral(ty) => *ty = canonicalize_type(ty, source_bound),
        AnnotationArgValue::Nested(nested) => canonicalize_annotation(nested, source_bound),
        AnnotationArgValue::Array(items) => {
            for item in items {
                canonicalize_arg_value(item, source_bound);
            }
        }
        AnnotationArgValue::Const(_) | AnnotationArgValue::Unevaluated(_) => {}
    }
}

fn canonicalize_type(ty: &Type, source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>) -> Type {
    match ty {
        Type::Class { segments } => Type::Class {
            segments: canonicalize_segments(segments, source_bound),
        },
        Type::Array { element, annotations } => Type::Array {
            element: std::rc::Rc::new(canonicalize_type(element, source_bound)),
            annotations: annotations.clone(),
        },
        Type::Wildcard { bound_kind, bound, annotations } => Type::Wildcard {
            bound_kind: *bound_kind,
            bound: bound.as_ref().map(|b| std::rc::Rc::new(canonicalize_type(b, source_bound))),
            annotations: annotations.clone(),
        },
        Type::Primitive { .. } | Type::Void | Type::TypeVariable { .. } | Type::Error => ty.clone(),
    }
}

/// Rebuilds the enclosing-class chain from the innermost resolved symbol's
/// actual declaring lineage (`SourceBound::enclosing`), reusing the
/// originally-parsed segments' type arguments and annotations where the
/// chain depth matches, and otherwise reattaching them to the new innermost
/// segment — the only position source syntax could have targeted them at,
/// since a path shorter than the real chain means intervening levels were
/// invisible to the writer.
fn canonicalize_segments(segments: &[ClassTypeSegment], source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>) -> Vec<ClassTypeSegment> {
    let Some(innermost) = segments.last() else {
        return Vec::new();
    };

    let mut chain = vec![innermost.symbol];
    let mut current = source_bound.get(&innermost.symbol).and_then(|s| s.enclosing);
    while let Some(enclosing) = current {
        chain.push(enclosing);
        current = source_bound.get(&enclosing).and_then(|s| s.enclosing);
    }
    chain.reverse();

    if chain.len() == segments.len() {
        return segments.to_vec();
    }

    let mut canonical: Vec<ClassTypeSegment> = chain
        .into_iter()
        .map(|symbol| ClassTypeSegment {
            symbol,
            type_args: Vec::new(),
            annotations: Vec::new(),
        })
        .collect();
    if let Some(last) = canonical.last_mut() {
        last.type_args = innermost.type_args.clone();
        last.annotations = innermost.annotations.clone();
    }
    canonical
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{HeaderBound, PackageBound, TypeBoundField};
    use crate::symbol::FieldSymbol;
    use symbind_ast::{Modifiers, TypeKind};
    use symbind_common::{Interner, Span};

    fn class(interner: &mut Interner, name: &str) -> ClassSymbol {
        ClassSymbol(interner.intern(name))
    }

    fn source_bound(symbol: ClassSymbol, enclosing: Option<ClassSymbol>, kind: TypeKind) -> crate::stage::SourceBound {
        crate::stage::SourceBound {
            symbol,
            enclosing,
            kind,
            modifiers: Modifiers::empty(),
            member_classes: Default::default(),
            source_file: Rc::from("Sub.java"),
            span: Span::dummy(),
        }
    }

    /// `Sub` inherits member class `Inner` from `Outer` and references it
    /// bare, with no qualifying prefix — the one-segment case the doc
    /// comment on `canonicalize_segments` calls out: the written path is
    /// shorter than `Inner`'s real declaring chain, so the missing levels
    /// must be reattached ahead of it.
    #[test]
    fn expands_a_bare_reference_to_an_inherited_member_class() {
        let mut interner = Interner::new();
        let outer = class(&mut interner, "pkg/Outer");
        let inner = class(&mut interner, "pkg/Outer$Inner");
        let sub = class(&mut interner, "pkg/Sub");

        let mut source_bound_map = FxHashMap::default();
        source_bound_map.insert(outer, source_bound_entry(outer, None));
        source_bound_map.insert(inner, source_bound_entry(inner, Some(outer)));
        source_bound_map.insert(sub, source_bound_entry(sub, None));

        let field_ty = Type::Class {
            segments: vec![ClassTypeSegment {
                symbol: inner,
                type_args: vec![Type::Primitive {
                    kind: crate::stage::PrimitiveKind::Int,
                    annotations: vec![],
                }],
                annotations: vec![ResolvedAnnotation {
                    symbol: inner,
                    arguments: vec![],
                    span: Span::dummy(),
                }],
            }],
        };

        let mut type_bounds = FxHashMap::default();
        type_bounds.insert(
            sub,
            TypeBound {
                header: HeaderBound {
                    package_bound: PackageBound {
                        source: source_bound_entry(sub, None),
                        package: vec!["pkg".into()],
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
                fields: vec![TypeBoundField {
                    symbol: FieldSymbol { owner: sub, name: interner.intern("x") },
                    modifiers: Modifiers::empty(),
                    ty: field_ty,
                    annotations: vec![],
                    initializer: None,
                    span: Span::dummy(),
                }],
                methods: vec![],
                annotations: vec![],
            },
        );

        let result = run(&type_bounds, &source_bound_map);
        let field = &result[&sub].fields[0];
        let Type::Class { segments } = &field.ty else {
            panic!("expected a class type");
        };

        assert_eq!(segments.len(), 2, "Outer and Inner, declaring-chain order");
        assert_eq!(segments[0].symbol.0, outer.0);
        assert!(segments[0].type_args.is_empty());
        assert!(segments[0].annotations.is_empty());
        assert_eq!(segments[1].symbol.0, inner.0);
        assert_eq!(segments[1].type_args.len(), 1, "type arguments stay on the declaring segment");
        assert_eq!(segments[1].annotations.len(), 1, "annotations stay on the declaring segment");
    }

    fn source_bound_entry(symbol: ClassSymbol, enclosing: Option<ClassSymbol>) -> crate::stage::SourceBound {
        source_bound(symbol, enclosing, TypeKind::Class)
    }
}
