//! TypePass (§4.6): binds type-parameter bounds, field types, and method
//! signatures. Annotation arguments are carried over as unevaluated syntax;
//! the constant evaluator resolves them later.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use symbind_ast::{FieldDecl, MethodDecl, PrimitiveKind as AstPrimitiveKind, TypeRef, TypeRefSegment};
use symbind_common::{Diagnostic, DiagnosticKind, DiagnosticSink, Interner};

use crate::decl_ref::{self, DeclRef};
use crate::scope::{ScopeLookup, ScopeStack};
use crate::scope_builder;
use crate::stage::{
    AnnotationArgValue, ClassTypeSegment, HeaderBound, PrimitiveKind, ResolvedAnnotation, Type, TypeBound,
    TypeBoundField, TypeBoundMethod, TypeBoundParam, WildcardBoundKind,
};
use crate::symbol::{ClassSymbol, FieldSymbol, MethodSymbol, Owner, TyVarSymbol};
use crate::top_level_index::TopLevelIndex;

pub fn run(
    units: &[symbind_ast::CompUnit],
    headers: &FxHashMap<ClassSymbol, HeaderBound>,
    source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>,
    decl_refs: &FxHashMap<ClassSymbol, DeclRef>,
    index: &TopLevelIndex,
    interner: &mut Interner,
    sink: &mut DiagnosticSink,
) -> FxHashMap<ClassSymbol, TypeBound> {
    let mut result = FxHashMap::default();

    for (&symbol, header) in headers {
        let Some(decl_ref) = decl_refs.get(&symbol) else { continue };
        let decl = decl_ref::resolve(units, decl_ref);

        let resolved_imports = scope_builder::build(&header.package_bound, index);
        let member_scopes_owned = inherited_member_scopes(symbol, source_bound, headers);
        let member_scopes: Vec<&_> = member_scopes_owned.iter().collect();
        let on_demand_refs: Vec<&_> = resolved_imports.on_demand.iter().collect();
        let scope_stack = ScopeStack {
            single_type_imports: &resolved_imports.single_type,
            enclosing_member_scopes: member_scopes,
            same_package: resolved_imports.same_package.as_ref(),
            on_demand_scopes: on_demand_refs,
            root_import_scope: resolved_imports.root.as_ref(),
            top_level_index: index,
        };

        let class_tyvar_scope = header.type_params.clone();
        let class_tyvar_slice: &[TyVarSymbol] = &class_tyvar_scope;

        let type_param_bounds = header
            .type_params
            .iter()
            .zip(decl.type_params.iter())
            .map(|(tyvar, tp)| {
                let bounds = tp
                    .bounds
                    .iter()
                    .map(|b| convert_type(b, &scope_stack, source_bound, &[class_tyvar_slice], interner, sink, &header.package_bound.source.source_file))
                    .collect();
                (*tyvar, bounds)
            })
            .collect();

        let fields = decl
            .fields
            .iter()
            .map(|f| convert_field(symbol, f, &scope_stack, source_bound, &class_tyvar_scope, interner, sink, &header.package_bound.source.source_file))
            .collect();

        let methods = decl
            .methods
            .iter()
            .map(|m| convert_method(symbol, m, &scope_stack, source_bound, &class_tyvar_scope, interner, sink, &header.package_bound.source.source_file))
            .collect();

        let annotations = decl
            .annotations
            .iter()
            .map(|a| convert_annotation(a, &scope_stack, source_bound, interner, sink, &header.package_bound.source.source_file))
            .collect();

        result.insert(
            symbol,
            TypeBound {
                header: header.clone(),
                type_param_bounds,
                fields,
                methods,
                annotations,
            },
        );
    }

    result
}

/// Declared plus inherited (superclass/superinterface chain) member-class
/// scopes, innermost first: TypePass is the first pass with a hierarchy
/// available, so inherited member classes finally become visible here.
fn inherited_member_scopes(
    symbol: ClassSymbol,
    source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>,
    headers: &FxHashMap<ClassSymbol, HeaderBound>,
) -> Vec<crate::scope::Scope> {
    let mut scopes = scope_builder::enclosing_member_scopes(symbol, source_bound);

    let mut seen = rustc_hash::FxHashSet::default();
    let mut frontier = vec![symbol];
    while let Some(current) = frontier.pop() {
        if !seen.insert(current) {
            continue;
        }
        let Some(header) = headers.get(&current) else { continue };
        for &parent in header.superclass.iter().chain(header.superinterfaces.iter()) {
            if let Some(entity) = source_bound.get(&parent) {
                let scope: crate::scope::Scope = entity.member_classes.iter().cloned().collect();
                scopes.push(scope);
            }
            frontier.push(parent);
        }
    }
    scopes
}

#[allow(clippy::too_many_arguments)]
fn convert_field(
    owner: ClassSymbol,
    field: &FieldDecl,
    scope_stack: &ScopeStack,
    source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>,
    tyvar_scopes: &[TyVarSymbol],
    interner: &mut Interner,
    sink: &mut DiagnosticSink,
    source_file: &str,
) -> TypeBoundField {
    let ty = convert_type(&field.ty, scope_stack, source_bound, &[tyvar_scopes], interner, sink, source_file);
    let annotations = field
        .annotations
        .iter()
        .map(|a| convert_annotation(a, scope_stack, source_bound, interner, sink, source_file))
        .collect();
    TypeBoundField {
        symbol: FieldSymbol {
            owner,
            name: interner.intern(&field.name),
        },
        modifiers: field.modifiers,
        ty,
        annotations,
        initializer: field.initializer.clone(),
        span: field.span,
    }
}

#[allow(clippy::too_many_arguments)]
fn convert_method(
    owner: ClassSymbol,
    method: &MethodDecl,
    scope_stack: &ScopeStack,
    source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>,
    class_tyvar_scope: &[TyVarSymbol],
    interner: &mut Interner,
    sink: &mut DiagnosticSink,
    source_file: &str,
) -> TypeBoundMethod {
    let method_owner = Owner::Method(owner, interner.intern(&method.name));
    let method_tyvars: Vec<TyVarSymbol> = method
        .type_params
        .iter()
        .map(|tp| TyVarSymbol {
            owner: method_owner,
            name: interner.intern(&tp.name),
        })
        .collect();

    let scopes: Vec<&[TyVarSymbol]> = vec![&method_tyvars, class_tyvar_scope];

    let params = method
        .params
        .iter()
        .map(|p| TypeBoundParam {
            ty: convert_type(&p.ty, scope_stack, source_bound, &scopes, interner, sink, source_file),
            annotations: p
                .annotations
                .iter()
                .map(|a| convert_annotation(a, scope_stack, source_bound, interner, sink, source_file))
                .collect(),
        })
        .collect();

    let return_type = convert_type(&method.return_type, scope_stack, source_bound, &scopes, interner, sink, source_file);
    let thrown = method
        .thrown
        .iter()
        .map(|t| convert_type(t, scope_stack, source_bound, &scopes, interner, sink, source_file))
        .collect();
    let annotations = method
        .annotations
        .iter()
        .map(|a| convert_annotation(a, scope_stack, source_bound, interner, sink, source_file))
        .collect();

    TypeBoundMethod {
        symbol: MethodSymbol {
            owner,
            name: interner.intern(&method.name),
        },
        modifiers: method.modifiers,
        type_params: method_tyvars,
        params,
        return_type,
        thrown,
        annotations,
        span: method.span,
    }
}

fn find_type_var(name: &str, scopes: &[&[TyVarSymbol]], interner: &Interner) -> Option<TyVarSymbol> {
    for scope in scopes {
        if let Some(found) = scope.iter().find(|tv| interner.resolve(tv.name) == name) {
            return Some(*found);
        }
    }
    None
}

#[allow(clippy::too_many_arguments)]
fn convert_type(
    type_ref: &TypeRef,
    scope_stack: &ScopeStack,
    source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>,
    tyvar_scopes: &[&[TyVarSymbol]],
    interner: &mut Interner,
    sink: &mut DiagnosticSink,
    source_file: &str,
) -> Type {
    match type_ref {
        TypeRef::Primitive { kind, .. } => Type::Primitive {
            kind: convert_primitive(*kind),
            annotations: Vec::new(),
        },
        TypeRef::Void { .. } => Type::Void,
        TypeRef::Array { element, annotations, .. } => Type::Array {
            element: Rc::new(convert_type(element, scope_stack, source_bound, tyvar_scopes, interner, sink, source_file)),
            annotations: annotations
                .iter()
                .map(|a| convert_annotation(a, scope_stack, source_bound, interner, sink, source_file))
                .collect(),
        },
        TypeRef::Wildcard {
            bound_kind,
            bound,
            annotations,
            ..
        } => Type::Wildcard {
            bound_kind: match bound_kind {
                symbind_ast::WildcardBoundKind::None => WildcardBoundKind::None,
                symbind_ast::WildcardBoundKind::Extends => WildcardBoundKind::Extends,
                symbind_ast::WildcardBoundKind::Super => WildcardBoundKind::Super,
            },
            bound: bound
                .as_ref()
                .map(|b| Rc::new(convert_type(b, scope_stack, source_bound, tyvar_scopes, interner, sink, source_file))),
            annotations: annotations
                .iter()
                .map(|a| convert_annotation(a, scope_stack, source_bound, interner, sink, source_file))
                .collect(),
        },
        TypeRef::Named { path, .. } => convert_named(path, scope_stack, source_bound, tyvar_scopes, interner, sink, source_file, type_ref),
    }
}

#[allow(clippy::too_many_arguments)]
fn convert_named(
    path: &[TypeRefSegment],
    scope_stack: &ScopeStack,
    source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>,
    tyvar_scopes: &[&[TyVarSymbol]],
    interner: &mut Interner,
    sink: &mut DiagnosticSink,
    source_file: &str,
    original: &TypeRef,
) -> Type {
    if path.len() == 1 && path[0].type_args.is_empty() {
        if let Some(tv) = find_type_var(&path[0].name, tyvar_scopes, interner) {
            return Type::TypeVariable {
                symbol: tv,
                annotations: path[0]
                    .annotations
                    .iter()
                    .map(|a| convert_annotation(a, scope_stack, source_bound, interner, sink, source_file))
                    .collect(),
            };
        }
    }

    let (mut current, mut rest): (ClassSymbol, &[TypeRefSegment]) = match path.split_first() {
        Some((head, rest)) => match scope_stack.resolve_simple(&head.name) {
            ScopeLookup::Found(sym) => (sym, rest),
            ScopeLookup::Ambiguous => {
                sink.push(Diagnostic::error(
                    DiagnosticKind::AmbiguousImport,
                    source_file,
                    original.span(),
                    format!("ambiguous reference to `{}`", head.name),
                ));
                return Type::Error;
            }
            ScopeLookup::Absent => {
                let names: Vec<String> = path.iter().map(|s| s.name.clone()).collect();
                match scope_stack.resolve_qualified(&names) {
                    Some(lookup) => {
                        let remaining_len = lookup.remaining.len();
                        (lookup.symbol, &path[path.len() - remaining_len..])
                    }
                    None => {
                        sink.push(Diagnostic::error(
                            DiagnosticKind::SymbolNotFound,
                            source_file,
                            original.span(),
                            format!("cannot resolve `{}`", head.name),
                        ));
                        return Type::Error;
                    }
                }
            }
        },
        None => return Type::Error,
    };

    let mut segments = vec![ClassTypeSegment {
        symbol: current,
        type_args: path[0]
            .type_args
            .iter()
            .map(|t| convert_type(t, scope_stack, source_bound, tyvar_scopes, interner, sink, source_file))
            .collect(),
        annotations: path[0]
            .annotations
            .iter()
            .map(|a| convert_annotation(a, scope_stack, source_bound, interner, sink, source_file))
            .collect(),
    }];

    while let Some((head, tail)) = rest.split_first() {
        let Some(entity) = source_bound.get(&current) else {
            sink.push(Diagnostic::error(
                DiagnosticKind::SymbolNotFound,
                source_file,
                original.span(),
                format!("cannot resolve member type `{}`", head.name),
            ));
            return Type::Error;
        };
        let Some(member) = entity.member_classes.iter().find(|(name, _)| name == &head.name) else {
            sink.push(Diagnostic::error(
                DiagnosticKind::SymbolNotFound,
                source_file,
                original.span(),
                format!("cannot resolve member type `{}`", head.name),
            ));
            return Type::Error;
        };
        current = member.1;
        segments.push(ClassTypeSegment {
            symbol: current,
            type_args: head
                .type_args
                .iter()
                .map(|t| convert_type(t, scope_stack, source_bound, tyvar_scopes, interner, sink, source_file))
                .collect(),
            annotations: head
                .annotations
                .iter()
                .map(|a| convert_annotation(a, scope_stack, source_bound, interner, sink, source_file))
                .collect(),
        });
        rest = tail;
    }

    Type::Class { segments }
}

fn convert_primitive(kind: AstPrimitiveKind) -> PrimitiveKind {
    match kind {
        AstPrimitiveKind::Boolean => PrimitiveKind::Boolean,
        AstPrimitiveKind::Byte => PrimitiveKind::Byte,
        AstPrimitiveKind::Short => PrimitiveKind::Short,
        AstPrimitiveKind::Char => PrimitiveKind::Char,
        AstPrimitiveKind::Int => PrimitiveKind::Int,
        AstPrimitiveKind::Long => PrimitiveKind::Long,
        AstPrimitiveKind::Float => PrimitiveKind::Float,
        AstPrimitiveKind::Double => PrimitiveKind::Double,
    }
}

fn convert_annotation(
    annotation: &symbind_ast::AnnotationUse,
    scope_stack: &ScopeStack,
    source_bound: &FxHashMap<ClassSymbol, crate::stage::SourceBound>,
    interner: &mut Interner,
    sink: &mut DiagnosticSink,
    source_file: &str,
) -> ResolvedAnnotation {
    let segments: Vec<TypeRefSegment> = annotation
        .path
        .iter()
        .map(|name| TypeRefSegment {
            name: name.clone(),
            type_args: Vec::new(),
            annotations: Vec::new(),
            span: annotation.span,
        })
        .collect();
    let symbol = match convert_named(&segments, scope_stack, source_bound, &[], interner, sink, source_file, &TypeRef::Named { path: segments.clone(), span: annotation.span }) {
        Type::Class { segments } if segments.len() == 1 => segments[0].symbol,
        _ => ClassSymbol(interner.intern("<error>")),
    };

    ResolvedAnnotation {
        symbol,
        arguments: annotation
            .arguments
            .iter()
            .map(|(name, expr)| (name.clone(), AnnotationArgValue::Unevaluated(expr.clone())))
            .collect(),
        span: annotation.span,
    }
}

