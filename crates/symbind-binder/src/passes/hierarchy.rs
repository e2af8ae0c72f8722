//! HierarchyPass (§4.5): resolves each source class's extends/implements
//! clauses and declared type-parameter symbols through a lazy environment,
//! so that cycles in the extends graph are caught rather than infinitely
//! recursing.

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};
use symbind_ast::{CompUnit, TypeKind};
use symbind_common::{Diagnostic, DiagnosticKind, DiagnosticSink, Interner};

use crate::classpath_bind::ClassPathBinder;
use crate::decl_ref::{self, DeclRef};
use crate::environment::{Environment, GetResult, LazyEnvironment};
use crate::resolve::resolve_named_path;
use crate::scope::ScopeStack;
use crate::scope_builder;
use crate::stage::{HeaderBound, PackageBound, SourceBound};
use crate::symbol::{ClassSymbol, Origin, Owner, TyVarSymbol};
use crate::top_level_index::TopLevelIndex;

/// The classpath side of the header environment. Classpath/boot classes
/// never cycle through source classes (cycles can only form among sources,
/// since a classpath archive was already compiled), so this is a thin,
/// uncached lookup the lazy source environment sits on top of as its base.
pub struct ClasspathHeaderEnvironment<'a> {
    binder: &'a ClassPathBinder,
    index: &'a TopLevelIndex,
    interner: &'a RefCell<Interner>,
}

impl<'a> ClasspathHeaderEnvironment<'a> {
    pub fn new(binder: &'a ClassPathBinder, index: &'a TopLevelIndex, interner: &'a RefCell<Interner>) -> Self {
        ClasspathHeaderEnvironment { binder, index, interner }
    }
}

impl<'a> Environment<ClassSymbol, HeaderBound> for ClasspathHeaderEnvironment<'a> {
    fn get(&self, sym: ClassSymbol) -> GetResult<HeaderBound> {
        if self.index.origin_of(sym) == Some(Origin::Source) {
            return GetResult::Absent;
        }
        let mut interner = self.interner.borrow_mut();
        let name = interner.resolve(sym.0).to_owned();
        match self.binder.resolve(sym, &name, &mut interner) {
            Some(bytecode) => GetResult::Found(HeaderBound {
                package_bound: PackageBound {
                    source: SourceBound {
                        symbol: sym,
                        enclosing: None,
                        kind: classify(&bytecode),
                        modifiers: symbind_ast::Modifiers::empty(),
                        member_classes: Default::default(),
                        source_file: "<classpath>".into(),
                        span: symbind_common::Span::dummy(),
                    },
                    package: Vec::new(),
                    single_type_imports: Default::default(),
                    on_demand_type_imports: Default::default(),
                    single_static_imports: Default::default(),
                    on_demand_static_imports: Default::default(),
                },
                superclass: bytecode.superclass,
                superinterfaces: bytecode.interfaces,
                type_params: Vec::new(),
                cyclic_hierarchy: false,
            }),
            None => GetResult::Absent,
        }
    }
}

fn classify(bytecode: &crate::classpath_bind::BytecodeBoundClass) -> TypeKind {
    if bytecode.is_annotation {
        TypeKind::Annotation
    } else if bytecode.is_interface {
        TypeKind::Interface
    } else if bytecode.is_enum {
        TypeKind::Enum
    } else {
        TypeKind::Class
    }
}

pub struct HierarchyResult {
    pub headers: FxHashMap<ClassSymbol, HeaderBound>,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    units: &[CompUnit],
    package_bound: &FxHashMap<ClassSymbol, PackageBound>,
    source_bound: &FxHashMap<ClassSymbol, SourceBound>,
    decl_refs: &FxHashMap<ClassSymbol, DeclRef>,
    index: &TopLevelIndex,
    classpath_env: &dyn Environment<ClassSymbol, HeaderBound>,
    interner: &RefCell<Interner>,
    sink: &mut DiagnosticSink,
) -> HierarchyResult {
    let owned: FxHashSet<ClassSymbol> = source_bound.keys().copied().collect();
    let pending_diagnostics: RefCell<Vec<Diagnostic>> = RefCell::new(Vec::new());

    let completer = |symbol: ClassSymbol, env: &dyn Environment<ClassSymbol, HeaderBound>| -> HeaderBound {
        let pkg_bound = package_bound.get(&symbol).cloned().unwrap_or_else(|| PackageBound {
            source: source_bound[&symbol].clone(),
            package: Vec::new(),
            single_type_imports: Default::default(),
            on_demand_type_imports: Default::default(),
            single_static_imports: Default::default(),
            on_demand_static_imports: Default::default(),
        });

        let resolved_imports = scope_builder::build(&pkg_bound, index);
        let member_scopes_owned = scope_builder::enclosing_member_scopes(symbol, source_bound);
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

        let kind = pkg_bound.source.kind;
        let decl = decl_refs.get(&symbol).map(|r| decl_ref::resolve(units, r));
        let mut cyclic_hierarchy = false;

        let mut resolve_target = |type_ref: &symbind_ast::TypeRef, what: &str| -> Option<ClassSymbol> {
            let symbind_ast::TypeRef::Named { path, .. } = type_ref else {
                return None;
            };
            match resolve_named_path(path, &scope_stack, source_bound) {
                Some(target) => {
                    if let GetResult::Cycle = env.get(target) {
                        cyclic_hierarchy = true;
                    }
                    Some(target)
                }
                None => {
                    pending_diagnostics.borrow_mut().push(Diagnostic::error(
                        DiagnosticKind::SymbolNotFound,
                        pkg_bound.source.source_file.to_string(),
                        type_ref.span(),
                        format!("cannot resolve {what}"),
                    ));
                    None
                }
            }
        };

        let superclass = if kind == TypeKind::Class {
            decl.and_then(|d| d.extends.as_ref()).and_then(|e| resolve_target(e, "superclass"))
        } else {
            None
        };

        let superinterfaces = decl
            .map(|d| d.implements.iter().filter_map(|i| resolve_target(i, "superinterface")).collect())
            .unwrap_or_default();

        let type_params: Vec<TyVarSymbol> = decl
            .map(|d| {
                d.type_params
                    .iter()
                    .map(|tp| TyVarSymbol {
                        owner: Owner::Class(symbol),
                        name: interner.borrow_mut().intern(&tp.name),
                    })
                    .collect()
            })
            .unwrap_or_default();

        HeaderBound {
            package_bound: pkg_bound,
            superclass,
            superinterfaces,
            type_params,
            cyclic_hierarchy,
        }
    };

    let lazy = LazyEnvironment::new(owned.clone(), classpath_env, Box::new(completer));
    let mut headers = FxHashMap::default();
    for &symbol in &owned {
        if let Some(mut header) = lazy.get(symbol).found() {
            header.cyclic_hierarchy = header.cyclic_hierarchy || lazy.is_on_cycle(symbol);
            if header.cyclic_hierarchy {
                pending_diagnostics.borrow_mut().push(Diagnostic::error(
                    DiagnosticKind::CyclicHierarchy,
                    header.package_bound.source.source_file.to_string(),
                    header.package_bound.source.span,
                    "class participates in a cyclic hierarchy",
                ));
            }
            headers.insert(symbol, header);
        }
    }

    for diagnostic in pending_diagnostics.into_inner() {
        sink.push(diagnostic);
    }
    HierarchyResult { headers }
}
