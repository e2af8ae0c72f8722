//! The per-class entity at each stage of the monotone refinement pipeline:
//! SourceBound -> PackageBound -> HeaderBound -> TypeBound -> Bound.
//!
//! Each stage's struct embeds the previous stage's, so a later pass always
//! has the earlier facts available without re-deriving them.

use std::rc::Rc;

use smallvec::SmallVec;
use symbind_ast::{Expr, Modifiers, TypeKind};
use symbind_common::Span;

use crate::symbol::{ClassSymbol, FieldSymbol, MethodSymbol, TyVarSymbol};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WildcardBoundKind {
    None,
    Extends,
    Super,
}

/// A resolved type, as it appears in field types, method signatures, and
/// type-parameter bounds.
#[derive(Clone, Debug)]
pub enum Type {
    Primitive {
        kind: PrimitiveKind,
        annotations: Vec<ResolvedAnnotation>,
    },
    Void,
    /// A possibly-qualified class type: one segment per enclosing level,
    /// outermost first. Only the canonicalizer guarantees every segment
    /// names the *declaring* enclosing class.
    Class { segments: Vec<ClassTypeSegment> },
    TypeVariable {
        symbol: TyVarSymbol,
        annotations: Vec<ResolvedAnnotation>,
    },
    Array {
        element: Rc<Type>,
        annotations: Vec<ResolvedAnnotation>,
    },
    Wildcard {
        bound_kind: WildcardBoundKind,
        bound: Option<Rc<Type>>,
        annotations: Vec<ResolvedAnnotation>,
    },
    /// Substituted wherever resolution failed, so later passes can keep
    /// making progress instead of aborting.
    Error,
}

#[derive(Clone, Debug)]
pub struct ClassTypeSegment {
    pub symbol: ClassSymbol,
    pub type_args: Vec<Type>,
    pub annotations: Vec<ResolvedAnnotation>,
}

/// A compile-time-representable value. Integral arithmetic narrower than
/// 32 bits is carried in `Int` during evaluation (widened), then narrowed
/// to the declared field type only on store.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Clone, Debug)]
pub struct ResolvedAnnotation {
    pub symbol: ClassSymbol,
    pub arguments: Vec<(String, AnnotationArgValue)>,
    pub span: Span,
}

/// An annotation argument, before (`Unevaluated`) or after (`Const`/`Nested`)
/// the constant evaluator has run.
#[derive(Clone, Debug)]
pub enum AnnotationArgValue {
    Unevaluated(Expr),
    Const(ConstValue),
    ClassLiteral(Type),
    Nested(Box<ResolvedAnnotation>),
    Array(Vec<AnnotationArgValue>),
}

// ---------------------------------------------------------------------
// Stage 1: SourceBound
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct SourceBound {
    pub symbol: ClassSymbol,
    pub enclosing: Option<ClassSymbol>,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    /// Short name -> member class symbol; keys are unique per owner.
    pub member_classes: SmallVec<[(String, ClassSymbol); 4]>,
    pub source_file: Rc<str>,
    pub span: Span,
}

// ---------------------------------------------------------------------
// Stage 2: PackageBound
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct PackageBound {
    pub source: SourceBound,
    pub package: Vec<String>,
    /// Single-type and static-member imports visible to this unit.
    pub single_type_imports: Rc<Vec<(String, Vec<String>)>>,
    pub on_demand_type_imports: Rc<Vec<Vec<String>>>,
    pub single_static_imports: Rc<Vec<(String, Vec<String>, String)>>,
    pub on_demand_static_imports: Rc<Vec<Vec<String>>>,
}

// ---------------------------------------------------------------------
// Stage 3: HeaderBound
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct HeaderBound {
    pub package_bound: PackageBound,
    pub superclass: Option<ClassSymbol>,
    pub superinterfaces: Vec<ClassSymbol>,
    pub type_params: Vec<TyVarSymbol>,
    /// Set when this class's hierarchy resolution detected it participates
    /// in an extends/implements cycle.
    pub cyclic_hierarchy: bool,
}

// ---------------------------------------------------------------------
// Stage 4: TypeBound
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct TypeBoundField {
    pub symbol: FieldSymbol,
    pub modifiers: Modifiers,
    pub ty: Type,
    pub annotations: Vec<ResolvedAnnotation>,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TypeBoundParam {
    pub ty: Type,
    pub annotations: Vec<ResolvedAnnotation>,
}

#[derive(Clone, Debug)]
pub struct TypeBoundMethod {
    pub symbol: MethodSymbol,
    pub modifiers: Modifiers,
    pub type_params: Vec<TyVarSymbol>,
    pub params: Vec<TypeBoundParam>,
    pub return_type: Type,
    pub thrown: Vec<Type>,
    pub annotations: Vec<ResolvedAnnotation>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct TypeBound {
    pub header: HeaderBound,
    pub type_param_bounds: Vec<(TyVarSymbol, Vec<Type>)>,
    pub fields: Vec<TypeBoundField>,
    pub methods: Vec<TypeBoundMethod>,
    pub annotations: Vec<ResolvedAnnotation>,
}

// ---------------------------------------------------------------------
// Stage 5: Bound (final)
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct BoundField {
    pub symbol: FieldSymbol,
    pub modifiers: Modifiers,
    pub ty: Type,
    pub declaration_annotations: Vec<ResolvedAnnotation>,
    pub type_annotations: Vec<ResolvedAnnotation>,
    /// Present iff the field is a constant that evaluated successfully.
    pub const_value: Option<ConstValue>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct BoundMethod {
    pub symbol: MethodSymbol,
    pub modifiers: Modifiers,
    pub return_type: Type,
    pub return_type_annotations: Vec<ResolvedAnnotation>,
    pub declaration_annotations: Vec<ResolvedAnnotation>,
    pub params: Vec<TypeBoundParam>,
    pub thrown: Vec<Type>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Bound {
    pub symbol: ClassSymbol,
    pub enclosing: Option<ClassSymbol>,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub superclass: Option<ClassSymbol>,
    pub superinterfaces: Vec<ClassSymbol>,
    pub type_params: Vec<TyVarSymbol>,
    pub fields: Vec<BoundField>,
    pub methods: Vec<BoundMethod>,
    pub declaration_annotations: Vec<ResolvedAnnotation>,
    pub type_annotations: Vec<ResolvedAnnotation>,
    /// Enclosing chain, outermost first, as recorded for the inner-classes
    /// attribute (see E1).
    pub inner_class_chain: Vec<ClassSymbol>,
}
