//! The parsed syntax tree handed to the binder.
//!
//! This crate owns no parser: it is the contract a tokenizer/parser produces
//! and the binder consumes. A [`CompUnit`] is the unit of input; everything
//! nested under it carries a [`Span`] so the binder can attach diagnostics to
//! precise source locations.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use symbind_common::Span;

/// One parsed source file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompUnit {
    /// Path or logical name used in diagnostics; not interpreted.
    pub source_file: String,
    pub package: Option<PkgDecl>,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PkgDecl {
    /// Dotted segments, e.g. `["com", "example"]`.
    pub segments: Vec<String>,
    pub annotations: Vec<AnnotationUse>,
    pub span: Span,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ImportDecl {
    /// `import com.example.Foo;`
    SingleType { path: Vec<String>, span: Span },
    /// `import com.example.*;`
    OnDemandType { path: Vec<String>, span: Span },
    /// `import static com.example.Foo.BAR;`
    SingleStaticMember {
        path: Vec<String>,
        member: String,
        span: Span,
    },
    /// `import static com.example.Foo.*;`
    OnDemandStaticMember { path: Vec<String>, span: Span },
}

impl ImportDecl {
    pub fn span(&self) -> Span {
        match self {
            ImportDecl::SingleType { span, .. }
            | ImportDecl::OnDemandType { span, .. }
            | ImportDecl::SingleStaticMember { span, .. }
            | ImportDecl::OnDemandStaticMember { span, .. } => *span,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Modifiers: u32 {
        const PUBLIC       = 0x0001;
        const PRIVATE      = 0x0002;
        const PROTECTED    = 0x0004;
        const STATIC       = 0x0008;
        const FINAL        = 0x0010;
        const ABSTRACT     = 0x0400;
        const SYNTHETIC    = 0x1000;
        const ANNOTATION   = 0x2000;
        const ENUM         = 0x4000;
        const DEPRECATED   = 0x0002_0000;
    }
}

/// A declared class/interface/enum/annotation, possibly nested.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationUse>,
    pub type_params: Vec<TyParamDecl>,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub members: Vec<TypeDecl>,
    pub span: Span,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TyParamDecl {
    pub name: String,
    /// Unparsed bound type references, resolved by the type pass.
    pub bounds: Vec<TypeRef>,
    pub span: Span,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationUse>,
    pub ty: TypeRef,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationUse>,
    pub type_params: Vec<TyParamDecl>,
    pub params: Vec<ParamDecl>,
    pub return_type: TypeRef,
    pub thrown: Vec<TypeRef>,
    pub receiver_annotations: Vec<AnnotationUse>,
    pub span: Span,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub annotations: Vec<AnnotationUse>,
    pub ty: TypeRef,
    pub span: Span,
}

/// An unresolved, syntactic type reference, as written in source.
///
/// `name` is a qualified-or-simple dotted path (`List`, `java.util.List`,
/// `Outer.Inner`); the binder resolves it to a `ClassSymbol`, possibly
/// leaving unresolved inner segments for the caller (see `TopLevelIndex`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TypeRef {
    Primitive {
        kind: PrimitiveKind,
        annotations: Vec<AnnotationUse>,
        span: Span,
    },
    Void {
        span: Span,
    },
    Named {
        path: Vec<TypeRefSegment>,
        span: Span,
    },
    Array {
        element: Box<TypeRef>,
        annotations: Vec<AnnotationUse>,
        span: Span,
    },
    Wildcard {
        bound_kind: WildcardBoundKind,
        bound: Option<Box<TypeRef>>,
        annotations: Vec<AnnotationUse>,
        span: Span,
    },
}

impl TypeRef {
    pub fn span(&self) -> Span {
        match self {
            TypeRef::Primitive { span, .. }
            | TypeRef::Void { span }
            | TypeRef::Named { span, .. }
            | TypeRef::Array { span, .. }
            | TypeRef::Wildcard { span, .. } => *span,
        }
    }
}

/// One `Name<Args>` segment of a possibly-qualified named type reference,
/// e.g. `Outer<String>.Inner` is two segments.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeRefSegment {
    pub name: String,
    pub type_args: Vec<TypeRef>,
    pub annotations: Vec<AnnotationUse>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
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

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WildcardBoundKind {
    None,
    Extends,
    Super,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnnotationUse {
    pub path: Vec<String>,
    pub arguments: Vec<(String, Expr)>,
    pub span: Span,
}

/// Constant and non-constant expression syntax. Only the subset relevant to
/// constant-field initializers and annotation arguments is modeled; method
/// bodies are out of scope and never produce these nodes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Expr {
    BoolLit(bool, Span),
    IntLit(i64, Span),
    LongLit(i64, Span),
    FloatLit(f32, Span),
    DoubleLit(f64, Span),
    StringLit(String, Span),
    CharLit(u16, Span),
    NullLit(Span),
    /// A possibly-qualified name, e.g. `Foo.BAR` or `BAR`.
    FieldRef { path: SmallVec<[String; 4]>, span: Span },
    Unary { op: UnaryOp, operand: Box<Expr>, span: Span },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr>, span: Span },
    Ternary { cond: Box<Expr>, then_branch: Box<Expr>, else_branch: Box<Expr>, span: Span },
    Cast { ty: Box<TypeRef>, operand: Box<Expr>, span: Span },
    /// `{ a, b, c }` used as an annotation array-valued argument.
    ArrayInit { elements: Vec<Expr>, span: Span },
    /// A nested annotation used as an annotation-valued argument.
    AnnotationValue(Box<AnnotationUse>),
    /// A `Foo.class`-style class literal used as an annotation argument.
    ClassLit { ty: Box<TypeRef>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::BoolLit(_, s)
            | Expr::IntLit(_, s)
            | Expr::LongLit(_, s)
            | Expr::FloatLit(_, s)
            | Expr::DoubleLit(_, s)
            | Expr::StringLit(_, s)
            | Expr::CharLit(_, s)
            | Expr::NullLit(s)
            | Expr::FieldRef { span: s, .. }
            | Expr::Unary { span: s, .. }
            | Expr::Binary { span: s, .. }
            | Expr::Ternary { span: s, .. }
            | Expr::Cast { span: s, .. }
            | Expr::ArrayInit { span: s, .. }
            | Expr::ClassLit { span: s, .. } => *s,
            Expr::AnnotationValue(anno) => anno.span,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    BitNot,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Concat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_decl_span_roundtrips_through_serde() {
        let decl = TypeDecl {
            name: "Foo".into(),
            kind: TypeKind::Class,
            modifiers: Modifiers::PUBLIC,
            annotations: vec![],
            type_params: vec![],
            extends: None,
            implements: vec![],
            fields: vec![],
            methods: vec![],
            members: vec![],
            span: Span::new(0, 10),
        };
        let json = serde_json::to_string(&decl).unwrap();
        let back: TypeDecl = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Foo");
        assert_eq!(back.span, Span::new(0, 10));
    }
}
