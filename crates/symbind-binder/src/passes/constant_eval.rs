//! ConstantEvaluator (§4.7): folds final-field initializers and
//! annotation-argument expressions into compile-time constant values.
//!
//! Built as a lazy environment keyed by `FieldSymbol`. A self-referential
//! initializer re-enters its own completer, observes `GetResult::Cycle`,
//! and is caught *locally* here — nowhere else in the pipeline catches a
//! cycle signal (§9 design notes).

use std::cell::RefCell;

use rustc_hash::{FxHashMap, FxHashSet};
use symbind_ast::{BinaryOp, Expr, PrimitiveKind as AstPrimitiveKind, TypeRef, UnaryOp};
use symbind_common::Interner;

use crate::classpath_bind::ClassPathBinder;
use crate::environment::{CompoundEnvironment, Environment, GetResult, LazyEnvironment, SimpleEnvironment};
use crate::stage::{AnnotationArgValue, ConstValue, ResolvedAnnotation, Type, TypeBound};
use crate::symbol::{ClassSymbol, FieldSymbol};
use crate::top_level_index::TopLevelIndex;

/// Classpath constants are already decoded (`BytecodeField::const_value`);
/// this environment just looks them up without ever completing anything.
pub struct ClasspathConstantEnvironment<'a> {
    binder: &'a ClassPathBinder,
    index: &'a TopLevelIndex,
    interner: &'a std::cell::RefCell<Interner>,
}

impl<'a> ClasspathConstantEnvironment<'a> {
    pub fn new(binder: &'a ClassPathBinder, index: &'a TopLevelIndex, interner: &'a std::cell::RefCell<Interner>) -> Self {
        ClasspathConstantEnvironment { binder, index, interner }
    }
}

impl<'a> Environment<FieldSymbol, Option<ConstValue>> for ClasspathConstantEnvironment<'a> {
    fn get(&self, sym: FieldSymbol) -> GetResult<Option<ConstValue>> {
        let mut interner = self.interner.borrow_mut();
        let class_name = interner.resolve(sym.owner.0).to_owned();
        let Some(bytecode) = self.binder.resolve(sym.owner, &class_name, &mut interner) else {
            return GetResult::Absent;
        };
        let field_name = interner.resolve(sym.name).to_owned();
        match bytecode.fields.iter().find(|f| interner.resolve(f.symbol.name) == field_name) {
            Some(f) if f.is_static && f.is_final => GetResult::Found(f.const_value.clone()),
            _ => GetResult::Absent,
        }
    }
}

pub fn run<'a>(
    type_bounds: &'a FxHashMap<ClassSymbol, TypeBound>,
    index: &'a TopLevelIndex,
    interner: &'a RefCell<Interner>,
    classpath_env: &'a dyn Environment<FieldSymbol, Option<ConstValue>>,
) -> FxHashMap<FieldSymbol, Option<ConstValue>> {
    let mut owned = FxHashSet::default();
    for (&class, tb) in type_bounds {
        for field in &tb.fields {
            if field.modifiers.contains(symbind_ast::Modifiers::FINAL) && field.initializer.is_some() && is_constant_kind(&field.ty) {
                owned.insert(FieldSymbol { owner: class, name: field.symbol.name });
            }
        }
    }

    let completer = move |field_symbol: FieldSymbol, env: &dyn Environment<FieldSymbol, Option<ConstValue>>| -> Option<ConstValue> {
        let tb = type_bounds.get(&field_symbol.owner)?;
        let field = tb.fields.iter().find(|f| f.symbol.name == field_symbol.name)?;
        let expr = field.initializer.as_ref()?;
        let value = evaluate(expr, field_symbol.owner, type_bounds, index, interner, env)?;
        Some(narrow_to(&value, field_declared_primitive(field)))
    };

    let lazy = LazyEnvironment::new(owned.clone(), classpath_env, Box::new(completer));
    let mut result = FxHashMap::default();
    for symbol in owned {
        if let Some(value) = lazy.get(symbol).found() {
            result.insert(symbol, value);
        }
    }
    result
}

/// Walks every annotation argument reachable from `type_bounds` (class,
/// field, method, and parameter annotations) and folds whichever ones are
/// compile-time-constant expressions into `Const`/`Array` values, using the
/// same field environment `run` already completed. Annotation arguments
/// that aren't constant-foldable (nested annotations, class literals) are
/// resolved by best-effort symbol lookup only — they aren't import-aware,
/// since the unit's `ScopeStack` no longer exists past `TypePass`.
pub fn evaluate_annotations(
    type_bounds: &FxHashMap<ClassSymbol, TypeBound>,
    interner: &RefCell<Interner>,
    index: &TopLevelIndex,
    field_constants: &FxHashMap<FieldSymbol, Option<ConstValue>>,
    classpath_env: &dyn Environment<FieldSymbol, Option<ConstValue>>,
) -> FxHashMap<ClassSymbol, TypeBound> {
    let mut completed = FxHashMap::default();
    for (&sym, value) in field_constants {
        completed.insert(sym, value.clone());
    }
    let resolved_fields = SimpleEnvironment::new(completed);
    let resolved_fields_ref: &dyn Environment<FieldSymbol, Option<ConstValue>> = &resolved_fields;
    let env = CompoundEnvironment::new(vec![resolved_fields_ref, classpath_env]);

    let mut result = FxHashMap::default();
    for (&class, tb) in type_bounds {
        let mut tb = tb.clone();
        for ann in &mut tb.annotations {
            fold_annotation(ann, class, type_bounds, interner, index, &env);
        }
        for field in &mut tb.fields {
            for ann in &mut field.annotations {
                fold_annotation(ann, class, type_bounds, interner, index, &env);
            }
        }
        for method in &mut tb.methods {
            for ann in &mut method.annotations {
                fold_annotation(ann, class, type_bounds, interner, index, &env);
            }
            for param in &mut method.params {
                for ann in &mut param.annotations {
                    fold_annotation(ann, class, type_bounds, interner, index, &env);
                }
            }
        }
        result.insert(class, tb);
    }
    result
}

fn fold_annotation(
    ann: &mut ResolvedAnnotation,
    current_class: ClassSymbol,
    type_bounds: &FxHashMap<ClassSymbol, TypeBound>,
    interner: &RefCell<Interner>,
    index: &TopLevelIndex,
    env: &dyn Environment<FieldSymbol, Option<ConstValue>>,
) {
    for (_, value) in &mut ann.arguments {
        *value = fold_arg_value(value, current_class, type_bounds, interner, index, env);
    }
}

fn fold_arg_value(
    value: &AnnotationArgValue,
    current_class: ClassSymbol,
    type_bounds: &FxHashMap<ClassSymbol, TypeBound>,
    interner: &RefCell<Interner>,
    index: &TopLevelIndex,
    env: &dyn Environment<FieldSymbol, Option<ConstValue>>,
) -> AnnotationArgValue {
    let AnnotationArgValue::Unevaluated(expr) = value else {
        return value.clone();
    };
    match expr {
        Expr::ArrayInit { elements, .. } => {
            let folded = elements
                .iter()
                .map(|e| fold_arg_value(&AnnotationArgValue::Unevaluated(e.clone()), current_class, type_bounds, interner, index, env))
                .collect();
            AnnotationArgValue::Array(folded)
        }
        Expr::AnnotationValue(nested) => {
            let segments: Vec<String> = nested.path.clone();
            match index.lookup(&segments) {
                Some(lookup) => {
                    let mut resolved = ResolvedAnnotation {
                        symbol: lookup.symbol,
                        arguments: nested.arguments.iter().map(|(n, e)| (n.clone(), AnnotationArgValue::Unevaluated(e.clone()))).collect(),
                        span: nested.span,
                    };
                    fold_annotation(&mut resolved, current_class, type_bounds, interner, index, env);
                    AnnotationArgValue::Nested(Box::new(resolved))
                }
                None => value.clone(),
            }
        }
        Expr::ClassLit { ty, .. } => match ty.as_ref() {
            TypeRef::Named { path, .. } => match index.lookup(&path.iter().map(|s| s.name.clone()).collect::<Vec<_>>()) {
                Some(lookup) => AnnotationArgValue::ClassLiteral(Type::Class {
                    segments: vec![crate::stage::ClassTypeSegment {
                        symbol: lookup.symbol,
                        type_args: Vec::new(),
                        annotations: Vec::new(),
                    }],
                }),
                None => value.clone(),
            },
            _ => value.clone(),
        },
        _ => evaluate(expr, current_class, type_bounds, index, interner, env)
            .map(AnnotationArgValue::Const)
            .unwrap_or_else(|| value.clone()),
    }
}

/// `None` when the field's declared type isn't a primitive (string
/// constants and non-constant-kind types pass through `narrow_to` unchanged).
fn field_declared_primitive(field: &crate::stage::TypeBoundField) -> Option<AstPrimitiveKind> {
    match &field.ty {
        Type::Primitive { kind, .. } => Some(match kind {
            crate::stage::PrimitiveKind::Boolean => AstPrimitiveKind::Boolean,
            crate::stage::PrimitiveKind::Byte => AstPrimitiveKind::Byte,
            crate::stage::PrimitiveKind::Short => AstPrimitiveKind::Short,
            crate::stage::PrimitiveKind::Char => AstPrimitiveKind::Char,
            crate::stage::PrimitiveKind::Int => AstPrimitiveKind::Int,
            crate::stage::PrimitiveKind::Long => AstPrimitiveKind::Long,
            crate::stage::PrimitiveKind::Float => AstPrimitiveKind::Float,
            crate::stage::PrimitiveKind::Double => AstPrimitiveKind::Double,
        }),
        _ => None,
    }
}

fn is_constant_kind(ty: &Type) -> bool {
    matches!(ty, Type::Primitive { .. }) || matches!(ty, Type::Class { segments } if segments.len() == 1)
}

fn evaluate(
    expr: &Expr,
    current_class: ClassSymbol,
    type_bounds: &FxHashMap<ClassSymbol, TypeBound>,
    index: &TopLevelIndex,
    interner: &RefCell<Interner>,
    env: &dyn Environment<FieldSymbol, Option<ConstValue>>,
) -> Option<ConstValue> {
    match expr {
        Expr::BoolLit(b, _) => Some(ConstValue::Boolean(*b)),
        Expr::IntLit(v, _) => Some(ConstValue::Int(*v as i32)),
        Expr::LongLit(v, _) => Some(ConstValue::Long(*v)),
        Expr::FloatLit(v, _) => Some(ConstValue::Float(*v)),
        Expr::DoubleLit(v, _) => Some(ConstValue::Double(*v)),
        Expr::StringLit(s, _) => Some(ConstValue::String(s.clone())),
        Expr::CharLit(c, _) => Some(ConstValue::Int(*c as i32)),
        Expr::NullLit(_) => None,
        Expr::FieldRef { path, .. } => {
            let target = resolve_field_ref(path, current_class, type_bounds, index, interner)?;
            match env.get(target) {
                GetResult::Found(v) => v,
                GetResult::Cycle => None,
                GetResult::Absent => None,
            }
        }
        Expr::Unary { op, operand, .. } => {
            let v = evaluate(operand, current_class, type_bounds, index, interner, env)?;
            apply_unary(*op, v)
        }
        Expr::Binary { op, lhs, rhs, .. } => {
            if *op == BinaryOp::And {
                let l = evaluate(lhs, current_class, type_bounds, index, interner, env)?;
                if matches!(l, ConstValue::Boolean(false)) {
                    return Some(l);
                }
                return evaluate(rhs, current_class, type_bounds, index, interner, env);
            }
            if *op == BinaryOp::Or {
                let l = evaluate(lhs, current_class, type_bounds, index, interner, env)?;
                if matches!(l, ConstValue::Boolean(true)) {
                    return Some(l);
                }
                return evaluate(rhs, current_class, type_bounds, index, interner, env);
            }
            let l = evaluate(lhs, current_class, type_bounds, index, interner, env)?;
            let r = evaluate(rhs, current_class, type_bounds, index, interner, env)?;
            if *op == BinaryOp::Concat {
                return Some(ConstValue::String(format!("{}{}", display(&l), display(&r))));
            }
            apply_binary(*op, l, r)
        }
        Expr::Ternary {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            let c = evaluate(cond, current_class, type_bounds, index, interner, env)?;
            match c {
                ConstValue::Boolean(true) => evaluate(then_branch, current_class, type_bounds, index, interner, env),
                ConstValue::Boolean(false) => evaluate(else_branch, current_class, type_bounds, index, interner, env),
                _ => None,
            }
        }
        Expr::Cast { ty, operand, .. } => {
            let v = evaluate(operand, current_class, type_bounds, index, interner, env)?;
            let kind = match ty.as_ref() {
                TypeRef::Primitive { kind, .. } => Some(*kind),
                _ => None,
            };
            Some(narrow_to(&v, kind))
        }
        Expr::ArrayInit { .. } | Expr::AnnotationValue(_) | Expr::ClassLit { .. } => None,
    }
}

/// Resolves a `FieldRef` to the `FieldSymbol` it names. A single-segment
/// reference is looked up among `current_class`'s own declared fields. A
/// qualified reference first tries `current_class`'s declared member
/// classes (an inherited-or-nested class reached without a top-level
/// qualifier), then falls back to a `TopLevelIndex` lookup so a sibling
/// top-level class in the same unit, another source unit, or an imported
/// classpath class can all be reached the same way (§4.7, §2 item 12).
/// When the resolved owner has no local `TypeBound` (a boot or ordinary
/// classpath class), the field name is interned fresh so the classpath
/// constant environment can compare it against the decoded class file.
fn resolve_field_ref(
    path: &[String],
    current_class: ClassSymbol,
    type_bounds: &FxHashMap<ClassSymbol, TypeBound>,
    index: &TopLevelIndex,
    interner: &RefCell<Interner>,
) -> Option<FieldSymbol> {
    let (class_path, field_name) = path.split_at(path.len() - 1);
    let field_name = field_name.first()?;

    let class = resolve_qualifier_class(class_path, current_class, type_bounds, index)?;

    match type_bounds.get(&class) {
        Some(tb) => {
            let field = tb.fields.iter().find(|f| interner.borrow().resolve(f.symbol.name) == field_name)?;
            Some(field.symbol)
        }
        None => {
            let name = interner.borrow_mut().intern(field_name);
            Some(FieldSymbol { owner: class, name })
        }
    }
}

/// Resolves the class a qualified `FieldRef`'s leading segments name: first
/// by walking `current_class`'s own declared member classes (an unqualified
/// path to a nested class), then — if that doesn't account for every
/// segment — by looking the whole path up in the `TopLevelIndex`, which
/// reaches a sibling top-level class, a class from another source unit, or
/// a boot/ordinary classpath class. An empty `class_path` (an unqualified
/// field reference) resolves to `current_class` itself.
fn resolve_qualifier_class(
    class_path: &[String],
    current_class: ClassSymbol,
    type_bounds: &FxHashMap<ClassSymbol, TypeBound>,
    index: &TopLevelIndex,
) -> Option<ClassSymbol> {
    if class_path.is_empty() {
        return Some(current_class);
    }

    let mut class = current_class;
    let mut via_members = true;
    for segment in class_path {
        let Some(tb) = type_bounds.get(&class) else {
            via_members = false;
            break;
        };
        let Some(member) = tb.header.package_bound.source.member_classes.iter().find(|(n, _)| n == segment) else {
            via_members = false;
            break;
        };
        class = member.1;
    }
    if via_members {
        return Some(class);
    }

    index.lookup(class_path).map(|r| r.symbol)
}

fn apply_unary(op: UnaryOp, v: ConstValue) -> Option<ConstValue> {
    match (op, v) {
        (UnaryOp::Neg, ConstValue::Int(i)) => Some(ConstValue::Int(i.wrapping_neg())),
        (UnaryOp::Neg, ConstValue::Long(l)) => Some(ConstValue::Long(l.wrapping_neg())),
        (UnaryOp::Neg, ConstValue::Float(f)) => Some(ConstValue::Float(-f)),
        (UnaryOp::Neg, ConstValue::Double(d)) => Some(ConstValue::Double(-d)),
        (UnaryOp::BitNot, ConstValue::Int(i)) => Some(ConstValue::Int(!i)),
        (UnaryOp::BitNot, ConstValue::Long(l)) => Some(ConstValue::Long(!l)),
        (UnaryOp::Not, ConstValue::Boolean(b)) => Some(ConstValue::Boolean(!b)),
        _ => None,
    }
}

/// Widened integer semantics: both operands promote to at least `Int`; the
/// result is the wider of the two operand kinds. Narrowing only happens on
/// assignment to a field of a narrower declared type (`narrow_to`).
fn apply_binary(op: BinaryOp, lhs: ConstValue, rhs: ConstValue) -> Option<ConstValue> {
    use ConstValue::*;
    match (lhs, rhs) {
        (Long(a), Long(b)) | (Long(a), Int(b)) if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem | BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor) => {
            int_op_i64(op, a, b as i64).map(Long)
        }
        (Int(a), Long(b)) if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor) => {
            int_op_i64(op, a as i64, b).map(Long)
        }
        (Int(a), Int(b)) if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem | BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor) => {
            int_op_i32(op, a, b).map(Int)
        }
        (Double(a), Double(b)) if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem) => {
            float_op(op, a, b).map(Double)
        }
        (Float(a), Float(b)) if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem) => {
            float_op(op, a as f64, b as f64).map(|v| Float(v as f32))
        }
        (Double(a), Int(b)) if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem) => {
            float_op(op, a, b as f64).map(Double)
        }
        (Int(a), Double(b)) if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem) => {
            float_op(op, a as f64, b).map(Double)
        }
        (Boolean(a), Boolean(b)) => match op {
            BinaryOp::Eq => Some(Boolean(a == b)),
            BinaryOp::Ne => Some(Boolean(a != b)),
            BinaryOp::BitAnd => Some(Boolean(a && b)),
            BinaryOp::BitOr => Some(Boolean(a || b)),
            BinaryOp::BitXor => Some(Boolean(a != b)),
            _ => None,
        },
        (Int(a), Int(b)) => cmp_i64(op, a as i64, b as i64),
        (Long(a), Long(b)) | (Long(a), Int(b)) => cmp_i64(op, a, b as i64),
        (Int(a), Long(b)) => cmp_i64(op, a as i64, b),
        (Double(a), Double(b)) | (Double(a), Int(b)) => cmp_f64(op, a, b as f64),
        (Int(a), Double(b)) => cmp_f64(op, a as f64, b),
        _ => None,
    }
}

fn int_op_i32(op: BinaryOp, a: i32, b: i32) -> Option<i32> {
    match op {
        BinaryOp::Add => Some(a.wrapping_add(b)),
        BinaryOp::Sub => Some(a.wrapping_sub(b)),
        BinaryOp::Mul => Some(a.wrapping_mul(b)),
        BinaryOp::Div => (b != 0).then(|| a.wrapping_div(b)),
        BinaryOp::Rem => (b != 0).then(|| a.wrapping_rem(b)),
        BinaryOp::Shl => Some(a.wrapping_shl(b as u32)),
        BinaryOp::Shr => Some(a.wrapping_shr(b as u32)),
        BinaryOp::UShr => Some(((a as u32).wrapping_shr(b as u32)) as i32),
        BinaryOp::BitAnd => Some(a & b),
        BinaryOp::BitOr => Some(a | b),
        BinaryOp::BitXor => Some(a ^ b),
        _ => None,
    }
}

fn int_op_i64(op: BinaryOp, a: i64, b: i64) -> Option<i64> {
    match op {
        BinaryOp::Add => Some(a.wrapping_add(b)),
        BinaryOp::Sub => Some(a.wrapping_sub(b)),
        BinaryOp::Mul => Some(a.wrapping_mul(b)),
        BinaryOp::Div => (b != 0).then(|| a.wrapping_div(b)),
        BinaryOp::Rem => (b != 0).then(|| a.wrapping_rem(b)),
        BinaryOp::Shl => Some(a.wrapping_shl(b as u32)),
        BinaryOp::Shr => Some(a.wrapping_shr(b as u32)),
        BinaryOp::UShr => Some(((a as u64).wrapping_shr(b as u32)) as i64),
        BinaryOp::BitAnd => Some(a & b),
        BinaryOp::BitOr => Some(a | b),
        BinaryOp::BitXor => Some(a ^ b),
        _ => None,
    }
}

fn float_op(op: BinaryOp, a: f64, b: f64) -> Option<f64> {
    match op {
        BinaryOp::Add => Some(a + b),
        BinaryOp::Sub => Some(a - b),
        BinaryOp::Mul => Some(a * b),
        BinaryOp::Div => Some(a / b),
        BinaryOp::Rem => Some(a % b),
        _ => None,
    }
}

fn cmp_i64(op: BinaryOp, a: i64, b: i64) -> Option<ConstValue> {
    match op {
        BinaryOp::Eq => Some(ConstValue::Boolean(a == b)),
        BinaryOp::Ne => Some(ConstValue::Boolean(a != b)),
        BinaryOp::Lt => Some(ConstValue::Boolean(a < b)),
        BinaryOp::Le => Some(ConstValue::Boolean(a <= b)),
        BinaryOp::Gt => Some(ConstValue::Boolean(a > b)),
        BinaryOp::Ge => Some(ConstValue::Boolean(a >= b)),
        _ => None,
    }
}

fn cmp_f64(op: BinaryOp, a: f64, b: f64) -> Option<ConstValue> {
    match op {
        BinaryOp::Eq => Some(ConstValue::Boolean(a == b)),
        BinaryOp::Ne => Some(ConstValue::Boolean(a != b)),
        BinaryOp::Lt => Some(ConstValue::Boolean(a < b)),
        BinaryOp::Le => Some(ConstValue::Boolean(a <= b)),
        BinaryOp::Gt => Some(ConstValue::Boolean(a > b)),
        BinaryOp::Ge => Some(ConstValue::Boolean(a >= b)),
        _ => None,
    }
}

fn display(v: &ConstValue) -> String {
    match v {
        ConstValue::Boolean(b) => b.to_string(),
        ConstValue::Int(i) => i.to_string(),
        ConstValue::Long(l) => l.to_string(),
        ConstValue::Float(f) => f.to_string(),
        ConstValue::Double(d) => d.to_string(),
        ConstValue::String(s) => s.clone(),
    }
}

/// Narrows a widened value to `declared`'s primitive kind, matching
/// standard narrowing-conversion semantics (truncating bit pattern, not
/// saturating) — see E2. `None` (non-primitive declared type) passes the
/// value through unchanged.
fn narrow_to(v: &ConstValue, declared: Option<AstPrimitiveKind>) -> ConstValue {
    let Some(kind) = declared else {
        return v.clone();
    };
    let wide = match v {
        ConstValue::Int(i) => *i as i64,
        ConstValue::Long(l) => *l,
        other => return other.clone(),
    };
    match kind {
        AstPrimitiveKind::Byte => ConstValue::Int(wide as i8 as i32),
        AstPrimitiveKind::Short => ConstValue::Int(wide as i16 as i32),
        AstPrimitiveKind::Char => ConstValue::Int(wide as u16 as i32),
        AstPrimitiveKind::Int => ConstValue::Int(wide as i32),
        AstPrimitiveKind::Long => ConstValue::Long(wide),
        AstPrimitiveKind::Boolean => ConstValue::Boolean(wide != 0),
        _ => ConstValue::Int(wide as i32),
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use symbind_ast::Modifiers;
    use symbind_common::Span;

    use super::*;
    use crate::environment::SimpleEnvironment;
    use crate::stage::{HeaderBound, PackageBound, SourceBound, TypeBoundField};

    fn test_class(interner: &mut Interner, name: &str) -> ClassSymbol {
        ClassSymbol(interner.intern(name))
    }

    fn empty_type_bound(symbol: ClassSymbol, fields: Vec<TypeBoundField>) -> TypeBound {
        TypeBound {
            header: HeaderBound {
                package_bound: PackageBound {
                    source: SourceBound {
                        symbol,
                        enclosing: None,
                        kind: symbind_ast::TypeKind::Class,
                        modifiers: Modifiers::empty(),
                        member_classes: smallvec![],
                        source_file: "Test.java".into(),
                        span: Span::dummy(),
                    },
                    package: Vec::new(),
                    single_type_imports: Default::default(),
                    on_demand_type_imports: Default::default(),
                    single_static_imports: Default::default(),
                    on_demand_static_imports: Default::default(),
                },
                superclass: None,
                superinterfaces: Vec::new(),
                type_params: Vec::new(),
                cyclic_hierarchy: false,
            },
            type_param_bounds: Vec::new(),
            fields,
            methods: Vec::new(),
            annotations: Vec::new(),
        }
    }

    fn field(owner: ClassSymbol, name_atom: symbind_common::Atom, ty: Type, initializer: Expr) -> TypeBoundField {
        TypeBoundField {
            symbol: FieldSymbol { owner, name: name_atom },
            modifiers: Modifiers::FINAL,
            ty,
            annotations: Vec::new(),
            initializer: Some(initializer),
            span: Span::dummy(),
        }
    }

    fn no_classpath() -> SimpleEnvironment<FieldSymbol, Option<ConstValue>> {
        SimpleEnvironment::empty()
    }

    #[test]
    fn narrowing_truncates_to_declared_byte_type() {
        let mut interner = Interner::new();
        let class = test_class(&mut interner, "Test");
        let name = interner.intern("B");
        let ty = Type::Primitive {
            kind: crate::stage::PrimitiveKind::Byte,
            annotations: Vec::new(),
        };
        let f = field(class, name, ty, Expr::IntLit(300, Span::dummy()));
        let symbol = f.symbol;
        let mut type_bounds = FxHashMap::default();
        type_bounds.insert(class, empty_type_bound(class, vec![f]));

        let classpath = no_classpath();
        let index = TopLevelIndex::new();
        let interner = RefCell::new(interner);
        let result = run(&type_bounds, &index, &interner, &classpath);

        assert_eq!(result.get(&symbol), Some(&Some(ConstValue::Int(44))));
    }

    #[test]
    fn self_referential_initializer_is_not_a_constant() {
        let mut interner = Interner::new();
        let class = test_class(&mut interner, "Test");
        let name = interner.intern("X");
        let ty = Type::Primitive {
            kind: crate::stage::PrimitiveKind::Int,
            annotations: Vec::new(),
        };
        let self_ref = Expr::FieldRef {
            path: smallvec!["X".to_string()],
            span: Span::dummy(),
        };
        let f = field(class, name, ty, self_ref);
        let symbol = f.symbol;
        let mut type_bounds = FxHashMap::default();
        type_bounds.insert(class, empty_type_bound(class, vec![f]));

        let classpath = no_classpath();
        let index = TopLevelIndex::new();
        let interner = RefCell::new(interner);
        let result = run(&type_bounds, &index, &interner, &classpath);

        assert_eq!(result.get(&symbol), Some(&None));
    }

    #[test]
    fn string_concatenation_joins_operand_displays() {
        let mut interner = Interner::new();
        let class = test_class(&mut interner, "Test");
        let name = interner.intern("S");
        let ty = Type::Class {
            segments: vec![crate::stage::ClassTypeSegment {
                symbol: test_class(&mut interner, "String"),
                type_args: Vec::new(),
                annotations: Vec::new(),
            }],
        };
        let concat = Expr::Binary {
            op: BinaryOp::Concat,
            lhs: Box::new(Expr::StringLit("n=".to_string(), Span::dummy())),
            rhs: Box::new(Expr::IntLit(7, Span::dummy())),
            span: Span::dummy(),
        };
        let f = field(class, name, ty, concat);
        let symbol = f.symbol;
        let mut type_bounds = FxHashMap::default();
        type_bounds.insert(class, empty_type_bound(class, vec![f]));

        let classpath = no_classpath();
        let index = TopLevelIndex::new();
        let interner = RefCell::new(interner);
        let result = run(&type_bounds, &index, &interner, &classpath);

        assert_eq!(result.get(&symbol), Some(&Some(ConstValue::String("n=7".to_string()))));
    }
}
