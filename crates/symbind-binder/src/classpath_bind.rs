//! Constructs lazy classpath-class views from archive entries and registers
//! their symbols with a [`TopLevelIndex`].

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use symbind_classfile::{ClasspathSet, FieldDescriptor as CfFieldDescriptor};
use symbind_common::Interner;

use crate::stage::{ConstValue, PrimitiveKind, Type};
use crate::symbol::{ClassSymbol, FieldSymbol, Origin};
use crate::top_level_index::TopLevelIndex;

/// One decoded classpath field, already shaped like a `TypeBound` field
/// minus the parts only sources ever have (initializer syntax, user
/// annotations beyond retention-visible ones).
#[derive(Clone, Debug)]
pub struct BytecodeField {
    pub symbol: FieldSymbol,
    pub is_static: bool,
    pub is_final: bool,
    pub ty: Type,
    pub const_value: Option<ConstValue>,
}

#[derive(Clone, Debug)]
pub struct BytecodeMethod {
    pub name: String,
    pub descriptor: String,
    pub return_type: Type,
    pub param_types: Vec<Type>,
}

/// The facts decoded from one `.class` file, matching the contract in
/// the external-collaborator section: access flags, kind, supertype and
/// interface symbols, fields, methods, and retention-visible annotations.
#[derive(Clone, Debug)]
pub struct BytecodeBoundClass {
    pub symbol: ClassSymbol,
    pub is_interface: bool,
    pub is_annotation: bool,
    pub is_enum: bool,
    pub is_deprecated: bool,
    pub superclass: Option<ClassSymbol>,
    pub interfaces: Vec<ClassSymbol>,
    pub fields: Vec<BytecodeField>,
    pub methods: Vec<BytecodeMethod>,
}

fn primitive_kind_of(kind: symbind_classfile::PrimitiveKind) -> PrimitiveKind {
    match kind {
        symbind_classfile::PrimitiveKind::Boolean => PrimitiveKind::Boolean,
        symbind_classfile::PrimitiveKind::Byte => PrimitiveKind::Byte,
        symbind_classfile::PrimitiveKind::Char => PrimitiveKind::Char,
        symbind_classfile::PrimitiveKind::Short => PrimitiveKind::Short,
        symbind_classfile::PrimitiveKind::Int => PrimitiveKind::Int,
        symbind_classfile::PrimitiveKind::Long => PrimitiveKind::Long,
        symbind_classfile::PrimitiveKind::Float => PrimitiveKind::Float,
        symbind_classfile::PrimitiveKind::Double => PrimitiveKind::Double,
    }
}

/// Resolves an `Object` descriptor segment to a `ClassSymbol`, interning its
/// binary name; primitives/arrays are mapped without needing the interner.
fn descriptor_to_type_interned(desc: &CfFieldDescriptor, interner: &mut Interner) -> Type {
    match desc {
        CfFieldDescriptor::Base(kind) => Type::Primitive {
            kind: primitive_kind_of(*kind),
            annotations: Vec::new(),
        },
        CfFieldDescriptor::Object(name) => Type::Class {
            segments: vec![crate::stage::ClassTypeSegment {
                symbol: ClassSymbol(interner.intern(name)),
                type_args: Vec::new(),
                annotations: Vec::new(),
            }],
        },
        CfFieldDescriptor::Array(elem) => Type::Array {
            element: std::rc::Rc::new(descriptor_to_type_interned(elem, interner)),
            annotations: Vec::new(),
        },
    }
}

fn constant_value_of(v: &symbind_classfile::ConstantValue) -> ConstValue {
    match v {
        symbind_classfile::ConstantValue::Int(i) => ConstValue::Int(*i),
        symbind_classfile::ConstantValue::Long(l) => ConstValue::Long(*l),
        symbind_classfile::ConstantValue::Float(f) => ConstValue::Float(*f),
        symbind_classfile::ConstantValue::Double(d) => ConstValue::Double(*d),
        symbind_classfile::ConstantValue::String(s) => ConstValue::String(s.clone()),
    }
}

fn from_class_file(
    class: &symbind_classfile::ClassFile,
    symbol: ClassSymbol,
    interner: &mut Interner,
) -> BytecodeBoundClass {
    use symbind_classfile::ClassAccessFlags as CAF;

    let superclass = class
        .super_class
        .as_ref()
        .map(|name| ClassSymbol(interner.intern(name)));
    let interfaces = class
        .interfaces
        .iter()
        .map(|name| ClassSymbol(interner.intern(name)))
        .collect();

    let fields = class
        .fields
        .iter()
        .map(|f| {
            let ty = symbind_classfile::parse_field_descriptor(&f.descriptor)
                .map(|d| descriptor_to_type_interned(&d, interner))
                .unwrap_or(Type::Error);
            BytecodeField {
                symbol: FieldSymbol {
                    owner: symbol,
                    name: interner.intern(&f.name),
                },
                is_static: f.access_flags.contains(symbind_classfile::FieldAccessFlags::STATIC),
                is_final: f.access_flags.contains(symbind_classfile::FieldAccessFlags::FINAL),
                ty,
                const_value: f.attributes.constant_value.as_ref().map(constant_value_of),
            }
        })
        .collect();

    let methods = class
        .methods
        .iter()
        .filter_map(|m| {
            let desc = symbind_classfile::parse_method_descriptor(&m.descriptor)?;
            Some(BytecodeMethod {
                name: m.name.clone(),
                descriptor: m.descriptor.clone(),
                return_type: desc
                    .return_type
                    .as_ref()
                    .map(|d| descriptor_to_type_interned(d, interner))
                    .unwrap_or(Type::Void),
                param_types: desc
                    .params
                    .iter()
                    .map(|d| descriptor_to_type_interned(d, interner))
                    .collect(),
            })
        })
        .collect();

    BytecodeBoundClass {
        symbol,
        is_interface: class.access_flags.contains(CAF::INTERFACE),
        is_annotation: class.access_flags.contains(CAF::ANNOTATION),
        is_enum: class.access_flags.contains(CAF::ENUM),
        is_deprecated: class.deprecated,
        superclass,
        interfaces,
        fields,
        methods,
    }
}

/// Lazily decodes and caches classpath classes, and seeds the top-level
/// index with every binary name an archive supplies.
pub struct ClassPathBinder {
    archives: ClasspathSet,
    origin: Origin,
    cache: RefCell<FxHashMap<ClassSymbol, Option<BytecodeBoundClass>>>,
}

impl ClassPathBinder {
    pub fn new(archives: ClasspathSet, origin: Origin) -> Self {
        ClassPathBinder {
            archives,
            origin,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Registers every binary name this binder's archives supply with
    /// `index`, in this binder's fixed priority (boot before classpath, both
    /// after all sources — enforced by call order, not by this method).
    pub fn register_with_index(&self, index: &mut TopLevelIndex, interner: &mut Interner) {
        let names: Vec<String> = self.archives.all_binary_names().map(|s| s.to_owned()).collect();
        for name in names {
            let symbol = ClassSymbol(interner.intern(&name));
            let (package, outer) = split_binary_name(&name);
            index.insert(&package, &outer, symbol, self.origin);
        }
    }

    /// Decode (or return the cached decoding of) the named classpath class.
    pub fn resolve(&self, symbol: ClassSymbol, binary_name: &str, interner: &mut Interner) -> Option<BytecodeBoundClass> {
        if let Some(cached) = self.cache.borrow().get(&symbol) {
            return cached.clone();
        }
        let decoded = self.archives.find(binary_name).and_then(|r| r.ok()).map(|class_file| {
            from_class_file(&class_file, symbol, interner)
        });
        self.cache.borrow_mut().insert(symbol, decoded.clone());
        decoded
    }
}

/// Splits `pkg/seg/Outer$Inner` into (`["pkg", "seg"]`, `"Outer"`) — the
/// index keys every nested class's entry under its outermost short name.
fn split_binary_name(binary_name: &str) -> (Vec<String>, String) {
    let mut parts: Vec<&str> = binary_name.split('/').collect();
    let leaf = parts.pop().unwrap_or_default();
    let outer = leaf.split('$').next().unwrap_or(leaf).to_owned();
    (parts.into_iter().map(str::to_owned).collect(), outer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_nested_binary_name() {
        let (pkg, outer) = split_binary_name("com/example/Outer$Inner");
        assert_eq!(pkg, vec!["com".to_string(), "example".to_string()]);
        assert_eq!(outer, "Outer");
    }

    #[test]
    fn splits_top_level_binary_name_with_no_package() {
        let (pkg, outer) = split_binary_name("Lib");
        assert!(pkg.is_empty());
        assert_eq!(outer, "Lib");
    }
}
