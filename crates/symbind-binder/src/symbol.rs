//! Opaque identities for classes, fields, methods, and type variables.
//!
//! Every symbol's equality is by canonical name. Interning (see
//! `symbind_common::Interner`) makes that comparison an integer compare
//! instead of a string compare once a symbol has been looked up once.

use std::fmt;

use symbind_common::Atom;

/// A class's canonical binary name, e.g. `pkg/seg/Outer$Inner$Leaf`.
///
/// Uniqueness is by string equality; the `Atom` is purely a fast handle onto
/// that string, produced by a shared interner.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassSymbol(pub Atom);

impl fmt::Debug for ClassSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassSymbol({:?})", self.0)
    }
}

/// The owner of a field, method, or type-variable symbol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Owner {
    Class(ClassSymbol),
    Method(ClassSymbol, Atom),
}

/// `(owner class, short name)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FieldSymbol {
    pub owner: ClassSymbol,
    pub name: Atom,
}

/// `(owner class, short name)`. Overload resolution is out of scope (method
/// bodies are never type-checked here), so a method symbol does not carry a
/// descriptor; callers disambiguate overloads by signature when needed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MethodSymbol {
    pub owner: ClassSymbol,
    pub name: Atom,
}

/// `(owner, short name)`. The owner is either a class (class-level type
/// parameter) or a method (method-level type parameter).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TyVarSymbol {
    pub owner: Owner,
    pub name: Atom,
}

/// Any symbol the environment can hold an entity for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Symbol {
    Class(ClassSymbol),
    Field(FieldSymbol),
    Method(MethodSymbol),
    TyVar(TyVarSymbol),
}

impl From<ClassSymbol> for Symbol {
    fn from(s: ClassSymbol) -> Self {
        Symbol::Class(s)
    }
}

impl From<FieldSymbol> for Symbol {
    fn from(s: FieldSymbol) -> Self {
        Symbol::Field(s)
    }
}

impl From<MethodSymbol> for Symbol {
    fn from(s: MethodSymbol) -> Self {
        Symbol::Method(s)
    }
}

impl From<TyVarSymbol> for Symbol {
    fn from(s: TyVarSymbol) -> Self {
        Symbol::TyVar(s)
    }
}

/// Where a class symbol's declaration lives. Fixed at top-level-index
/// insertion time and never re-assigned, per the priority invariant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Origin {
    Source,
    Boot,
    Classpath,
}
