//! String interning for canonical binary names.
//!
//! Every class, field, method, and type-variable symbol carries a canonical
//! name string. Interning turns repeated name comparisons (scope walks,
//! top-level index lookups, cycle-detection sets) into `u32` equality instead
//! of `str` comparison.

use rustc_hash::FxHashMap;
use std::sync::{Arc, RwLock};

/// A cheap, `Copy` handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Atom(u32);

impl Atom {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Single-threaded string interner.
#[derive(Debug, Default)]
pub struct Interner {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Interner::default()
    }

    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let arc: Arc<str> = Arc::from(s);
        self.strings.push(arc.clone());
        self.map.insert(arc, atom);
        atom
    }

    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        &self.strings[atom.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Thread-safe interner shared between a binding invocation's passes.
///
/// The binder drives passes sequentially today, but classpath scanning and
/// source traversal are natural candidates for future parallelism; a single
/// `RwLock`-guarded interner avoids threading a mutable one through every
/// component ahead of that need.
#[derive(Debug, Default)]
pub struct SharedInterner {
    inner: RwLock<Interner>,
}

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner::default()
    }

    pub fn intern(&self, s: &str) -> Atom {
        if let Some(&atom) = self.inner.read().unwrap().map.get(s) {
            return atom;
        }
        self.inner.write().unwrap().intern(s)
    }

    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.inner.read().unwrap().strings[atom.0 as usize].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_string_twice_returns_same_atom() {
        let mut interner = Interner::new();
        let a = interner.intern("com/example/Foo");
        let b = interner.intern("com/example/Foo");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn distinct_strings_get_distinct_atoms() {
        let mut interner = Interner::new();
        let a = interner.intern("com/example/Foo");
        let b = interner.intern("com/example/Bar");
        assert_ne!(a, b);
        assert_eq!(interner.resolve(a), "com/example/Foo");
        assert_eq!(interner.resolve(b), "com/example/Bar");
    }

    #[test]
    fn shared_interner_is_consistent_across_threads() {
        let interner = Arc::new(SharedInterner::new());
        let a = interner.intern("pkg/A");
        let b = interner.intern("pkg/A");
        assert_eq!(a, b);
    }
}
