//! Environments: the partial function from symbol to entity that every pass
//! is built on top of.
//!
//! Three variants, composed as needed per pass:
//! - [`SimpleEnvironment`] — eager, fully populated map.
//! - [`CompoundEnvironment`] — chained lookup, leftmost wins.
//! - [`LazyEnvironment`] — on-demand completion with cycle detection.
//!
//! Binding is single-threaded and cooperative (no suspension points), so
//! interior mutability here is plain `RefCell`, not a lock.

use std::cell::RefCell;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

/// The result of looking a symbol up in an environment.
#[derive(Clone)]
pub enum GetResult<E> {
    Found(E),
    Absent,
    /// Only ever observed by a completer re-entering its own in-progress
    /// completion (directly or transitively). See [`LazyEnvironment`].
    Cycle,
}

impl<E> GetResult<E> {
    pub fn found(self) -> Option<E> {
        match self {
            GetResult::Found(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, GetResult::Cycle)
    }
}

pub trait Environment<S, E> {
    fn get(&self, sym: S) -> GetResult<E>;

    /// Whether `sym`'s completion was observed to be part of a dependency
    /// cycle. Always `false` outside a [`LazyEnvironment`].
    fn is_on_cycle(&self, _sym: S) -> bool {
        false
    }
}

impl<S: Copy, E, T: Environment<S, E> + ?Sized> Environment<S, E> for &T {
    fn get(&self, sym: S) -> GetResult<E> {
        (**self).get(sym)
    }

    fn is_on_cycle(&self, sym: S) -> bool {
        (**self).is_on_cycle(sym)
    }
}

/// An eagerly and fully populated environment.
pub struct SimpleEnvironment<S, E> {
    map: FxHashMap<S, E>,
}

impl<S: Eq + Hash + Copy, E: Clone> SimpleEnvironment<S, E> {
    pub fn new(map: FxHashMap<S, E>) -> Self {
        SimpleEnvironment { map }
    }

    pub fn empty() -> Self {
        SimpleEnvironment { map: FxHashMap::default() }
    }

    pub fn insert(&mut self, sym: S, entity: E) {
        self.map.insert(sym, entity);
    }
}

impl<S: Eq + Hash + Copy, E: Clone> Environment<S, E> for SimpleEnvironment<S, E> {
    fn get(&self, sym: S) -> GetResult<E> {
        match self.map.get(&sym) {
            Some(e) => GetResult::Found(e.clone()),
            None => GetResult::Absent,
        }
    }
}

/// Chained lookup over an ordered sequence of environments. `get` returns
/// the first non-absent result; composition is associative and left-biased.
pub struct CompoundEnvironment<'a, S, E> {
    layers: Vec<&'a dyn Environment<S, E>>,
}

impl<'a, S: Copy, E> CompoundEnvironment<'a, S, E> {
    pub fn new(layers: Vec<&'a dyn Environment<S, E>>) -> Self {
        CompoundEnvironment { layers }
    }
}

impl<'a, S: Copy, E> Environment<S, E> for CompoundEnvironment<'a, S, E> {
    fn get(&self, sym: S) -> GetResult<E> {
        for layer in &self.layers {
            match layer.get(sym) {
                GetResult::Absent => continue,
                other => return other,
            }
        }
        GetResult::Absent
    }

    fn is_on_cycle(&self, sym: S) -> bool {
        self.layers.iter().any(|l| l.is_on_cycle(sym))
    }
}

type Completer<'a, S, E> = dyn Fn(S, &dyn Environment<S, E>) -> E + 'a;

/// An on-demand completion environment with in-progress cycle detection.
///
/// `get(sym)`:
/// 1. If `sym` isn't owned by this layer, delegates to `base`.
/// 2. If already completed, returns the memoized entity.
/// 3. If `sym` is already being completed (it's on the in-progress stack),
///    every symbol from its stack position to the top is marked on-cycle
///    and [`GetResult::Cycle`] is returned to the re-entrant caller.
/// 4. Otherwise pushes `sym`, runs the completer (which may recursively
///    `get` other symbols, including back into this same layer), pops,
///    memoizes, and returns the result.
///
/// A completer is total: given a [`GetResult::Cycle`] for one of its own
/// dependencies it must still produce *some* entity (typically a poisoned
/// sentinel), since cycle recovery policy (fatal vs. locally-recovered) is
/// the caller's responsibility, not this environment's.
pub struct LazyEnvironment<'a, S, E, B> {
    owned: FxHashSet<S>,
    completer: Box<Completer<'a, S, E>>,
    base: B,
    memo: RefCell<FxHashMap<S, E>>,
    stack: RefCell<Vec<S>>,
    on_cycle: RefCell<FxHashSet<S>>,
}

impl<'a, S, E, B> LazyEnvironment<'a, S, E, B>
where
    S: Eq + Hash + Copy,
    E: Clone,
    B: Environment<S, E>,
{
    pub fn new(owned: FxHashSet<S>, base: B, completer: Box<Completer<'a, S, E>>) -> Self {
        LazyEnvironment {
            owned,
            completer,
            base,
            memo: RefCell::new(FxHashMap::default()),
            stack: RefCell::new(Vec::new()),
            on_cycle: RefCell::new(FxHashSet::default()),
        }
    }

    fn owns(&self, sym: S) -> bool {
        self.owned.contains(&sym)
    }
}

impl<'a, S, E, B> Environment<S, E> for LazyEnvironment<'a, S, E, B>
where
    S: Eq + Hash + Copy,
    E: Clone,
    B: Environment<S, E>,
{
    fn get(&self, sym: S) -> GetResult<E> {
        if !self.owns(sym) {
            return self.base.get(sym);
        }
        if let Some(entity) = self.memo.borrow().get(&sym) {
            return GetResult::Found(entity.clone());
        }
        {
            let stack = self.stack.borrow();
            if let Some(pos) = stack.iter().position(|s| *s == sym) {
                let cyclic: Vec<S> = stack[pos..].to_vec();
                drop(stack);
                self.on_cycle.borrow_mut().extend(cyclic);
                return GetResult::Cycle;
            }
        }
        self.stack.borrow_mut().push(sym);
        let entity = (self.completer)(sym, self as &dyn Environment<S, E>);
        self.stack.borrow_mut().pop();
        self.memo.borrow_mut().insert(sym, entity.clone());
        GetResult::Found(entity)
    }

    fn is_on_cycle(&self, sym: S) -> bool {
        self.on_cycle.borrow().contains(&sym) || self.base.is_on_cycle(sym)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    struct Sym(u32);

    #[test]
    fn compound_environment_prefers_leftmost() {
        let mut a = SimpleEnvironment::new(FxHashMap::default());
        a.insert(Sym(1), "a");
        let mut b = SimpleEnvironment::new(FxHashMap::default());
        b.insert(Sym(1), "b");
        b.insert(Sym(2), "b2");
        let compound = CompoundEnvironment::new(vec![&a, &b]);
        assert_eq!(compound.get(Sym(1)).found(), Some("a"));
        assert_eq!(compound.get(Sym(2)).found(), Some("b2"));
        assert!(compound.get(Sym(3)).found().is_none());
    }

    #[test]
    fn lazy_environment_memoizes_completion() {
        let owned: FxHashSet<Sym> = [Sym(1)].into_iter().collect();
        let calls = RefCell::new(0);
        let env = LazyEnvironment::new(
            owned,
            SimpleEnvironment::<Sym, u32>::empty(),
            Box::new(move |_sym, _env: &dyn Environment<Sym, u32>| {
                *calls.borrow_mut() += 1;
                42
            }),
        );
        assert_eq!(env.get(Sym(1)).found(), Some(42));
        assert_eq!(env.get(Sym(1)).found(), Some(42));
    }

    #[test]
    fn self_referential_completer_observes_cycle() {
        let owned: FxHashSet<Sym> = [Sym(1)].into_iter().collect();
        let env: LazyEnvironment<Sym, u32, SimpleEnvironment<Sym, u32>> = LazyEnvironment::new(
            owned,
            SimpleEnvironment::empty(),
            Box::new(|sym, env| match env.get(sym) {
                GetResult::Cycle => 0,
                _ => unreachable!(),
            }),
        );
        assert_eq!(env.get(Sym(1)).found(), Some(0));
        assert!(env.is_on_cycle(Sym(1)));
    }

    #[test]
    fn indirect_cycle_marks_every_participant() {
        // A's completer resolves B; B's completer resolves A, closing the cycle.
        let owned: FxHashSet<Sym> = [Sym(1), Sym(2)].into_iter().collect();
        let env: LazyEnvironment<Sym, u32, SimpleEnvironment<Sym, u32>> = LazyEnvironment::new(
            owned,
            SimpleEnvironment::empty(),
            Box::new(|sym, env| {
                let other = if sym == Sym(1) { Sym(2) } else { Sym(1) };
                match env.get(other) {
                    GetResult::Found(v) => v,
                    GetResult::Cycle => 0,
                    GetResult::Absent => unreachable!(),
                }
            }),
        );
        env.get(Sym(1));
        assert!(env.is_on_cycle(Sym(1)));
        assert!(env.is_on_cycle(Sym(2)));
    }
}
