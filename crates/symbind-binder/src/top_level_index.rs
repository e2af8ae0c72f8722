//! Global name index: a trie keyed by package segments, populated in a
//! fixed priority order (source ≻ boot ≻ classpath).

use rustc_hash::FxHashMap;

use crate::symbol::{ClassSymbol, Origin};

#[derive(Default)]
struct TrieNode {
    /// Short-name scope at this package level: outermost class name -> symbol.
    scope: FxHashMap<String, ClassSymbol>,
    children: FxHashMap<String, TrieNode>,
}

/// The result of a qualified-name lookup: the symbol resolved so far, and
/// any trailing segments the caller still has to resolve as inner-class
/// member lookups (which require a bound hierarchy this index doesn't have).
#[derive(Debug, Clone)]
pub struct LookupResult<'a> {
    pub symbol: ClassSymbol,
    pub remaining: &'a [String],
}

/// Global, insertion-order-sensitive name index.
///
/// **Insertion order matters.** Callers must insert all source symbols
/// first, then boot, then classpath: `insert` silently drops a duplicate
/// short name at the same package path, so whichever priority class is
/// inserted first permanently wins that slot.
pub struct TopLevelIndex {
    root: TrieNode,
    origins: FxHashMap<ClassSymbol, Origin>,
}

impl TopLevelIndex {
    pub fn new() -> Self {
        TopLevelIndex {
            root: TrieNode::default(),
            origins: FxHashMap::default(),
        }
    }

    /// `package` is the dotted package path (possibly empty); `outer_name`
    /// is the short name of the outermost class (never contains `$`).
    pub fn insert(&mut self, package: &[String], outer_name: &str, symbol: ClassSymbol, origin: Origin) {
        let mut node = &mut self.root;
        for segment in package {
            node = node.children.entry(segment.clone()).or_default();
        }
        node.scope.entry(outer_name.to_owned()).or_insert(symbol);
        self.origins.entry(symbol).or_insert(origin);
    }

    pub fn origin_of(&self, symbol: ClassSymbol) -> Option<Origin> {
        self.origins.get(&symbol).copied()
    }

    pub fn lookup_package<'p>(&self, segments: &'p [String]) -> Option<&FxHashMap<String, ClassSymbol>> {
        let mut node = &self.root;
        for segment in segments {
            node = node.children.get(segment)?;
        }
        Some(&node.scope)
    }

    /// Resolve a fully or partially qualified dotted path. Walks segments
    /// greedily as package segments until one matches a class short name in
    /// some package scope; everything after that is returned as
    /// `remaining` for the caller to resolve via the bound hierarchy.
    pub fn lookup<'a>(&self, segments: &'a [String]) -> Option<LookupResult<'a>> {
        let mut node = &self.root;
        for (i, segment) in segments.iter().enumerate() {
            if let Some(&symbol) = node.scope.get(segment) {
                return Some(LookupResult {
                    symbol,
                    remaining: &segments[i + 1..],
                });
            }
            node = node.children.get(segment)?;
        }
        None
    }
}

impl Default for TopLevelIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symbind_common::Interner;

    fn sym(interner: &mut Interner, name: &str) -> ClassSymbol {
        ClassSymbol(interner.intern(name))
    }

    #[test]
    fn first_insert_wins_on_duplicate_short_name() {
        let mut interner = Interner::new();
        let mut index = TopLevelIndex::new();
        let source_foo = sym(&mut interner, "p/Foo#source");
        let classpath_foo = sym(&mut interner, "p/Foo#classpath");
        let pkg = vec!["p".to_string()];

        index.insert(&pkg, "Foo", source_foo, Origin::Source);
        index.insert(&pkg, "Foo", classpath_foo, Origin::Classpath);

        let scope = index.lookup_package(&pkg).unwrap();
        assert_eq!(scope["Foo"], source_foo);
        assert_eq!(index.origin_of(source_foo), Some(Origin::Source));
    }

    #[test]
    fn lookup_splits_remaining_inner_segments() {
        let mut interner = Interner::new();
        let mut index = TopLevelIndex::new();
        let outer = sym(&mut interner, "p/Outer");
        index.insert(&["p".to_string()], "Outer", outer, Origin::Source);

        let path = vec!["p".to_string(), "Outer".to_string(), "Inner".to_string()];
        let result = index.lookup(&path).unwrap();
        assert_eq!(result.symbol, outer);
        assert_eq!(result.remaining, &["Inner".to_string()]);
    }

    #[test]
    fn lookup_of_unknown_path_is_none() {
        let index = TopLevelIndex::new();
        let path = vec!["nope".to_string()];
        assert!(index.lookup(&path).is_none());
    }
}
