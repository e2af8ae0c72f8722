//! Classpath / bootclasspath entries.
//!
//! Each entry is a directory of `.class` files laid out by canonical binary
//! name (`pkg/seg/Outer$Inner.class`), the same layout archive tools extract
//! to. A single archive reader is opened per entry and held for the lifetime
//! of the binding so lazy class views can decode on demand, per the binder's
//! resource-lifetime contract.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::ClassFileError;
use crate::model::ClassFile;
use crate::parse::parse_class_file;

/// An opened classpath entry: an index from canonical binary name to the
/// `.class` file path supplying it, built once at entry-open time.
pub struct ClasspathEntry {
    root: PathBuf,
    index: FxHashMap<String, PathBuf>,
}

impl ClasspathEntry {
    /// Walk `root` and index every `.class` file by its path-derived binary
    /// name. The binary name inside the file (`this_class`) is trusted only
    /// at decode time; the index itself is built from paths so opening an
    /// entry never has to parse every file up front.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ClassFileError> {
        let root = root.as_ref().to_path_buf();
        let mut index = FxHashMap::default();
        for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() && entry.path().extension().map(|e| e == "class").unwrap_or(false) {
                let relative = entry
                    .path()
                    .strip_prefix(&root)
                    .map_err(|e| ClassFileError::Io(e.to_string()))?;
                let binary_name = relative
                    .with_extension("")
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                index.insert(binary_name, entry.path().to_path_buf());
            }
        }
        debug!(root = %root.display(), classes = index.len(), "indexed classpath entry");
        Ok(ClasspathEntry { root, index })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, binary_name: &str) -> bool {
        self.index.contains_key(binary_name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(|s| s.as_str())
    }

    /// Decode the named class, if present in this entry.
    pub fn read(&self, binary_name: &str) -> Option<Result<ClassFile, ClassFileError>> {
        let path = self.index.get(binary_name)?;
        Some(std::fs::read(path).map_err(|e| ClassFileError::Io(e.to_string())).and_then(|bytes| parse_class_file(&bytes)))
    }
}

/// An ordered sequence of classpath entries, searched first-to-last.
///
/// Used for both the classpath and the bootclasspath; the binder's
/// top-level index consults the bootclasspath's `ClasspathSet` before the
/// classpath's, per the fixed sources ≻ boot ≻ classpath priority.
pub struct ClasspathSet {
    entries: Vec<ClasspathEntry>,
}

impl ClasspathSet {
    pub fn open(roots: &[PathBuf]) -> Result<Self, ClassFileError> {
        let entries = roots
            .iter()
            .map(ClasspathEntry::open)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ClasspathSet { entries })
    }

    pub fn empty() -> Self {
        ClasspathSet { entries: Vec::new() }
    }

    pub fn find(&self, binary_name: &str) -> Option<Result<ClassFile, ClassFileError>> {
        for entry in &self.entries {
            if let Some(result) = entry.read(binary_name) {
                return Some(result);
            }
        }
        None
    }

    pub fn all_binary_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().flat_map(|e| e.names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn indexes_nested_class_files_by_binary_name() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("com/example");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Foo.class"), b"not a real class file").unwrap();

        let entry = ClasspathEntry::open(dir.path()).unwrap();
        assert!(entry.contains("com/example/Foo"));
        assert!(!entry.contains("com/example/Bar"));
    }

    #[test]
    fn classpath_set_is_searched_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("A.class"), b"junk").unwrap();
        fs::write(second.path().join("B.class"), b"junk").unwrap();

        let set = ClasspathSet::open(&[first.path().to_path_buf(), second.path().to_path_buf()]).unwrap();
        assert!(set.find("A").is_some());
        assert!(set.find("B").is_some());
        assert!(set.find("C").is_none());
    }
}
