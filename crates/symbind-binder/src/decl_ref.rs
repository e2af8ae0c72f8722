//! A path back to a [`TypeDecl`] node inside the original `[CompUnit]`
//! slice, so later passes can revisit source syntax without cloning the
//! tree into every stage's entity.

use smallvec::SmallVec;
use symbind_ast::{CompUnit, TypeDecl};

#[derive(Clone, Debug)]
pub struct DeclRef {
    pub unit: usize,
    /// `path[0]` indexes `unit.types`; each subsequent entry indexes the
    /// previous node's `members`.
    pub path: SmallVec<[usize; 4]>,
}

impl DeclRef {
    pub fn top_level(unit: usize, index: usize) -> Self {
        DeclRef {
            unit,
            path: SmallVec::from_slice(&[index]),
        }
    }

    pub fn nested(&self, index: usize) -> Self {
        let mut path = self.path.clone();
        path.push(index);
        DeclRef { unit: self.unit, path }
    }
}

pub fn resolve<'a>(units: &'a [CompUnit], decl_ref: &DeclRef) -> &'a TypeDecl {
    let unit = &units[decl_ref.unit];
    let mut node = &unit.types[decl_ref.path[0]];
    for &idx in &decl_ref.path[1..] {
        node = &node.members[idx];
    }
    node
}
