//! The monotone pass sequence: SourceBound -> PackageBound -> HeaderBound ->
//! TypeBound -> (ConstantEvaluator, TypeAnnotationDisambiguator,
//! Canonicalizer) -> Bound. See `crate::driver` for how they're wired.

pub mod canonicalize;
pub mod constant_eval;
pub mod hierarchy;
pub mod package_bound;
pub mod source_bound;
pub mod type_annotation;
pub mod type_pass;
