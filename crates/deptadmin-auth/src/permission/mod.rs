//! Department-scoped permission evaluation.

pub mod evaluator;

pub use evaluator::PermissionEvaluator;
