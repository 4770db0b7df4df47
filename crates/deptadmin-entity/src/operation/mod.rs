//! Operation log entities.

pub mod model;

pub use model::{CreateOperationLog, OperationLog};
