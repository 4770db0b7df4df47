//! Department domain entities.

pub mod model;
pub mod permission;

pub use model::{CreateDepartment, Department};
pub use permission::PermissionSet;
