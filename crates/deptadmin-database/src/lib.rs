//! # deptadmin-database
//!
//! Storage for DeptAdmin. The auth core only talks to the [`store`] traits;
//! [`repositories`] implements them on PostgreSQL and [`memory`] implements
//! them in process.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{DepartmentStore, OperationLogStore, UserStore};
