//! # deptadmin-entity
//!
//! Domain entity models for DeptAdmin. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod department;
pub mod operation;
pub mod user;
