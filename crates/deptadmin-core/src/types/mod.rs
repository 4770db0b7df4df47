//! Core type definitions used across the DeptAdmin workspace.

pub mod id;

pub use id::*;
