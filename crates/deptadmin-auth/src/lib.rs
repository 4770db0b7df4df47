//! # deptadmin-auth
//!
//! Authentication and authorization core for DeptAdmin.
//!
//! ## Modules
//!
//! - `password`: Argon2id credential hashing and password policy
//! - `jwt`: access/refresh and legacy session token codec
//! - `session`: token-to-principal resolution and the login flow
//! - `permission`: department-scoped `(resource, action)` evaluation
//! - `gate`: the request gate wrapping protected operations
//! - `accounts`: user and department administration

pub mod accounts;
pub mod error;
pub mod gate;
pub mod jwt;
pub mod password;
pub mod permission;
pub mod session;

pub use accounts::{AccountService, NewAccount};
pub use error::AuthError;
pub use gate::{GateOutcome, GateRequest, Guarded, RequestGate};
pub use jwt::{AccessClaims, JwtDecoder, JwtEncoder, SessionClaims, TokenClass, TokenError, TokenPair};
pub use password::{PasswordHasher, PasswordValidator};
pub use permission::PermissionEvaluator;
pub use session::{LoginResult, LoginService, SessionResolver};
