//! Token-to-principal resolution and the login flow.

pub mod login;
pub mod resolver;

pub use login::{LoginResult, LoginService};
pub use resolver::SessionResolver;
