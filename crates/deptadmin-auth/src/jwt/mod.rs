//! JWT token encoding, decoding, and claims management.
//!
//! Access and refresh tokens share one claim shape and differ only by their
//! class flag. The legacy session token carries display names instead.

pub mod claims;
pub mod decoder;
pub mod encoder;
pub mod error;

pub use claims::{AccessClaims, SessionClaims, TokenClass};
pub use decoder::JwtDecoder;
pub use encoder::{JwtEncoder, TokenPair};
pub use error::TokenError;
