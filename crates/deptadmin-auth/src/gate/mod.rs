//! Composition of resolution, authorization and auditing around operations.

pub mod guard;

pub use guard::{GateOutcome, GateRequest, Guarded, RequestGate};
