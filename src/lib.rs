//! Enclave
//!
//! Resolves the host capabilities granted to a sandboxed workspace from a
//! tree of path-scoped rules. This crate re-exports [`enclave_core`]; see
//! there for the full API.

pub use enclave_core::*;
