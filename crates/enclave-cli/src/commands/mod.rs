//! CLI commands

pub mod check_call;
pub mod resolve;
pub mod validate;
