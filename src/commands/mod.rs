//! Command implementations
//!
//! Thin CLI wrappers that pick the host, delegate to the operations module
//! and print the results.

pub mod provision;
pub mod version;
