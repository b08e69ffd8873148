//! Shared test utilities for the search-keeper workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`gateway`]: [`MemoryGateway`], an in-memory cluster with call counters
//!   and failure injection
//! - [`workspace`]: [`TestWorkspace`], a temporary storage directory and
//!   config file

pub mod gateway;
pub mod workspace;

pub use gateway::MemoryGateway;
pub use workspace::TestWorkspace;

use keeper_core::ResourceBody;

/// Build a resource body from a JSON object literal.
///
/// # Panics
/// Panics if `value` is not a JSON object.
pub fn body(value: serde_json::Value) -> ResourceBody {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("resource body must be a JSON object, got {other}"),
    }
}
