//! Core synchronization layer for search-keeper
//!
//! This crate implements:
//!
//! - **Configuration**: environment definitions, storage location, and the
//!   global ignore list, loaded from a YAML/JSON file
//! - **Resource model**: index templates and ISM policies, with the
//!   server-managed fields each kind carries
//! - **Codec**: conversion between resource bodies and their stored YAML form
//! - **Pattern matching**: glob-style selection with ignore precedence
//! - **SyncEngine**: list, save, publish, and delete against a
//!   [`RemoteGateway`]
//!
//! # Architecture
//!
//! ```text
//!                 keeper-cli
//!                /          \
//!        keeper-remote       |
//!                \          /
//!                keeper-core
//!                     |
//!                 keeper-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use keeper_core::{PatternMatcher, ResourceKind, SyncEngine};
//! use keeper_fs::{LocalStore, NormalizedPath};
//!
//! fn save_all(gateway: Box<dyn keeper_core::RemoteGateway>) -> keeper_core::Result<()> {
//!     let store = LocalStore::new(&NormalizedPath::new("dump"), "qa", ResourceKind::Template.dir_name());
//!     let engine = SyncEngine::new(gateway, store, PatternMatcher::default());
//!     let report = engine.save(None)?;
//!     assert!(!report.has_failures());
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod pattern;
pub mod resource;
pub mod sync;

pub use config::{ConfigLoader, Environment, KeeperConfig};
pub use error::{Error, Result};
pub use gateway::RemoteGateway;
pub use pattern::{NamePattern, PatternMatcher};
pub use resource::{RemoteDocument, ResourceBody, ResourceKind, Revision};
pub use sync::{
    Interrupt, ListEntry, ListState, SyncEngine, SyncOptions, SyncReport, SyncResult, SyncStatus,
};
