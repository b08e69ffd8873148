//! Filesystem layer for search-keeper
//!
//! Provides normalized paths, atomic writes, format-detecting config loading,
//! and the per-environment [`LocalStore`] that holds one file per resource.

pub mod config;
pub mod error;
pub mod io;
pub mod naming;
pub mod path;
pub mod store;

pub use config::{ConfigStore, parse_yaml};
pub use error::{Error, Result};
pub use naming::{file_name_to_resource, resource_to_file_name};
pub use path::NormalizedPath;
pub use store::LocalStore;
