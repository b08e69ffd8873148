//! SyncEngine for reconciling remote resources with the local file tree
//!
//! This module provides:
//! - **list**: annotate names with where they exist and whether they differ
//! - **save**: pull remote resources into local files
//! - **publish**: push local files to the cluster, skipping unchanged ones
//! - **delete**: remove a single remote resource

mod engine;
mod interrupt;
mod pool;
mod report;

pub use engine::{SyncEngine, SyncOptions};
pub use interrupt::Interrupt;
pub use report::{ListEntry, ListState, SyncReport, SyncResult, SyncStatus};
