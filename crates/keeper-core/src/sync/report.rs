//! Per-item outcomes of sync operations

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::resource::ResourceKind;

/// Outcome of one resource operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Target did not have the resource before
    Created,
    /// Target had a different version
    Updated,
    /// Target already matched; nothing written remotely
    Unchanged,
    /// Remote resource removed
    Deleted,
    /// Delete requested for a resource that does not exist (warning)
    Absent,
    /// Operation failed for this item
    Failed,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Deleted => "deleted",
            Self::Absent => "absent",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Result of one resource operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncResult {
    pub name: String,
    pub kind: ResourceKind,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    pub fn ok(name: impl Into<String>, kind: ResourceKind, status: SyncStatus) -> Self {
        Self {
            name: name.into(),
            kind,
            status,
            error: None,
        }
    }

    pub fn failed(name: impl Into<String>, kind: ResourceKind, error: impl ToString) -> Self {
        Self {
            name: name.into(),
            kind,
            status: SyncStatus::Failed,
            error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == SyncStatus::Failed
    }
}

/// Results of a batch, one per selected name, sorted by kind then name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SyncReport {
    results: Vec<SyncResult>,
}

impl SyncReport {
    pub fn new(mut results: Vec<SyncResult>) -> Self {
        results.sort_by(|a, b| (a.kind, &a.name).cmp(&(b.kind, &b.name)));
        Self { results }
    }

    pub fn results(&self) -> &[SyncResult] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Result for `name`, if it was part of the batch
    pub fn get(&self, name: &str) -> Option<&SyncResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn count(&self, status: SyncStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// True if any item failed; the command must then exit non-zero
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(SyncResult::is_failure)
    }

    /// Combine two reports, keeping the sort order
    pub fn merge(self, other: SyncReport) -> Self {
        let mut results = self.results;
        results.extend(other.results);
        Self::new(results)
    }
}

/// Where a listed name exists and how the two sides compare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListState {
    LocalOnly,
    RemoteOnly,
    Differs,
    Identical,
    /// Present on both sides but the comparison itself failed
    Unknown,
}

impl fmt::Display for ListState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LocalOnly => "local only",
            Self::RemoteOnly => "remote only",
            Self::Differs => "both, differs",
            Self::Identical => "both, identical",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// One row of a list operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListEntry {
    pub name: String,
    pub kind: ResourceKind,
    pub state: ListState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
