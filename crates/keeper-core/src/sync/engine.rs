//! SyncEngine implementation
//!
//! The engine reconciles one resource kind in one environment: the remote
//! side through a [`RemoteGateway`], the local side through a [`LocalStore`].

use std::collections::BTreeSet;

use keeper_fs::LocalStore;

use crate::codec;
use crate::error::{Error, Result};
use crate::gateway::RemoteGateway;
use crate::pattern::{NamePattern, PatternMatcher};
use crate::resource::{RemoteDocument, ResourceBody, ResourceKind};

use super::interrupt::Interrupt;
use super::pool;
use super::report::{ListEntry, ListState, SyncReport, SyncResult, SyncStatus};

/// Options for list, save, and publish
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Compute outcomes without writing locally or remotely
    pub dry_run: bool,
    /// Items processed in parallel; 1 means sequential
    pub workers: usize,
    /// Stops the batch from starting new items
    pub interrupt: Interrupt,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            workers: 1,
            interrupt: Interrupt::new(),
        }
    }
}

/// Engine for synchronizing one resource kind
pub struct SyncEngine {
    gateway: Box<dyn RemoteGateway>,
    store: LocalStore,
    matcher: PatternMatcher,
    options: SyncOptions,
}

impl SyncEngine {
    pub fn new(gateway: Box<dyn RemoteGateway>, store: LocalStore, matcher: PatternMatcher) -> Self {
        Self {
            gateway,
            store,
            matcher,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.gateway.kind()
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Selected names from both sides, annotated with presence and diff state.
    ///
    /// Only the initial listings can fail; per-name comparison errors are
    /// reported as [`ListState::Unknown`].
    pub fn list(&self, pattern: Option<&NamePattern>) -> Result<Vec<ListEntry>> {
        let remote = self.gateway.list_names()?;
        let local = self.store.list()?;
        let selected: Vec<String> = self
            .matcher
            .select(remote.union(&local).cloned(), pattern)
            .into_iter()
            .collect();

        tracing::info!(kind = %self.kind(), count = selected.len(), "listing resources");

        let entries = pool::run(
            &selected,
            self.options.workers,
            &self.options.interrupt,
            |name| self.list_entry(name, remote.contains(name), local.contains(name)),
            |name| self.entry(name, ListState::Unknown, Some(Error::Interrupted.to_string())),
        );
        Ok(entries)
    }

    /// Pull selected remote resources into local files.
    ///
    /// Fails only if the remote listing fails or the store directory cannot
    /// be created; item failures are recorded in the report.
    pub fn save(&self, pattern: Option<&NamePattern>) -> Result<SyncReport> {
        let names = self.matcher.select(self.gateway.list_names()?, pattern);
        if !self.options.dry_run && !names.is_empty() {
            self.store.ensure_dir()?;
        }
        tracing::info!(kind = %self.kind(), count = names.len(), dir = %self.store.dir(), "saving resources");
        Ok(self.run_batch(names, |name| self.save_one(name)))
    }

    /// Push selected local files to the cluster.
    ///
    /// Resources identical to their remote version are reported
    /// `Unchanged` and not written.
    pub fn publish(&self, pattern: Option<&NamePattern>) -> Result<SyncReport> {
        let names = self.matcher.select(self.store.list()?, pattern);
        tracing::info!(kind = %self.kind(), count = names.len(), "publishing resources");
        Ok(self.run_batch(names, |name| self.publish_one(name)))
    }

    /// Delete one remote resource by exact name.
    ///
    /// A resource that is already absent yields [`SyncStatus::Absent`]
    /// rather than a failure. With `purge_local` the local file is removed
    /// too.
    pub fn delete(&self, name: &str, purge_local: bool) -> SyncResult {
        let kind = self.kind();
        let mut result = match self.gateway.delete(name) {
            Ok(()) => {
                tracing::info!(%kind, resource = name, "deleted remote resource");
                SyncResult::ok(name, kind, SyncStatus::Deleted)
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!(%kind, resource = name, "resource already absent");
                SyncResult {
                    error: Some(e.to_string()),
                    ..SyncResult::ok(name, kind, SyncStatus::Absent)
                }
            }
            Err(e) => SyncResult::failed(name, kind, e),
        };

        if purge_local && !result.is_failure() {
            match self.store.delete(name) {
                Ok(()) => tracing::debug!(resource = name, "removed local file"),
                Err(e) if e.is_not_found() => {}
                Err(e) => result = SyncResult::failed(name, kind, e),
            }
        }
        result
    }

    fn run_batch<F>(&self, names: BTreeSet<String>, item: F) -> SyncReport
    where
        F: Fn(&str) -> Result<SyncStatus> + Sync,
    {
        let kind = self.kind();
        let names: Vec<String> = names.into_iter().collect();
        let results = pool::run(
            &names,
            self.options.workers,
            &self.options.interrupt,
            |name| match item(name) {
                Ok(status) => {
                    tracing::debug!(%kind, resource = name, %status, "item complete");
                    SyncResult::ok(name, kind, status)
                }
                Err(e) => {
                    tracing::error!(%kind, resource = name, error = %e, "item failed");
                    SyncResult::failed(name, kind, e)
                }
            },
            |name| SyncResult::failed(name, kind, Error::Interrupted),
        );
        SyncReport::new(results)
    }

    fn save_one(&self, name: &str) -> Result<SyncStatus> {
        let kind = self.kind();
        let remote = self.fetch_remote(name)?;

        let status = match self.store.read(name) {
            Ok(bytes) => match codec::decode(kind, &bytes) {
                Ok(local) if local == remote.body => SyncStatus::Unchanged,
                _ => SyncStatus::Updated,
            },
            Err(e) if e.is_not_found() => SyncStatus::Created,
            Err(e) => return Err(e.into()),
        };

        if !self.options.dry_run {
            let content = codec::encode(kind, &remote.body)?;
            self.store.write(name, content.as_bytes())?;
        }
        Ok(status)
    }

    fn publish_one(&self, name: &str) -> Result<SyncStatus> {
        let kind = self.kind();
        let body = self.read_local(name)?;
        codec::validate(kind, &body)?;

        let remote = match self.fetch_remote(name) {
            Ok(doc) => Some(doc),
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };

        let status = match &remote {
            Some(doc) if doc.body == body => return Ok(SyncStatus::Unchanged),
            Some(_) => SyncStatus::Updated,
            None => SyncStatus::Created,
        };

        if !self.options.dry_run {
            let expected = remote.as_ref().and_then(|doc| doc.revision.as_ref());
            self.gateway.put(name, &body, expected)?;
        }
        Ok(status)
    }

    fn list_entry(&self, name: &str, on_remote: bool, on_local: bool) -> ListEntry {
        match (on_remote, on_local) {
            (false, _) => self.entry(name, ListState::LocalOnly, None),
            (true, false) => match self.fetch_remote(name) {
                Ok(doc) => ListEntry {
                    last_updated: doc.last_updated(),
                    ..self.entry(name, ListState::RemoteOnly, None)
                },
                Err(e) => self.entry(name, ListState::RemoteOnly, Some(e.to_string())),
            },
            (true, true) => match self.compare(name) {
                Ok((doc, identical)) => {
                    let state = if identical {
                        ListState::Identical
                    } else {
                        ListState::Differs
                    };
                    ListEntry {
                        last_updated: doc.last_updated(),
                        ..self.entry(name, state, None)
                    }
                }
                Err(e) => self.entry(name, ListState::Unknown, Some(e.to_string())),
            },
        }
    }

    fn compare(&self, name: &str) -> Result<(RemoteDocument, bool)> {
        let local = self.read_local(name)?;
        let remote = self.fetch_remote(name)?;
        let identical = remote.body == local;
        Ok((remote, identical))
    }

    fn entry(&self, name: &str, state: ListState, error: Option<String>) -> ListEntry {
        ListEntry {
            name: name.to_string(),
            kind: self.kind(),
            state,
            last_updated: None,
            error,
        }
    }

    /// Remote document with server-managed fields removed.
    fn fetch_remote(&self, name: &str) -> Result<RemoteDocument> {
        let mut doc = self.gateway.get(name)?;
        codec::strip_server_fields(self.kind(), &mut doc.body);
        Ok(doc)
    }

    /// Local body with any server-managed fields removed.
    fn read_local(&self, name: &str) -> Result<ResourceBody> {
        let bytes = self.store.read(name)?;
        let mut body = codec::decode(self.kind(), &bytes)?;
        codec::strip_server_fields(self.kind(), &mut body);
        Ok(body)
    }
}
