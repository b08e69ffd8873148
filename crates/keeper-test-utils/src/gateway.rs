//! [`MemoryGateway`]: an in-memory [`RemoteGateway`] for engine tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{TimeZone, Utc};
use keeper_core::{
    Error, Interrupt, RemoteDocument, RemoteGateway, ResourceBody, ResourceKind, Result, Revision,
};

#[derive(Default)]
struct State {
    docs: BTreeMap<String, (ResourceBody, Revision)>,
    next_seq_no: u64,
    gets: Vec<String>,
    puts: Vec<String>,
    deletes: Vec<String>,
    failing: BTreeSet<String>,
    edited_after_get: BTreeSet<String>,
    listing_fails: bool,
    listing_rejected: Option<u16>,
    interrupt_after: Option<(usize, Interrupt)>,
}

/// Cluster stand-in holding one kind of resource.
///
/// Clones share state, so a test can hand one clone to the engine and
/// inspect another afterwards.
///
/// # Example
///
/// ```rust
/// use keeper_core::{RemoteGateway, ResourceKind};
/// use keeper_test_utils::{MemoryGateway, body};
/// use serde_json::json;
///
/// let gateway = MemoryGateway::new(ResourceKind::Template)
///     .with_resource("logs", body(json!({"index_patterns": ["logs-*"]})));
/// assert!(gateway.get("logs").is_ok());
/// assert_eq!(gateway.put_count(), 0);
/// ```
#[derive(Clone)]
pub struct MemoryGateway {
    kind: ResourceKind,
    state: Arc<Mutex<State>>,
}

impl MemoryGateway {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Seed a resource as if it had been created on the cluster.
    pub fn with_resource(self, name: &str, body: ResourceBody) -> Self {
        {
            let mut state = self.lock();
            let revision = state.next_revision();
            state.docs.insert(name.to_string(), (body, revision));
        }
        self
    }

    /// Make every get, put, and delete of `name` fail with a connection error.
    pub fn failing_on(self, name: &str) -> Self {
        self.lock().failing.insert(name.to_string());
        self
    }

    /// Bump the revision of `name` right after each get, as if another
    /// client had updated it in between.
    pub fn edited_after_get(self, name: &str) -> Self {
        self.lock().edited_after_get.insert(name.to_string());
        self
    }

    /// Make `list_names` fail with a connection error.
    pub fn failing_listing(self) -> Self {
        self.lock().listing_fails = true;
        self
    }

    /// Make `list_names` fail with an API error carrying `status`.
    pub fn rejecting_listing(self, status: u16) -> Self {
        self.lock().listing_rejected = Some(status);
        self
    }

    /// Trigger `interrupt` once `gets` fetches have been served.
    pub fn interrupting_after(self, gets: usize, interrupt: Interrupt) -> Self {
        self.lock().interrupt_after = Some((gets, interrupt));
        self
    }

    /// Current body of `name` without server-managed fields.
    pub fn body_of(&self, name: &str) -> Option<ResourceBody> {
        self.lock().docs.get(name).map(|(body, _)| body.clone())
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.lock().docs.keys().cloned().collect()
    }

    pub fn gets(&self) -> Vec<String> {
        self.lock().gets.clone()
    }

    pub fn puts(&self) -> Vec<String> {
        self.lock().puts.clone()
    }

    pub fn put_count(&self) -> usize {
        self.lock().puts.len()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.lock().deletes.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn unreachable(name: &str) -> Error {
        Error::Connection {
            target: "memory".to_string(),
            message: format!("injected failure for '{name}'"),
        }
    }

    fn not_found(&self, name: &str) -> Error {
        Error::NotFound {
            kind: self.kind,
            name: name.to_string(),
        }
    }

    /// Body as the cluster would return it, server fields included.
    fn served_body(&self, name: &str, body: &ResourceBody, revision: &Revision) -> ResourceBody {
        let mut served = body.clone();
        if self.kind == ResourceKind::IsmPolicy {
            let millis = revision.last_updated.map(|t| t.timestamp_millis()).unwrap_or(0);
            served.insert("policy_id".into(), name.into());
            served.insert("last_updated_time".into(), millis.into());
            served.insert("schema_version".into(), 21.into());
        }
        served
    }
}

impl State {
    fn next_revision(&mut self) -> Revision {
        self.next_seq_no += 1;
        let seconds = 1_700_000_000 + self.next_seq_no as i64;
        Revision {
            seq_no: Some(self.next_seq_no),
            primary_term: Some(1),
            last_updated: Utc.timestamp_opt(seconds, 0).single(),
        }
    }
}

impl RemoteGateway for MemoryGateway {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn list_names(&self) -> Result<BTreeSet<String>> {
        let state = self.lock();
        if state.listing_fails {
            return Err(Self::unreachable("<listing>"));
        }
        if let Some(status) = state.listing_rejected {
            return Err(Error::Api {
                status,
                reason: "listing rejected".to_string(),
            });
        }
        Ok(state.docs.keys().cloned().collect())
    }

    fn get(&self, name: &str) -> Result<RemoteDocument> {
        let mut state = self.lock();
        state.gets.push(name.to_string());
        if let Some((after, interrupt)) = &state.interrupt_after {
            if state.gets.len() >= *after {
                interrupt.trigger();
            }
        }
        if state.failing.contains(name) {
            return Err(Self::unreachable(name));
        }
        let (body, revision) = state.docs.get(name).ok_or_else(|| self.not_found(name))?;
        let served = RemoteDocument {
            body: self.served_body(name, body, revision),
            revision: Some(revision.clone()),
        };
        if state.edited_after_get.contains(name) {
            let bumped = state.next_revision();
            if let Some((_, revision)) = state.docs.get_mut(name) {
                *revision = bumped;
            }
        }
        Ok(served)
    }

    fn put(&self, name: &str, body: &ResourceBody, expected: Option<&Revision>) -> Result<()> {
        let mut state = self.lock();
        if state.failing.contains(name) {
            return Err(Self::unreachable(name));
        }
        if let (Some(expected), Some((_, current))) = (expected, state.docs.get(name)) {
            if expected.has_token()
                && (expected.seq_no, expected.primary_term) != (current.seq_no, current.primary_term)
            {
                return Err(Error::Api {
                    status: 409,
                    reason: format!("version conflict for '{name}'"),
                });
            }
        }
        state.puts.push(name.to_string());
        let revision = state.next_revision();
        state.docs.insert(name.to_string(), (body.clone(), revision));
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        if state.failing.contains(name) {
            return Err(Self::unreachable(name));
        }
        state.deletes.push(name.to_string());
        match state.docs.remove(name) {
            Some(_) => Ok(()),
            None => Err(self.not_found(name)),
        }
    }
}
