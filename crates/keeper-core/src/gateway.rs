//! Remote side of a synchronization: one cluster, one resource kind

use std::collections::BTreeSet;

use crate::error::Result;
use crate::resource::{RemoteDocument, ResourceBody, ResourceKind, Revision};

/// Operations the engine needs from the cluster for a single kind.
///
/// Implementations make exactly one attempt per call. Errors map to:
/// - [`Error::Connection`](crate::Error::Connection) for transport or
///   authentication failures
/// - [`Error::Api`](crate::Error::Api) for other non-2xx responses
/// - [`Error::NotFound`](crate::Error::NotFound) when the named resource
///   does not exist
pub trait RemoteGateway: Send + Sync {
    /// Kind of resource this gateway addresses
    fn kind(&self) -> ResourceKind;

    /// Names of all resources of this kind on the cluster
    fn list_names(&self) -> Result<BTreeSet<String>>;

    /// Fetch one resource, body as returned by the cluster
    fn get(&self, name: &str) -> Result<RemoteDocument>;

    /// Create or replace a resource.
    ///
    /// When `expected` carries a concurrency token the write only succeeds
    /// if the remote still holds that revision.
    fn put(&self, name: &str, body: &ResourceBody, expected: Option<&Revision>) -> Result<()>;

    /// Delete a resource
    fn delete(&self, name: &str) -> Result<()>;
}
