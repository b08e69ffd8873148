//! Resource model: kinds, bodies, and remote revisions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Body of a resource: a JSON-compatible mapping with ordered keys.
pub type ResourceBody = serde_json::Map<String, serde_json::Value>;

/// Kind of synchronized resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Composable index template
    Template,
    /// Index state management policy
    IsmPolicy,
}

/// Static description of how a kind is stored, addressed, and cleaned.
#[derive(Debug)]
pub struct KindInfo {
    /// Directory name under `<storage_dir>/<environment>/`, also the CLI name
    pub dir: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// REST collection path on the cluster
    pub api_path: &'static str,
    /// Top-level body fields managed by the server
    pub server_fields: &'static [&'static str],
    /// Server-managed fields inside each entry of a nested list (`parent`, `field`)
    pub nested_server_fields: &'static [(&'static str, &'static str)],
    /// Keys a body must contain to be published
    pub required_fields: &'static [&'static str],
}

const TEMPLATE_INFO: KindInfo = KindInfo {
    dir: "templates",
    label: "Template",
    api_path: "_index_template",
    server_fields: &[],
    nested_server_fields: &[],
    required_fields: &["index_patterns"],
};

const ISM_POLICY_INFO: KindInfo = KindInfo {
    dir: "ism-policies",
    label: "ISM policy",
    api_path: "_plugins/_ism/policies",
    server_fields: &["policy_id", "last_updated_time", "schema_version"],
    nested_server_fields: &[("ism_template", "last_updated_time")],
    required_fields: &[],
};

impl ResourceKind {
    /// All kinds, in display order.
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Template, ResourceKind::IsmPolicy];

    pub fn info(&self) -> &'static KindInfo {
        match self {
            Self::Template => &TEMPLATE_INFO,
            Self::IsmPolicy => &ISM_POLICY_INFO,
        }
    }

    pub fn dir_name(&self) -> &'static str {
        self.info().dir
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "templates" | "template" => Ok(Self::Template),
            "ism-policies" | "ism-policy" | "ism" | "policies" => Ok(Self::IsmPolicy),
            _ => Err(Error::config(format!(
                "unknown resource kind '{}' (expected templates or ism-policies)",
                s
            ))),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().label)
    }
}

/// Server-side version information for a remote resource.
///
/// `seq_no` / `primary_term` form the optimistic concurrency token used for
/// conflict-safe updates; kinds without one leave them unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Revision {
    pub seq_no: Option<u64>,
    pub primary_term: Option<u64>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Revision {
    /// True when both halves of the concurrency token are known.
    pub fn has_token(&self) -> bool {
        self.seq_no.is_some() && self.primary_term.is_some()
    }
}

/// A resource body as fetched from the cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub body: ResourceBody,
    pub revision: Option<Revision>,
}

impl RemoteDocument {
    pub fn new(body: ResourceBody) -> Self {
        Self {
            body,
            revision: None,
        }
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.revision.as_ref().and_then(|r| r.last_updated)
    }
}
