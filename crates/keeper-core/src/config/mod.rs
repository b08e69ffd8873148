//! Configuration model and loading
//!
//! The configuration is a single YAML (or JSON) file:
//!
//! ```yaml
//! storage_dir: ./dump
//! ignore_patterns: [".kibana*"]
//! workers: 4
//! environments:
//!   qa:
//!     host: search-qa.example.com
//!     port: 443
//!     aws_auth: { region: eu-west-1 }
//! ```

mod environment;
mod loader;

pub use environment::{AwsAuth, BasicAuth, Environment, ProxyConfig};
pub use loader::{CONFIG_ENV_VAR, ConfigLoader, default_search_paths};

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::pattern::PatternMatcher;

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./dump")
}

/// Top-level configuration, immutable once loaded.
#[derive(Debug, Deserialize)]
pub struct KeeperConfig {
    /// Named connection profiles
    #[serde(default)]
    pub environments: BTreeMap<String, Environment>,

    /// Root of the local file tree
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Globs excluding resource names from every operation
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Parallel item workers for save and publish
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            environments: BTreeMap::new(),
            storage_dir: default_storage_dir(),
            ignore_patterns: Vec::new(),
            workers: None,
        }
    }
}

impl KeeperConfig {
    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Self = keeper_fs::parse_yaml(content)
            .map_err(|e| Error::config(format!("invalid YAML: {}", e)))?;
        config.finish()?;
        Ok(config)
    }

    /// Fill in environment names and validate every section.
    pub(crate) fn finish(&mut self) -> Result<()> {
        for (name, env) in self.environments.iter_mut() {
            env.name = name.clone();
            env.validate()?;
        }
        PatternMatcher::new(&self.ignore_patterns)
            .map_err(|e| Error::config(format!("ignore_patterns: {}", e)))?;
        if self.workers == Some(0) {
            return Err(Error::config("workers must be at least 1"));
        }
        Ok(())
    }

    /// Look up an environment by name.
    pub fn environment(&self, name: &str) -> Result<&Environment> {
        self.environments
            .get(name)
            .ok_or_else(|| Error::UnknownEnvironment {
                name: name.to_string(),
                available: self.environment_names(),
            })
    }

    /// Environment names in sorted order.
    pub fn environment_names(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    /// Matcher for the global ignore list.
    pub fn ignore_matcher(&self) -> Result<PatternMatcher> {
        PatternMatcher::new(&self.ignore_patterns)
    }
}
