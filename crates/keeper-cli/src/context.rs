//! Command context: loaded configuration plus the pieces needed to build
//! a [`SyncEngine`] for one environment and kind.

use std::path::{Path, PathBuf};

use keeper_core::{
    ConfigLoader, Environment, Interrupt, KeeperConfig, NamePattern, RemoteGateway, ResourceKind,
    SyncEngine, SyncOptions,
};
use keeper_fs::{LocalStore, NormalizedPath};
use keeper_remote::OpenSearchGateway;

use crate::error::Result;

/// Opens a gateway for an environment and kind.
pub type Connector =
    Box<dyn Fn(&Environment, ResourceKind) -> keeper_core::Result<Box<dyn RemoteGateway>>>;

/// Connector that talks to a real cluster over HTTP.
pub fn http_connector() -> Connector {
    Box::new(|env: &Environment, kind: ResourceKind| {
        let gateway = OpenSearchGateway::connect(env, kind)?;
        Ok(Box::new(gateway) as Box<dyn RemoteGateway>)
    })
}

pub struct Context {
    config_path: PathBuf,
    config: KeeperConfig,
    workers: usize,
    interrupt: Interrupt,
    connector: Connector,
}

impl Context {
    /// Load configuration from `explicit` or the default search path.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (config_path, config) = ConfigLoader::new().load(explicit)?;
        Ok(Self::new(config_path, config, http_connector()))
    }

    pub fn new(config_path: PathBuf, config: KeeperConfig, connector: Connector) -> Self {
        let workers = config.workers.unwrap_or(1);
        Self {
            config_path,
            config,
            workers,
            interrupt: Interrupt::new(),
            connector,
        }
    }

    /// Override the configured worker count.
    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        if let Some(workers) = workers {
            self.workers = workers;
        }
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &KeeperConfig {
        &self.config
    }

    /// Connect to `environment` and build an engine for `kind`.
    pub fn engine(&self, environment: &str, kind: ResourceKind, dry_run: bool) -> Result<SyncEngine> {
        let env = self.config.environment(environment)?;
        let gateway = (self.connector)(env, kind)?;
        let store = LocalStore::new(
            &NormalizedPath::new(&self.config.storage_dir),
            &env.name,
            kind.dir_name(),
        );
        let options = SyncOptions {
            dry_run,
            workers: self.workers,
            interrupt: self.interrupt.clone(),
        };
        Ok(SyncEngine::new(gateway, store, self.config.ignore_matcher()?).with_options(options))
    }
}

/// Compile an optional user pattern.
pub fn parse_pattern(pattern: Option<&str>) -> Result<Option<NamePattern>> {
    Ok(pattern.map(NamePattern::parse).transpose()?)
}
