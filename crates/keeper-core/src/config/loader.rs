//! Resolves the configuration file from an explicit path or the search path

use std::path::{Path, PathBuf};

use keeper_fs::{ConfigStore, NormalizedPath};

use super::KeeperConfig;
use crate::error::{Error, Result};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "SEARCH_KEEPER_CONFIG";

/// Locations searched, in order, when no path is given.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(path));
    }
    paths.push(PathBuf::from("./config.yaml"));
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".search-keeper").join("config.yaml"));
    }
    paths.push(PathBuf::from("/etc/search-keeper/config.yaml"));
    paths
}

/// Loads [`KeeperConfig`] once at startup.
pub struct ConfigLoader {
    store: ConfigStore,
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Loader using [`default_search_paths`].
    pub fn new() -> Self {
        Self::with_search_paths(default_search_paths())
    }

    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self {
            store: ConfigStore::new(),
            search_paths,
        }
    }

    /// Load from `explicit` if given, else from the first existing search path.
    ///
    /// Returns the path that was loaded alongside the validated config.
    pub fn load(&self, explicit: Option<&Path>) -> Result<(PathBuf, KeeperConfig)> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::ConfigNotFound {
                        searched: vec![path.to_path_buf()],
                    });
                }
                path.to_path_buf()
            }
            None => self
                .search_paths
                .iter()
                .find(|p| p.is_file())
                .cloned()
                .ok_or_else(|| Error::ConfigNotFound {
                    searched: self.search_paths.clone(),
                })?,
        };

        let mut config: KeeperConfig = self
            .store
            .load(&NormalizedPath::new(&path))
            .map_err(|e| Error::config(e.to_string()))?;
        config.finish()?;

        tracing::info!(path = %path.display(), "loaded configuration");
        Ok((path, config))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
