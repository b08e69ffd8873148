//! Local resource store: one YAML file per resource under a kind directory

use std::collections::BTreeSet;
use std::fs;

use crate::naming::{file_name_to_resource, resource_to_file_name};
use crate::{Error, NormalizedPath, Result, io};

/// Extension used for files written by the store.
pub const PRIMARY_EXTENSION: &str = "yaml";

/// Extensions recognised when listing and reading.
const EXTENSIONS: &[&str] = &[PRIMARY_EXTENSION, "yml"];

/// Store for resource files of one kind in one environment.
///
/// The directory is `<storage_dir>/<environment>/<kind_dir>/`. It is created
/// lazily by [`LocalStore::write`] and [`LocalStore::ensure_dir`]; an absent
/// directory lists as empty.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: NormalizedPath,
}

impl LocalStore {
    /// Create a store rooted at `storage_dir/environment/kind_dir`.
    pub fn new(storage_dir: &NormalizedPath, environment: &str, kind_dir: &str) -> Self {
        Self {
            dir: storage_dir.join(environment).join(kind_dir),
        }
    }

    /// Directory holding this store's files.
    pub fn dir(&self) -> &NormalizedPath {
        &self.dir
    }

    /// Create the store directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<()> {
        let native = self.dir.to_native();
        fs::create_dir_all(&native).map_err(|e| Error::io(native, e))
    }

    /// Names of all stored resources.
    pub fn list(&self) -> Result<BTreeSet<String>> {
        let native = self.dir.to_native();
        if !native.exists() {
            return Ok(BTreeSet::new());
        }

        let entries = fs::read_dir(&native).map_err(|e| Error::io(&native, e))?;
        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&native, e))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with('.') {
                continue;
            }
            let Some((stem, ext)) = file_name.rsplit_once('.') else {
                continue;
            };
            if !EXTENSIONS.contains(&ext) {
                continue;
            }
            match file_name_to_resource(stem) {
                Some(name) => {
                    names.insert(name);
                }
                None => {
                    tracing::warn!(file = %file_name, "skipping file with undecodable name");
                }
            }
        }
        Ok(names)
    }

    /// Read the stored bytes for `name`.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.existing_path(name).ok_or_else(|| self.not_found(name))?;
        let native = path.to_native();
        fs::read(&native).map_err(|e| Error::io(native, e))
    }

    /// Atomically write `content` as the file for `name`.
    pub fn write(&self, name: &str, content: &[u8]) -> Result<()> {
        let path = self.path_for(name, PRIMARY_EXTENSION);
        io::write_atomic(&path, content)?;

        // Keep a single file per resource.
        let legacy = self.path_for(name, "yml");
        if legacy.is_file() {
            let native = legacy.to_native();
            fs::remove_file(&native).map_err(|e| Error::io(native, e))?;
        }
        tracing::debug!(resource = name, path = %path, "stored resource file");
        Ok(())
    }

    /// Remove the file for `name`.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.existing_path(name).ok_or_else(|| self.not_found(name))?;
        let native = path.to_native();
        fs::remove_file(&native).map_err(|e| Error::io(native, e))
    }

    /// True if a file exists for `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.existing_path(name).is_some()
    }

    /// Path of the file that would hold `name` with the given extension.
    pub fn path_for(&self, name: &str, extension: &str) -> NormalizedPath {
        self.dir
            .join(&format!("{}.{}", resource_to_file_name(name), extension))
    }

    fn existing_path(&self, name: &str) -> Option<NormalizedPath> {
        EXTENSIONS
            .iter()
            .map(|ext| self.path_for(name, ext))
            .find(|path| path.is_file())
    }

    fn not_found(&self, name: &str) -> Error {
        Error::NotFound {
            dir: self.dir.to_native(),
            name: name.to_string(),
        }
    }
}
