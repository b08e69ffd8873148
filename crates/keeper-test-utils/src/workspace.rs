//! [`TestWorkspace`]: a temporary directory holding a config file and the
//! resource storage tree.

use std::fs;
use std::path::{Path, PathBuf};

use keeper_core::ResourceKind;
use keeper_fs::{LocalStore, NormalizedPath};
use tempfile::TempDir;

/// Temporary storage root with helpers for seeding and inspecting files.
///
/// # Example
///
/// ```rust
/// use keeper_core::ResourceKind;
/// use keeper_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// ws.write_local("qa", ResourceKind::Template, "logs", "index_patterns:\n- logs-*\n");
/// ws.assert_local_exists("qa", ResourceKind::Template, "logs");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Storage directory (`<root>/dump`).
    pub fn storage_dir(&self) -> PathBuf {
        self.root().join("dump")
    }

    pub fn store(&self, environment: &str, kind: ResourceKind) -> LocalStore {
        LocalStore::new(
            &NormalizedPath::new(self.storage_dir()),
            environment,
            kind.dir_name(),
        )
    }

    /// Write `config.yaml` in the root and return its path.
    ///
    /// A `storage_dir` pointing into the workspace is appended unless the
    /// content already sets one.
    pub fn write_config(&self, content: &str) -> PathBuf {
        let mut content = content.to_string();
        if !content.contains("storage_dir:") {
            content.push_str(&format!(
                "\nstorage_dir: \"{}\"\n",
                self.storage_dir().display().to_string().replace('\\', "/")
            ));
        }
        let path = self.root().join("config.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    /// Seed a stored resource file with raw YAML.
    pub fn write_local(&self, environment: &str, kind: ResourceKind, name: &str, yaml: &str) {
        self.store(environment, kind)
            .write(name, yaml.as_bytes())
            .unwrap_or_else(|e| panic!("could not seed '{name}': {e}"));
    }

    /// Raw YAML of a stored resource.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_local(&self, environment: &str, kind: ResourceKind, name: &str) -> String {
        let bytes = self
            .store(environment, kind)
            .read(name)
            .unwrap_or_else(|e| panic!("could not read '{name}': {e}"));
        String::from_utf8(bytes).unwrap()
    }

    pub fn assert_local_exists(&self, environment: &str, kind: ResourceKind, name: &str) {
        assert!(
            self.store(environment, kind).contains(name),
            "Expected stored {kind} '{name}' in environment '{environment}'"
        );
    }

    pub fn assert_local_missing(&self, environment: &str, kind: ResourceKind, name: &str) {
        assert!(
            !self.store(environment, kind).contains(name),
            "Expected no stored {kind} '{name}' in environment '{environment}'"
        );
    }
}
