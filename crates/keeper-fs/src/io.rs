//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Removes the temp file on drop unless the rename succeeded.
struct TempFileGuard {
    path: PathBuf,
    committed: bool,
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Write content atomically to a file.
///
/// Writes to a sibling temp file (same filesystem), holds an exclusive
/// advisory lock while writing, fsyncs, then renames over the target.
/// Readers observe either the old or the new content. On any failure the
/// temp file is removed and the target is left untouched.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_path = temp_path_for(&native_path);
    let mut guard = TempFileGuard {
        path: temp_path.clone(),
        committed: false,
    };

    {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;

        temp_file
            .lock_exclusive()
            .map_err(|_| Error::LockFailed {
                path: native_path.clone(),
            })?;

        write_and_sync(&mut temp_file, content).map_err(|e| Error::io(&temp_path, e))?;

        // Lock is released when the handle closes at the end of this scope.
        let _ = FileExt::unlock(&temp_file);
    }

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;
    guard.committed = true;

    tracing::trace!(path = %path, bytes = content.len(), "atomic write complete");
    Ok(())
}

fn write_and_sync(file: &mut File, content: &[u8]) -> std::io::Result<()> {
    file.write_all(content)?;
    file.sync_all()
}

fn temp_path_for(target: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.{}.tmp",
        target
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    );
    target.with_file_name(temp_name)
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}
