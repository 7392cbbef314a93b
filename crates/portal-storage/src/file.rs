//! JSON file storage backend.
//!
//! Persists a flat string map to `~/.mentor-portal/storage.json` with owner-only
//! permissions (0o600) so the token pair survives restarts.

use crate::{SecureStorage, StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

type Entries = BTreeMap<String, String>;

/// File-backed storage. Every operation reads and rewrites the whole map,
/// serialized through an in-process lock.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create storage backed by the given file. The file is created lazily
    /// on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StorageResult<Entries> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        if data.trim().is_empty() {
            return Ok(Entries::new());
        }

        match serde_json::from_str::<Entries>(&data) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // An unreadable file holds no usable credentials; the next
                // write replaces it.
                warn!(path = %self.path.display(), error = %e, "Ignoring malformed storage file");
                Ok(Entries::new())
            }
        }
    }

    /// Replace the file atomically: write a private sibling temp file, sync
    /// it, then rename it over the target.
    fn write_entries(&self, entries: &Entries) -> StorageResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;

        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("storage.json");
        let tmp_path = dir.join(format!(
            ".{}.tmp.{}.{}",
            file_name,
            std::process::id(),
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));

        let write_result = (|| -> io::Result<()> {
            let mut options = OpenOptions::new();
            options.write(true).create_new(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }

            let mut file = options.open(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;

            std::fs::rename(&tmp_path, &self.path)?;

            if let Ok(parent_dir) = File::open(dir) {
                let _ = parent_dir.sync_all();
            }
            Ok(())
        })();

        if let Err(e) = write_result {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(StorageError::Io(e));
        }

        Ok(())
    }
}

impl SecureStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)?;
        debug!(key, "Stored value");
        Ok(())
    }

    fn set_many(&self, values: &[(&str, &str)]) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        for (key, value) in values {
            entries.insert(key.to_string(), value.to_string());
        }
        self.write_entries(&entries)?;
        debug!(keys = values.len(), "Stored values");
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.write_entries(&entries)?;
        debug!(key, "Deleted value");
        Ok(true)
    }

    fn delete_many(&self, keys: &[&str]) -> StorageResult<usize> {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries()?;
        let removed = keys
            .iter()
            .filter(|key| entries.remove(**key).is_some())
            .count();
        if removed > 0 {
            self.write_entries(&entries)?;
        }
        Ok(removed)
    }
}
