// Key-value persistence backends

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// String-keyed storage slot used to persist snapshots
///
/// Synchronous, no transactions, no TTL. `set` replaces any previous value
/// under the key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// File-per-key storage under a base directory
///
/// The slot for key `k` lives at `<base>/<k>.json`, so keys are validated to
/// be safe file names.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open or create a storage directory at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create storage directory")?;
        Ok(Self { base_path })
    }

    /// Get the base path of this storage directory
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let value = fs::read_to_string(&path).context("Failed to read storage slot")?;
        debug!(key, bytes = value.len(), "Read storage slot");
        Ok(Some(value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.slot_path(key)?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .context("Failed to open storage slot for writing")?;

        // Acquire exclusive lock before writing
        file.lock_exclusive().context("Failed to acquire file lock")?;

        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        debug!(key, bytes = value.len(), "Wrote storage slot");

        // Lock is automatically released when file is dropped
        Ok(())
    }
}

/// HashMap-backed storage, for tests and ephemeral use
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Storage key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Storage key too long: {} (max 64 chars)", key));
    }
    if !key
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '_' || c == '-')
    {
        return Err(eyre!(
            "Invalid storage key: {} (must be alphanumeric with ./_/-)",
            key
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_open_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("store");

        let storage = FileStorage::open(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(storage.base_path(), dir);
    }

    #[test]
    fn test_file_storage_get_missing_key() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::open(temp.path()).unwrap();

        assert_eq!(storage.get("tasklist.tasks").unwrap(), None);
    }

    #[test]
    fn test_file_storage_set_then_get() {
        let temp = TempDir::new().unwrap();
        let mut storage = FileStorage::open(temp.path()).unwrap();

        storage.set("tasklist.tasks", "[]").unwrap();
        assert_eq!(storage.get("tasklist.tasks").unwrap().as_deref(), Some("[]"));

        // The slot is a plain file named after the key
        assert!(temp.path().join("tasklist.tasks.json").exists());
    }

    #[test]
    fn test_file_storage_set_replaces_value() {
        let temp = TempDir::new().unwrap();
        let mut storage = FileStorage::open(temp.path()).unwrap();

        storage.set("slot", "first value, longer than the second").unwrap();
        storage.set("slot", "second").unwrap();
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_validation_key() {
        // Valid
        assert!(validate_key("tasklist.tasks").is_ok());
        assert!(validate_key("valid_key-1").is_ok());

        // Invalid
        assert!(validate_key("").is_err());
        assert!(validate_key("invalid/key").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
    }

    #[test]
    fn test_memory_storage_roundtrip() {
        let mut storage = MemoryStorage::new();

        assert_eq!(storage.get("slot").unwrap(), None);
        storage.set("slot", "value").unwrap();
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("value"));
        storage.set("slot", "replaced").unwrap();
        assert_eq!(storage.get("slot").unwrap().as_deref(), Some("replaced"));
    }
}
