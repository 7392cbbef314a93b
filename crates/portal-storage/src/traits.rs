//! Storage trait definitions.

use crate::StorageResult;

/// Trait for key-value storage backends holding portal credentials.
pub trait SecureStorage: Send + Sync {
    /// Store a value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value. Returns whether the key existed.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Store several values. Backends that can should apply them as one
    /// write, so a failure leaves none of them stored.
    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Delete several keys. Returns how many existed.
    fn delete_many(&self, keys: &[&str]) -> StorageResult<usize> {
        let mut removed = 0;
        for key in keys {
            if self.delete(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
