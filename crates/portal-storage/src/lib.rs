//! Credential storage for the mentor portal client.
//!
//! This crate provides:
//! - **`SecureStorage`**: the key-value backend trait
//! - **`FileStorage`**: JSON file at `~/.mentor-portal/storage.json` (0o600)
//! - **`MemoryStorage`**: in-process storage for tests
//! - **`TokenStore`**: the token pair and password-reset keys on top of a backend

mod file;
mod keys;
mod memory;
mod tokens;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use tokens::{TokenPair, TokenStore};
pub use traits::SecureStorage;

use portal_config_and_utils::Paths;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default file storage under the portal base directory.
pub fn create_storage(paths: &Paths) -> Box<dyn SecureStorage> {
    Box::new(FileStorage::new(paths.storage_file()))
}

/// Create a TokenStore over the default file storage.
pub fn create_token_store(paths: &Paths) -> TokenStore {
    TokenStore::new(create_storage(paths))
}
