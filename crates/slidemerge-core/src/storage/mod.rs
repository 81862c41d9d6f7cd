//! Design library persistence.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::design::DesignDocument;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Design not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A named collection of saved designs.
///
/// Implementations can keep designs in memory or on the filesystem.
pub trait Storage: Send + Sync {
    /// Save a design under `name`, replacing any previous one.
    fn save(&self, name: &str, design: &DesignDocument) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a design. Stored documents are validated like an import.
    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<DesignDocument>>;

    /// Delete a design. Deleting a missing design is not an error.
    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all design names, sorted.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a design exists.
    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>>;
}
