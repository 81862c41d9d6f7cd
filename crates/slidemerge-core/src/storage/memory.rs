//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::design::DesignDocument;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    designs: RwLock<BTreeMap<String, DesignDocument>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, name: &str, design: &DesignDocument) -> BoxFuture<'_, StorageResult<()>> {
        let name = name.to_string();
        let design = design.clone();
        Box::pin(async move {
            self.designs.write().map_err(lock_error)?.insert(name, design);
            Ok(())
        })
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<DesignDocument>> {
        let name = name.to_string();
        Box::pin(async move {
            let designs = self.designs.read().map_err(lock_error)?;
            designs.get(&name).cloned().ok_or(StorageError::NotFound(name))
        })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let name = name.to_string();
        Box::pin(async move {
            self.designs.write().map_err(lock_error)?.remove(&name);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move { Ok(self.designs.read().map_err(lock_error)?.keys().cloned().collect()) })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let name = name.to_string();
        Box::pin(async move { Ok(self.designs.read().map_err(lock_error)?.contains_key(&name)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::export_design;
    use crate::model::{PlacementModel, SlideDimensions};
    use pollster::block_on;

    fn design(width: f64) -> DesignDocument {
        export_design(&PlacementModel::new(SlideDimensions::new(width, 10.0).unwrap()), &[])
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        block_on(storage.save("cards", &design(20.0))).unwrap();
        let loaded = block_on(storage.load("cards")).unwrap();
        assert_eq!(loaded.dimensions.width, 20.0);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_save_replaces() {
        let storage = MemoryStorage::new();
        block_on(storage.save("cards", &design(20.0))).unwrap();
        block_on(storage.save("cards", &design(30.0))).unwrap();
        assert_eq!(block_on(storage.load("cards")).unwrap().dimensions.width, 30.0);
    }

    #[test]
    fn test_delete_and_list() {
        let storage = MemoryStorage::new();
        block_on(storage.save("b", &design(20.0))).unwrap();
        block_on(storage.save("a", &design(20.0))).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["a", "b"]);

        block_on(storage.delete("a")).unwrap();
        block_on(storage.delete("a")).unwrap();
        assert!(!block_on(storage.exists("a")).unwrap());
        assert!(block_on(storage.exists("b")).unwrap());
    }
}
