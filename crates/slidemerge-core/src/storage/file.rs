//! File-based storage implementation for native platforms.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::design::{DesignDocument, DesignError, parse_design};
use std::fs;
use std::path::{Path, PathBuf};

/// Stores designs as JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a file storage in `base_path`, creating the directory if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("Failed to create storage directory: {}", e)))?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Linux: `~/.local/share/slidemerge/designs/`
    /// On Windows: `%LOCALAPPDATA%\slidemerge\designs\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("slidemerge").join("designs"))
    }

    /// File path for a design name. Unsafe characters become `_`.
    fn design_path(&self, name: &str) -> PathBuf {
        let safe: String = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl Storage for FileStorage {
    fn save(&self, name: &str, design: &DesignDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.design_path(name);
        let json = design.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json).map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))
        })
    }

    fn load(&self, name: &str) -> BoxFuture<'_, StorageResult<DesignDocument>> {
        let path = self.design_path(name);
        let name = name.to_string();
        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(name));
            }
            let json = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
            parse_design(&json).map_err(|e: DesignError| {
                StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, name: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.design_path(name);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path)
                    .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base).map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut names: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|e| e == "json"))
                .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                .collect();
            names.sort();
            Ok(names)
        })
    }

    fn exists(&self, name: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.design_path(name);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::export_design;
    use crate::model::{PlacementElement, PlacementModel, SlideDimensions};
    use kurbo::Point;
    use pollster::block_on;
    use tempfile::tempdir;

    fn design() -> DesignDocument {
        let mut model = PlacementModel::new(SlideDimensions::new(25.4, 19.05).unwrap());
        model.add(PlacementElement::new_static(Point::new(1.0, 2.0))).unwrap();
        export_design(&model, &[])
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("badges", &design())).unwrap();
        let loaded = block_on(storage.load("badges")).unwrap();
        assert_eq!(loaded, design());
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        block_on(storage.save("doc2", &design())).unwrap();
        block_on(storage.save("doc1", &design())).unwrap();
        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc1", "doc2"]);

        block_on(storage.delete("doc1")).unwrap();
        assert!(!block_on(storage.exists("doc1")).unwrap());
        assert_eq!(block_on(storage.list()).unwrap(), vec!["doc2"]);
    }

    #[test]
    fn test_file_storage_sanitizes_name() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.save("team/cards:v2", &design())).unwrap();
        assert!(dir.path().join("team_cards_v2.json").exists());
        assert!(block_on(storage.load("team/cards:v2")).is_ok());
    }

    #[test]
    fn test_file_storage_rejects_invalid_document() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        std::fs::write(dir.path().join("broken.json"), r#"{"version": 1}"#).unwrap();
        let result = block_on(storage.load("broken"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
