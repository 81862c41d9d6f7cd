//! Data session: ingested rows, the variables derived from their columns,
//! and the image blobs referenced by filename.

use crate::model::{Variable, VariableId, VariableKind};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// One record of the data source: column name to cell value.
pub type DataRow = HashMap<String, String>;

/// Errors while ingesting rows or images.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No data rows found")]
    Empty,
    #[error("Invalid row data: {0}")]
    Malformed(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Source of data rows, e.g. a spreadsheet reader.
pub trait RowSource {
    /// Read the column headers (in column order) and all rows.
    fn ingest_rows(&self) -> Result<(Vec<String>, Vec<DataRow>), IngestError>;
}

/// Rows stored as a JSON array of flat objects.
///
/// Header order follows key order of the objects. Strings are taken as is,
/// `null` becomes an empty string and other scalars are stringified.
pub struct JsonRowSource {
    json: String,
}

impl JsonRowSource {
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }

    /// Read the JSON text from a file.
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| IngestError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Ok(Self { json })
    }
}

impl RowSource for JsonRowSource {
    fn ingest_rows(&self) -> Result<(Vec<String>, Vec<DataRow>), IngestError> {
        let data: serde_json::Value =
            serde_json::from_str(&self.json).map_err(|e| IngestError::Malformed(format!("Invalid JSON: {}", e)))?;
        let records = data
            .as_array()
            .ok_or_else(|| IngestError::Malformed("expected an array of rows".to_string()))?;
        if records.is_empty() {
            return Err(IngestError::Empty);
        }

        let mut headers: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let object = record
                .as_object()
                .ok_or_else(|| IngestError::Malformed(format!("row {} is not an object", i)))?;
            let mut row = DataRow::with_capacity(object.len());
            for (key, value) in object {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
                let cell = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                row.insert(key.clone(), cell);
            }
            rows.push(row);
        }
        Ok((headers, rows))
    }
}

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            "gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// An opaque image blob. Decoding is left to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub format: ImageFormat,
    pub bytes: Arc<[u8]>,
}

impl ImageAsset {
    /// Wrap raw bytes, sniffing the format from the data or the file name.
    pub fn from_bytes(bytes: Vec<u8>, filename: &str) -> Option<Self> {
        let format = ImageFormat::from_magic_bytes(&bytes).or_else(|| {
            Path::new(filename)
                .extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
        })?;
        Some(Self {
            format,
            bytes: bytes.into(),
        })
    }
}

/// Image blobs keyed by filename.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageStore {
    images: HashMap<String, Arc<ImageAsset>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, asset: ImageAsset) {
        self.images.insert(filename.into(), Arc::new(asset));
    }

    /// Look up an image. Empty names never match.
    pub fn get(&self, filename: &str) -> Option<&Arc<ImageAsset>> {
        if filename.is_empty() {
            return None;
        }
        self.images.get(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.get(filename).is_some()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }

    /// Add every recognised image file in `dir`. Returns how many were added.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, IngestError> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| IngestError::Io(format!("Failed to read directory {}: {}", dir.display(), e)))?;
        let mut added = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let bytes = std::fs::read(&path)
                .map_err(|e| IngestError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
            match ImageAsset::from_bytes(bytes, name) {
                Some(asset) => {
                    self.insert(name, asset);
                    added += 1;
                }
                None => log::warn!("Skipping unrecognised image file {}", path.display()),
            }
        }
        Ok(added)
    }
}

/// Everything loaded from the data source for one session.
///
/// Variables are owned here; placement elements only refer to them by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSession {
    pub variables: Vec<Variable>,
    pub rows: Vec<DataRow>,
    pub images: ImageStore,
    pub background: Option<Arc<ImageAsset>>,
}

impl DataSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with one text variable per header.
    pub fn from_rows(headers: Vec<String>, rows: Vec<DataRow>) -> Self {
        let variables = headers
            .into_iter()
            .map(|name| Variable::new(name, VariableKind::Text))
            .collect();
        Self {
            variables,
            rows,
            ..Self::default()
        }
    }

    /// Ingest from a row source, replacing variables and rows.
    ///
    /// Images and background are kept. Variable ids are regenerated, so
    /// existing bindings go dangling.
    pub fn load_rows(&mut self, source: &dyn RowSource) -> Result<(), IngestError> {
        let (headers, rows) = source.ingest_rows()?;
        log::info!("Loaded {} rows with {} columns", rows.len(), headers.len());
        let fresh = Self::from_rows(headers, rows);
        self.variables = fresh.variables;
        self.rows = fresh.rows;
        self.detect_image_columns();
        Ok(())
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.iter().find(|v| v.id == id)
    }

    pub fn variable_by_name(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Add images and re-run image column detection.
    pub fn add_images(&mut self, images: ImageStore) {
        for (name, asset) in images.images {
            self.images.images.insert(name, asset);
        }
        self.detect_image_columns();
    }

    /// Mark a column as image when any of its values names a stored image.
    ///
    /// Does nothing until both rows and images are present.
    pub fn detect_image_columns(&mut self) {
        if self.rows.is_empty() || self.images.is_empty() {
            return;
        }
        for variable in &mut self.variables {
            let is_image = self
                .rows
                .iter()
                .any(|row| row.get(&variable.name).is_some_and(|v| self.images.contains(v)));
            variable.kind = if is_image { VariableKind::Image } else { VariableKind::Text };
        }
    }

    /// Flip a variable between text and image.
    pub fn toggle_kind(&mut self, id: VariableId) -> Option<VariableKind> {
        let variable = self.variables.iter_mut().find(|v| v.id == id)?;
        variable.kind = variable.kind.toggled();
        Some(variable.kind)
    }

    /// Remove a variable. Elements bound to it degrade to empty content.
    pub fn remove_variable(&mut self, id: VariableId) -> Option<Variable> {
        let pos = self.variables.iter().position(|v| v.id == id)?;
        Some(self.variables.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_asset() -> ImageAsset {
        ImageAsset::from_bytes(PNG.to_vec(), "a.png").unwrap()
    }

    #[test]
    fn test_json_rows() {
        let source = JsonRowSource::new(
            r#"[{"Name": "Ada", "Age": 36, "Photo": null}, {"Name": "Alan", "Team": "B"}]"#,
        );
        let (headers, rows) = source.ingest_rows().unwrap();
        assert_eq!(headers, vec!["Name", "Age", "Photo", "Team"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Age"], "36");
        assert_eq!(rows[0]["Photo"], "");
        assert_eq!(rows[1]["Team"], "B");
        assert!(!rows[1].contains_key("Age"));
    }

    #[test]
    fn test_json_rows_errors() {
        assert!(matches!(JsonRowSource::new("[]").ingest_rows(), Err(IngestError::Empty)));
        assert!(matches!(JsonRowSource::new("{}").ingest_rows(), Err(IngestError::Malformed(_))));
        assert!(matches!(JsonRowSource::new("[1]").ingest_rows(), Err(IngestError::Malformed(_))));
        assert!(matches!(JsonRowSource::new("nope").ingest_rows(), Err(IngestError::Malformed(_))));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_magic_bytes(&PNG), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBP"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_magic_bytes(b"ab"), None);

        let asset = ImageAsset::from_bytes(b"not really".to_vec(), "photo.JPG").unwrap();
        assert_eq!(asset.format, ImageFormat::Jpeg);
        assert!(ImageAsset::from_bytes(b"plain text".to_vec(), "notes.txt").is_none());
    }

    #[test]
    fn test_image_store_ignores_empty_name() {
        let mut store = ImageStore::new();
        store.insert("", png_asset());
        assert!(store.get("").is_none());
    }

    #[test]
    fn test_detect_image_columns() {
        let mut row = DataRow::new();
        row.insert("Name".to_string(), "Ada".to_string());
        row.insert("Photo".to_string(), "ada.png".to_string());
        let mut session = DataSession::from_rows(vec!["Name".into(), "Photo".into()], vec![row]);
        assert!(session.variables.iter().all(|v| v.kind == VariableKind::Text));

        let mut images = ImageStore::new();
        images.insert("ada.png", png_asset());
        session.add_images(images);

        assert_eq!(session.variable_by_name("Name").unwrap().kind, VariableKind::Text);
        assert_eq!(session.variable_by_name("Photo").unwrap().kind, VariableKind::Image);
    }

    #[test]
    fn test_toggle_and_remove_variable() {
        let mut session = DataSession::from_rows(vec!["Name".into()], vec![]);
        let id = session.variables[0].id;
        assert_eq!(session.toggle_kind(id), Some(VariableKind::Image));
        assert_eq!(session.toggle_kind(id), Some(VariableKind::Text));
        assert!(session.remove_variable(id).is_some());
        assert!(session.variable(id).is_none());
        assert_eq!(session.toggle_kind(id), None);
    }

    #[test]
    fn test_load_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), PNG).unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        let mut store = ImageStore::new();
        assert_eq!(store.load_dir(dir.path()).unwrap(), 1);
        assert!(store.contains("a.png"));
    }
}
