//! Command implementations for the `slidemerge` shell.

use slidemerge_core::storage::{FileStorage, Storage, StorageError};
use slidemerge_core::{
    DesignDocument, DesignError, EditorConfig, ElementKind, ExportError, ExportProgress, ImageAsset, ImageStore,
    IngestError, JsonRowSource, ModelError, Workspace, parse_design,
};
use slidemerge_render::DeckSink;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Shell errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("Unsupported image file: {0}")]
    UnsupportedImage(PathBuf),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Design(#[from] DesignError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type AppResult<T> = Result<T, AppError>;

/// Shell configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Design library directory. Defaults to the platform data directory.
    pub library_dir: Option<PathBuf>,
    /// Indent the exported deck JSON.
    pub pretty: bool,
}

impl AppConfig {
    /// Open the design library.
    pub fn open_library(&self) -> AppResult<FileStorage> {
        let storage = match &self.library_dir {
            Some(dir) => FileStorage::new(dir.clone())?,
            None => FileStorage::default_location()?,
        };
        log::debug!("Design library at {}", storage.base_path().display());
        Ok(storage)
    }
}

fn read_string(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_design(path: &Path) -> AppResult<DesignDocument> {
    Ok(parse_design(&read_string(path)?)?)
}

/// Inputs of a batch export.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub design: PathBuf,
    pub rows: PathBuf,
    pub images: Option<PathBuf>,
    pub background: Option<PathBuf>,
    pub out: PathBuf,
}

/// Outcome of a finished export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub slides: usize,
    pub bytes: usize,
}

/// Load everything from disk and write the deck to `request.out`.
///
/// Nothing is written if any row fails.
pub fn run_export<F>(config: &AppConfig, request: &ExportRequest, on_progress: F) -> AppResult<ExportSummary>
where
    F: FnMut(ExportProgress),
{
    let mut workspace = Workspace::new(Default::default(), EditorConfig::default());

    // Rows first so the design binds against their columns.
    workspace.load_rows(&JsonRowSource::from_path(&request.rows)?)?;
    if let Some(dir) = &request.images {
        let mut images = ImageStore::new();
        let count = images.load_dir(dir)?;
        log::info!("Loaded {} images from {}", count, dir.display());
        workspace.add_images(images);
    }
    if let Some(path) = &request.background {
        let bytes = fs::read(path).map_err(|source| AppError::Read {
            path: path.clone(),
            source,
        })?;
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let asset = ImageAsset::from_bytes(bytes, name).ok_or_else(|| AppError::UnsupportedImage(path.clone()))?;
        workspace.set_background(Some(asset));
    }
    workspace.import_design(&read_design(&request.design)?)?;

    let sink = if config.pretty { DeckSink::new().pretty() } else { DeckSink::new() };
    let bytes = workspace.begin_export(sink)?.run(on_progress)?;

    fs::write(&request.out, &bytes).map_err(|source| AppError::Write {
        path: request.out.clone(),
        source,
    })?;
    Ok(ExportSummary {
        slides: workspace.session().rows.len(),
        bytes: bytes.len(),
    })
}

/// Result of checking a design.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub elements: usize,
    /// Distinct column names the design refers to, in document order.
    pub columns: Vec<String>,
    /// Referenced columns absent from the data, when data was given.
    pub missing_columns: Vec<String>,
    /// Labels of data elements without a column; they export empty.
    pub unbound: Vec<String>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.missing_columns.is_empty() && self.unbound.is_empty()
    }
}

/// Validate a design and, with `rows`, check its columns against the data.
pub fn run_check(design: &Path, rows: Option<&Path>) -> AppResult<CheckReport> {
    let doc = read_design(design)?;
    let mut report = CheckReport {
        elements: doc.canvas_elements.len(),
        ..Default::default()
    };

    for el in &doc.canvas_elements {
        match &el.variable_name {
            Some(name) if !report.columns.contains(name) => report.columns.push(name.clone()),
            Some(_) => {}
            None if el.kind != ElementKind::Static => report.unbound.push(el.label.clone()),
            None => {}
        }
    }

    if let Some(rows) = rows {
        let mut workspace = Workspace::default();
        workspace.load_rows(&JsonRowSource::from_path(rows)?)?;
        report.missing_columns = report
            .columns
            .iter()
            .filter(|name| workspace.session().variable_by_name(name).is_none())
            .cloned()
            .collect();
    }
    Ok(report)
}

/// Names of all saved designs.
pub fn library_list(storage: &dyn Storage) -> AppResult<Vec<String>> {
    Ok(pollster::block_on(storage.list())?)
}

/// Validate a design file and store it under `name`.
pub fn library_save(storage: &dyn Storage, name: &str, file: &Path) -> AppResult<()> {
    let doc = read_design(file)?;
    pollster::block_on(storage.save(name, &doc))?;
    log::info!("Saved design {:?} ({} elements)", name, doc.canvas_elements.len());
    Ok(())
}

/// Remove a saved design. Returns false if there was none.
pub fn library_remove(storage: &dyn Storage, name: &str) -> AppResult<bool> {
    if !pollster::block_on(storage.exists(name))? {
        return Ok(false);
    }
    pollster::block_on(storage.delete(name))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidemerge_core::storage::MemoryStorage;
    use tempfile::{TempDir, tempdir};

    const DESIGN: &str = r##"{
        "version": 1,
        "dimensions": {"width": 25.4, "height": 19.05},
        "canvasElements": [
            {"variableName": null, "type": "static", "label": "Hello", "x": 1, "y": 1, "width": 6, "height": 1.2,
             "style": {"fontFamily": "Arial", "fontSize": 18, "color": "#000000", "align": "left", "bold": false, "italic": false},
             "keepAspectRatio": null},
            {"variableName": "Name", "type": "text", "label": "{Name}", "x": 1, "y": 3, "width": 8, "height": 1.2,
             "style": {"fontFamily": "Arial", "fontSize": 18, "color": "#000000", "align": "left", "bold": false, "italic": false},
             "keepAspectRatio": null},
            {"variableName": "Team", "type": "text", "label": "{Team}", "x": 1, "y": 5, "width": 8, "height": 1.2,
             "keepAspectRatio": null},
            {"variableName": null, "type": "image", "label": "{Photo}", "x": 10, "y": 1, "width": 5, "height": 5,
             "keepAspectRatio": true}
        ]
    }"##;

    fn fixture() -> (TempDir, ExportRequest) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("design.json"), DESIGN).unwrap();
        fs::write(dir.path().join("rows.json"), r#"[{"Name": "Ada"}, {"Name": "Grace"}]"#).unwrap();
        let request = ExportRequest {
            design: dir.path().join("design.json"),
            rows: dir.path().join("rows.json"),
            images: None,
            background: None,
            out: dir.path().join("deck.json"),
        };
        (dir, request)
    }

    #[test]
    fn test_export_writes_deck() {
        let (_dir, request) = fixture();
        let mut seen = Vec::new();
        let summary = run_export(&AppConfig::default(), &request, |p| seen.push(p.percent)).unwrap();
        assert_eq!(summary.slides, 2);
        assert_eq!(seen, vec![50, 100]);

        let deck: serde_json::Value = serde_json::from_str(&fs::read_to_string(&request.out).unwrap()).unwrap();
        let items = deck["slides"][1]["items"].as_array().unwrap();
        // Static, Name and the missing Team column; the unbound image is left out.
        assert_eq!(items.len(), 3);
        assert_eq!(items[1]["text"], "Grace");
        assert_eq!(items[2]["text"], "");
    }

    #[test]
    fn test_export_failure_writes_nothing() {
        let (dir, mut request) = fixture();
        fs::write(dir.path().join("design.json"), r#"{"version": 1}"#).unwrap();
        assert!(matches!(
            run_export(&AppConfig::default(), &request, |_| {}),
            Err(AppError::Design(_))
        ));
        assert!(!request.out.exists());

        request.background = Some(dir.path().join("rows.json"));
        assert!(matches!(
            run_export(&AppConfig::default(), &request, |_| {}),
            Err(AppError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn test_check_reports_columns() {
        let (_dir, request) = fixture();
        let report = run_check(&request.design, None).unwrap();
        assert_eq!(report.elements, 4);
        assert_eq!(report.columns, vec!["Name", "Team"]);
        assert_eq!(report.unbound, vec!["{Photo}"]);
        assert!(report.missing_columns.is_empty());

        let report = run_check(&request.design, Some(&request.rows)).unwrap();
        assert_eq!(report.missing_columns, vec!["Team"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_library_commands() {
        let (_dir, request) = fixture();
        let storage = MemoryStorage::new();
        library_save(&storage, "badges", &request.design).unwrap();
        assert_eq!(library_list(&storage).unwrap(), vec!["badges"]);
        assert!(library_remove(&storage, "badges").unwrap());
        assert!(!library_remove(&storage, "badges").unwrap());
        assert!(library_list(&storage).unwrap().is_empty());

        assert!(library_save(&storage, "bad", &request.rows).is_err());
    }

    #[test]
    fn test_open_library_in_custom_dir() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            library_dir: Some(dir.path().join("designs")),
            ..Default::default()
        };
        let storage = config.open_library().unwrap();
        assert!(dir.path().join("designs").is_dir());
        assert!(library_list(&storage).unwrap().is_empty());
    }
}
