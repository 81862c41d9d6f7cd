//! SlideMerge Application
//!
//! Command-line shell around the layout engine: batch export, design
//! checks and the local design library.

mod app;

pub use app::{
    AppConfig, AppError, AppResult, CheckReport, ExportRequest, ExportSummary, library_list, library_remove,
    library_save, run_check, run_export,
};
