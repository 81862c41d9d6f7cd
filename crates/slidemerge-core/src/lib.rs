//! SlideMerge Core Library
//!
//! Platform-agnostic layout engine for data-driven slides: the placement
//! model, snapping, drag/resize gestures, design documents, content
//! projection and batch export.

pub mod config;
pub mod design;
pub mod export;
pub mod interaction;
pub mod model;
pub mod project;
pub mod session;
pub mod snap;
pub mod storage;
pub mod units;
pub mod workspace;

pub use config::EditorConfig;
pub use design::{DesignDocument, DesignElement, DesignError, export_design, import_design, parse_design};
pub use export::{ExportError, ExportJob, ExportProgress, ExportSink, RenderedSlide};
pub use interaction::{Corner, GestureState, Interaction, PointerDownOutcome, SnapGuides};
pub use model::{
    CmRect, ElementId, ElementKind, ModelError, PlacementElement, PlacementModel, SLIDE_PRESETS, SlideDimensions,
    TextAlign, TextStyle, Variable, VariableId, VariableKind,
};
pub use project::{PlacedItem, ResolvedContent, project, project_slide};
pub use session::{DataRow, DataSession, ImageAsset, ImageFormat, ImageStore, IngestError, JsonRowSource, RowSource};
pub use snap::{SNAP_THRESHOLD_CM, SnapPoints, SnapResult, get_snap_points, resolve_snap};
pub use units::{CM_PER_INCH, UnitConverter, cm_to_inch};
pub use workspace::Workspace;
