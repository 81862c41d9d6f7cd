//! The editing workspace: placement model, data session and gesture state.
//!
//! `Workspace` is the one owner of mutable layout state. Presentation code
//! reads through the accessors and writes only through the methods here.

use crate::config::EditorConfig;
use crate::design::{DesignDocument, DesignError, export_design, import_design, parse_design};
use crate::export::{BusyFlag, ExportError, ExportJob, ExportSink};
use crate::interaction::{Interaction, PointerDownOutcome, SnapGuides};
use crate::model::{
    CmRect, ElementId, ModelError, PlacementElement, PlacementModel, SlideDimensions, TextStyle, VariableId,
    VariableKind,
};
use crate::project::{PlacedItem, project_slide};
use crate::session::{DataSession, ImageAsset, ImageStore, IngestError, RowSource};
use crate::units::UnitConverter;
use kurbo::Point;
use std::sync::Arc;

/// Layout editor state.
#[derive(Debug, Default)]
pub struct Workspace {
    model: PlacementModel,
    session: DataSession,
    interaction: Interaction,
    config: EditorConfig,
    export_busy: BusyFlag,
}

impl Workspace {
    /// Create an empty workspace for the given slide.
    pub fn new(dimensions: SlideDimensions, config: EditorConfig) -> Self {
        Self {
            model: PlacementModel::new(dimensions),
            config,
            ..Self::default()
        }
    }

    pub fn model(&self) -> &PlacementModel {
        &self.model
    }

    pub fn session(&self) -> &DataSession {
        &self.session
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.interaction.selected()
    }

    pub fn select(&mut self, id: Option<ElementId>) {
        self.interaction.select(id.filter(|id| self.model.contains(*id)));
    }

    pub fn snap_guides(&self) -> SnapGuides {
        self.interaction.snap_guides()
    }

    /// Unit converter for the current slide on the editor surface.
    pub fn converter(&self) -> UnitConverter {
        self.config.converter(self.model.dimensions())
    }

    pub fn set_dimensions(&mut self, dimensions: SlideDimensions) -> Result<(), ModelError> {
        self.model.set_dimensions(dimensions)
    }

    // --- Data session ---

    /// Replace the data rows. Existing bindings go dangling until a design is
    /// re-imported or elements are re-dropped.
    pub fn load_rows(&mut self, source: &dyn RowSource) -> Result<(), IngestError> {
        self.session.load_rows(source)
    }

    pub fn add_images(&mut self, images: ImageStore) {
        self.session.add_images(images);
    }

    pub fn set_background(&mut self, background: Option<ImageAsset>) {
        self.session.background = background.map(Arc::new);
    }

    pub fn toggle_variable_kind(&mut self, id: VariableId) -> Option<VariableKind> {
        self.session.toggle_kind(id)
    }

    pub fn remove_variable(&mut self, id: VariableId) -> bool {
        self.session.remove_variable(id).is_some()
    }

    // --- Placement ---

    /// Drop point in display pixels to a non-negative slide position.
    fn drop_origin(&self, pointer: Point) -> Point {
        let p = self.converter().point_to_physical(pointer);
        Point::new(p.x.max(0.0), p.y.max(0.0))
    }

    fn place(&mut self, element: PlacementElement) -> Result<ElementId, ModelError> {
        let id = self.model.add(element)?;
        self.interaction.select(Some(id));
        Ok(id)
    }

    /// Place an element bound to `variable` at a display-space point.
    pub fn drop_variable(&mut self, variable: VariableId, pointer: Point) -> Result<ElementId, ModelError> {
        let var = self
            .session
            .variable(variable)
            .ok_or(ModelError::UnknownVariable(variable))?;
        let element = PlacementElement::for_variable(var, self.drop_origin(pointer));
        self.place(element)
    }

    /// Place a static text element at a display-space point.
    pub fn drop_static(&mut self, pointer: Point) -> Result<ElementId, ModelError> {
        let element = PlacementElement::new_static(self.drop_origin(pointer));
        self.place(element)
    }

    /// Delete an element. Clears the selection if it was selected.
    pub fn delete(&mut self, id: ElementId) -> Option<PlacementElement> {
        let removed = self.model.remove(id)?;
        if self.interaction.selected() == Some(id) {
            self.interaction.select(None);
        }
        Some(removed)
    }

    /// Delete the selected element, if any.
    pub fn delete_selected(&mut self) -> Option<PlacementElement> {
        self.delete(self.interaction.selected()?)
    }

    pub fn set_bounds(&mut self, id: ElementId, bounds: CmRect) -> Result<(), ModelError> {
        self.model.set_bounds(id, bounds)
    }

    pub fn set_style(&mut self, id: ElementId, style: TextStyle) -> Result<(), ModelError> {
        self.model.set_style(id, style)
    }

    pub fn set_label(&mut self, id: ElementId, label: impl Into<String>) -> Result<(), ModelError> {
        self.model.set_label(id, label)
    }

    pub fn set_keep_aspect_ratio(&mut self, id: ElementId, keep: bool) -> Result<(), ModelError> {
        self.model.set_keep_aspect_ratio(id, keep)
    }

    // --- Gestures ---

    pub fn pointer_down(&mut self, pointer: Point) -> PointerDownOutcome {
        self.interaction.pointer_down(&self.model, &self.config, pointer)
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Result<Option<CmRect>, ModelError> {
        self.interaction.pointer_move(&mut self.model, &self.config, pointer)
    }

    pub fn pointer_up(&mut self) -> Option<ElementId> {
        self.interaction.pointer_up()
    }

    // --- Design documents ---

    pub fn design_document(&self) -> DesignDocument {
        export_design(&self.model, &self.session.variables)
    }

    pub fn export_design_json(&self) -> Result<String, DesignError> {
        self.design_document().to_json()
    }

    /// Replace the layout with a document. Nothing changes on error.
    pub fn import_design(&mut self, doc: &DesignDocument) -> Result<(), DesignError> {
        let (dimensions, elements) = import_design(doc, &self.session.variables)?;
        self.model.replace_all(dimensions, elements)?;
        self.interaction.clear();
        Ok(())
    }

    /// Parse and apply a design document. Nothing changes on error.
    pub fn import_design_json(&mut self, json: &str) -> Result<(), DesignError> {
        let doc = parse_design(json)?;
        self.import_design(&doc)
    }

    // --- Preview and export ---

    /// Resolved content of one data row, for the preview.
    pub fn preview(&self, row: usize) -> Option<Vec<PlacedItem>> {
        let row = self.session.rows.get(row)?;
        Some(project_slide(&self.model, &self.session.variables, row, &self.session.images))
    }

    pub fn is_exporting(&self) -> bool {
        self.export_busy.is_busy()
    }

    /// Start a batch export into `sink`.
    ///
    /// Fails with [`ExportError::Busy`] while another job from this
    /// workspace is alive.
    pub fn begin_export<S: ExportSink>(&self, sink: S) -> Result<ExportJob<'_, S>, ExportError> {
        let guard = self.export_busy.try_acquire()?;
        Ok(ExportJob::new(&self.model, &self.session, sink).with_guard(guard))
    }
}
