//! Placement model: slide dimensions and the positioned elements on a slide.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Session-local identifier of a placement element.
pub type ElementId = Uuid;

/// Session-local identifier of a variable (data column).
pub type VariableId = Uuid;

/// Minimum element width reachable by a resize gesture, in centimetres.
pub const MIN_WIDTH_CM: f64 = 1.0;

/// Minimum element height, in centimetres.
pub const MIN_HEIGHT_CM: f64 = 0.5;

/// Placement model errors.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Element not found: {0}")]
    UnknownElement(ElementId),
    #[error("Variable not found: {0}")]
    UnknownVariable(VariableId),
    #[error("Invalid slide dimensions: {width} x {height} cm")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("Invalid element box: {0}")]
    InvalidBox(String),
}

/// Physical size of a slide in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlideDimensions {
    pub width: f64,
    pub height: f64,
}

impl SlideDimensions {
    /// Create slide dimensions, rejecting non-positive or non-finite sizes.
    pub fn new(width: f64, height: f64) -> Result<Self, ModelError> {
        let dims = Self { width, height };
        dims.validate()?;
        Ok(dims)
    }

    /// Check the invariant `width > 0 && height > 0`.
    pub fn validate(&self) -> Result<(), ModelError> {
        let ok = self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0;
        if ok {
            Ok(())
        } else {
            Err(ModelError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// The whole slide as a box.
    pub fn bounds(&self) -> CmRect {
        CmRect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for SlideDimensions {
    fn default() -> Self {
        SLIDE_PRESETS[0].dimensions
    }
}

/// A named slide size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlidePreset {
    pub label: &'static str,
    pub dimensions: SlideDimensions,
}

/// Common slide sizes.
pub const SLIDE_PRESETS: [SlidePreset; 4] = [
    SlidePreset { label: "A4 Horizontal", dimensions: SlideDimensions { width: 29.7, height: 21.0 } },
    SlidePreset { label: "A4 Vertical", dimensions: SlideDimensions { width: 21.0, height: 29.7 } },
    SlidePreset { label: "16:9", dimensions: SlideDimensions { width: 33.867, height: 19.05 } },
    SlidePreset { label: "4:3", dimensions: SlideDimensions { width: 25.4, height: 19.05 } },
];

/// An axis-aligned box in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CmRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Check if a point (in centimetres) lies inside the box.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Keep the size, move the box so it lies within the slide.
    pub fn clamp_position(&self, slide: SlideDimensions) -> Self {
        let x = self.x.min(slide.width - self.width).max(0.0);
        let y = self.y.min(slide.height - self.height).max(0.0);
        Self { x, y, ..*self }
    }

    /// Enforce minimum size, cap the size at the slide, then keep it on the slide.
    pub fn clamped_to(&self, slide: SlideDimensions, min_width: f64, min_height: f64) -> Self {
        let width = self.width.max(min_width).min(slide.width);
        let height = self.height.max(min_height).min(slide.height);
        Self { width, height, ..*self }.clamp_position(slide)
    }
}

impl From<CmRect> for Rect {
    fn from(r: CmRect) -> Self {
        Rect::new(r.x, r.y, r.right(), r.bottom())
    }
}

impl From<Rect> for CmRect {
    fn from(r: Rect) -> Self {
        let r = r.abs();
        CmRect::new(r.x0, r.y0, r.width(), r.height())
    }
}

/// Kind of data a variable holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Text,
    Image,
}

impl VariableKind {
    pub fn toggled(self) -> Self {
        match self {
            VariableKind::Text => VariableKind::Image,
            VariableKind::Image => VariableKind::Text,
        }
    }
}

/// A data column that elements can bind to.
///
/// `id` is stable only within one data-load session; `name` (the column
/// header) is the portable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    pub kind: VariableKind,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: VariableKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
        }
    }
}

/// What an element renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    /// Literal text stored in the element label.
    Static,
    /// Text taken from the bound column.
    Text,
    /// Image whose filename is taken from the bound column.
    Image,
}

impl ElementKind {
    /// Static and text elements share the text rendering path.
    pub fn is_textual(self) -> bool {
        matches!(self, ElementKind::Static | ElementKind::Text)
    }
}

impl From<VariableKind> for ElementKind {
    fn from(kind: VariableKind) -> Self {
        match kind {
            VariableKind::Text => ElementKind::Text,
            VariableKind::Image => ElementKind::Image,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Text style for static and text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_family: String,
    /// Font size in points.
    pub font_size: f64,
    /// Hex color, e.g. `#000000`.
    pub color: String,
    pub align: TextAlign,
    pub bold: bool,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 18.0,
            color: "#000000".to_string(),
            align: TextAlign::Left,
            bold: false,
            italic: false,
        }
    }
}

/// A positioned element on the slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementElement {
    pub id: ElementId,
    /// Bound variable, `None` for static content.
    pub binding: Option<VariableId>,
    pub kind: ElementKind,
    /// Literal text for static elements, editor placeholder for bound ones.
    pub label: String,
    /// Box in centimetres.
    pub bounds: CmRect,
    pub style: Option<TextStyle>,
    /// Only meaningful for image elements.
    pub keep_aspect_ratio: Option<bool>,
}

impl PlacementElement {
    /// Default size of a new static text element.
    pub const STATIC_SIZE: Size = Size::new(6.0, 1.2);
    /// Default size of a new bound text element.
    pub const TEXT_SIZE: Size = Size::new(8.0, 1.2);
    /// Default size of a new image element.
    pub const IMAGE_SIZE: Size = Size::new(5.0, 5.0);

    /// Create a static text element at `origin` with default size and style.
    pub fn new_static(origin: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            binding: None,
            kind: ElementKind::Static,
            label: "Static text".to_string(),
            bounds: CmRect::new(origin.x, origin.y, Self::STATIC_SIZE.width, Self::STATIC_SIZE.height),
            style: Some(TextStyle::default()),
            keep_aspect_ratio: None,
        }
    }

    /// Create an element bound to `variable` at `origin`.
    pub fn for_variable(variable: &Variable, origin: Point) -> Self {
        let kind = ElementKind::from(variable.kind);
        let size = match kind {
            ElementKind::Image => Self::IMAGE_SIZE,
            _ => Self::TEXT_SIZE,
        };
        Self {
            id: Uuid::new_v4(),
            binding: Some(variable.id),
            kind,
            label: format!("{{{}}}", variable.name),
            bounds: CmRect::new(origin.x, origin.y, size.width, size.height),
            style: kind.is_textual().then(TextStyle::default),
            keep_aspect_ratio: (kind == ElementKind::Image).then_some(true),
        }
    }

    /// Whether resize gestures must preserve the width/height ratio.
    pub fn keeps_aspect_ratio(&self) -> bool {
        self.kind == ElementKind::Image && self.keep_aspect_ratio == Some(true)
    }
}

/// Check a box for use in the model and clamp it onto the slide.
///
/// Non-finite values and non-positive widths are rejected. Everything else
/// is clamped: height is raised to the minimum, size is capped at the
/// slide and the position is moved inside it.
pub fn sanitize_bounds(bounds: CmRect, slide: SlideDimensions) -> Result<CmRect, ModelError> {
    if !bounds.is_finite() {
        return Err(ModelError::InvalidBox(format!("non-finite box {:?}", bounds)));
    }
    if bounds.width <= 0.0 {
        return Err(ModelError::InvalidBox(format!("width must be positive, got {}", bounds.width)));
    }
    Ok(bounds.clamped_to(slide, 0.0, MIN_HEIGHT_CM))
}

/// The set of placed elements plus the slide they live on.
///
/// Elements are kept in paint order (back to front). All writes go through
/// the methods below, and each write replaces a whole element, so readers
/// never observe a partially updated element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlacementModel {
    dimensions: SlideDimensions,
    elements: Vec<PlacementElement>,
}

impl PlacementModel {
    /// Create an empty model for the given slide.
    pub fn new(dimensions: SlideDimensions) -> Self {
        Self {
            dimensions,
            elements: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> SlideDimensions {
        self.dimensions
    }

    /// Change the slide size, re-clamping every element onto the new slide.
    pub fn set_dimensions(&mut self, dimensions: SlideDimensions) -> Result<(), ModelError> {
        dimensions.validate()?;
        self.dimensions = dimensions;
        for el in &mut self.elements {
            let bounds = el.bounds.clamped_to(dimensions, 0.0, MIN_HEIGHT_CM);
            *el = PlacementElement { bounds, ..el.clone() };
        }
        Ok(())
    }

    /// Elements in paint order.
    pub fn elements(&self) -> &[PlacementElement] {
        &self.elements
    }

    pub fn get(&self, id: ElementId) -> Option<&PlacementElement> {
        self.elements.iter().find(|el| el.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Add an element on top of the others, clamping its box onto the slide.
    pub fn add(&mut self, mut element: PlacementElement) -> Result<ElementId, ModelError> {
        element.bounds = sanitize_bounds(element.bounds, self.dimensions)?;
        let id = element.id;
        log::debug!("Adding {:?} element {}", element.kind, id);
        self.elements.push(element);
        Ok(id)
    }

    /// Replace an element with an edited copy.
    ///
    /// The closure edits a clone; the box is sanitized before the copy
    /// replaces the stored element. The id cannot be changed.
    pub fn update<F>(&mut self, id: ElementId, edit: F) -> Result<(), ModelError>
    where
        F: FnOnce(&mut PlacementElement),
    {
        let dims = self.dimensions;
        let slot = self
            .elements
            .iter_mut()
            .find(|el| el.id == id)
            .ok_or(ModelError::UnknownElement(id))?;
        let mut edited = slot.clone();
        edit(&mut edited);
        edited.id = id;
        edited.bounds = sanitize_bounds(edited.bounds, dims)?;
        *slot = edited;
        Ok(())
    }

    /// Replace an element's box.
    pub fn set_bounds(&mut self, id: ElementId, bounds: CmRect) -> Result<(), ModelError> {
        self.update(id, |el| el.bounds = bounds)
    }

    /// Replace an element's text style.
    pub fn set_style(&mut self, id: ElementId, style: TextStyle) -> Result<(), ModelError> {
        self.update(id, |el| el.style = Some(style))
    }

    /// Replace an element's label (the literal text of static elements).
    pub fn set_label(&mut self, id: ElementId, label: impl Into<String>) -> Result<(), ModelError> {
        let label = label.into();
        self.update(id, |el| el.label = label)
    }

    /// Set whether an image element keeps its aspect ratio when resized.
    pub fn set_keep_aspect_ratio(&mut self, id: ElementId, keep: bool) -> Result<(), ModelError> {
        self.update(id, |el| el.keep_aspect_ratio = Some(keep))
    }

    /// Remove an element.
    pub fn remove(&mut self, id: ElementId) -> Option<PlacementElement> {
        let pos = self.elements.iter().position(|el| el.id == id)?;
        log::debug!("Removing element {}", id);
        Some(self.elements.remove(pos))
    }

    /// Replace the whole model. Nothing is applied if any part is invalid.
    pub fn replace_all(
        &mut self,
        dimensions: SlideDimensions,
        elements: Vec<PlacementElement>,
    ) -> Result<(), ModelError> {
        dimensions.validate()?;
        let elements = elements
            .into_iter()
            .map(|mut el| {
                el.bounds = sanitize_bounds(el.bounds, dimensions)?;
                Ok(el)
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        self.dimensions = dimensions;
        self.elements = elements;
        Ok(())
    }

    /// Front-most element whose box contains `point` (centimetres).
    pub fn element_at(&self, point: Point) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|el| el.bounds.contains(point))
            .map(|el| el.id)
    }

    /// Bring an element to the front (topmost).
    pub fn bring_to_front(&mut self, id: ElementId) {
        if let Some(el) = self.remove(id) {
            self.elements.push(el);
        }
    }

    /// Send an element to the back (bottommost).
    pub fn send_to_back(&mut self, id: ElementId) {
        if let Some(el) = self.remove(id) {
            self.elements.insert(0, el);
        }
    }
}
