//! Element manipulation: drag and corner-resize gestures.
//!
//! Pointer positions are display pixels relative to the canvas origin.
//! Every move recomputes the box from the gesture-start box, so the result
//! only depends on the start state and the current pointer. The box is
//! clamped to the slide, optionally snapped, and committed to the model
//! before the call returns.

use crate::config::EditorConfig;
use crate::model::{CmRect, ElementId, ModelError, PlacementModel, SlideDimensions};
use crate::snap::{SnapPoints, get_snap_points, resolve_snap};
use kurbo::{Point, Vec2};

/// Slack for floating-point bound checks (centimetres).
const EPSILON: f64 = 1e-9;

/// Resize handle positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Corner::NorthWest, Corner::NorthEast, Corner::SouthWest, Corner::SouthEast];

    /// Whether this corner drives the left edge (otherwise the right one).
    pub fn moves_west(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::SouthWest)
    }

    /// Whether this corner drives the top edge (otherwise the bottom one).
    pub fn moves_north(self) -> bool {
        matches!(self, Corner::NorthWest | Corner::NorthEast)
    }

    /// Position of this corner on a box.
    pub fn position(self, bounds: CmRect) -> Point {
        let x = if self.moves_west() { bounds.x } else { bounds.right() };
        let y = if self.moves_north() { bounds.y } else { bounds.bottom() };
        Point::new(x, y)
    }
}

/// Guide lines to draw while a gesture is snapped (centimetres).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnapGuides {
    /// Vertical guide at this x.
    pub x: Option<f64>,
    /// Horizontal guide at this y.
    pub y: Option<f64>,
}

impl SnapGuides {
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }
}

/// State of the active gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        element: ElementId,
        origin_pointer: Point,
        origin_bounds: CmRect,
    },
    Resizing {
        element: ElementId,
        corner: Corner,
        origin_pointer: Point,
        origin_bounds: CmRect,
    },
}

impl GestureState {
    /// The element under manipulation, if any.
    pub fn element(&self) -> Option<ElementId> {
        match *self {
            GestureState::Idle => None,
            GestureState::Dragging { element, .. } | GestureState::Resizing { element, .. } => Some(element),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDownOutcome {
    /// A resize handle of the selected element.
    Resize(ElementId, Corner),
    /// The body of an element.
    Drag(ElementId),
    /// Empty canvas.
    Miss,
}

/// Find which corner handle (if any) is hit at `point`.
/// `point` and `tolerance` are in centimetres.
pub fn hit_test_handles(bounds: CmRect, point: Point, tolerance: f64) -> Option<Corner> {
    Corner::ALL.into_iter().find(|corner| {
        let handle = corner.position(bounds);
        let dx = point.x - handle.x;
        let dy = point.y - handle.y;
        dx * dx + dy * dy <= tolerance * tolerance
    })
}

/// Translate a box by `delta` and keep it on the slide. Size is unchanged.
pub fn apply_drag(origin: CmRect, delta: Vec2, slide: SlideDimensions) -> CmRect {
    CmRect {
        x: origin.x + delta.x,
        y: origin.y + delta.y,
        ..origin
    }
    .clamp_position(slide)
}

/// Box from the fixed (opposite) corner and a size.
fn rect_from_fixed(corner: Corner, fixed: Point, width: f64, height: f64) -> CmRect {
    let x = if corner.moves_west() { fixed.x - width } else { fixed.x };
    let y = if corner.moves_north() { fixed.y - height } else { fixed.y };
    CmRect::new(x, y, width, height)
}

/// The corner that stays put while `corner` is dragged.
fn fixed_corner(corner: Corner, bounds: CmRect) -> Point {
    let x = if corner.moves_west() { bounds.right() } else { bounds.x };
    let y = if corner.moves_north() { bounds.bottom() } else { bounds.y };
    Point::new(x, y)
}

/// Resize a box by dragging one corner by `delta`.
///
/// The opposite corner stays fixed. Minimum sizes come from `config`. With
/// `keep_aspect_ratio` the height follows the width using the ratio of
/// `origin`. The result never leaves the slide.
pub fn apply_resize(
    origin: CmRect,
    corner: Corner,
    delta: Vec2,
    keep_aspect_ratio: bool,
    slide: SlideDimensions,
    config: &EditorConfig,
) -> CmRect {
    let fixed = fixed_corner(corner, origin);
    let max_width = if corner.moves_west() { fixed.x } else { slide.width - fixed.x };
    let max_height = if corner.moves_north() { fixed.y } else { slide.height - fixed.y };

    let dx = if corner.moves_west() { -delta.x } else { delta.x };
    let dy = if corner.moves_north() { -delta.y } else { delta.y };
    let mut width = (origin.width + dx).max(config.min_width_cm);
    let mut height = (origin.height + dy).max(config.min_height_cm);

    if keep_aspect_ratio && origin.height > 0.0 {
        let ratio = origin.width / origin.height;
        width = width.min(max_width).min(max_height * ratio);
        height = (width / ratio).max(config.min_height_cm).min(max_height);
    } else {
        width = width.min(max_width);
        height = height.min(max_height);
    }

    rect_from_fixed(corner, fixed, width, height)
}

/// Whether a box satisfies the size minimums and lies on the slide.
fn fits(bounds: CmRect, slide: SlideDimensions, config: &EditorConfig) -> bool {
    bounds.width >= config.min_width_cm - EPSILON
        && bounds.height >= config.min_height_cm - EPSILON
        && bounds.x >= -EPSILON
        && bounds.y >= -EPSILON
        && bounds.right() <= slide.width + EPSILON
        && bounds.bottom() <= slide.height + EPSILON
}

/// Snap the top-left corner of a dragged box.
///
/// An axis only snaps if the snapped box still lies on the slide.
fn snap_drag(candidate: CmRect, points: &SnapPoints, slide: SlideDimensions, config: &EditorConfig) -> (CmRect, SnapGuides) {
    let result = resolve_snap(candidate.origin(), points, config.snap_threshold_cm);
    let mut bounds = candidate;
    let mut guides = SnapGuides::default();

    if let Some(x) = result.snapped_x {
        if x >= -EPSILON && x + bounds.width <= slide.width + EPSILON {
            bounds.x = x;
            guides.x = Some(x);
        }
    }
    if let Some(y) = result.snapped_y {
        if y >= -EPSILON && y + bounds.height <= slide.height + EPSILON {
            bounds.y = y;
            guides.y = Some(y);
        }
    }
    (bounds, guides)
}

/// Snap the moving corner of a resized box.
///
/// Only the edges driven by `corner` snap. With a locked aspect ratio the
/// horizontal snap wins and the height follows it; the vertical snap is
/// used only when the horizontal one did not apply.
fn snap_resize(
    candidate: CmRect,
    corner: Corner,
    aspect_ratio: Option<f64>,
    points: &SnapPoints,
    slide: SlideDimensions,
    config: &EditorConfig,
) -> (CmRect, SnapGuides) {
    let fixed = fixed_corner(corner, candidate);
    let result = resolve_snap(corner.position(candidate), points, config.snap_threshold_cm);
    let mut bounds = candidate;
    let mut guides = SnapGuides::default();

    if let Some(x) = result.snapped_x {
        let width = if corner.moves_west() { fixed.x - x } else { x - fixed.x };
        let height = aspect_ratio.map_or(bounds.height, |ratio| width / ratio);
        let snapped = rect_from_fixed(corner, fixed, width, height);
        if fits(snapped, slide, config) {
            bounds = snapped;
            guides.x = Some(x);
        }
    }

    let locked = aspect_ratio.is_some() && guides.x.is_some();
    if let (Some(y), false) = (result.snapped_y, locked) {
        let height = if corner.moves_north() { fixed.y - y } else { y - fixed.y };
        let width = aspect_ratio.map_or(bounds.width, |ratio| height * ratio);
        let snapped = rect_from_fixed(corner, fixed, width, height);
        if fits(snapped, slide, config) {
            bounds = snapped;
            guides.y = Some(y);
        }
    }
    (bounds, guides)
}

/// Tracks the selection and the single active gesture.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    state: GestureState,
    guides: SnapGuides,
    selected: Option<ElementId>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// Current snap guide lines, empty when nothing snapped.
    pub fn snap_guides(&self) -> SnapGuides {
        self.guides
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<ElementId>) {
        self.selected = id;
    }

    /// Route a pointer-down: handles of the selected element first, then
    /// element bodies front to back.
    pub fn pointer_down(&mut self, model: &PlacementModel, config: &EditorConfig, pointer: Point) -> PointerDownOutcome {
        let conv = config.converter(model.dimensions());
        let position = conv.point_to_physical(pointer);
        let tolerance = conv.to_physical(config.handle_tolerance_px);

        if let Some(selected) = self.selected.and_then(|id| model.get(id)) {
            if let Some(corner) = hit_test_handles(selected.bounds, position, tolerance) {
                let id = selected.id;
                self.begin_resize(model, id, corner, pointer);
                return PointerDownOutcome::Resize(id, corner);
            }
        }

        match model.element_at(position) {
            Some(id) => {
                self.selected = Some(id);
                self.begin_drag(model, id, pointer);
                PointerDownOutcome::Drag(id)
            }
            None => {
                self.selected = None;
                PointerDownOutcome::Miss
            }
        }
    }

    /// Start moving an element. Returns false if it does not exist.
    pub fn begin_drag(&mut self, model: &PlacementModel, id: ElementId, pointer: Point) -> bool {
        let Some(el) = model.get(id) else {
            return false;
        };
        self.abort_stale();
        log::debug!("Begin drag of {}", id);
        self.state = GestureState::Dragging {
            element: id,
            origin_pointer: pointer,
            origin_bounds: el.bounds,
        };
        true
    }

    /// Start resizing an element from a corner. Returns false if it does not exist.
    pub fn begin_resize(&mut self, model: &PlacementModel, id: ElementId, corner: Corner, pointer: Point) -> bool {
        let Some(el) = model.get(id) else {
            return false;
        };
        self.abort_stale();
        log::debug!("Begin resize of {} from {:?}", id, corner);
        self.state = GestureState::Resizing {
            element: id,
            corner,
            origin_pointer: pointer,
            origin_bounds: el.bounds,
        };
        true
    }

    /// Apply a pointer move to the active gesture and commit the new box.
    ///
    /// Returns the committed box, or `None` when idle. If the element was
    /// removed mid-gesture the gesture is dropped.
    pub fn pointer_move(
        &mut self,
        model: &mut PlacementModel,
        config: &EditorConfig,
        pointer: Point,
    ) -> Result<Option<CmRect>, ModelError> {
        let (element, corner, origin_pointer, origin_bounds) = match self.state {
            GestureState::Idle => return Ok(None),
            GestureState::Dragging {
                element,
                origin_pointer,
                origin_bounds,
            } => (element, None, origin_pointer, origin_bounds),
            GestureState::Resizing {
                element,
                corner,
                origin_pointer,
                origin_bounds,
            } => (element, Some(corner), origin_pointer, origin_bounds),
        };

        let Some(current) = model.get(element) else {
            log::debug!("Element {} disappeared during gesture", element);
            self.reset();
            return Ok(None);
        };
        let keep_aspect_ratio = current.keeps_aspect_ratio();

        let slide = model.dimensions();
        let delta = config.converter(slide).vec_to_physical(pointer - origin_pointer);
        let points = config
            .snap_enabled
            .then(|| get_snap_points(model.elements(), slide, Some(element)));

        let (bounds, guides) = match corner {
            None => {
                let candidate = apply_drag(origin_bounds, delta, slide);
                match &points {
                    Some(points) => snap_drag(candidate, points, slide, config),
                    None => (candidate, SnapGuides::default()),
                }
            }
            Some(corner) => {
                let candidate = apply_resize(origin_bounds, corner, delta, keep_aspect_ratio, slide, config);
                let ratio = keep_aspect_ratio.then(|| origin_bounds.width / origin_bounds.height);
                match &points {
                    Some(points) => snap_resize(candidate, corner, ratio, points, slide, config),
                    None => (candidate, SnapGuides::default()),
                }
            }
        };

        model.set_bounds(element, bounds)?;
        self.guides = guides;
        Ok(model.get(element).map(|el| el.bounds))
    }

    /// End the gesture. The last committed box is final.
    pub fn pointer_up(&mut self) -> Option<ElementId> {
        let element = self.state.element();
        if let Some(id) = element {
            log::debug!("End gesture on {}", id);
        }
        self.reset();
        element
    }

    /// Drop the gesture and the selection.
    pub fn clear(&mut self) {
        self.reset();
        self.selected = None;
    }

    fn abort_stale(&mut self) {
        if let Some(id) = self.state.element() {
            log::debug!("Aborting stale gesture on {}", id);
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.guides = SnapGuides::default();
    }
}
