//! Editor configuration.

use crate::model::{MIN_HEIGHT_CM, MIN_WIDTH_CM, SlideDimensions};
use crate::snap::SNAP_THRESHOLD_CM;
use crate::units::{DISPLAY_CANVAS_PX, UnitConverter};

/// Hit tolerance of resize handles, in display pixels.
pub const HANDLE_HIT_TOLERANCE_PX: f64 = 10.0;

/// Tunables of the layout editor surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Width of the editor canvas in display pixels.
    pub canvas_width_px: f64,
    /// Whether gestures snap to slide and element edges.
    pub snap_enabled: bool,
    /// Snap tolerance in centimetres.
    pub snap_threshold_cm: f64,
    /// Smallest width a resize gesture may produce.
    pub min_width_cm: f64,
    /// Smallest height a resize gesture may produce.
    pub min_height_cm: f64,
    /// Resize handle hit tolerance in display pixels.
    pub handle_tolerance_px: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width_px: DISPLAY_CANVAS_PX,
            snap_enabled: true,
            snap_threshold_cm: SNAP_THRESHOLD_CM,
            min_width_cm: MIN_WIDTH_CM,
            min_height_cm: MIN_HEIGHT_CM,
            handle_tolerance_px: HANDLE_HIT_TOLERANCE_PX,
        }
    }
}

impl EditorConfig {
    /// Unit converter for a slide shown on this editor surface.
    pub fn converter(&self, dimensions: SlideDimensions) -> UnitConverter {
        UnitConverter::for_slide(dimensions, self.canvas_width_px)
    }

    /// Builder-style snapping toggle.
    pub fn with_snap(mut self, enabled: bool) -> Self {
        self.snap_enabled = enabled;
        self
    }
}
