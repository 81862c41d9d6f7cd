//! Conversion between the physical layout unit (centimetres) and display pixels.
//!
//! Element boxes are always stored in centimetres. Conversion only happens at
//! the render and interaction boundaries, so the export path never depends on
//! the display zoom.

use crate::model::{CmRect, SlideDimensions};
use kurbo::{Point, Rect, Vec2};

/// Width of the editor surface in display pixels.
pub const DISPLAY_CANVAS_PX: f64 = 900.0;

/// Centimetres per inch. External contract of the export backend.
pub const CM_PER_INCH: f64 = 2.54;

/// Typographic points per centimetre.
pub const POINTS_PER_CM: f64 = 28.35;

/// Maps between centimetres and display pixels for a given slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    /// Display pixels per centimetre.
    scale: f64,
}

impl UnitConverter {
    /// Create a converter with an explicit scale (pixels per centimetre).
    ///
    /// Non-positive or non-finite scales fall back to 1.0.
    pub fn with_scale(scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        Self { scale }
    }

    /// Converter for a slide shown on a canvas `canvas_width_px` pixels wide.
    pub fn for_slide(dimensions: SlideDimensions, canvas_width_px: f64) -> Self {
        Self::with_scale(canvas_width_px / dimensions.width)
    }

    /// Pixels per centimetre.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn to_display(&self, cm: f64) -> f64 {
        cm * self.scale
    }

    pub fn to_physical(&self, px: f64) -> f64 {
        px / self.scale
    }

    /// Convert a display-space point to centimetres.
    pub fn point_to_physical(&self, point: Point) -> Point {
        Point::new(self.to_physical(point.x), self.to_physical(point.y))
    }

    /// Convert a display-space offset to centimetres.
    pub fn vec_to_physical(&self, delta: Vec2) -> Vec2 {
        Vec2::new(self.to_physical(delta.x), self.to_physical(delta.y))
    }

    /// Display-space rectangle of a physical box.
    pub fn rect_to_display(&self, rect: CmRect) -> Rect {
        Rect::new(
            self.to_display(rect.x),
            self.to_display(rect.y),
            self.to_display(rect.x + rect.width),
            self.to_display(rect.y + rect.height),
        )
    }

    /// Display size of a font given in points.
    pub fn font_to_display(&self, points: f64) -> f64 {
        points * (self.scale / POINTS_PER_CM)
    }
}

/// Centimetres to inches.
pub fn cm_to_inch(cm: f64) -> f64 {
    cm / CM_PER_INCH
}
