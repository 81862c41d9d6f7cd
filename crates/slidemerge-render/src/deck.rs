//! Deck export sink.
//!
//! Writes the batch export as a JSON deck manifest for a presentation
//! writer. Geometry is in inches, images are embedded as base64.

use crate::fit::{contain_rect, image_size};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Rect;
use serde::Serialize;
use slidemerge_core::{
    CmRect, ExportSink, ImageAsset, RenderedSlide, ResolvedContent, SlideDimensions, TextAlign, TextStyle, cm_to_inch,
};
use thiserror::Error;

/// Deck sink errors.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Deck not started")]
    NotStarted,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A box in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InchBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl From<Rect> for InchBox {
    /// Convert a rectangle in centimetres.
    fn from(r: Rect) -> Self {
        Self {
            x: cm_to_inch(r.x0),
            y: cm_to_inch(r.y0),
            w: cm_to_inch(r.width()),
            h: cm_to_inch(r.height()),
        }
    }
}

impl From<CmRect> for InchBox {
    fn from(r: CmRect) -> Self {
        Rect::from(r).into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckText {
    #[serde(flatten)]
    pub frame: InchBox,
    pub text: String,
    pub font_face: String,
    pub font_size: f64,
    /// Hex color without `#`.
    pub color: String,
    pub align: TextAlign,
    pub bold: bool,
    pub italic: bool,
    pub wrap: bool,
}

impl DeckText {
    fn new(frame: InchBox, text: String, style: Option<&TextStyle>) -> Self {
        let default_style = TextStyle::default();
        let style = style.unwrap_or(&default_style);
        Self {
            frame,
            text,
            font_face: style.font_family.clone(),
            font_size: style.font_size,
            color: style.color.trim_start_matches('#').to_string(),
            align: style.align,
            bold: style.bold,
            italic: style.italic,
            wrap: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckImage {
    /// Where the image is drawn.
    #[serde(flatten)]
    pub frame: InchBox,
    pub mime_type: String,
    /// Base64 image data.
    pub data: String,
}

impl DeckImage {
    fn new(frame: InchBox, asset: &ImageAsset) -> Self {
        Self {
            frame,
            mime_type: asset.format.mime_type().to_string(),
            data: STANDARD.encode(&asset.bytes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeckItem {
    Text(DeckText),
    Image(DeckImage),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeckSlide {
    pub items: Vec<DeckItem>,
}

/// Slide size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeckLayout {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deck {
    pub layout: DeckLayout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<DeckImage>,
    pub slides: Vec<DeckSlide>,
}

/// Collects exported slides into a [`Deck`] and serializes it on finish.
#[derive(Debug, Default)]
pub struct DeckSink {
    deck: Option<Deck>,
    pretty: bool,
}

impl DeckSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit indented JSON.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// The deck built so far.
    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }
}

/// Contain-fit an image inside a box given in centimetres.
fn image_frame(bounds: CmRect, asset: &ImageAsset) -> InchBox {
    let rect = Rect::from(bounds);
    let placed = image_size(&asset.bytes).map_or(rect, |size| contain_rect(size, rect));
    placed.into()
}

impl ExportSink for DeckSink {
    type Error = SinkError;

    fn begin(&mut self, dimensions: SlideDimensions, background: Option<&ImageAsset>) -> Result<(), SinkError> {
        let frame = InchBox::from(dimensions.bounds());
        self.deck = Some(Deck {
            layout: DeckLayout {
                width: frame.w,
                height: frame.h,
            },
            background: background.map(|bg| DeckImage::new(frame, bg)),
            slides: Vec::new(),
        });
        Ok(())
    }

    fn add_slide(&mut self, slide: &RenderedSlide) -> Result<(), SinkError> {
        let deck = self.deck.as_mut().ok_or(SinkError::NotStarted)?;
        let items = slide
            .items
            .iter()
            .filter_map(|item| match &item.content {
                ResolvedContent::Text(text) => Some(DeckItem::Text(DeckText::new(
                    item.bounds.into(),
                    text.clone(),
                    item.style.as_ref(),
                ))),
                ResolvedContent::Image { asset, .. } => {
                    Some(DeckItem::Image(DeckImage::new(image_frame(item.bounds, asset), asset)))
                }
                ResolvedContent::Unresolved { filename } => {
                    log::debug!("Slide {}: leaving out unresolved image {:?}", slide.index + 1, filename);
                    None
                }
            })
            .collect();
        deck.slides.push(DeckSlide { items });
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, SinkError> {
        let deck = self.deck.as_ref().ok_or(SinkError::NotStarted)?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(deck)?
        } else {
            serde_json::to_vec(deck)?
        };
        Ok(bytes)
    }
}
