//! Content resolution shared by the editor, the preview and the export.
//!
//! Every consumer resolves what an element shows through [`project`], so
//! the three views cannot disagree about a row's content.

use crate::model::{CmRect, ElementId, ElementKind, PlacementElement, PlacementModel, TextStyle, Variable};
use crate::session::{DataRow, ImageAsset, ImageStore};
use std::sync::Arc;

/// Concrete content of one element for one data row.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedContent {
    /// Text to draw. May be empty.
    Text(String),
    /// A found image.
    Image { filename: String, asset: Arc<ImageAsset> },
    /// An image binding whose file is empty or not in the store.
    Unresolved { filename: String },
}

impl ResolvedContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResolvedContent::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, ResolvedContent::Unresolved { .. })
    }
}

/// Row value of the column an element is bound to.
///
/// Unbound elements, dangling bindings and absent keys all give `""`.
fn bound_value<'a>(element: &PlacementElement, variables: &[Variable], row: &'a DataRow) -> &'a str {
    element
        .binding
        .and_then(|id| variables.iter().find(|v| v.id == id))
        .and_then(|v| row.get(&v.name))
        .map(String::as_str)
        .unwrap_or("")
}

/// Resolve what `element` shows for `row`.
pub fn project(element: &PlacementElement, variables: &[Variable], row: &DataRow, images: &ImageStore) -> ResolvedContent {
    match element.kind {
        ElementKind::Static => ResolvedContent::Text(element.label.clone()),
        ElementKind::Text => ResolvedContent::Text(bound_value(element, variables, row).to_string()),
        ElementKind::Image => {
            let filename = bound_value(element, variables, row);
            match images.get(filename) {
                Some(asset) => ResolvedContent::Image {
                    filename: filename.to_string(),
                    asset: Arc::clone(asset),
                },
                None => {
                    if !filename.is_empty() {
                        log::warn!("Image {:?} not found for element {}", filename, element.id);
                    }
                    ResolvedContent::Unresolved {
                        filename: filename.to_string(),
                    }
                }
            }
        }
    }
}

/// One element resolved against a row, ready for a presentation adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub element: ElementId,
    /// Box in centimetres.
    pub bounds: CmRect,
    pub content: ResolvedContent,
    pub style: Option<TextStyle>,
}

/// Resolve every element of the model against `row`, in paint order.
pub fn project_slide(
    model: &PlacementModel,
    variables: &[Variable],
    row: &DataRow,
    images: &ImageStore,
) -> Vec<PlacedItem> {
    model
        .elements()
        .iter()
        .map(|el| PlacedItem {
            element: el.id,
            bounds: el.bounds,
            content: project(el, variables, row, images),
            style: el.style.clone(),
        })
        .collect()
}
