//! Display-space frames for the layout editor and the single-row preview.
//!
//! Both frames are built from the same projected content as the export, so
//! they only differ in units and decorations.

use crate::fit::{contain_rect, image_size};
use kurbo::{Line, Point, Rect, Size};
use peniko::Color;
use slidemerge_core::interaction::Corner;
use slidemerge_core::{
    DataRow, ElementId, ElementKind, PlacedItem, ResolvedContent, TextAlign, TextStyle, UnitConverter, Workspace,
    project_slide,
};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error, PartialEq)]
pub enum RendererError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Row {0} does not exist")]
    NoSuchRow(usize),
}

/// Side length of a resize handle square, in display pixels.
pub const HANDLE_SIZE_PX: f64 = 8.0;

/// Parse `#rgb` or `#rrggbb` (the `#` is optional).
pub fn parse_color(hex: &str) -> Result<Color, RendererError> {
    let digits = hex.trim().trim_start_matches('#');
    let invalid = || RendererError::InvalidColor(hex.to_string());
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

    // Byte slicing below needs ASCII input.
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    match digits.len() {
        3 => {
            let expand = |i: usize| channel(&digits[i..=i].repeat(2));
            Ok(Color::from_rgba8(expand(0)?, expand(1)?, expand(2)?, 255))
        }
        6 => Ok(Color::from_rgba8(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
            255,
        )),
        _ => Err(invalid()),
    }
}

fn color_or_black(hex: &str) -> Color {
    parse_color(hex).unwrap_or_else(|e| {
        log::warn!("{}; using black", e);
        Color::BLACK
    })
}

/// Text ready to draw in display space.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameText {
    pub text: String,
    pub font_family: String,
    pub font_size_px: f64,
    pub color: Color,
    pub align: TextAlign,
    pub bold: bool,
    pub italic: bool,
}

impl FrameText {
    fn new(text: String, style: Option<&TextStyle>, conv: &UnitConverter) -> Self {
        let default_style = TextStyle::default();
        let style = style.unwrap_or(&default_style);
        Self {
            text,
            font_family: style.font_family.clone(),
            font_size_px: conv.font_to_display(style.font_size),
            color: color_or_black(&style.color),
            align: style.align,
            bold: style.bold,
            italic: style.italic,
        }
    }
}

/// What a frame item shows.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameContent {
    Text(FrameText),
    /// An image drawn into `placement`, contain-fitted inside the item rect.
    Image {
        filename: String,
        placement: Rect,
        bytes: std::sync::Arc<[u8]>,
    },
    /// Stand-in for content that cannot be shown.
    Placeholder { label: String },
}

/// One element in display pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameItem {
    pub element: ElementId,
    pub rect: Rect,
    pub content: FrameContent,
}

fn frame_item(item: PlacedItem, conv: &UnitConverter) -> FrameItem {
    let rect = conv.rect_to_display(item.bounds);
    let content = match item.content {
        ResolvedContent::Text(text) => FrameContent::Text(FrameText::new(text, item.style.as_ref(), conv)),
        ResolvedContent::Image { filename, asset } => {
            let placement = image_size(&asset.bytes).map_or(rect, |size| contain_rect(size, rect));
            FrameContent::Image {
                filename,
                placement,
                bytes: asset.bytes.clone(),
            }
        }
        ResolvedContent::Unresolved { filename } => FrameContent::Placeholder { label: filename },
    };
    FrameItem {
        element: item.element,
        rect,
        content,
    }
}

/// The single-row preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewFrame {
    /// Canvas size in display pixels.
    pub size: Size,
    pub row: usize,
    pub items: Vec<FrameItem>,
}

impl PreviewFrame {
    /// Build the preview of data row `row`.
    pub fn build(workspace: &Workspace, row: usize) -> Result<Self, RendererError> {
        let placed = workspace.preview(row).ok_or(RendererError::NoSuchRow(row))?;
        let conv = workspace.converter();
        Ok(Self {
            size: slide_size(workspace, &conv),
            row,
            items: placed.into_iter().map(|item| frame_item(item, &conv)).collect(),
        })
    }
}

fn slide_size(workspace: &Workspace, conv: &UnitConverter) -> Size {
    let dims = workspace.model().dimensions();
    Size::new(conv.to_display(dims.width), conv.to_display(dims.height))
}

/// The interactive editor surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorFrame {
    /// Canvas size in display pixels.
    pub size: Size,
    pub items: Vec<FrameItem>,
    /// Outline of the selected element.
    pub selection: Option<Rect>,
    /// Resize handle squares of the selected element.
    pub handles: Vec<Rect>,
    /// Snap guide lines across the canvas.
    pub guides: Vec<Line>,
}

impl EditorFrame {
    /// Build the editor frame.
    ///
    /// With a sample row, bound elements show that row's content. Without
    /// one they show their label.
    pub fn build(workspace: &Workspace, sample: Option<&DataRow>) -> Self {
        let conv = workspace.converter();
        let model = workspace.model();
        let size = slide_size(workspace, &conv);
        let session = workspace.session();

        let empty = DataRow::new();
        let placed = project_slide(model, &session.variables, sample.unwrap_or(&empty), &session.images);
        let items = placed
            .into_iter()
            .map(|item| {
                let label = match (sample, model.get(item.element)) {
                    (None, Some(el)) if el.kind != ElementKind::Static => Some(el.label.clone()),
                    _ => None,
                };
                match label {
                    Some(label) if item.content.as_text().is_some() => FrameItem {
                        element: item.element,
                        rect: conv.rect_to_display(item.bounds),
                        content: FrameContent::Text(FrameText::new(label, item.style.as_ref(), &conv)),
                    },
                    Some(label) => FrameItem {
                        element: item.element,
                        rect: conv.rect_to_display(item.bounds),
                        content: FrameContent::Placeholder { label },
                    },
                    None => frame_item(item, &conv),
                }
            })
            .collect();

        let selected = workspace.selected().and_then(|id| model.get(id));
        let selection = selected.map(|el| conv.rect_to_display(el.bounds));
        let handles = selected
            .map(|el| {
                Corner::ALL
                    .iter()
                    .map(|corner| {
                        let p = corner.position(el.bounds);
                        let center = Point::new(conv.to_display(p.x), conv.to_display(p.y));
                        Rect::from_center_size(center, Size::new(HANDLE_SIZE_PX, HANDLE_SIZE_PX))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let snap = workspace.snap_guides();
        let mut guides = Vec::new();
        if let Some(x) = snap.x {
            let x = conv.to_display(x);
            guides.push(Line::new((x, 0.0), (x, size.height)));
        }
        if let Some(y) = snap.y {
            let y = conv.to_display(y);
            guides.push(Line::new((0.0, y), (size.width, y)));
        }

        Self {
            size,
            items,
            selection,
            handles,
            guides,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::png_bytes;
    use slidemerge_core::{EditorConfig, ImageAsset, ImageStore, JsonRowSource, SlideDimensions};

    fn workspace() -> Workspace {
        let config = EditorConfig {
            canvas_width_px: 200.0,
            ..EditorConfig::default()
        };
        let mut ws = Workspace::new(SlideDimensions::new(20.0, 10.0).unwrap(), config);
        ws.load_rows(&JsonRowSource::new(
            r#"[{"Name": "Ada", "Photo": "ada.png"}, {"Name": "Grace", "Photo": "nope.png"}]"#,
        ))
        .unwrap();
        let mut images = ImageStore::new();
        images.insert("ada.png", ImageAsset::from_bytes(png_bytes(20, 10), "ada.png").unwrap());
        ws.add_images(images);
        ws
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff0000").unwrap(), Color::from_rgba8(255, 0, 0, 255));
        assert_eq!(parse_color("0a0B0c").unwrap(), Color::from_rgba8(10, 11, 12, 255));
        assert_eq!(parse_color("#fff").unwrap(), Color::from_rgba8(255, 255, 255, 255));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#gggggg").is_err());
        assert!(parse_color("#é1").is_err());
        assert!(parse_color("#aé123").is_err());
        assert!(parse_color("+1+2+3").is_err());
    }

    #[test]
    fn test_imported_bad_color_falls_back_to_black() {
        let mut ws = workspace();
        ws.import_design_json(
            r##"{
                "version": 1,
                "dimensions": {"width": 20, "height": 10},
                "canvasElements": [
                    {"variableName": null, "type": "static", "label": "Hi", "x": 1, "y": 1, "width": 6, "height": 1.2,
                     "style": {"color": "#aé123"}, "keepAspectRatio": null}
                ]
            }"##,
        )
        .unwrap();

        let editor = EditorFrame::build(&ws, None);
        let preview = PreviewFrame::build(&ws, 0).unwrap();
        for item in editor.items.iter().chain(preview.items.iter()) {
            match &item.content {
                FrameContent::Text(text) => assert_eq!(text.color, Color::BLACK),
                other => panic!("unexpected content {:?}", other),
            }
        }
    }

    #[test]
    fn test_preview_resolves_row() {
        let mut ws = workspace();
        let name = ws.session().variable_by_name("Name").unwrap().id;
        let photo = ws.session().variable_by_name("Photo").unwrap().id;
        ws.drop_variable(name, Point::new(10.0, 10.0)).unwrap();
        ws.drop_variable(photo, Point::new(100.0, 10.0)).unwrap();

        let frame = PreviewFrame::build(&ws, 0).unwrap();
        assert_eq!(frame.size, Size::new(200.0, 100.0));
        match &frame.items[0].content {
            FrameContent::Text(text) => {
                assert_eq!(text.text, "Ada");
                assert!((text.font_size_px - 18.0 * 10.0 / 28.35).abs() < 1e-9);
                assert_eq!(text.color, Color::from_rgba8(0, 0, 0, 255));
            }
            other => panic!("expected text, got {:?}", other),
        }
        match &frame.items[1].content {
            FrameContent::Image { placement, .. } => {
                // 5 x 5 cm box at (10, 1) cm; a 2:1 image fills the width.
                assert_eq!(frame.items[1].rect, Rect::new(100.0, 10.0, 150.0, 60.0));
                assert_eq!(*placement, Rect::new(100.0, 22.5, 150.0, 47.5));
            }
            other => panic!("expected image, got {:?}", other),
        }

        let frame = PreviewFrame::build(&ws, 1).unwrap();
        assert_eq!(
            frame.items[1].content,
            FrameContent::Placeholder {
                label: "nope.png".to_string()
            }
        );
        assert_eq!(PreviewFrame::build(&ws, 2), Err(RendererError::NoSuchRow(2)));
    }

    #[test]
    fn test_editor_shows_labels_without_sample() {
        let mut ws = workspace();
        let name = ws.session().variable_by_name("Name").unwrap().id;
        let photo = ws.session().variable_by_name("Photo").unwrap().id;
        ws.drop_static(Point::ORIGIN).unwrap();
        ws.drop_variable(name, Point::new(0.0, 30.0)).unwrap();
        let image = ws.drop_variable(photo, Point::new(100.0, 10.0)).unwrap();

        let frame = EditorFrame::build(&ws, None);
        let texts: Vec<_> = frame
            .items
            .iter()
            .map(|item| match &item.content {
                FrameContent::Text(t) => t.text.clone(),
                FrameContent::Placeholder { label } => label.clone(),
                FrameContent::Image { filename, .. } => filename.clone(),
            })
            .collect();
        assert_eq!(texts, vec!["Static text", "{Name}", "{Photo}"]);

        // The last drop is selected: outline plus four handles.
        assert_eq!(ws.selected(), Some(image));
        assert_eq!(frame.selection, Some(Rect::new(100.0, 10.0, 150.0, 60.0)));
        assert_eq!(frame.handles.len(), 4);
        assert_eq!(frame.handles[0], Rect::new(96.0, 6.0, 104.0, 14.0));
        assert!(frame.guides.is_empty());
    }

    #[test]
    fn test_editor_with_sample_matches_preview() {
        let mut ws = workspace();
        let name = ws.session().variable_by_name("Name").unwrap().id;
        ws.drop_variable(name, Point::ORIGIN).unwrap();
        let row = ws.session().rows[0].clone();

        let editor = EditorFrame::build(&ws, Some(&row));
        let preview = PreviewFrame::build(&ws, 0).unwrap();
        assert_eq!(editor.items, preview.items);
    }

    #[test]
    fn test_editor_draws_snap_guides() {
        let mut ws = workspace();
        let a = ws.drop_static(Point::new(100.0, 50.0)).unwrap();
        let b = ws.drop_static(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(ws.selected(), Some(b));

        // Drag b so its left edge lands 0.1 cm from a's left edge.
        ws.pointer_down(Point::new(20.0, 15.0));
        ws.pointer_move(Point::new(109.0, 15.0)).unwrap();
        let frame = EditorFrame::build(&ws, None);
        assert_eq!(frame.guides, vec![Line::new((100.0, 0.0), (100.0, 100.0))]);
        assert_eq!(ws.model().get(b).unwrap().bounds.x, ws.model().get(a).unwrap().bounds.x);
    }
}
