//! Portable design documents.
//!
//! A design document is the placement model with variable ids replaced by
//! column names, so a layout saved in one data session can be loaded in
//! another where ids are regenerated.

use crate::model::{
    CmRect, ElementKind, ModelError, PlacementElement, PlacementModel, SlideDimensions, TextStyle, Variable,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Current design document version.
pub const DESIGN_VERSION: u32 = 1;

/// Design document errors.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid design: {0}")]
    Structure(String),
    #[error("Invalid design element {index}: {reason}")]
    Element { index: usize, reason: String },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A placement element in portable form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignElement {
    /// Name of the bound column, `None` for static content.
    pub variable_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
    #[serde(default)]
    pub keep_aspect_ratio: Option<bool>,
}

impl DesignElement {
    pub fn bounds(&self) -> CmRect {
        CmRect::new(self.x, self.y, self.width, self.height)
    }
}

/// A saved slide layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDocument {
    pub version: u32,
    pub dimensions: SlideDimensions,
    pub canvas_elements: Vec<DesignElement>,
}

impl DesignDocument {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, DesignError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a document. See [`parse_design`].
    pub fn from_json(json: &str) -> Result<Self, DesignError> {
        parse_design(json)
    }
}

/// Build a document from the model, naming each binding by its column.
///
/// Bindings whose variable no longer exists are written as unbound.
pub fn export_design(model: &PlacementModel, variables: &[Variable]) -> DesignDocument {
    let canvas_elements = model
        .elements()
        .iter()
        .map(|el| DesignElement {
            variable_name: el
                .binding
                .and_then(|id| variables.iter().find(|v| v.id == id))
                .map(|v| v.name.clone()),
            kind: el.kind,
            label: el.label.clone(),
            x: el.bounds.x,
            y: el.bounds.y,
            width: el.bounds.width,
            height: el.bounds.height,
            style: el.style.clone(),
            keep_aspect_ratio: el.keep_aspect_ratio,
        })
        .collect();

    DesignDocument {
        version: DESIGN_VERSION,
        dimensions: model.dimensions(),
        canvas_elements,
    }
}

fn is_number(value: Option<&Value>) -> bool {
    value.is_some_and(Value::is_number)
}

/// Structural check of an untyped document.
///
/// Requires a numeric `version`, a `dimensions` object with numeric
/// `width` and `height`, and a `canvasElements` array.
pub fn validate_design_value(value: &Value) -> Result<(), DesignError> {
    let Some(root) = value.as_object() else {
        return Err(DesignError::Structure("document is not an object".to_string()));
    };
    if !is_number(root.get("version")) {
        return Err(DesignError::Structure("missing numeric version".to_string()));
    }
    let Some(dims) = root.get("dimensions").and_then(Value::as_object) else {
        return Err(DesignError::Structure("missing dimensions object".to_string()));
    };
    if !is_number(dims.get("width")) || !is_number(dims.get("height")) {
        return Err(DesignError::Structure("dimensions need numeric width and height".to_string()));
    }
    if !root.get("canvasElements").is_some_and(Value::is_array) {
        return Err(DesignError::Structure("missing canvasElements array".to_string()));
    }
    Ok(())
}

/// Parse a design document: structural validation first, then typed
/// decoding of every element. Any failure rejects the whole document.
pub fn parse_design(json: &str) -> Result<DesignDocument, DesignError> {
    let value: Value = serde_json::from_str(json)?;
    parse_design_value(value)
}

/// Like [`parse_design`] for an already-parsed value.
pub fn parse_design_value(value: Value) -> Result<DesignDocument, DesignError> {
    validate_design_value(&value)?;
    let Value::Object(mut root) = value else {
        return Err(DesignError::Structure("document is not an object".to_string()));
    };

    let version = root
        .get("version")
        .and_then(Value::as_f64)
        .ok_or_else(|| DesignError::Structure("missing numeric version".to_string()))?;
    // Stricter than the numeric check above: only whole versions that fit a u32 load.
    if version.fract() != 0.0 || version < 0.0 || version > u32::MAX as f64 {
        return Err(DesignError::Structure(format!("unsupported version {}", version)));
    }
    let dimensions: SlideDimensions = serde_json::from_value(root.remove("dimensions").unwrap_or_default())?;
    dimensions.validate()?;

    let raw_elements = match root.remove("canvasElements") {
        Some(Value::Array(items)) => items,
        _ => return Err(DesignError::Structure("missing canvasElements array".to_string())),
    };
    let canvas_elements = raw_elements
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<DesignElement>(item).map_err(|e| DesignError::Element {
                index,
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DesignDocument {
        version: version as u32,
        dimensions,
        canvas_elements,
    })
}

/// Rebuild placement elements for the current session.
///
/// Every element gets a fresh id. Column names are matched against
/// `variables`; an unknown name leaves that element unbound. Boxes are
/// checked but not yet clamped, that happens when the result is applied
/// with [`PlacementModel::replace_all`].
pub fn import_design(
    doc: &DesignDocument,
    variables: &[Variable],
) -> Result<(SlideDimensions, Vec<PlacementElement>), DesignError> {
    doc.dimensions.validate()?;

    let elements = doc
        .canvas_elements
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let bounds = item.bounds();
            if !bounds.is_finite() || bounds.width <= 0.0 {
                return Err(DesignError::Element {
                    index,
                    reason: format!("invalid box {:?}", bounds),
                });
            }
            let binding = item
                .variable_name
                .as_deref()
                .and_then(|name| variables.iter().find(|v| v.name == name));
            if binding.is_none() {
                if let Some(name) = &item.variable_name {
                    log::warn!("Design references unknown column {:?}; element left unbound", name);
                }
            }
            Ok(PlacementElement {
                id: Uuid::new_v4(),
                binding: binding.map(|v| v.id),
                kind: item.kind,
                label: item.label.clone(),
                bounds,
                style: item.style.clone(),
                keep_aspect_ratio: item.keep_aspect_ratio,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("Imported design with {} elements", elements.len());
    Ok((doc.dimensions, elements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TextAlign, VariableKind};
    use kurbo::Point;

    fn sample_model(name: &Variable, photo: &Variable) -> PlacementModel {
        let mut model = PlacementModel::new(SlideDimensions::new(29.7, 21.0).unwrap());
        let mut title = PlacementElement::new_static(Point::new(1.0, 1.0));
        title.label = "Welcome".to_string();
        title.style = Some(TextStyle {
            font_size: 32.0,
            align: TextAlign::Center,
            bold: true,
            ..TextStyle::default()
        });
        model.add(title).unwrap();
        model.add(PlacementElement::for_variable(name, Point::new(2.0, 5.0))).unwrap();
        model.add(PlacementElement::for_variable(photo, Point::new(20.0, 10.0))).unwrap();
        model
    }

    #[test]
    fn test_export_uses_column_names() {
        let name = Variable::new("Name", VariableKind::Text);
        let photo = Variable::new("Photo", VariableKind::Image);
        let model = sample_model(&name, &photo);
        let doc = export_design(&model, &[name, photo]);

        assert_eq!(doc.version, DESIGN_VERSION);
        let names: Vec<_> = doc.canvas_elements.iter().map(|e| e.variable_name.clone()).collect();
        assert_eq!(names, vec![None, Some("Name".to_string()), Some("Photo".to_string())]);

        let json: Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        let first = &json["canvasElements"][0];
        assert_eq!(first["type"], "static");
        assert_eq!(first["variableName"], Value::Null);
        assert_eq!(first["keepAspectRatio"], Value::Null);
        assert_eq!(first["style"]["fontSize"], 32.0);
        assert!(json["canvasElements"][2].get("style").is_none());
        assert_eq!(json["canvasElements"][2]["keepAspectRatio"], true);
    }

    #[test]
    fn test_round_trip_rebinds_by_name() {
        let name = Variable::new("Name", VariableKind::Text);
        let photo = Variable::new("Photo", VariableKind::Image);
        let model = sample_model(&name, &photo);
        let json = export_design(&model, &[name, photo]).to_json().unwrap();

        // New session: same column names, new ids.
        let name2 = Variable::new("Name", VariableKind::Text);
        let photo2 = Variable::new("Photo", VariableKind::Image);
        let doc = parse_design(&json).unwrap();
        let (dims, elements) = import_design(&doc, &[photo2.clone(), name2.clone()]).unwrap();

        let mut imported = PlacementModel::new(dims);
        imported.replace_all(dims, elements).unwrap();

        assert_eq!(imported.dimensions(), model.dimensions());
        for (a, b) in model.elements().iter().zip(imported.elements()) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.bounds, b.bounds);
            assert_eq!(a.style, b.style);
            assert_eq!(a.label, b.label);
            assert_eq!(a.keep_aspect_ratio, b.keep_aspect_ratio);
        }
        assert_eq!(imported.elements()[0].binding, None);
        assert_eq!(imported.elements()[1].binding, Some(name2.id));
        assert_eq!(imported.elements()[2].binding, Some(photo2.id));
    }

    #[test]
    fn test_missing_column_degrades_one_element() {
        let name = Variable::new("Name", VariableKind::Text);
        let photo = Variable::new("Photo", VariableKind::Image);
        let doc = export_design(&sample_model(&name, &photo), &[name, photo]);

        let name2 = Variable::new("Name", VariableKind::Text);
        let (_, elements) = import_design(&doc, std::slice::from_ref(&name2)).unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[1].binding, Some(name2.id));
        assert_eq!(elements[2].binding, None);
        assert_eq!(elements[2].kind, ElementKind::Image);
    }

    #[test]
    fn test_dangling_binding_exports_unbound() {
        let name = Variable::new("Name", VariableKind::Text);
        let mut model = PlacementModel::new(SlideDimensions::default());
        model.add(PlacementElement::for_variable(&name, Point::ORIGIN)).unwrap();
        let doc = export_design(&model, &[]);
        assert_eq!(doc.canvas_elements[0].variable_name, None);
    }

    #[test]
    fn test_structural_validation() {
        let cases = [
            r#"[]"#,
            r#"{"dimensions": {"width": 10, "height": 5}, "canvasElements": []}"#,
            r#"{"version": "1", "dimensions": {"width": 10, "height": 5}, "canvasElements": []}"#,
            r#"{"version": 1, "canvasElements": []}"#,
            r#"{"version": 1, "dimensions": {"width": "10", "height": 5}, "canvasElements": []}"#,
            r#"{"version": 1, "dimensions": {"width": 10, "height": 5}}"#,
            r#"{"version": 1, "dimensions": {"width": 10, "height": 5}, "canvasElements": {}}"#,
        ];
        for json in cases {
            assert!(
                matches!(parse_design(json), Err(DesignError::Structure(_))),
                "accepted {json}"
            );
        }
        assert!(matches!(parse_design("{not json"), Err(DesignError::Json(_))));
    }

    #[test]
    fn test_version_must_be_whole() {
        for version in ["1.5", "-1", "1e12"] {
            let json = format!(
                r#"{{"version": {version}, "dimensions": {{"width": 10, "height": 5}}, "canvasElements": []}}"#
            );
            assert!(
                matches!(parse_design(&json), Err(DesignError::Structure(_))),
                "accepted version {version}"
            );
        }
        let json = r#"{"version": 2.0, "dimensions": {"width": 10, "height": 5}, "canvasElements": []}"#;
        assert_eq!(parse_design(json).unwrap().version, 2);
    }

    #[test]
    fn test_minimal_document() {
        let doc = parse_design(r#"{"version": 1, "dimensions": {"width": 25.4, "height": 19.05}, "canvasElements": []}"#)
            .unwrap();
        assert_eq!(doc.dimensions, SlideDimensions::new(25.4, 19.05).unwrap());
        assert!(doc.canvas_elements.is_empty());
    }

    #[test]
    fn test_non_positive_dimensions_rejected() {
        let json = r#"{"version": 1, "dimensions": {"width": 0, "height": 5}, "canvasElements": []}"#;
        assert!(matches!(parse_design(json), Err(DesignError::Model(_))));
    }

    #[test]
    fn test_malformed_element_rejects_document() {
        let json = r#"{
            "version": 1,
            "dimensions": {"width": 20, "height": 10},
            "canvasElements": [
                {"variableName": null, "type": "static", "label": "ok", "x": 0, "y": 0, "width": 2, "height": 1, "keepAspectRatio": null},
                {"variableName": null, "type": "shape", "label": "bad", "x": 0, "y": 0, "width": 2, "height": 1}
            ]
        }"#;
        assert!(matches!(parse_design(json), Err(DesignError::Element { index: 1, .. })));
    }

    #[test]
    fn test_partial_style_uses_defaults() {
        let json = r##"{
            "version": 1,
            "dimensions": {"width": 20, "height": 10},
            "canvasElements": [
                {"variableName": "Name", "type": "text", "label": "{Name}", "x": 1, "y": 1, "width": 8, "height": 1.2,
                 "style": {"fontSize": 24, "color": "#ff0000"}}
            ]
        }"##;
        let doc = parse_design(json).unwrap();
        let style = doc.canvas_elements[0].style.clone().unwrap();
        assert_eq!(style.font_size, 24.0);
        assert_eq!(style.color, "#ff0000");
        assert_eq!(style.font_family, "Arial");
        assert_eq!(doc.canvas_elements[0].keep_aspect_ratio, None);
    }

    #[test]
    fn test_import_rejects_zero_width_box() {
        let mut doc = export_design(&PlacementModel::new(SlideDimensions::default()), &[]);
        doc.canvas_elements.push(DesignElement {
            variable_name: None,
            kind: ElementKind::Static,
            label: "x".to_string(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 1.0,
            style: None,
            keep_aspect_ratio: None,
        });
        assert!(matches!(import_design(&doc, &[]), Err(DesignError::Element { index: 0, .. })));
    }
}
