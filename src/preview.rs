//! Preview derivation for imported drawings
//!
//! The renderer is an external collaborator: it turns a document's element
//! sequence into a self-contained preview artifact and must not mutate its
//! inputs. Rendering failures are per-file failures, folded into the batch
//! outcome like any other.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

const EXPORT_PADDING: f64 = 10.0;
const DEFAULT_BACKGROUND: &str = "#ffffff";
const DEFAULT_STROKE: &str = "#1e1e1e";

#[async_trait]
pub trait PreviewRenderer: Send + Sync {
    /// Produce self-contained preview markup for a drawing.
    async fn render(
        &self,
        elements: &[Value],
        app_state: &Map<String, Value>,
        files: Option<&Map<String, Value>>,
    ) -> Result<String>;
}

/// App state as handed to a renderer: background export forced on and the
/// background color defaulted to white when unset. Works on a copy; the
/// source document is left untouched.
pub fn export_app_state(app_state: &Map<String, Value>) -> Map<String, Value> {
    let mut state = app_state.clone();
    state.insert("exportBackground".to_string(), Value::Bool(true));
    let has_background = state
        .get("viewBackgroundColor")
        .and_then(Value::as_str)
        .map_or(false, |color| !color.is_empty());
    if !has_background {
        state.insert(
            "viewBackgroundColor".to_string(),
            Value::String(DEFAULT_BACKGROUND.to_string()),
        );
    }
    state
}

/// Built-in renderer producing minimal SVG markup from element bounding
/// boxes. Stands in for a full rendering engine; callers wanting faithful
/// previews supply their own [`PreviewRenderer`].
pub struct SvgPreviewRenderer;

#[async_trait]
impl PreviewRenderer for SvgPreviewRenderer {
    async fn render(
        &self,
        elements: &[Value],
        app_state: &Map<String, Value>,
        _files: Option<&Map<String, Value>>,
    ) -> Result<String> {
        let state = export_app_state(app_state);
        let background = state
            .get("viewBackgroundColor")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_BACKGROUND);

        let (min_x, min_y, max_x, max_y) = element_bounds(elements);
        let x = min_x - EXPORT_PADDING;
        let y = min_y - EXPORT_PADDING;
        let width = (max_x - min_x) + 2.0 * EXPORT_PADDING;
        let height = (max_y - min_y) + 2.0 * EXPORT_PADDING;

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{x} {y} {width} {height}" width="{width}" height="{height}">"#
        );
        svg.push_str(&format!(
            r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{background}"/>"#
        ));
        for element in elements {
            if element
                .get("isDeleted")
                .and_then(Value::as_bool)
                .unwrap_or(false)
            {
                continue;
            }
            let ex = number(element, "x");
            let ey = number(element, "y");
            let ew = number(element, "width");
            let eh = number(element, "height");
            let stroke = element
                .get("strokeColor")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_STROKE);
            svg.push_str(&format!(
                r#"<rect x="{ex}" y="{ey}" width="{ew}" height="{eh}" fill="none" stroke="{stroke}"/>"#
            ));
        }
        svg.push_str("</svg>");
        Ok(svg)
    }
}

fn number(element: &Value, key: &str) -> f64 {
    element.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn element_bounds(elements: &[Value]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for element in elements {
        if element
            .get("isDeleted")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            continue;
        }
        let x = number(element, "x");
        let y = number(element, "y");
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x + number(element, "width"));
        max_y = max_y.max(y + number(element, "height"));
    }

    if min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite() {
        (min_x, min_y, max_x, max_y)
    } else {
        (0.0, 0.0, 0.0, 0.0)
    }
}
