//! Drawing document parsing, validation, and submission payloads

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ImportError, ImportResult};

/// One user-supplied file, owned by the caller for the duration of an
/// import call.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }

    /// View the contents as text; non-UTF-8 input is a parse failure.
    pub fn text(&self) -> ImportResult<&str> {
        std::str::from_utf8(&self.contents)
            .map_err(|_| ImportError::Parse(format!("{} is not valid UTF-8", self.name)))
    }
}

/// A parsed drawing document: element sequence, app state, and optional
/// embedded assets. Element and state content is opaque and submitted
/// verbatim, preserving fidelity with the originating tool.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingDocument {
    pub elements: Vec<Value>,
    pub app_state: Map<String, Value>,
    pub files: Option<Map<String, Value>>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl DrawingDocument {
    /// Parse raw file text into a document.
    ///
    /// Malformed serialization is a parse error; a document missing
    /// `elements` or `appState` is a structural error naming the file.
    /// Blank input has no structure at all and is reported structurally.
    pub fn parse(file_name: &str, text: &str) -> ImportResult<Self> {
        let value: Value = serde_json::from_str(text).map_err(|err| {
            if text.trim().is_empty() {
                ImportError::Structural(file_name.to_string())
            } else {
                ImportError::Parse(err.to_string())
            }
        })?;
        Self::from_value(file_name, value)
    }

    pub fn from_value(file_name: &str, value: Value) -> ImportResult<Self> {
        let structural = || ImportError::Structural(file_name.to_string());

        let Value::Object(mut map) = value else {
            return Err(structural());
        };
        let elements = match map.remove("elements") {
            Some(Value::Array(elements)) => elements,
            _ => return Err(structural()),
        };
        let app_state = match map.remove("appState") {
            Some(Value::Object(app_state)) => app_state,
            _ => return Err(structural()),
        };
        let files = match map.remove("files") {
            Some(Value::Object(files)) => Some(files),
            _ => None,
        };

        Ok(Self {
            elements,
            app_state,
            files,
            created_at: map.get("createdAt").and_then(Value::as_i64),
            updated_at: map.get("updatedAt").and_then(Value::as_i64),
        })
    }
}

/// Submission shape for the create-drawing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingPayload {
    pub name: String,
    pub elements: Vec<Value>,
    pub app_state: Map<String, Value>,
    /// Asset mapping, or explicit null when the source document had none
    pub files: Value,
    pub collection_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub preview: String,
}

impl DrawingPayload {
    /// Build the submission payload. The name defaults to the filename with
    /// its drawing extension stripped; timestamps default to now when the
    /// source document carries none.
    pub fn from_document(
        file_name: &str,
        document: DrawingDocument,
        collection_id: Option<&str>,
        preview: String,
    ) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            name: strip_drawing_extension(file_name).to_string(),
            files: document.files.map(Value::Object).unwrap_or(Value::Null),
            collection_id: collection_id.map(str::to_string),
            created_at: document.created_at.unwrap_or(now),
            updated_at: document.updated_at.unwrap_or(now),
            elements: document.elements,
            app_state: document.app_state,
            preview,
        }
    }
}

/// A drawing as persisted by the remote store; the id is assigned remotely,
/// never by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingRecord {
    pub id: String,
    pub name: String,
    pub elements: Vec<Value>,
    pub app_state: Map<String, Value>,
    #[serde(default)]
    pub files: Value,
    pub collection_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub preview: Option<String>,
}

/// Strip a recognized drawing extension from a filename. Unrecognized
/// extensions are kept as-is.
pub fn strip_drawing_extension(name: &str) -> &str {
    name.strip_suffix(".excalidraw")
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_document() {
        let text = r##"{"elements": [{"type": "rectangle"}], "appState": {"viewBackgroundColor": "#fff"}, "createdAt": 1700000000000}"##;
        let doc = DrawingDocument::parse("sketch.json", text).unwrap();
        assert_eq!(doc.elements.len(), 1);
        assert_eq!(doc.created_at, Some(1700000000000));
        assert_eq!(doc.updated_at, None);
        assert!(doc.files.is_none());
    }

    #[test]
    fn test_missing_app_state_is_structural() {
        let text = r#"{"elements": []}"#;
        let err = DrawingDocument::parse("sketch.json", text).unwrap_err();
        assert_eq!(err, ImportError::Structural("sketch.json".to_string()));
        assert_eq!(err.to_string(), "Invalid file structure: sketch.json");
    }

    #[test]
    fn test_missing_elements_is_structural() {
        let text = r#"{"appState": {}}"#;
        let err = DrawingDocument::parse("sketch.json", text).unwrap_err();
        assert_eq!(err, ImportError::Structural("sketch.json".to_string()));
    }

    #[test]
    fn test_blank_input_is_structural() {
        let err = DrawingDocument::parse("empty.json", "").unwrap_err();
        assert_eq!(err, ImportError::Structural("empty.json".to_string()));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = DrawingDocument::parse("broken.json", "{not json").unwrap_err();
        assert!(matches!(err, ImportError::Parse(_)));
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_drawing_extension("diagram.excalidraw"), "diagram");
        assert_eq!(strip_drawing_extension("diagram.json"), "diagram");
        assert_eq!(strip_drawing_extension("diagram.svg"), "diagram.svg");
    }

    #[test]
    fn test_payload_defaults() {
        let doc = DrawingDocument::parse(
            "wireframe.excalidraw",
            r#"{"elements": [], "appState": {}}"#,
        )
        .unwrap();
        let payload =
            DrawingPayload::from_document("wireframe.excalidraw", doc, None, "<svg/>".to_string());
        assert_eq!(payload.name, "wireframe");
        assert_eq!(payload.files, Value::Null);
        assert!(payload.collection_id.is_none());
        assert!(payload.created_at > 0);
        assert_eq!(payload.created_at, payload.updated_at);
    }

    #[test]
    fn test_payload_keeps_source_timestamps_and_files() {
        let doc = DrawingDocument::parse(
            "notes.json",
            r#"{"elements": [], "appState": {}, "files": {"asset-1": {}}, "createdAt": 42, "updatedAt": 43}"#,
        )
        .unwrap();
        let payload = DrawingPayload::from_document("notes.json", doc, Some("col-7"), String::new());
        assert_eq!(payload.created_at, 42);
        assert_eq!(payload.updated_at, 43);
        assert_eq!(payload.collection_id.as_deref(), Some("col-7"));
        assert_eq!(payload.files, json!({"asset-1": {}}));
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let doc =
            DrawingDocument::parse("a.json", r#"{"elements": [], "appState": {}}"#).unwrap();
        let payload = DrawingPayload::from_document("a.json", doc, None, String::new());
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("appState").is_some());
        assert!(value.get("collectionId").is_some());
        assert!(value.get("createdAt").is_some());
    }
}
