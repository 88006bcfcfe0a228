//! Decoding detection lists from JSON.
//!
//! Three shapes are accepted:
//! - a list of detection objects: `[{"text", "confidence", "bbox"}, ...]`
//! - a recognizer service response: `{"blocks": [...], "width", "height"}`
//! - raw recognizer lines: `[[polygon, [text, confidence]], ...]`, optionally
//!   wrapped in a per-image list, in which case the first image is used

use serde::Deserialize;
use serde_json::Value;

use crate::error::{LayoutError, Result};
use crate::ingest::{Detection, ImageSize};
use crate::layout::Geometry;

/// Detections decoded from one document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionDocument {
    pub detections: Vec<Detection>,
    pub image: Option<ImageSize>,
}

#[derive(Deserialize)]
struct ServiceResponse {
    blocks: Vec<Value>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
}

/// Parse a JSON document into detections.
pub fn parse_detections(json: &str) -> Result<DetectionDocument> {
    let value: Value = serde_json::from_str(json)?;
    from_value(value)
}

/// Like [`parse_detections`] for an already parsed value.
pub fn from_value(value: Value) -> Result<DetectionDocument> {
    match value {
        Value::Object(_) => {
            let response: ServiceResponse = serde_json::from_value(value)
                .map_err(|e| LayoutError::MalformedDetections(e.to_string()))?;
            let image = match (response.width, response.height) {
                (Some(width), Some(height)) => Some(ImageSize { width, height }),
                _ => None,
            };
            Ok(DetectionDocument {
                detections: objects(response.blocks)?,
                image,
            })
        }
        Value::Array(items) => Ok(DetectionDocument {
            detections: from_array(items)?,
            image: None,
        }),
        other => Err(LayoutError::MalformedDetections(format!(
            "expected a list or an object, got {}",
            kind(&other)
        ))),
    }
}

enum Shape {
    Empty,
    Objects,
    Lines,
    Nested,
    Unexpected(&'static str),
}

fn from_array(items: Vec<Value>) -> Result<Vec<Detection>> {
    let shape = match items.first() {
        None => Shape::Empty,
        // no text found on the first image
        Some(Value::Null) => Shape::Empty,
        Some(Value::Object(_)) => Shape::Objects,
        Some(first @ Value::Array(_)) if is_line(first) => Shape::Lines,
        Some(Value::Array(_)) => Shape::Nested,
        Some(other) => Shape::Unexpected(kind(other)),
    };
    match shape {
        Shape::Empty => Ok(Vec::new()),
        Shape::Objects => objects(items),
        Shape::Lines => lines(items),
        Shape::Nested => match items.into_iter().next() {
            Some(Value::Array(page)) => from_array(page),
            _ => Ok(Vec::new()),
        },
        Shape::Unexpected(what) => Err(LayoutError::MalformedDetections(format!(
            "unexpected list entry: {what}"
        ))),
    }
}

fn objects(items: Vec<Value>) -> Result<Vec<Detection>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| LayoutError::invalid_input(index, e.to_string()))
        })
        .collect()
}

/// `[polygon, [text, confidence]]`
fn is_line(value: &Value) -> bool {
    match value.as_array().map(Vec::as_slice) {
        Some([_, Value::Array(rec)]) => matches!(rec.first(), Some(Value::String(_))),
        _ => false,
    }
}

fn lines(items: Vec<Value>) -> Result<Vec<Detection>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| line(index, item))
        .collect()
}

fn line(index: usize, item: Value) -> Result<Detection> {
    let Value::Array(mut parts) = item else {
        return Err(LayoutError::invalid_input(index, "line is not a list"));
    };
    if parts.len() != 2 {
        return Err(LayoutError::invalid_input(
            index,
            format!("line needs [box, [text, confidence]], got {} parts", parts.len()),
        ));
    }
    let rec = parts.pop().unwrap_or(Value::Null);
    let geometry = parts.pop().unwrap_or(Value::Null);

    let bbox: Geometry = serde_json::from_value(geometry)
        .map_err(|e| LayoutError::invalid_input(index, format!("bad box: {e}")))?;
    let (text, confidence): (String, f64) = serde_json::from_value(rec)
        .map_err(|e| LayoutError::invalid_input(index, format!("bad recognition: {e}")))?;
    Ok(Detection {
        bbox,
        text,
        confidence,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
