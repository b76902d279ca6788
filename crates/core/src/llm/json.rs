//! Best-effort extraction of structured JSON from free-text model output.
//!
//! Models are asked for bare JSON but regularly wrap it in markdown fences or prose.
//! Every failure surfaces as a single [`StructuredOutputError`].

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    Array,
}

impl Shape {
    fn open(self) -> char {
        match self {
            Shape::Object => '{',
            Shape::Array => '[',
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Shape::Object => value.is_object(),
            Shape::Array => value.is_array(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StructuredOutputError {
    pub expected: Shape,
    pub detail: String,
    pub raw_output: String,
}

impl fmt::Display for StructuredOutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model output has no usable JSON {:?}: {}",
            self.expected, self.detail
        )
    }
}

impl std::error::Error for StructuredOutputError {}

/// Returns the first well-formed JSON value of the requested shape in `text`.
///
/// Tried in order: the whole text, the body of a fenced block, then every opening
/// bracket of the right kind from left to right.
pub fn extract_json(text: &str, shape: Shape) -> Option<Value> {
    let trimmed = text.trim();
    if let Some(value) = parse_whole(trimmed, shape) {
        return Some(value);
    }

    if let Some(inner) = fenced_body(trimmed) {
        if let Some(value) = parse_whole(inner, shape) {
            return Some(value);
        }
    }

    for (idx, _) in trimmed.match_indices(shape.open()) {
        let mut stream = serde_json::Deserializer::from_str(&trimmed[idx..]).into_iter::<Value>();
        if let Some(Ok(value)) = stream.next() {
            if shape.matches(&value) {
                return Some(value);
            }
        }
    }

    None
}

/// Extracts the first JSON object and decodes it into `T`.
pub fn parse_object<T: DeserializeOwned>(text: &str) -> Result<T, StructuredOutputError> {
    let value = extract_json(text, Shape::Object).ok_or_else(|| StructuredOutputError {
        expected: Shape::Object,
        detail: "no JSON object found".to_string(),
        raw_output: text.to_string(),
    })?;
    serde_json::from_value::<T>(value).map_err(|e| StructuredOutputError {
        expected: Shape::Object,
        detail: e.to_string(),
        raw_output: text.to_string(),
    })
}

/// Extracts the first JSON array and returns its elements.
pub fn parse_array(text: &str) -> Result<Vec<Value>, StructuredOutputError> {
    match extract_json(text, Shape::Array) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(StructuredOutputError {
            expected: Shape::Array,
            detail: "no JSON array found".to_string(),
            raw_output: text.to_string(),
        }),
    }
}

fn parse_whole(text: &str, shape: Shape) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(|value| shape.matches(value))
}

fn fenced_body(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip the info string (```json).
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}
