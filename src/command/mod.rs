//! Diagram construction commands and their interpreter.
//!
//! DESIGN
//! ======
//! A command is one JSON object from the construction stream, tagged by its
//! `command` field. Decoding is lenient about numbers: the generator emits
//! `120`, `"120"` and occasionally nothing at all, so geometry fields decode
//! to `f64` with NaN standing in for "absent or unusable". Whether a NaN is
//! fatal for the command is the interpreter's decision, not the decoder's.
//! Ids and labels get the same treatment: null reads as empty and a bare
//! number or bool reads as its text, so `"id": 7` still names element `7`.
//! Only a nested array or object in one of those fields is malformed.

pub mod interpret;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use interpret::{apply, execute};

use crate::error::ErrorCode;
use crate::model::{ElementId, ModelError};

/// Node type used when an `addShape` omits `type`.
pub const DEFAULT_SHAPE_TYPE: &str = "bpmn:Task";

const KNOWN_COMMANDS: [&str; 3] = ["createLane", "addShape", "addConnection"];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum DiagramCommand {
    CreateLane(CreateLane),
    AddShape(AddShape),
    AddConnection(AddConnection),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLane {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(default = "not_a_number", deserialize_with = "lenient_f64")]
    pub x: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_f64")]
    pub y: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_f64")]
    pub width: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_f64")]
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddShape {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "type", default = "default_shape_type", deserialize_with = "lenient_shape_type")]
    pub type_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_step")]
    pub step_number: Option<u32>,
    /// Id of the owning lane; the pool when absent or unknown.
    #[serde(default, alias = "parentId", deserialize_with = "lenient_parent")]
    pub parent: Option<ElementId>,
    #[serde(default = "not_a_number", deserialize_with = "lenient_f64")]
    pub x: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_f64")]
    pub y: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_f64")]
    pub width: f64,
    #[serde(default = "not_a_number", deserialize_with = "lenient_f64")]
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddConnection {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source_id: ElementId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub target_id: ElementId,
}

/// What a successfully applied command changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    LaneCreated { id: ElementId },
    ShapeCreated { id: ElementId, parent: Option<ElementId> },
    ConnectionCreated { id: ElementId, source: ElementId, target: ElementId },
}

impl Mutation {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::LaneCreated { id } | Self::ShapeCreated { id, .. } | Self::ConnectionCreated { id, .. } => id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("malformed command: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("invalid coordinates for {id}")]
    InvalidCoordinates { id: String },
    #[error("could not connect '{source_id}' to '{target_id}': one or both elements not found")]
    EndpointMissing { source_id: ElementId, target_id: ElementId },
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl ErrorCode for CommandError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unknown(_) => "E_UNKNOWN_COMMAND",
            Self::Malformed(_) => "E_MALFORMED_COMMAND",
            Self::InvalidCoordinates { .. } => "E_INVALID_COORDINATES",
            Self::EndpointMissing { .. } => "E_ENDPOINT_MISSING",
            Self::Model(e) => e.error_code(),
        }
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode one sanitized JSON object into a command.
///
/// # Errors
///
/// Returns `Unknown` when the `command` tag is missing or unrecognised and
/// `Malformed` when a known command has fields of the wrong shape.
pub fn decode(value: Value) -> Result<DiagramCommand, CommandError> {
    let tag = value.get("command").and_then(Value::as_str).unwrap_or_default();
    if !KNOWN_COMMANDS.contains(&tag) {
        return Err(CommandError::Unknown(tag.to_string()));
    }
    serde_json::from_value(value).map_err(CommandError::Malformed)
}

fn not_a_number() -> f64 {
    f64::NAN
}

fn default_shape_type() -> String {
    DEFAULT_SHAPE_TYPE.to_string()
}

/// Scalars as text; null reads as empty. Arrays and objects are rejected.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    text_from_value(&value).ok_or_else(|| <D::Error as serde::de::Error>::custom(format!("expected a string, found {value}")))
}

fn lenient_shape_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let type_name = lenient_string(deserializer)?;
    Ok(if type_name.is_empty() { default_shape_type() } else { type_name })
}

fn lenient_parent<'de, D>(deserializer: D) -> Result<Option<ElementId>, D::Error>
where
    D: Deserializer<'de>,
{
    let parent = lenient_string(deserializer)?;
    Ok((!parent.is_empty()).then_some(parent))
}

fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Accept JSON numbers, numeric strings (leading-number prefix like
/// `"120px"`) and null. Anything unusable becomes NaN.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_step<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let step = number_from_value(&value);
    if step.is_finite() && step >= 0.0 && step <= f64::from(u32::MAX) {
        Ok(Some(step.round() as u32))
    } else {
        Ok(None)
    }
}

pub(crate) fn number_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_leading_float(s),
        _ => f64::NAN,
    }
}

/// Parse the longest numeric prefix of `raw`, ignoring leading whitespace.
pub(crate) fn parse_leading_float(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while let Some(&b) = bytes.get(end) {
        if b.is_ascii_digit() {
            seen_digit = true;
        } else if b == b'.' && !seen_dot {
            seen_dot = true;
        } else {
            break;
        }
        end += 1;
    }
    if !seen_digit {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits = bytes[exp_end.min(bytes.len())..].iter().take_while(|b| b.is_ascii_digit()).count();
        if digits > 0 {
            end = exp_end + digits;
        }
    }
    trimmed[..end].parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
