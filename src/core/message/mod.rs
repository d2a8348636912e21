//! Message processing: payload classification, normalization, and extraction.
//!
//! The chat service overloads its response shape — sometimes a bare string,
//! sometimes a fielded record, sometimes a survey-progress record carrying
//! `competency_status` plus auxiliary fields. Everything here is a total
//! function over that raw JSON: classify once at the boundary, normalize to a
//! display string exactly once, and derive options/images from the result.

mod image;
mod options;

pub use image::{ImageRef, contains_image, direct_view_url, drive_file_id, extract_image};
pub use options::{option_input_value, parse_options};

use serde_json::{Map, Value};

/// Fallback shown when a payload cannot be serialized for display.
pub const COMPLEX_OBJECT_FALLBACK: &str = "[complex object]";

/// Survey progress reported in the `competency_status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompetencyStatus {
    InProgress,
    Complete,
    /// Anything else the service might send; treated as metadata-only.
    Unknown,
}

impl CompetencyStatus {
    fn parse(raw: &str) -> Self {
        match raw {
            "in progress" => Self::InProgress,
            "complete" => Self::Complete,
            _ => Self::Unknown,
        }
    }
}

/// A survey-progress record: `competency_status` plus auxiliary fields.
#[derive(Debug, Clone, Copy)]
pub struct Survey<'a> {
    pub status: CompetencyStatus,
    pub level: Option<&'a str>,
    pub score: Option<&'a str>,
    /// Raw `message` value, if any. Normalize before display.
    pub message: Option<&'a Value>,
}

/// Classified response payload. The service guarantees no schema, so every
/// JSON value lands in exactly one arm and downstream matching is exhaustive.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// JSON null (or a missing body).
    Absent,
    /// A bare string reply.
    PlainText(&'a str),
    /// An object without `competency_status`.
    Fielded(&'a Map<String, Value>),
    /// An object with `competency_status`.
    Survey(Survey<'a>),
    /// Any other value (number, bool, array).
    Scalar(&'a Value),
}

impl<'a> Payload<'a> {
    /// Classify a raw response body. Total: never fails, never panics.
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Null => Payload::Absent,
            Value::String(s) => Payload::PlainText(s),
            Value::Object(map) => match map.get("competency_status") {
                Some(status) => Payload::Survey(Survey {
                    status: CompetencyStatus::parse(status.as_str().unwrap_or_default()),
                    level: map.get("level").and_then(Value::as_str),
                    score: map.get("score").and_then(Value::as_str),
                    message: map.get("message"),
                }),
                None => Payload::Fielded(map),
            },
            other => Payload::Scalar(other),
        }
    }
}

/// Canonicalize an arbitrary payload into a display string.
///
/// Null becomes empty, strings pass through unchanged, objects yield the first
/// present field among `text`/`content`/`message` (re-normalized when the
/// field itself is not a string) or their pretty-printed form, and everything
/// else falls back to its string representation. Total by construction: this
/// sits upstream of all rendering, so every input has a defined output.
pub fn normalize(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            for key in ["text", "content", "message"] {
                if let Some(inner) = map.get(key) {
                    return match inner {
                        Value::String(s) => s.clone(),
                        other => normalize(other),
                    };
                }
            }
            pretty(value)
        }
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) => pretty(value),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| COMPLEX_OBJECT_FALLBACK.to_string())
}

/// Whether a response carries prose to show, as opposed to pure state
/// metadata. True when the response has a `message` field with any value, is
/// itself a string, or is an object lacking `competency_status`.
pub fn has_displayable_message(response: &Value) -> bool {
    match Payload::classify(response) {
        Payload::Absent | Payload::Scalar(_) => false,
        Payload::PlainText(_) | Payload::Fielded(_) => true,
        Payload::Survey(survey) => survey.message.is_some(),
    }
}

/// Extract the displayable message from a response, already normalized.
///
/// Priority: explicit `message` field, then the response itself if a string,
/// then the whole record when it lacks `competency_status`, else empty. This
/// is the single normalization pass — callers render the result as-is.
pub fn extract_message(response: &Value) -> String {
    match Payload::classify(response) {
        Payload::Absent | Payload::Scalar(_) => String::new(),
        Payload::PlainText(s) => s.to_string(),
        Payload::Survey(survey) => survey.message.map(normalize).unwrap_or_default(),
        Payload::Fielded(map) => match map.get("message") {
            Some(inner) => normalize(inner),
            None => normalize(response),
        },
    }
}
