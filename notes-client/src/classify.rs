//! Turning failed calls into user-facing messages.
//!
//! The backend uses at least three error envelopes:
//! - a plain string `detail`
//! - a validation array `detail: [{loc, msg}, ...]`
//! - a stringified dict with single quotes inside `detail`, e.g.
//!   `"{'status': 'error', 'code': 'USER_NOT_FOUND', 'message': '...'}"`
//!
//! Everything here works on a JSON view of the error (see
//! [`crate::ApiError::to_value`]) and never panics, whatever the input.
//! The envelope grammar is inferred from observed payloads, so the
//! stringified-dict parsing is best effort.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// `detail` strings at least this long are treated as dumps (HTML error
/// pages, tracebacks) and never shown to the user.
pub const MAX_DETAIL_LEN: usize = 200;

static PY_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([:\[,]\s*)(True|False|None)\b").expect("literal pattern is valid")
});

static MESSAGE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""message"\s*:\s*""#).expect("message pattern is valid"));

/// A machine-readable error recovered from a backend payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredApiError {
    pub status: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl StructuredApiError {
    fn from_object(map: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            status: scalar_text(map.get("status")?)?,
            code: scalar_text(map.get("code")?)?,
            message: scalar_text(map.get("message")?)?,
            data: map.get("data").filter(|d| !d.is_null()).cloned(),
        })
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Rewrites a Python-repr style dict into JSON text.
///
/// Single quotes become double quotes, `True`/`False`/`None` in value
/// position become JSON literals, and quotes left inside the `message` value
/// are escaped.
#[must_use]
pub fn normalize_envelope(raw: &str) -> String {
    let quoted = raw.replace('\'', "\"");
    let literals = PY_LITERAL.replace_all(&quoted, |caps: &regex::Captures<'_>| {
        let literal = match &caps[2] {
            "True" => "true",
            "False" => "false",
            _ => "null",
        };
        format!("{}{}", &caps[1], literal)
    });
    escape_message_quotes(&literals)
}

fn escape_message_quotes(text: &str) -> String {
    let Some(open) = MESSAGE_OPEN.find(text) else {
        return text.to_string();
    };
    let body_start = open.end();
    let body = &text[body_start..];

    // The value ends at the first quote followed by `}` or by `, "`.
    let close = body.char_indices().filter(|&(_, c)| c == '"').find_map(|(i, _)| {
        let rest = body[i + 1..].trim_start();
        let ends = rest.starts_with('}')
            || rest
                .strip_prefix(',')
                .is_some_and(|after| after.trim_start().starts_with('"'));
        ends.then_some(i)
    });
    let Some(close) = close else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len() + 8);
    out.push_str(&text[..body_start]);
    let mut escaped = false;
    for c in body[..close].chars() {
        if c == '"' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out.push_str(&body[close..]);
    out
}

fn text_of(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn parse_candidate(candidate: &Value) -> Option<StructuredApiError> {
    match candidate {
        Value::Object(map) => StructuredApiError::from_object(map),
        Value::String(text) => {
            let trimmed = text.trim();
            if !trimmed.starts_with('{') {
                return None;
            }
            let parsed = serde_json::from_str::<Value>(trimmed)
                .or_else(|_| serde_json::from_str::<Value>(&normalize_envelope(trimmed)))
                .ok()?;
            parsed.as_object().and_then(StructuredApiError::from_object)
        }
        _ => None,
    }
}

fn candidates(error: &Value) -> [Option<&Value>; 3] {
    [
        error.pointer("/response/data/detail"),
        error.get("detail"),
        error.get("message"),
    ]
}

/// Recovers a `{status, code, message, data?}` descriptor from an error.
///
/// Looks at `response.data.detail`, `detail` and `message` in that order and
/// returns the first that holds (or encodes) an object with `status`, `code`
/// and `message`. `None` means no structured error was found.
#[must_use]
pub fn extract_api_error(error: &Value) -> Option<StructuredApiError> {
    candidates(error).into_iter().flatten().find_map(parse_candidate)
}

/// True if [`extract_api_error`] finds a descriptor.
#[must_use]
pub fn is_structured_api_error(error: &Value) -> bool {
    extract_api_error(error).is_some()
}

/// Error code from the structured descriptor, if any.
#[must_use]
pub fn api_error_code(error: &Value) -> Option<String> {
    extract_api_error(error).map(|e| e.code)
}

/// Extra data from the structured descriptor, if any.
#[must_use]
pub fn api_error_data(error: &Value) -> Option<Value> {
    extract_api_error(error).and_then(|e| e.data)
}

/// Best human-readable message for `error`, or `fallback`.
#[must_use]
pub fn api_error_message(error: &Value, fallback: &str) -> String {
    if let Some(structured) = extract_api_error(error) {
        return structured.message;
    }

    let plain = text_of(error.pointer("/response/data/detail"))
        .filter(|d| d.chars().count() < MAX_DETAIL_LEN)
        .or_else(|| text_of(error.pointer("/response/data/message")))
        .or_else(|| text_of(error.get("detail")))
        .or_else(|| text_of(error.get("message")));
    if let Some(message) = plain {
        return message.to_string();
    }

    let detail_list = [error.pointer("/response/data/detail"), error.get("detail")]
        .into_iter()
        .flatten()
        .filter_map(Value::as_array)
        .find_map(|items| format_validation_detail(items));
    if let Some(message) = detail_list {
        return message;
    }

    let field_map = [error.pointer("/response/data/errors"), error.get("errors")]
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .map(format_validation_errors)
        .find(|m| !m.is_empty());
    if let Some(message) = field_map {
        return message;
    }

    fallback.to_string()
}

/// Joins `[{loc: [...], msg}]` entries as `"a.b: msg, c: msg"`.
///
/// Returns `None` when no entry has a `msg`.
#[must_use]
pub fn format_validation_detail(items: &[Value]) -> Option<String> {
    let parts: Vec<String> = items
        .iter()
        .filter_map(|item| {
            let msg = item.get("msg").and_then(Value::as_str)?;
            let loc = item
                .get("loc")
                .and_then(Value::as_array)
                .map(|segments| {
                    segments
                        .iter()
                        .filter_map(scalar_text)
                        .collect::<Vec<_>>()
                        .join(".")
                })
                .unwrap_or_default();
            Some(if loc.is_empty() {
                msg.to_string()
            } else {
                format!("{loc}: {msg}")
            })
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// Joins a field → messages map as `"field: m1, m2"` lines.
///
/// Only fields mapped to a list of strings count; anything else is skipped.
#[must_use]
pub fn format_validation_errors(errors: &Map<String, Value>) -> String {
    errors
        .iter()
        .filter_map(|(field, messages)| {
            let texts = messages
                .as_array()?
                .iter()
                .map(Value::as_str)
                .collect::<Option<Vec<&str>>>()?;
            if texts.is_empty() {
                return None;
            }
            Some(format!("{field}: {}", texts.join(", ")))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Best human-readable confirmation from a success payload, or `fallback`.
#[must_use]
pub fn api_success_message(response: &Value, fallback: &str) -> String {
    ["message", "detail", "success"]
        .iter()
        .find_map(|key| response.get(*key).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map_or_else(|| fallback.to_string(), str::to_string)
}
