//! Placeholder templating for mock bodies.
//!
//! A top-level string field whose whole value is `"{name}"` is a placeholder.
//! `{currentDate}` resolves to the current instant; any other name copies the
//! same-named field of the request body, or stays untouched when absent.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Placeholder resolved to the current instant.
pub const CURRENT_DATE: &str = "currentDate";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\{([^{}]+)\}$").expect("placeholder pattern is valid"))
}

/// Extract `name` from a value of the form `"{name}"`.
pub fn placeholder_name(value: &str) -> Option<&str> {
    placeholder_pattern()
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Timestamp format used for `{currentDate}` (RFC 3339, millisecond precision, `Z`).
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Substitute placeholders in the top-level string fields of `body`.
///
/// Non-object bodies and nested values are left alone.
pub fn resolve_placeholders(body: &mut Value, request_body: Option<&Value>, now: DateTime<Utc>) {
    let Some(fields) = body.as_object_mut() else {
        return;
    };
    let source = request_body.and_then(Value::as_object);

    for value in fields.values_mut() {
        let replacement = match value.as_str().and_then(placeholder_name) {
            Some(CURRENT_DATE) => Some(Value::String(format_timestamp(now))),
            Some(name) => source.and_then(|s| s.get(name)).cloned(),
            None => None,
        };
        if let Some(replacement) = replacement {
            *value = replacement;
        }
    }
}
