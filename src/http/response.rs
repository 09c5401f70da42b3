//! Canonical response shape.
//!
//! Every adapter normalizes its native transfer result into `ApiResponse`
//! before handing it back to the router. Failures that never reached a
//! backend are synthesized here too, so callers only ever see this shape.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A normalized response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Create a response with the standard reason phrase for `status`.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            status_text: status_text(status).to_string(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// A `500` standing in for a dispatch that failed before a backend answered.
    pub fn transport_failure(source: &str, error: &dyn std::fmt::Display) -> Self {
        Self::new(500).with_body(json!({
            "error": "Request failed",
            "message": error.to_string(),
            "source": source,
        }))
    }
}

/// Canonical reason phrase for `status`, empty for unregistered codes.
pub fn status_text(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}
