//! Canonical request shape.
//!
//! # Responsibilities
//! - Carry the learner-composed request (method, url, headers, body)
//! - Answer the questions the mock engine and verifier ask of it
//!   (does the method carry a body, is the body empty, header lookup)
//!
//! # Design Decisions
//! - Requests are never mutated after construction; adapters clone first
//! - Headers keep the exact spelling the learner typed; lookups that
//!   model HTTP semantics go through `header()` (case-insensitive)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Methods that conventionally carry a request body.
pub const BODY_METHODS: [&str; 3] = ["POST", "PUT", "PATCH"];

/// Returns true for POST, PUT and PATCH (case-insensitive).
pub fn is_body_method(method: &str) -> bool {
    BODY_METHODS.iter().any(|m| m.eq_ignore_ascii_case(method))
}

/// A request as composed by the learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a request with no headers and no body.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Whether this request's method conventionally carries a body.
    pub fn carries_body(&self) -> bool {
        is_body_method(&self.method)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// True when the body is absent, null, or an empty string/object/array.
    pub fn body_is_empty(&self) -> bool {
        match &self.body {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Object(map)) => map.is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        }
    }

    /// Look up a top-level body field, if the body is an object.
    pub fn body_field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.as_object()).and_then(|m| m.get(name))
    }
}
