//! Verification outcome.

use serde::Serialize;
use serde_json::Value;

/// One failed sub-check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "camelCase")]
pub enum Mismatch {
    Method { expected: String, actual: String },
    Url { expected: String, actual: String },
    MissingHeader { name: String },
    Header { name: String, expected: String, actual: String },
    MissingBodyField { field: String },
    BodyField { field: String, expected: Value, actual: Value },
    Status { expected: u16, actual: u16 },
    ResponseHeader { name: String, expected: String, actual: Option<String> },
    Body { expected: Value, actual: Option<Value> },
    MissingPath { path: String },
    PathValue { path: String, expected: Value, actual: Value },
}

/// Result of a check: passed iff no mismatches were found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub passed: bool,
    pub failures: Vec<Mismatch>,
}

impl Verdict {
    pub fn from_failures(failures: Vec<Mismatch>) -> Self {
        Self {
            passed: failures.is_empty(),
            failures,
        }
    }

    pub fn pass() -> Self {
        Self::from_failures(Vec::new())
    }
}
