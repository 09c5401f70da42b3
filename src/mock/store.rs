//! Static mock entry table and lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

use crate::http::response::status_text;
use crate::http::{ApiRequest, ApiResponse};
use crate::mock::key::{synthesize_key, KeyRules};
use crate::mock::template::resolve_placeholders;

/// Entry table compiled into the binary.
const BUILTIN_ENTRIES: &str = include_str!("../../data/mock_entries.json");

/// A canned response template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockEntry {
    pub key: String,
    pub status: u16,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
}

/// Errors loading an entry table.
#[derive(Debug, Error)]
pub enum MockStoreError {
    #[error("failed to read mock entries: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid mock entry table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate mock entry key: {0}")]
    DuplicateKey(String),
}

/// Lookup table from synthesized key to entry.
#[derive(Debug, Clone)]
pub struct MockStore {
    entries: HashMap<String, MockEntry>,
    rules: KeyRules,
}

impl MockStore {
    /// Build a store from a list of entries. Keys must be unique.
    pub fn from_entries(entries: Vec<MockEntry>, rules: KeyRules) -> Result<Self, MockStoreError> {
        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            if map.contains_key(&entry.key) {
                return Err(MockStoreError::DuplicateKey(entry.key));
            }
            map.insert(entry.key.clone(), entry);
        }
        Ok(Self { entries: map, rules })
    }

    /// Parse a JSON array of entries.
    pub fn from_json(json: &str, rules: KeyRules) -> Result<Self, MockStoreError> {
        let entries: Vec<MockEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries, rules)
    }

    /// Load the entry table from a JSON file.
    pub fn load(path: &Path, rules: KeyRules) -> Result<Self, MockStoreError> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json(&content, rules)?;
        tracing::info!(path = ?path, entries = store.len(), "Loaded mock entries");
        Ok(store)
    }

    /// The table shipped with the crate.
    pub fn builtin(rules: KeyRules) -> Result<Self, MockStoreError> {
        Self::from_json(BUILTIN_ENTRIES, rules)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produce the mocked response for `request` as of `now`.
    ///
    /// A miss yields a `404` whose body echoes the synthesized key.
    pub fn respond(&self, request: &ApiRequest, now: DateTime<Utc>) -> ApiResponse {
        let key = synthesize_key(request, &self.rules);

        let Some(entry) = self.entries.get(&key) else {
            tracing::debug!(key = %key, "No mock entry");
            return ApiResponse::new(404).with_body(json!({
                "error": "Not found",
                "key": key,
            }));
        };

        let mut body = entry.body.clone();
        if request.carries_body() {
            if let Some(body) = body.as_mut() {
                resolve_placeholders(body, request.body.as_ref(), now);
            }
        }

        ApiResponse {
            status: entry.status,
            status_text: entry
                .status_text
                .clone()
                .unwrap_or_else(|| status_text(entry.status).to_string()),
            headers: entry.headers.clone(),
            body,
        }
    }
}
