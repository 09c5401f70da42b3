//! Backend adapters.
//!
//! # Data Flow
//! ```text
//! Router (current source)
//!     → Adapter::dispatch
//!         → process_request  (clone, absolutize url, inject headers)
//!         → transfer         (single suspend point: mock delay or network)
//!         → process_response (normalize into ApiResponse, capture tokens)
//!     → ApiResponse
//! ```
//!
//! # Design Decisions
//! - One concrete type per backend; the router resolves them by key
//! - The caller's request is never mutated; adapters work on a clone
//! - `dispatch` never fails: transport errors become a `500` tagged with the source

pub mod mock;
pub mod public;
pub mod training;
pub mod transport;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::http::response::status_text;
use crate::http::{ApiRequest, ApiResponse};

pub use mock::{MockAdapter, MockDelay};
pub use public::PublicApiAdapter;
pub use training::TrainingServiceAdapter;
pub use transport::HttpTransport;

/// Errors raised while transferring a request.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("invalid request method: {0}")]
    InvalidMethod(String),

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Body of a native transfer result.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    Empty,
    Json(Value),
    Text(String),
}

/// A backend's native transfer result, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: RawBody,
}

impl From<ApiResponse> for RawResponse {
    fn from(response: ApiResponse) -> Self {
        Self {
            status: response.status,
            status_text: Some(response.status_text),
            headers: response.headers.into_iter().collect(),
            body: response.body.map_or(RawBody::Empty, RawBody::Json),
        }
    }
}

/// Map a raw result into the canonical shape.
///
/// Text bodies are parsed as JSON when they can be, otherwise kept as a string.
pub fn normalize(raw: RawResponse) -> ApiResponse {
    let status_text = raw
        .status_text
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| status_text(raw.status).to_string());

    let body = match raw.body {
        RawBody::Empty => None,
        RawBody::Json(value) => Some(value),
        RawBody::Text(text) => Some(serde_json::from_str(&text).unwrap_or(Value::String(text))),
    };

    ApiResponse {
        status: raw.status,
        status_text,
        headers: raw.headers.into_iter().collect(),
        body: body.filter(|b| !b.is_null()),
    }
}

/// Prefix `url` with `base_address` unless it is already an absolute http(s) url.
pub fn resolve_url(base_address: &str, url: &str) -> String {
    let absolute = Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if absolute {
        return url.to_string();
    }

    let base = base_address.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{}{}", base, url)
    } else {
        format!("{}/{}", base, url)
    }
}

/// A request-handling backend.
///
/// The router enters through [`Adapter::try_dispatch`] so it can tell a
/// backend answer from a transport failure before emitting task events; it
/// then synthesizes the same `500` that [`Adapter::dispatch`] would.
/// `dispatch` is the infallible entry point for callers that only need a
/// response.
#[async_trait]
pub trait Adapter: Send + Sync + std::fmt::Debug {
    /// Key of the source this adapter serves.
    fn key(&self) -> &str;

    /// Prepare a transport-ready copy of `request`.
    fn process_request(&self, request: &ApiRequest) -> ApiRequest;

    /// Normalize a native result.
    fn process_response(&self, raw: RawResponse) -> ApiResponse;

    /// Perform the transfer of an already prepared request.
    async fn transfer(&self, request: ApiRequest) -> Result<RawResponse, AdapterError>;

    /// Whether the backend is reachable. Probes `path` relative to the backend.
    async fn probe(&self, _path: &str) -> bool {
        true
    }

    /// Prepare, transfer and normalize, surfacing transport errors. The router's entry point.
    async fn try_dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, AdapterError> {
        let prepared = self.process_request(request);
        let raw = self.transfer(prepared).await?;
        Ok(self.process_response(raw))
    }

    /// Like `try_dispatch`, but a failure becomes a synthesized `500`.
    async fn dispatch(&self, request: &ApiRequest) -> ApiResponse {
        match self.try_dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(source = %self.key(), error = %e, "Dispatch failed");
                ApiResponse::transport_failure(self.key(), &e)
            }
        }
    }
}
