//! Adapter for the training service.
//!
//! The service hands back a bearer credential in a response header (on
//! login). The adapter stores it in the session and attaches it to later
//! requests that don't carry their own `Authorization` header.

use async_trait::async_trait;

use crate::adapters::{normalize, resolve_url, Adapter, AdapterError, HttpTransport, RawResponse};
use crate::http::{ApiRequest, ApiResponse};
use crate::session::{token_key, SessionStore};

const AUTHORIZATION: &str = "Authorization";

#[derive(Debug)]
pub struct TrainingServiceAdapter {
    key: String,
    base_address: String,
    transport: HttpTransport,
    session: SessionStore,
    token_header: String,
}

impl TrainingServiceAdapter {
    pub fn new(
        key: impl Into<String>,
        base_address: impl Into<String>,
        transport: HttpTransport,
        session: SessionStore,
        token_header: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            base_address: base_address.into(),
            transport,
            session,
            token_header: token_header.into(),
        }
    }

    /// The credential captured for this source, if any.
    pub fn stored_token(&self) -> Option<String> {
        self.session.get(&token_key(&self.key))
    }
}

fn bearer(token: &str) -> String {
    if token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {}", token)
    }
}

#[async_trait]
impl Adapter for TrainingServiceAdapter {
    fn key(&self) -> &str {
        &self.key
    }

    fn process_request(&self, request: &ApiRequest) -> ApiRequest {
        let mut prepared = request.clone();
        prepared.url = resolve_url(&self.base_address, &request.url);
        if prepared.header(AUTHORIZATION).is_none() {
            if let Some(token) = self.stored_token() {
                prepared.headers.insert(AUTHORIZATION.to_string(), bearer(&token));
            }
        }
        prepared
    }

    fn process_response(&self, raw: RawResponse) -> ApiResponse {
        let token = raw
            .headers
            .iter()
            .find(|(name, value)| name.eq_ignore_ascii_case(&self.token_header) && !value.is_empty())
            .map(|(_, value)| value.clone());
        if let Some(token) = token {
            tracing::debug!(source = %self.key, "Captured credential from response");
            self.session.set(&token_key(&self.key), token);
        }
        normalize(raw)
    }

    async fn transfer(&self, request: ApiRequest) -> Result<RawResponse, AdapterError> {
        self.transport.send(&request).await
    }

    async fn probe(&self, path: &str) -> bool {
        self.transport.probe(&resolve_url(&self.base_address, path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RawBody;
    use std::time::Duration;

    fn adapter(session: SessionStore) -> TrainingServiceAdapter {
        let transport = HttpTransport::new(Duration::from_secs(1)).unwrap();
        TrainingServiceAdapter::new("training", "http://localhost:3000", transport, session, "Authorization")
    }

    #[test]
    fn test_captures_and_replays_token() {
        let session = SessionStore::default();
        let adapter = adapter(session.clone());

        let before = adapter.process_request(&ApiRequest::new("GET", "/api/profile"));
        assert!(before.header("Authorization").is_none());

        let raw = RawResponse {
            status: 200,
            status_text: None,
            headers: vec![("authorization".into(), "Bearer abc".into())],
            body: RawBody::Empty,
        };
        adapter.process_response(raw);
        assert_eq!(session.get("auth_token:training").as_deref(), Some("Bearer abc"));

        let after = adapter.process_request(&ApiRequest::new("GET", "/api/profile"));
        assert_eq!(after.url, "http://localhost:3000/api/profile");
        assert_eq!(after.header("Authorization"), Some("Bearer abc"));
    }

    #[test]
    fn test_explicit_authorization_not_overridden() {
        let session = SessionStore::default();
        session.set("auth_token:training", "abc");
        let adapter = adapter(session);

        let prepared = adapter.process_request(&ApiRequest::new("GET", "/x").with_header("authorization", "Bearer mine"));
        assert_eq!(prepared.header("Authorization"), Some("Bearer mine"));

        let prepared = adapter.process_request(&ApiRequest::new("GET", "/x"));
        assert_eq!(prepared.header("Authorization"), Some("Bearer abc"));
    }
}
