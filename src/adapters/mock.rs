//! Baseline adapter backed by the mock table.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{normalize, Adapter, AdapterError, RawResponse};
use crate::http::{ApiRequest, ApiResponse};
use crate::mock::MockStore;

/// Artificial latency applied before each mocked response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockDelay {
    pub base: Duration,
    pub jitter: Duration,
}

impl MockDelay {
    pub fn none() -> Self {
        Self {
            base: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Base delay plus a uniformly drawn jitter.
    pub fn sample(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = if jitter_ms > 0 { fastrand::u64(0..=jitter_ms) } else { 0 };
        self.base + Duration::from_millis(extra)
    }
}

/// Local simulator. Never performs network transport and never fails.
#[derive(Debug)]
pub struct MockAdapter {
    key: String,
    store: Arc<MockStore>,
    delay: MockDelay,
}

impl MockAdapter {
    pub fn new(key: impl Into<String>, store: Arc<MockStore>, delay: MockDelay) -> Self {
        Self {
            key: key.into(),
            store,
            delay,
        }
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    fn key(&self) -> &str {
        &self.key
    }

    fn process_request(&self, request: &ApiRequest) -> ApiRequest {
        request.clone()
    }

    fn process_response(&self, raw: RawResponse) -> ApiResponse {
        normalize(raw)
    }

    async fn transfer(&self, request: ApiRequest) -> Result<RawResponse, AdapterError> {
        let delay = self.delay.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.store.respond(&request, Utc::now()).into())
    }
}
