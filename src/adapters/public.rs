//! Adapter for a public HTTP service.
//!
//! Requests are absolutized against the source's base address and tagged
//! with a client-identification header so the service can attribute traffic.

use async_trait::async_trait;

use crate::adapters::{normalize, resolve_url, Adapter, AdapterError, HttpTransport, RawResponse};
use crate::http::{ApiRequest, ApiResponse};

#[derive(Debug)]
pub struct PublicApiAdapter {
    key: String,
    base_address: String,
    transport: HttpTransport,
    client_id: String,
    client_id_header: String,
}

impl PublicApiAdapter {
    pub fn new(
        key: impl Into<String>,
        base_address: impl Into<String>,
        transport: HttpTransport,
        client_id: impl Into<String>,
        client_id_header: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            base_address: base_address.into(),
            transport,
            client_id: client_id.into(),
            client_id_header: client_id_header.into(),
        }
    }
}

#[async_trait]
impl Adapter for PublicApiAdapter {
    fn key(&self) -> &str {
        &self.key
    }

    fn process_request(&self, request: &ApiRequest) -> ApiRequest {
        let mut prepared = request.clone();
        prepared.url = resolve_url(&self.base_address, &request.url);
        if prepared.header(&self.client_id_header).is_none() {
            prepared
                .headers
                .insert(self.client_id_header.clone(), self.client_id.clone());
        }
        prepared
    }

    fn process_response(&self, raw: RawResponse) -> ApiResponse {
        normalize(raw)
    }

    async fn transfer(&self, request: ApiRequest) -> Result<RawResponse, AdapterError> {
        self.transport.send(&request).await
    }

    async fn probe(&self, path: &str) -> bool {
        self.transport.probe(&resolve_url(&self.base_address, path)).await
    }
}
