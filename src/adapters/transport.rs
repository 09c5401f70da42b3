//! Shared HTTP transport for network-backed adapters.

use reqwest::Method;
use std::time::Duration;
use url::Url;

use crate::adapters::{AdapterError, RawBody, RawResponse};
use crate::http::ApiRequest;

/// Thin wrapper over a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Transport(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    /// Send a prepared request. The url must already be absolute.
    pub async fn send(&self, request: &ApiRequest) -> Result<RawResponse, AdapterError> {
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| AdapterError::InvalidMethod(request.method.clone()))?;
        let url = Url::parse(&request.url).map_err(|e| AdapterError::InvalidUrl {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AdapterError::Body(e.to_string()))?;

        let body = if bytes.is_empty() {
            RawBody::Empty
        } else {
            RawBody::Text(String::from_utf8_lossy(&bytes).into_owned())
        };

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().map(str::to_string),
            headers,
            body,
        })
    }

    /// GET `url`; any answer below 500 counts as reachable.
    pub async fn probe(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => {
                let reachable = !response.status().is_server_error();
                if !reachable {
                    tracing::warn!(url = %url, status = %response.status(), "Probe failed: server error");
                }
                reachable
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Probe failed: connection error");
                false
            }
        }
    }

    fn classify(&self, error: reqwest::Error) -> AdapterError {
        if error.is_timeout() {
            AdapterError::Timeout(self.timeout)
        } else {
            AdapterError::Transport(error.to_string())
        }
    }
}
