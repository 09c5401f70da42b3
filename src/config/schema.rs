//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the TOML file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::MockDelay;
use crate::health::state::Thresholds;
use crate::mock::KeyRules;
use crate::routing::source::{AdapterKind, SourceDescriptor};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LabConfig {
    /// Sources in registration order (ties in priority go to the earlier one).
    pub sources: Vec<SourceConfig>,

    /// Health probe settings.
    pub health_check: HealthCheckConfig,

    /// Mock engine settings.
    pub mock: MockConfig,

    /// Session storage and credential handling.
    pub session: SessionConfig,

    /// Local JSON API settings.
    pub api: ApiConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                SourceConfig {
                    key: "mock".to_string(),
                    display_name: "Local simulator".to_string(),
                    description: "Built-in mock API; always available".to_string(),
                    base_address: String::new(),
                    priority: 3,
                    adapter: AdapterKind::Mock,
                },
                SourceConfig {
                    key: "public".to_string(),
                    display_name: "Public demo API".to_string(),
                    description: "A public REST service for practice".to_string(),
                    base_address: "https://jsonplaceholder.typicode.com".to_string(),
                    priority: 2,
                    adapter: AdapterKind::Public,
                },
                SourceConfig {
                    key: "training".to_string(),
                    display_name: "Training server".to_string(),
                    description: "Course training service with authentication".to_string(),
                    base_address: "http://localhost:3000".to_string(),
                    priority: 1,
                    adapter: AdapterKind::Training,
                },
            ],
            health_check: HealthCheckConfig::default(),
            mock: MockConfig::default(),
            session: SessionConfig::default(),
            api: ApiConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// One source definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Unique source identifier.
    pub key: String,

    /// Label shown to the learner.
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    /// Base address prefixed to relative urls (unused by the mock adapter).
    #[serde(default)]
    pub base_address: String,

    /// Failover priority (lower = preferred).
    #[serde(default)]
    pub priority: u32,

    /// Adapter implementation serving this source.
    pub adapter: AdapterKind,
}

impl SourceConfig {
    pub fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor {
            key: self.key.clone(),
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            base_address: self.base_address.clone(),
            priority: self.priority,
            kind: self.adapter,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable periodic probes.
    pub enabled: bool,

    /// Probe interval in seconds.
    pub interval_secs: u64,

    /// Probe timeout in seconds.
    pub timeout_secs: u64,

    /// Path probed relative to each source's base address.
    pub path: String,

    /// Consecutive failed probes before a source is marked unavailable.
    pub unhealthy_threshold: u32,

    /// Consecutive good probes before a source is marked available again.
    pub healthy_threshold: u32,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            timeout_secs: 5,
            path: "/".to_string(),
            unhealthy_threshold: 1,
            healthy_threshold: 1,
        }
    }
}

impl HealthCheckConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            healthy: self.healthy_threshold,
            unhealthy: self.unhealthy_threshold,
        }
    }
}

/// Mock engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MockConfig {
    /// Fixed artificial delay in milliseconds.
    pub delay_ms: u64,

    /// Random extra delay, up to this many milliseconds.
    pub jitter_ms: u64,

    /// Entry table to load instead of the built-in one.
    pub entries_path: Option<PathBuf>,

    /// Url prefixes whose keys are extended with the credential.
    pub protected_prefixes: Vec<String>,

    /// Header carrying the credential.
    pub auth_header: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        let rules = KeyRules::default();
        Self {
            delay_ms: 300,
            jitter_ms: 200,
            entries_path: None,
            protected_prefixes: rules.protected_prefixes,
            auth_header: rules.auth_header,
        }
    }
}

impl MockConfig {
    pub fn key_rules(&self) -> KeyRules {
        KeyRules {
            protected_prefixes: self.protected_prefixes.clone(),
            auth_header: self.auth_header.clone(),
        }
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay {
            base: Duration::from_millis(self.delay_ms),
            jitter: Duration::from_millis(self.jitter_ms),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// JSON file the session is persisted to. In-memory only when unset.
    pub persistence_path: Option<PathBuf>,

    /// Header carrying the client id on public-service requests.
    pub client_id_header: String,

    /// Response header a training backend returns its credential in.
    pub token_header: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            persistence_path: None,
            client_id_header: "X-Client-Id".to_string(),
            token_header: "Authorization".to_string(),
        }
    }
}

/// Local JSON API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Bind address (e.g., "127.0.0.1:7878").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:7878".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outbound transfer timeout for network-backed adapters, in seconds.
    pub transfer_secs: u64,

    /// Total time allowed for one local API request, in seconds.
    pub api_request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            transfer_secs: 15,
            api_request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
