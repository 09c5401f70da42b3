//! Source descriptors.
//!
//! A source is a named backend that can handle routed requests. Descriptors
//! are fixed at registration; availability lives in the router's state.

use serde::{Deserialize, Serialize};

use crate::health::state::HealthState;

/// Which adapter implementation serves a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Local simulator backed by the mock table. The baseline source.
    Mock,
    /// Public service; requests carry a client-identification header.
    Public,
    /// Training service; bearer credentials are captured and replayed.
    Training,
}

/// Static description of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub base_address: String,
    /// Lower is preferred.
    pub priority: u32,
    pub kind: AdapterKind,
}

impl SourceDescriptor {
    pub fn is_baseline(&self) -> bool {
        self.kind == AdapterKind::Mock
    }
}

/// Snapshot of a source for collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub base_address: String,
    pub priority: u32,
    pub available: bool,
    pub health: HealthState,
    pub current: bool,
}
