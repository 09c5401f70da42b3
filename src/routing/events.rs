//! Notifications emitted to progress and UI collaborators.

use serde::Serialize;

use crate::http::ApiRequest;

/// Something collaborators may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RouterEvent {
    /// A request for `task_id` was routed; the request is the learner's current solution.
    #[serde(rename_all = "camelCase")]
    SolutionSaved { task_id: String, request: ApiRequest },
    /// The attempt for `task_id` completed with `status`.
    #[serde(rename_all = "camelCase")]
    AttemptUpdated { task_id: String, status: u16 },
    /// A source's availability flipped.
    AvailabilityChanged { key: String, available: bool },
    /// The current source changed.
    SourceSwitched { previous: String, current: String },
}
