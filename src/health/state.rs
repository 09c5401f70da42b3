//! Source availability state machine.
//!
//! # States
//! - Unknown: never probed; counted as available
//! - Healthy: receives traffic
//! - Unhealthy: excluded from selection
//!
//! # State Transitions
//! ```text
//! * → Unhealthy: consecutive failed probes >= unhealthy_threshold
//! * → Healthy:   consecutive good probes   >= healthy_threshold
//! ```
//!
//! Counters reset on every opposite result, so thresholds above one add
//! hysteresis against flapping.

use serde::Serialize;

/// Health state of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Unknown,
    Healthy,
    Unhealthy,
}

/// Consecutive-result thresholds for flipping availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub healthy: u32,
    pub unhealthy: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { healthy: 1, unhealthy: 1 }
    }
}

/// Availability bookkeeping for one source.
#[derive(Debug, Clone)]
pub struct SourceHealth {
    state: HealthState,
    consecutive_failures: u32,
    consecutive_successes: u32,
}

impl Default for SourceHealth {
    fn default() -> Self {
        Self {
            state: HealthState::Unknown,
            consecutive_failures: 0,
            consecutive_successes: 0,
        }
    }
}

impl SourceHealth {
    pub fn state(&self) -> HealthState {
        self.state
    }

    pub fn is_available(&self) -> bool {
        self.state != HealthState::Unhealthy
    }

    /// Record one probe result. Returns the new availability if it changed.
    pub fn record(&mut self, healthy: bool, thresholds: Thresholds) -> Option<bool> {
        let was_available = self.is_available();

        if healthy {
            self.consecutive_failures = 0;
            self.consecutive_successes = self.consecutive_successes.saturating_add(1);
            if self.state != HealthState::Healthy && self.consecutive_successes >= thresholds.healthy {
                self.state = HealthState::Healthy;
            }
        } else {
            self.consecutive_successes = 0;
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            if self.state != HealthState::Unhealthy && self.consecutive_failures >= thresholds.unhealthy {
                self.state = HealthState::Unhealthy;
            }
        }

        let available = self.is_available();
        (available != was_available).then_some(available)
    }

    /// Force a state, bypassing thresholds. Returns the new availability if it changed.
    pub fn force(&mut self, available: bool) -> Option<bool> {
        let was_available = self.is_available();
        self.consecutive_failures = 0;
        self.consecutive_successes = 0;
        self.state = if available { HealthState::Healthy } else { HealthState::Unhealthy };
        (available != was_available).then_some(available)
    }
}
