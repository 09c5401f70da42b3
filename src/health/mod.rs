//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active probes (active.rs):
//!     Periodic timer
//!     → Probe every non-baseline source concurrently
//!     → Each result applied as it settles
//!     → state.rs (threshold state machine)
//!     → Router re-validates the current source
//! ```
//!
//! # Design Decisions
//! - Only probes change availability; a failed dispatch does not
//! - Probes never hold the router lock while waiting on the network
//! - The baseline source is never probed

pub mod active;
pub mod state;

pub use active::HealthMonitor;
pub use state::{HealthState, SourceHealth, Thresholds};
