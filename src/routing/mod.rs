//! Source registry and routing.
//!
//! # Data Flow
//! ```text
//! route(request)
//!     → router.rs (read current source under the state lock)
//!     → adapter.dispatch (lock released across the suspend point)
//!     → ApiResponse (+ SolutionSaved / AttemptUpdated events)
//!
//! set_source / health probe result
//!     → router.rs (read-decide-write under one lock)
//!     → selection.rs (lowest priority among available, baseline last resort)
//!     → SourceSwitched / AvailabilityChanged events
//! ```
//!
//! # Design Decisions
//! - All mutable selection state lives in one `RouterState` behind one lock
//! - The baseline source is always a candidate; selection never strands
//! - A failed dispatch does not change availability; only probes do

pub mod events;
pub mod router;
pub mod selection;
pub mod source;

pub use events::RouterEvent;
pub use router::{Router, RouterError};
pub use source::{AdapterKind, SourceDescriptor, SourceInfo};
