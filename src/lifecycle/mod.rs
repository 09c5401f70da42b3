//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Session restore → Mock table → Adapters → Router
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast → health monitor and API server stop → session saved
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Every long-running task subscribes to the same shutdown broadcast

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{build_router, open_session, StartupError};
