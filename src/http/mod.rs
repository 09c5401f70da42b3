//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! UI collaborator (JSON over HTTP)
//!     → server.rs (axum handlers, request id, tracing, limits)
//!     → Router::route / set_source / verify::*
//!     → JSON reply
//! ```
//!
//! `request.rs` and `response.rs` hold the canonical shapes that flow
//! through routing, adapters and verification.

pub mod request;
pub mod response;
pub mod server;

pub use request::ApiRequest;
pub use response::ApiResponse;
pub use server::{build_app, ApiServer, AppState};
