//! API lab request routing and verification engine.

pub mod adapters;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod mock;
pub mod observability;
pub mod routing;
pub mod session;
pub mod verify;

pub use config::schema::LabConfig;
pub use http::{ApiRequest, ApiResponse, ApiServer};
pub use lifecycle::Shutdown;
pub use routing::Router;
