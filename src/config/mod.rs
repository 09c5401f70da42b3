//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LabConfig (validated, immutable)
//!     → startup builds sources, adapters and the mock table from it
//! ```
//!
//! # Design Decisions
//! - Loaded once at startup; sources are not re-derived at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ApiConfig, HealthCheckConfig, LabConfig, MockConfig, ObservabilityConfig, SessionConfig, SourceConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
