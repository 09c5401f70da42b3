//! Mock response engine.
//!
//! # Data Flow
//! ```text
//! ApiRequest
//!     → key.rs (synthesize "<METHOD>:<url>[/<credential>][/empty]")
//!     → store.rs (lookup MockEntry, 404 echoing the key on miss)
//!     → template.rs (clone entry body, substitute "{field}" placeholders)
//!     → ApiResponse
//! ```
//!
//! # Design Decisions
//! - Entries are loaded once and never mutated; every hit is a deep clone
//! - Lookup is a pure function of the request plus the current instant
//! - The artificial delay lives in the mock adapter, not here

pub mod key;
pub mod store;
pub mod template;

pub use key::{synthesize_key, KeyRules};
pub use store::{MockEntry, MockStore, MockStoreError};
