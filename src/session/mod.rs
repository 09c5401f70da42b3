//! Session-scoped key/value storage.
//!
//! Holds the state that must survive across requests within a session:
//! the selected source, captured bearer credentials, the client id.
//! Writers are last-writer-wins; when a persistence path is configured
//! every write is flushed to a JSON file so a restart resumes the session.

pub mod store;

pub use store::{SessionError, SessionStore};

/// Key holding the currently selected source.
pub const CURRENT_SOURCE: &str = "current_source";

/// Key holding this installation's client id.
pub const CLIENT_ID: &str = "client_id";

/// Key holding the bearer credential captured from `source`.
pub fn token_key(source: &str) -> String {
    format!("auth_token:{}", source)
}
