//! Startup orchestration: turn a validated config into a running router.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::{Adapter, AdapterError, HttpTransport, MockAdapter, PublicApiAdapter, TrainingServiceAdapter};
use crate::config::{LabConfig, SessionConfig};
use crate::mock::{MockStore, MockStoreError};
use crate::routing::{AdapterKind, Router, RouterError};
use crate::session::{SessionError, SessionStore, CLIENT_ID};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Mock(#[from] MockStoreError),

    #[error(transparent)]
    Transport(#[from] AdapterError),

    #[error(transparent)]
    Router(#[from] RouterError),
}

/// Open the session store, restoring it from disk when persistence is configured.
pub fn open_session(config: &SessionConfig) -> Result<SessionStore, SessionError> {
    match &config.persistence_path {
        Some(path) => SessionStore::load_from_file(path),
        None => Ok(SessionStore::new(None)),
    }
}

/// The installation's client id, generated on first use.
pub fn ensure_client_id(session: &SessionStore) -> String {
    if let Some(id) = session.get(CLIENT_ID) {
        return id;
    }
    let id = uuid::Uuid::new_v4().to_string();
    session.set(CLIENT_ID, id.clone());
    id
}

/// Build every adapter named by `config` and register them with a router.
pub fn build_router(config: &LabConfig, session: SessionStore) -> Result<Router, StartupError> {
    let rules = config.mock.key_rules();
    let store = match &config.mock.entries_path {
        Some(path) => MockStore::load(path, rules)?,
        None => MockStore::builtin(rules)?,
    };
    let store = Arc::new(store);
    let transport = HttpTransport::new(Duration::from_secs(config.timeouts.transfer_secs))?;
    let client_id = ensure_client_id(&session);

    let mut adapters: HashMap<String, Arc<dyn Adapter>> = HashMap::new();
    for source in &config.sources {
        let adapter: Arc<dyn Adapter> = match source.adapter {
            AdapterKind::Mock => Arc::new(MockAdapter::new(&source.key, store.clone(), config.mock.delay())),
            AdapterKind::Public => Arc::new(PublicApiAdapter::new(
                &source.key,
                &source.base_address,
                transport.clone(),
                client_id.clone(),
                &config.session.client_id_header,
            )),
            AdapterKind::Training => Arc::new(TrainingServiceAdapter::new(
                &source.key,
                &source.base_address,
                transport.clone(),
                session.clone(),
                &config.session.token_header,
            )),
        };
        adapters.insert(source.key.clone(), adapter);
    }

    let descriptors = config.sources.iter().map(|s| s.descriptor()).collect();
    Ok(Router::new(descriptors, adapters, session)?)
}
