//! The source registry and request router.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::adapters::Adapter;
use crate::health::state::{SourceHealth, Thresholds};
use crate::http::{ApiRequest, ApiResponse};
use crate::observability::metrics;
use crate::routing::events::RouterEvent;
use crate::routing::selection::preferred_source;
use crate::routing::source::{SourceDescriptor, SourceInfo};
use crate::session::{SessionStore, CURRENT_SOURCE};

const EVENT_CAPACITY: usize = 64;

/// Errors building a router.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("no baseline (mock) source registered")]
    MissingBaseline,

    #[error("more than one baseline source: {0} and {1}")]
    MultipleBaselines(String, String),

    #[error("duplicate source key: {0}")]
    DuplicateKey(String),

    #[error("no adapter registered for source: {0}")]
    MissingAdapter(String),
}

/// Mutable selection state.
#[derive(Debug)]
struct RouterState {
    current: usize,
    health: Vec<SourceHealth>,
}

/// Picks the backend for each request and keeps the current source valid.
#[derive(Debug)]
pub struct Router {
    sources: Vec<SourceDescriptor>,
    adapters: Vec<Arc<dyn Adapter>>,
    baseline: usize,
    state: Mutex<RouterState>,
    session: SessionStore,
    events: broadcast::Sender<RouterEvent>,
}

impl Router {
    /// Register `sources` in order, each served by the adapter under its key.
    ///
    /// The current source is restored from the session when it names a
    /// registered source; otherwise the baseline is selected.
    pub fn new(
        sources: Vec<SourceDescriptor>,
        mut adapters: HashMap<String, Arc<dyn Adapter>>,
        session: SessionStore,
    ) -> Result<Self, RouterError> {
        let mut seen = HashSet::new();
        let mut baseline: Option<usize> = None;
        let mut resolved = Vec::with_capacity(sources.len());

        for (i, source) in sources.iter().enumerate() {
            if !seen.insert(source.key.as_str()) {
                return Err(RouterError::DuplicateKey(source.key.clone()));
            }
            if source.is_baseline() {
                if let Some(first) = baseline {
                    return Err(RouterError::MultipleBaselines(sources[first].key.clone(), source.key.clone()));
                }
                baseline = Some(i);
            }
            let adapter = adapters
                .remove(&source.key)
                .ok_or_else(|| RouterError::MissingAdapter(source.key.clone()))?;
            resolved.push(adapter);
        }
        let baseline = baseline.ok_or(RouterError::MissingBaseline)?;

        let current = session
            .get(CURRENT_SOURCE)
            .and_then(|key| sources.iter().position(|s| s.key == key))
            .unwrap_or(baseline);

        tracing::info!(
            sources = sources.len(),
            baseline = %sources[baseline].key,
            current = %sources[current].key,
            "Router initialized"
        );

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let health = vec![SourceHealth::default(); sources.len()];

        Ok(Self {
            sources,
            adapters: resolved,
            baseline,
            state: Mutex::new(RouterState { current, health }),
            session,
            events,
        })
    }

    /// Subscribe to router notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Switch to `key` if it is known and available (the baseline always is).
    ///
    /// Otherwise falls back to [`Router::auto_select`] and returns false.
    pub fn set_source(&self, key: &str) -> bool {
        let (selected, switched) = {
            let mut state = self.lock();
            match self.index_of(key) {
                Some(i) if self.is_available(&state, i) => (true, self.switch_to(&mut state, i)),
                known => {
                    tracing::warn!(key = %key, known = known.is_some(), "Requested source not selectable");
                    (false, self.auto_select_locked(&mut state))
                }
            }
        };
        self.persist_if(switched);
        selected
    }

    /// Keep the current source if available, else move to the preferred available one.
    pub fn auto_select(&self) {
        let switched = self.auto_select_locked(&mut self.lock());
        self.persist_if(switched);
    }

    /// Dispatch `request` through the current source.
    ///
    /// Never fails: a transport error comes back as a `500` tagged with the
    /// source. When `task_id` is given, a routed response also emits
    /// `SolutionSaved` and `AttemptUpdated`.
    pub async fn route(&self, request: &ApiRequest, task_id: Option<&str>) -> ApiResponse {
        let (key, adapter) = {
            let state = self.lock();
            (self.sources[state.current].key.clone(), self.adapters[state.current].clone())
        };

        tracing::debug!(source = %key, method = %request.method, url = %request.url, "Routing request");
        let start = Instant::now();

        match adapter.try_dispatch(request).await {
            Ok(response) => {
                metrics::record_route(&key, response.status, start);
                if let Some(task_id) = task_id {
                    self.emit(RouterEvent::SolutionSaved {
                        task_id: task_id.to_string(),
                        request: request.clone(),
                    });
                    self.emit(RouterEvent::AttemptUpdated {
                        task_id: task_id.to_string(),
                        status: response.status,
                    });
                }
                response
            }
            Err(e) => {
                tracing::error!(source = %key, error = %e, "Dispatch failed");
                metrics::record_route(&key, 500, start);
                ApiResponse::transport_failure(&key, &e)
            }
        }
    }

    pub fn current_source_info(&self) -> SourceInfo {
        let state = self.lock();
        self.info(&state, state.current)
    }

    /// Every registered source in registration order.
    pub fn sources(&self) -> Vec<SourceInfo> {
        let state = self.lock();
        (0..self.sources.len()).map(|i| self.info(&state, i)).collect()
    }

    /// Registered sources currently available for selection.
    pub fn available_sources(&self) -> Vec<SourceInfo> {
        self.sources().into_iter().filter(|s| s.available).collect()
    }

    /// Non-baseline sources with their adapters, for probing.
    pub fn probe_targets(&self) -> Vec<(String, Arc<dyn Adapter>)> {
        self.sources
            .iter()
            .zip(&self.adapters)
            .enumerate()
            .filter(|(i, _)| *i != self.baseline)
            .map(|(_, (s, a))| (s.key.clone(), a.clone()))
            .collect()
    }

    /// Apply one probe result, then re-validate the current source.
    ///
    /// Returns the new availability if it changed.
    pub fn record_probe(&self, key: &str, healthy: bool, thresholds: Thresholds) -> Option<bool> {
        let i = self.index_of(key).filter(|i| *i != self.baseline)?;
        let (changed, switched) = {
            let mut state = self.lock();
            let changed = state.health[i].record(healthy, thresholds);
            if let Some(available) = changed {
                self.availability_changed(i, available);
            }
            (changed, self.auto_select_locked(&mut state))
        };
        self.persist_if(switched);
        changed
    }

    /// Force a source's availability without re-selecting.
    ///
    /// The baseline cannot be marked unavailable. Returns false for unknown keys.
    pub fn set_availability(&self, key: &str, available: bool) -> bool {
        let Some(i) = self.index_of(key) else {
            return false;
        };
        if i == self.baseline {
            return true;
        }
        let mut state = self.lock();
        if let Some(available) = state.health[i].force(available) {
            self.availability_changed(i, available);
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.sources.iter().position(|s| s.key == key)
    }

    fn is_available(&self, state: &RouterState, i: usize) -> bool {
        i == self.baseline || state.health[i].is_available()
    }

    /// Returns true if the current source changed.
    fn auto_select_locked(&self, state: &mut RouterState) -> bool {
        if self.is_available(state, state.current) {
            return false;
        }
        let next = {
            let snapshot: &RouterState = state;
            preferred_source(&self.sources, self.baseline, |i| self.is_available(snapshot, i))
        };
        tracing::warn!(
            from = %self.sources[state.current].key,
            to = %self.sources[next].key,
            "Current source unavailable, failing over"
        );
        self.switch_to(state, next)
    }

    // Stages the new selection in the session; the caller flushes it once
    // the state lock is released.
    fn switch_to(&self, state: &mut RouterState, next: usize) -> bool {
        if state.current == next {
            return false;
        }
        let previous = std::mem::replace(&mut state.current, next);
        let (previous, current) = (&self.sources[previous].key, &self.sources[next].key);

        self.session.stage(CURRENT_SOURCE, current.clone());
        metrics::record_source_switch(previous, current);
        tracing::info!(previous = %previous, current = %current, "Source switched");
        self.emit(RouterEvent::SourceSwitched {
            previous: previous.clone(),
            current: current.clone(),
        });
        true
    }

    fn persist_if(&self, switched: bool) {
        if switched {
            self.session.flush();
        }
    }

    fn availability_changed(&self, i: usize, available: bool) {
        let key = &self.sources[i].key;
        if available {
            tracing::info!(source = %key, "Source available");
        } else {
            tracing::warn!(source = %key, "Source unavailable");
        }
        metrics::record_source_available(key, available);
        self.emit(RouterEvent::AvailabilityChanged {
            key: key.clone(),
            available,
        });
    }

    fn info(&self, state: &RouterState, i: usize) -> SourceInfo {
        let source = &self.sources[i];
        SourceInfo {
            key: source.key.clone(),
            display_name: source.display_name.clone(),
            description: source.description.clone(),
            base_address: source.base_address.clone(),
            priority: source.priority,
            available: self.is_available(state, i),
            health: state.health[i].state(),
            current: state.current == i,
        }
    }

    fn emit(&self, event: RouterEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{normalize, AdapterError, RawBody, RawResponse};
    use crate::routing::source::AdapterKind;
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Debug)]
    struct StubAdapter {
        key: String,
        fail: bool,
    }

    #[async_trait]
    impl Adapter for StubAdapter {
        fn key(&self) -> &str {
            &self.key
        }

        fn process_request(&self, request: &ApiRequest) -> ApiRequest {
            request.clone()
        }

        fn process_response(&self, raw: RawResponse) -> ApiResponse {
            normalize(raw)
        }

        async fn transfer(&self, _request: ApiRequest) -> Result<RawResponse, AdapterError> {
            if self.fail {
                return Err(AdapterError::Transport("connection refused".into()));
            }
            Ok(RawResponse {
                status: 200,
                status_text: None,
                headers: Vec::new(),
                body: RawBody::Json(json!({"servedBy": self.key})),
            })
        }
    }

    fn descriptor(key: &str, priority: u32, kind: AdapterKind) -> SourceDescriptor {
        SourceDescriptor {
            key: key.into(),
            display_name: key.to_uppercase(),
            description: String::new(),
            base_address: format!("http://{}.local", key),
            priority,
            kind,
        }
    }

    fn build(specs: &[(&str, u32, AdapterKind, bool)], session: SessionStore) -> Router {
        let sources = specs.iter().map(|(k, p, kind, _)| descriptor(k, *p, *kind)).collect();
        let adapters = specs
            .iter()
            .map(|(k, _, _, fail)| {
                let adapter: Arc<dyn Adapter> = Arc::new(StubAdapter {
                    key: k.to_string(),
                    fail: *fail,
                });
                (k.to_string(), adapter)
            })
            .collect();
        Router::new(sources, adapters, session).unwrap()
    }

    fn standard() -> Router {
        build(
            &[
                ("a", 2, AdapterKind::Public, false),
                ("b", 1, AdapterKind::Training, false),
                ("mock", 1, AdapterKind::Mock, false),
            ],
            SessionStore::default(),
        )
    }

    #[test]
    fn test_starts_on_baseline() {
        let router = standard();
        assert_eq!(router.current_source_info().key, "mock");
        assert_eq!(router.sources().len(), 3);
    }

    #[test]
    fn test_failover_determinism() {
        let router = standard();
        assert!(router.set_source("a"));
        assert!(router.set_availability("a", false));
        router.auto_select();
        assert_eq!(router.current_source_info().key, "b");
    }

    #[test]
    fn test_failover_to_baseline_on_tie_after_b() {
        let router = standard();
        assert!(router.set_source("a"));
        router.set_availability("b", false);
        router.set_availability("a", false);
        router.auto_select();
        assert_eq!(router.current_source_info().key, "mock");
    }

    #[test]
    fn test_never_stranded() {
        let keys = ["a", "b", "c"];
        for mask in 0u8..8 {
            for start in keys {
                let router = build(
                    &[
                        ("a", 1, AdapterKind::Public, false),
                        ("b", 2, AdapterKind::Training, false),
                        ("c", 3, AdapterKind::Public, false),
                        ("mock", 4, AdapterKind::Mock, false),
                    ],
                    SessionStore::default(),
                );
                assert!(router.set_source(start));
                for (bit, key) in keys.iter().enumerate() {
                    router.set_availability(key, mask & (1 << bit) != 0);
                }
                router.auto_select();
                let current = router.current_source_info();
                assert!(current.available, "mask {mask} start {start} stranded on {}", current.key);
            }
        }
    }

    #[test]
    fn test_set_source_rejects_unknown_and_unavailable() {
        let router = standard();
        assert!(!router.set_source("nope"));
        assert_eq!(router.current_source_info().key, "mock");

        router.set_availability("a", false);
        assert!(!router.set_source("a"));
        assert_eq!(router.current_source_info().key, "mock");
    }

    #[test]
    fn test_set_source_unknown_triggers_auto_select() {
        let router = standard();
        assert!(router.set_source("a"));
        router.set_availability("a", false);
        assert!(!router.set_source("zzz"));
        assert_eq!(router.current_source_info().key, "b");
    }

    #[test]
    fn test_baseline_cannot_be_disabled() {
        let router = standard();
        assert!(router.set_availability("mock", false));
        assert!(router.set_source("mock"));
        assert!(router.available_sources().iter().any(|s| s.key == "mock"));
    }

    #[test]
    fn test_switch_emits_and_persists() {
        let session = SessionStore::default();
        let router = build(
            &[("mock", 5, AdapterKind::Mock, false), ("b", 1, AdapterKind::Training, false)],
            session.clone(),
        );
        let mut rx = router.subscribe();

        assert!(router.set_source("b"));
        assert_eq!(
            rx.try_recv().unwrap(),
            RouterEvent::SourceSwitched {
                previous: "mock".into(),
                current: "b".into()
            }
        );
        assert_eq!(session.get(CURRENT_SOURCE).as_deref(), Some("b"));

        // Re-selecting the current source is silent.
        assert!(router.set_source("b"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_route_failure_matches_adapter_dispatch() {
        let router = build(
            &[("mock", 1, AdapterKind::Mock, false), ("b", 2, AdapterKind::Training, true)],
            SessionStore::default(),
        );
        assert!(router.set_source("b"));

        let request = ApiRequest::new("GET", "/api/users");
        let routed = router.route(&request, None).await;
        let direct = StubAdapter {
            key: "b".into(),
            fail: true,
        }
        .dispatch(&request)
        .await;
        assert_eq!(routed, direct);
        assert_eq!(routed.status, 500);
    }

    #[test]
    fn test_failover_writes_selection_to_disk() {
        let path = std::env::temp_dir().join(format!("api-lab-router-{}.json", uuid::Uuid::new_v4()));
        let session = SessionStore::load_from_file(&path).unwrap();
        let router = build(
            &[
                ("a", 2, AdapterKind::Public, false),
                ("b", 1, AdapterKind::Training, false),
                ("mock", 3, AdapterKind::Mock, false),
            ],
            session,
        );
        assert!(router.set_source("b"));
        router.record_probe("b", false, Thresholds::default());
        assert_eq!(router.current_source_info().key, "a");

        let restored = SessionStore::load_from_file(&path).unwrap();
        assert_eq!(restored.get(CURRENT_SOURCE).as_deref(), Some("a"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_restores_persisted_source() {
        let session = SessionStore::default();
        session.set(CURRENT_SOURCE, "a");
        let router = build(
            &[("a", 2, AdapterKind::Public, false), ("mock", 1, AdapterKind::Mock, false)],
            session,
        );
        assert_eq!(router.current_source_info().key, "a");
    }

    #[test]
    fn test_record_probe_fails_over_and_notifies() {
        let router = standard();
        router.set_source("b");
        let mut rx = router.subscribe();

        assert_eq!(router.record_probe("b", false, Thresholds::default()), Some(false));
        assert_eq!(
            rx.try_recv().unwrap(),
            RouterEvent::AvailabilityChanged {
                key: "b".into(),
                available: false
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            RouterEvent::SourceSwitched {
                previous: "b".into(),
                current: "mock".into()
            }
        );

        // Recovery does not switch back on its own.
        assert_eq!(router.record_probe("b", true, Thresholds::default()), Some(true));
        assert_eq!(router.current_source_info().key, "mock");
        assert_eq!(router.record_probe("mock", false, Thresholds::default()), None);
    }

    #[tokio::test]
    async fn test_route_success_emits_task_events() {
        let router = standard();
        router.set_source("b");
        let mut rx = router.subscribe();

        let request = ApiRequest::new("GET", "/api/users");
        let resp = router.route(&request, Some("task-1")).await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body.unwrap()["servedBy"], "b");

        assert_eq!(
            rx.try_recv().unwrap(),
            RouterEvent::SolutionSaved {
                task_id: "task-1".into(),
                request: request.clone()
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            RouterEvent::AttemptUpdated {
                task_id: "task-1".into(),
                status: 200
            }
        );

        router.route(&request, None).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_route_failure_is_synthesized_and_keeps_availability() {
        let router = build(
            &[("flaky", 1, AdapterKind::Public, true), ("mock", 2, AdapterKind::Mock, false)],
            SessionStore::default(),
        );
        assert!(router.set_source("flaky"));
        let mut rx = router.subscribe();

        let resp = router.route(&ApiRequest::new("GET", "/x"), Some("task-1")).await;
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body.unwrap()["source"], "flaky");

        let current = router.current_source_info();
        assert_eq!(current.key, "flaky");
        assert!(current.available);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_construction_errors() {
        let session = SessionStore::default();
        let no_baseline = Router::new(vec![descriptor("a", 1, AdapterKind::Public)], HashMap::new(), session.clone());
        assert!(matches!(no_baseline, Err(RouterError::MissingAdapter(k)) if k == "a"));

        let stub = |k: &str| -> (String, Arc<dyn Adapter>) {
            (k.to_string(), Arc::new(StubAdapter { key: k.to_string(), fail: false }))
        };

        let result = Router::new(
            vec![descriptor("a", 1, AdapterKind::Public)],
            HashMap::from([stub("a")]),
            session.clone(),
        );
        assert!(matches!(result, Err(RouterError::MissingBaseline)));

        let result = Router::new(
            vec![descriptor("m1", 1, AdapterKind::Mock), descriptor("m2", 1, AdapterKind::Mock)],
            HashMap::from([stub("m1"), stub("m2")]),
            session.clone(),
        );
        assert!(matches!(result, Err(RouterError::MultipleBaselines(..))));

        let result = Router::new(
            vec![descriptor("m", 1, AdapterKind::Mock), descriptor("m", 1, AdapterKind::Public)],
            HashMap::from([stub("m")]),
            session,
        );
        assert!(matches!(result, Err(RouterError::DuplicateKey(k)) if k == "m"));
    }
}
