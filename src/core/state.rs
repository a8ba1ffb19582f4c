//! Shared application state for the query pipeline.
//!
//! Replaces the ambient store of a browser front end with an explicit
//! object: the submission controller and panel owner write to it, UI layers
//! subscribe to change events instead of looking state up implicitly.
//!
//! The querying flag and failure slot are last-write-wins across concurrent
//! submissions; readers must tolerate the flag flipping due to unrelated
//! submissions.

use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Structured query failure surfaced in place of a result panel.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFailure {
    pub code: String,
    pub message: String,
}

impl QueryFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        QueryFailure {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum StateEvent {
    QueryStarted { generation: u64 },
    QueryFinished,
    QueryFailed(QueryFailure),
    ReauthRequired,
    PanelAppended { index: u64 },
    PanelCleared { index: u64 },
    PanelsCleared,
}

type Listener = Box<dyn Fn(&StateEvent) + Send + Sync>;

pub struct AppState {
    querying: AtomicBool,
    generation: AtomicU64,
    last_failure: Mutex<Option<QueryFailure>>,
    reauth_required: AtomicBool,
    listeners: Mutex<Vec<Listener>>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            querying: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            last_failure: Mutex::new(None),
            reauth_required: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self, listener: Listener) {
        self.listeners.lock().unwrap().push(listener);
    }

    pub fn emit(&self, event: StateEvent) {
        for listener in self.listeners.lock().unwrap().iter() {
            listener(&event);
        }
    }

    pub fn is_querying(&self) -> bool {
        self.querying.load(Ordering::SeqCst)
    }

    pub fn set_querying(&self, querying: bool) {
        self.querying.store(querying, Ordering::SeqCst);
    }

    /// Generation snapshot taken by each submission; responses resolved
    /// against a superseded generation are discarded.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Supersede all in-flight submissions, e.g. when the user switches
    /// datasets or clears the dashboard.
    pub fn invalidate(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn record_failure(&self, failure: QueryFailure) {
        *self.last_failure.lock().unwrap() = Some(failure.clone());
        self.emit(StateEvent::QueryFailed(failure));
    }

    pub fn clear_failure(&self) {
        *self.last_failure.lock().unwrap() = None;
    }

    pub fn last_failure(&self) -> Option<QueryFailure> {
        self.last_failure.lock().unwrap().clone()
    }

    /// Invalidate the current session credential and notify subscribers.
    /// Emits at most once until the flag is cleared again.
    pub fn require_reauth(&self) {
        if !self.reauth_required.swap(true, Ordering::SeqCst) {
            self.emit(StateEvent::ReauthRequired);
        }
    }

    pub fn clear_reauth(&self) {
        self.reauth_required.store(false, Ordering::SeqCst);
    }

    pub fn needs_reauth(&self) -> bool {
        self.reauth_required.load(Ordering::SeqCst)
    }
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new()
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("querying", &self.is_querying())
            .field("generation", &self.current_generation())
            .field("last_failure", &self.last_failure())
            .field("reauth_required", &self.needs_reauth())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_querying_flag_last_write_wins() {
        let state = AppState::new();
        assert!(!state.is_querying());
        state.set_querying(true);
        state.set_querying(true);
        state.set_querying(false);
        assert!(!state.is_querying());
    }

    #[test]
    fn test_invalidate_bumps_generation() {
        let state = AppState::new();
        let before = state.current_generation();
        let after = state.invalidate();
        assert_eq!(after, before + 1);
        assert_eq!(state.current_generation(), after);
    }

    #[test]
    fn test_failure_slot_overwrites() {
        let state = AppState::new();
        state.record_failure(QueryFailure::new("Neo.ClientError", "bad query"));
        state.record_failure(QueryFailure::new("502", "bad gateway"));
        assert_eq!(state.last_failure().unwrap().code, "502");
        state.clear_failure();
        assert!(state.last_failure().is_none());
    }

    #[test]
    fn test_reauth_emits_exactly_once_until_cleared() {
        let state = AppState::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        state.subscribe(Box::new(move |event| {
            if matches!(event, StateEvent::ReauthRequired) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }));

        state.require_reauth();
        state.require_reauth();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(state.needs_reauth());

        state.clear_reauth();
        state.require_reauth();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscribers_observe_query_lifecycle() {
        let state = AppState::new();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        state.subscribe(Box::new(move |event| {
            sink.lock().unwrap().push(format!("{:?}", event));
        }));

        state.emit(StateEvent::QueryStarted { generation: 0 });
        state.emit(StateEvent::PanelAppended { index: 0 });
        state.emit(StateEvent::QueryFinished);

        let seen = events.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].contains("QueryStarted"));
        assert!(seen[1].contains("PanelAppended"));
    }
}
