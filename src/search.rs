//! Keyword search with last-search-wins semantics.
//!
//! Every call to [`SearchController::search`] opens a new session, cancels
//! the request of the previous one, and makes the store reject anything but
//! the newest session's response.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::api::RecipeApi;
use crate::model::SessionToken;
use crate::store::RecipeStore;

/// How a call to [`SearchController::search`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The response was written to the store
    Applied(SessionToken),
    /// The request failed while still current; the store holds the error
    Failed(SessionToken),
    /// A newer search or a cancel took over before the request finished
    Cancelled(SessionToken),
    /// The response arrived but its session was no longer active
    Stale(SessionToken),
    /// Blank keyword: the search was cleared without a request
    Cleared,
}

struct InFlight {
    session: SessionToken,
    cancel: CancellationToken,
}

#[derive(Default)]
struct ControllerState {
    keyword: String,
    last_session: u64,
    in_flight: Option<InFlight>,
}

/// Issues searches against the API and feeds results to the store
pub struct SearchController {
    api: Arc<dyn RecipeApi>,
    store: Arc<RecipeStore>,
    state: Mutex<ControllerState>,
}

impl SearchController {
    pub fn new(api: Arc<dyn RecipeApi>, store: Arc<RecipeStore>) -> Self {
        Self {
            api,
            store,
            state: Mutex::new(ControllerState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Search the API for `keyword`.
    ///
    /// A blank keyword behaves like [`SearchController::cancel`] and sends
    /// nothing. Errors of the current session end up in
    /// [`RecipeStore::error`]; errors of superseded sessions are dropped.
    pub async fn search(&self, keyword: &str) -> SearchOutcome {
        if keyword.trim().is_empty() {
            self.cancel();
            return SearchOutcome::Cleared;
        }

        let (session, cancel) = self.open_session(keyword);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Search session {} cancelled before completion", session.0);
                return SearchOutcome::Cancelled(session);
            }
            response = self.api.search_by_name(keyword) => response,
        };
        self.close_session(session);

        match response {
            Ok(raw) if self.store.ingest_search_result(raw.as_deref(), session) => {
                SearchOutcome::Applied(session)
            }
            Err(e) if self.store.fail_search(&e, session) => SearchOutcome::Failed(session),
            _ => SearchOutcome::Stale(session),
        }
    }

    /// Clear the keyword, abort the in-flight request, and empty the store's
    /// search result.
    pub fn cancel(&self) {
        let mut state = self.state();
        state.keyword.clear();
        if let Some(in_flight) = state.in_flight.take() {
            debug!("Cancelling search session {}", in_flight.session.0);
            in_flight.cancel.cancel();
        }
        self.store.end_search();
        self.store.clear_search();
    }

    /// Keyword of the latest search, empty after a cancel
    pub fn keyword(&self) -> String {
        self.state().keyword.clone()
    }

    pub fn is_searching(&self) -> bool {
        self.state().in_flight.is_some()
    }

    fn open_session(&self, keyword: &str) -> (SessionToken, CancellationToken) {
        let mut state = self.state();
        state.last_session += 1;
        let session = SessionToken(state.last_session);
        let cancel = CancellationToken::new();

        let previous = state.in_flight.replace(InFlight {
            session,
            cancel: cancel.clone(),
        });
        if let Some(previous) = previous {
            debug!(
                "Search session {} supersedes session {}",
                session.0, previous.session.0
            );
            previous.cancel.cancel();
        }
        state.keyword = keyword.to_string();

        // Still under our lock so sessions reach the store in allocation order
        self.store.begin_search(session);
        debug!("Search session {} started for '{}'", session.0, keyword);
        (session, cancel)
    }

    fn close_session(&self, session: SessionToken) {
        let mut state = self.state();
        if state
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.session == session)
        {
            state.in_flight = None;
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        if let Some(in_flight) = self.state().in_flight.take() {
            in_flight.cancel.cancel();
        }
    }
}
