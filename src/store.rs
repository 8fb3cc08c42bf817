//! The in-memory recipe collection every screen reads from.
//!
//! Search results are kept as a projection: when a result has the same id as
//! a record in the collection, reads and favorite toggles go to the
//! collection's record, so the two can never disagree.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::RecipeApi;
use crate::events::{EventBus, Subscription, NEW_RECIPE_TOPIC};
use crate::model::{FetchStatus, Recipe, SessionToken};
use crate::normalize::normalize;
use crate::SyncError;

/// Message stored in [`RecipeStore::error`] when the batch load fails
pub const FETCH_FAILED: &str = "Failed to fetch recipes";
/// Message stored in [`RecipeStore::error`] when the active search fails
pub const SEARCH_FAILED: &str = "Failed to search recipes.";

#[derive(Debug, Default)]
struct StoreState {
    recipes: Vec<Recipe>,
    search_result: Vec<Recipe>,
    status: FetchStatus,
    error: Option<String>,
    active_session: Option<SessionToken>,
}

impl StoreState {
    fn find(&self, id: &str) -> Option<&Recipe> {
        // Collection first: a search hit that is also in the collection is only a reference to it
        self.recipes
            .iter()
            .chain(self.search_result.iter())
            .find(|recipe| recipe.id == id)
    }

    fn resolved_search_result(&self) -> Vec<Recipe> {
        let by_id: HashMap<&str, &Recipe> = self
            .recipes
            .iter()
            .map(|recipe| (recipe.id.as_str(), recipe))
            .collect();
        self.search_result
            .iter()
            .map(|hit| by_id.get(hit.id.as_str()).copied().unwrap_or(hit).clone())
            .collect()
    }
}

/// Serializable copy of the collection, for callers that persist it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub recipes: Vec<Recipe>,
}

/// Owns the recipe collection, the current search result, and fetch status
pub struct RecipeStore {
    api: Arc<dyn RecipeApi>,
    default_letter: char,
    state: Mutex<StoreState>,
}

impl RecipeStore {
    pub fn new(api: Arc<dyn RecipeApi>) -> Self {
        Self::with_default_letter(api, 'b')
    }

    pub fn with_default_letter(api: Arc<dyn RecipeApi>, default_letter: char) -> Self {
        Self {
            api,
            default_letter,
            state: Mutex::new(StoreState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the default batch and replace the collection with it.
    ///
    /// On failure the error is recorded and whatever was loaded before stays
    /// available. The error is also returned for callers that want it.
    pub async fn initialize(&self) -> Result<usize, SyncError> {
        {
            let mut state = self.state();
            state.status = FetchStatus::Loading;
            state.error = None;
        }

        match self.api.list_by_first_letter(self.default_letter).await {
            Ok(raw) => {
                let recipes = normalize(raw.as_deref());
                let count = recipes.len();
                {
                    let mut state = self.state();
                    state.recipes = recipes;
                    state.status = FetchStatus::Ready;
                }
                info!("Loaded {} recipes starting with '{}'", count, self.default_letter);
                Ok(count)
            }
            Err(e) => {
                warn!("Initial recipe load failed: {}", e);
                let mut state = self.state();
                state.error = Some(FETCH_FAILED.to_string());
                state.status = FetchStatus::Failed;
                Err(e)
            }
        }
    }

    /// Make `session` the only one whose results are accepted.
    pub fn begin_search(&self, session: SessionToken) {
        let mut state = self.state();
        state.active_session = Some(session);
        state.status = FetchStatus::Loading;
        state.error = None;
    }

    /// Stop accepting results for any session.
    pub fn end_search(&self) {
        let mut state = self.state();
        if let Some(session) = state.active_session.take() {
            debug!("Search session {} ended", session.0);
            if state.status == FetchStatus::Loading {
                state.status = FetchStatus::Idle;
            }
        }
    }

    /// Replace the search result with `raw_meals` if `session` is still the
    /// active one. Returns whether the result was accepted.
    pub fn ingest_search_result(&self, raw_meals: Option<&[Value]>, session: SessionToken) -> bool {
        let mut state = self.state();
        if state.active_session != Some(session) {
            debug!("Discarding stale search result for session {}", session.0);
            return false;
        }

        state.search_result = normalize(raw_meals);
        state.error = None;
        state.status = FetchStatus::Ready;
        debug!(
            "Accepted {} search results for session {}",
            state.search_result.len(),
            session.0
        );
        true
    }

    /// Record a failed search if `session` is still the active one.
    /// The previous search result is kept.
    pub fn fail_search(&self, error: &SyncError, session: SessionToken) -> bool {
        let mut state = self.state();
        if state.active_session != Some(session) {
            debug!("Discarding stale search failure for session {}: {}", session.0, error);
            return false;
        }

        warn!("Search failed: {}", error);
        state.error = Some(SEARCH_FAILED.to_string());
        state.status = FetchStatus::Failed;
        true
    }

    pub fn clear_search(&self) {
        self.state().search_result.clear();
    }

    /// Append a recipe created on this device.
    ///
    /// Titles may repeat. A recipe whose id is already held is a caller bug
    /// and is dropped with a warning so ids stay unique.
    pub fn append_local_recipe(&self, recipe: Recipe) {
        let mut state = self.state();
        if state.recipes.iter().any(|existing| existing.id == recipe.id) {
            warn!("Ignoring local recipe with duplicate id '{}'", recipe.id);
            return;
        }
        debug!("Appending local recipe '{}' ({})", recipe.title, recipe.id);
        state.recipes.push(recipe);
    }

    /// Flip the favorite flag of the collection recipe with `id`.
    ///
    /// Returns the new value, or `None` when the collection does not hold it.
    /// Search hits outside the collection are left alone.
    pub fn toggle_favorite(&self, id: &str) -> Option<bool> {
        let mut state = self.state();
        let recipe = state.recipes.iter_mut().find(|recipe| recipe.id == id)?;
        recipe.favorite = !recipe.favorite;
        Some(recipe.favorite)
    }

    /// What the browser should show: the search result while there is one,
    /// otherwise the whole collection.
    pub fn effective_list(&self) -> Vec<Recipe> {
        let state = self.state();
        if state.search_result.is_empty() {
            state.recipes.clone()
        } else {
            state.resolved_search_result()
        }
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.state().recipes.clone()
    }

    pub fn search_result(&self) -> Vec<Recipe> {
        self.state().resolved_search_result()
    }

    pub fn find(&self, id: &str) -> Option<Recipe> {
        self.state().find(id).cloned()
    }

    pub fn favorites(&self) -> Vec<Recipe> {
        self.state()
            .recipes
            .iter()
            .filter(|recipe| recipe.favorite)
            .cloned()
            .collect()
    }

    /// Case-insensitive title match over the collection, without a request
    pub fn filter_by_title(&self, keyword: &str) -> Vec<Recipe> {
        let keyword = keyword.to_lowercase();
        self.state()
            .recipes
            .iter()
            .filter(|recipe| recipe.title.to_lowercase().contains(&keyword))
            .cloned()
            .collect()
    }

    pub fn status(&self) -> FetchStatus {
        self.state().status
    }

    pub fn is_loading(&self) -> bool {
        self.status() == FetchStatus::Loading
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn active_session(&self) -> Option<SessionToken> {
        self.state().active_session
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            recipes: self.recipes(),
        }
    }

    /// Replace the collection with a previously taken snapshot.
    pub fn restore(&self, snapshot: StoreSnapshot) {
        let mut state = self.state();
        info!("Restoring {} recipes from snapshot", snapshot.recipes.len());
        state.recipes = snapshot.recipes;
        if state.status == FetchStatus::Idle {
            state.status = FetchStatus::Ready;
        }
    }

    /// Append every recipe published on [`NEW_RECIPE_TOPIC`] until the
    /// returned subscription is released.
    pub fn connect(self: &Arc<Self>, bus: &EventBus<Recipe>) -> Subscription {
        let store: Weak<Self> = Arc::downgrade(self);
        bus.subscribe(NEW_RECIPE_TOPIC, move |recipe: &Recipe| {
            if let Some(store) = store.upgrade() {
                store.append_local_recipe(recipe.clone());
            }
        })
    }
}
