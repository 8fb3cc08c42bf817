use std::sync::Arc;
use std::time::Duration;

use crate::api::{HttpRecipeApi, RecipeApi};
use crate::compose::{RecipeComposer, RecipeDraft};
use crate::config::SyncConfig;
use crate::events::{EventBus, Subscription};
use crate::model::{Category, Recipe};
use crate::search::{SearchController, SearchOutcome};
use crate::store::RecipeStore;
use crate::SyncError;

/// Builder for wiring the API client, event bus, store and search
/// controller together
#[derive(Default)]
pub struct RecipeBrowserBuilder {
    config: Option<SyncConfig>,
    base_url: Option<String>,
    default_letter: Option<char>,
    timeout: Option<Duration>,
    api: Option<Arc<dyn RecipeApi>>,
    bus: Option<EventBus<Recipe>>,
}

impl RecipeBrowserBuilder {
    /// Start from a loaded configuration. Individual setters still win.
    ///
    /// # Example
    /// ```
    /// use recipe_sync::{RecipeBrowser, SyncConfig};
    ///
    /// let builder = RecipeBrowser::builder().config(SyncConfig::default());
    /// ```
    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the meal API base URL
    ///
    /// # Example
    /// ```
    /// use recipe_sync::RecipeBrowser;
    ///
    /// let builder = RecipeBrowser::builder()
    ///     .base_url("https://www.themealdb.com/api/json/v1/1");
    /// ```
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the first letter of the batch loaded by `initialize`
    pub fn default_letter(mut self, letter: char) -> Self {
        self.default_letter = Some(letter);
        self
    }

    /// Set a timeout for HTTP requests
    ///
    /// # Example
    /// ```
    /// use recipe_sync::RecipeBrowser;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeBrowser::builder().timeout(Duration::from_secs(30));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Use a custom API implementation instead of the HTTP client.
    /// Base URL and timeout are ignored in that case.
    pub fn api(mut self, api: Arc<dyn RecipeApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Share an existing bus, e.g. one other screens already publish on
    pub fn event_bus(mut self, bus: EventBus<Recipe>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Wire everything up. No request is made until `initialize` or `search`.
    ///
    /// # Errors
    /// Returns `SyncError::BuilderError` if the default letter is not an
    /// ASCII letter, or `SyncError::FetchError` if the HTTP client cannot be
    /// created.
    pub fn build(self) -> Result<RecipeBrowser, SyncError> {
        let mut config = self.config.unwrap_or_default();
        if let Some(base_url) = self.base_url {
            config.api_base_url = base_url;
        }
        if let Some(letter) = self.default_letter {
            config.default_letter = letter;
        }

        if !config.default_letter.is_ascii_alphabetic() {
            return Err(SyncError::BuilderError(format!(
                "default letter must be an ASCII letter, got '{}'",
                config.default_letter
            )));
        }
        let letter = config.default_letter.to_ascii_lowercase();

        let api: Arc<dyn RecipeApi> = match self.api {
            Some(api) => api,
            None => {
                let timeout = self
                    .timeout
                    .or(config.timeout_secs.map(Duration::from_secs));
                Arc::new(HttpRecipeApi::with_options(
                    config.api_base_url.as_str(),
                    &config.user_agent,
                    timeout,
                )?)
            }
        };
        let bus = self.bus.unwrap_or_default();

        let store = Arc::new(RecipeStore::with_default_letter(Arc::clone(&api), letter));
        let new_recipes = store.connect(&bus);
        let search = SearchController::new(Arc::clone(&api), Arc::clone(&store));
        let composer = RecipeComposer::new(bus.clone());

        Ok(RecipeBrowser {
            api,
            bus,
            store,
            search,
            composer,
            _new_recipes: new_recipes,
        })
    }
}

/// The data layer of the recipe browser, as one value
pub struct RecipeBrowser {
    api: Arc<dyn RecipeApi>,
    bus: EventBus<Recipe>,
    store: Arc<RecipeStore>,
    search: SearchController,
    composer: RecipeComposer,
    _new_recipes: Subscription,
}

impl RecipeBrowser {
    /// Creates a new builder
    ///
    /// # Example
    /// ```
    /// use recipe_sync::RecipeBrowser;
    ///
    /// let builder = RecipeBrowser::builder();
    /// ```
    pub fn builder() -> RecipeBrowserBuilder {
        RecipeBrowserBuilder::default()
    }

    pub async fn initialize(&self) -> Result<usize, SyncError> {
        self.store.initialize().await
    }

    pub async fn search(&self, keyword: &str) -> SearchOutcome {
        self.search.search(keyword).await
    }

    pub fn cancel_search(&self) {
        self.search.cancel();
    }

    pub fn toggle_favorite(&self, id: &str) -> Option<bool> {
        self.store.toggle_favorite(id)
    }

    pub fn effective_list(&self) -> Vec<Recipe> {
        self.store.effective_list()
    }

    /// Validate and publish a recipe from the add-recipe form. Every store
    /// connected to this browser's bus, including its own, receives it.
    pub fn add_recipe(&self, draft: RecipeDraft) -> Result<Recipe, SyncError> {
        self.composer.skip_past(&self.store.recipes());
        self.composer.submit(draft)
    }

    /// Categories offered by the add-recipe form
    pub async fn categories(&self) -> Result<Vec<Category>, SyncError> {
        self.api.list_categories().await
    }

    pub fn store(&self) -> &Arc<RecipeStore> {
        &self.store
    }

    pub fn search_controller(&self) -> &SearchController {
        &self.search
    }

    pub fn event_bus(&self) -> &EventBus<Recipe> {
        &self.bus
    }
}
