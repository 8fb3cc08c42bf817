//! UniFFI bindings for recipe-sync
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! The browser object owns a tokio runtime and exposes blocking methods; hosts
//! call them from background threads. Concurrent `search` calls from several
//! threads follow the same last-search-wins rules as the async API.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::{Recipe, RecipeBrowser, RecipeDraft, SearchOutcome, StoreSnapshot, SyncError};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible recipe structure
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipe {
    pub id: String,
    pub title: String,
    /// Empty string for uncategorized local recipes
    pub category: String,
    pub instructions: String,
    pub ingredients: Vec<String>,
    pub image: String,
    pub favorite: bool,
}

impl From<Recipe> for FfiRecipe {
    fn from(recipe: Recipe) -> Self {
        FfiRecipe {
            id: recipe.id,
            title: recipe.title,
            category: recipe.category,
            instructions: recipe.instructions,
            ingredients: recipe.ingredients,
            image: recipe.image,
            favorite: recipe.favorite,
        }
    }
}

/// Add-recipe form contents
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipeDraft {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    pub image: String,
}

impl From<FfiRecipeDraft> for RecipeDraft {
    fn from(ffi: FfiRecipeDraft) -> Self {
        RecipeDraft {
            title: ffi.title,
            ingredients: ffi.ingredients,
            instructions: ffi.instructions,
            image: ffi.image,
        }
    }
}

/// FFI-compatible search outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Enum))]
pub enum FfiSearchOutcome {
    /// Results are in `effective_list`
    Applied,
    /// Search failed; see `error`
    Failed,
    /// Superseded by a newer search or a cancel
    Cancelled,
    /// Arrived after being superseded and was dropped
    Stale,
    /// Blank keyword cleared the search
    Cleared,
}

impl From<SearchOutcome> for FfiSearchOutcome {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Applied(_) => FfiSearchOutcome::Applied,
            SearchOutcome::Failed(_) => FfiSearchOutcome::Failed,
            SearchOutcome::Cancelled(_) => FfiSearchOutcome::Cancelled,
            SearchOutcome::Stale(_) => FfiSearchOutcome::Stale,
            SearchOutcome::Cleared => FfiSearchOutcome::Cleared,
        }
    }
}

/// FFI-compatible error type
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiSyncError {
    /// Network or HTTP status failure
    FetchError { message: String },
    /// Unexpected response or snapshot format
    DecodeError { message: String },
    /// Add-recipe form is incomplete
    InvalidRecipe { message: String },
    /// Builder configuration error
    BuilderError { message: String },
    /// Configuration error
    ConfigError { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiSyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiSyncError::FetchError { message } => write!(f, "Fetch error: {}", message),
            FfiSyncError::DecodeError { message } => write!(f, "Decode error: {}", message),
            FfiSyncError::InvalidRecipe { message } => write!(f, "Invalid recipe: {}", message),
            FfiSyncError::BuilderError { message } => write!(f, "Builder error: {}", message),
            FfiSyncError::ConfigError { message } => write!(f, "Config error: {}", message),
            FfiSyncError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiSyncError {}

impl From<SyncError> for FfiSyncError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::FetchError(e) => FfiSyncError::FetchError {
                message: e.to_string(),
            },
            e @ SyncError::Status { .. } => FfiSyncError::FetchError {
                message: e.to_string(),
            },
            SyncError::DecodeError(e) => FfiSyncError::DecodeError {
                message: e.to_string(),
            },
            SyncError::InvalidRecipe(msg) => FfiSyncError::InvalidRecipe { message: msg },
            SyncError::BuilderError(msg) => FfiSyncError::BuilderError { message: msg },
            SyncError::ConfigError(e) => FfiSyncError::ConfigError {
                message: e.to_string(),
            },
        }
    }
}

/// Configuration for the browser object
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiSyncConfig {
    /// Optional API base URL (uses TheMealDB if not specified)
    pub base_url: Option<String>,
    /// Optional first letter of the initial batch, e.g. "b"
    pub default_letter: Option<String>,
    /// Optional timeout in seconds (no timeout if not specified)
    pub timeout_seconds: Option<u64>,
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiSyncError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiSyncError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

/// Recipe data layer for mobile hosts
#[cfg_attr(feature = "uniffi", derive(uniffi::Object))]
pub struct FfiRecipeBrowser {
    runtime: tokio::runtime::Runtime,
    browser: RecipeBrowser,
}

#[cfg_attr(feature = "uniffi", uniffi::export)]
impl FfiRecipeBrowser {
    /// Create a browser. No request is made until `initialize` or `search`.
    #[cfg_attr(feature = "uniffi", uniffi::constructor)]
    pub fn new(config: Option<FfiSyncConfig>) -> Result<Arc<Self>, FfiSyncError> {
        let config = config.unwrap_or_default();
        let mut builder = RecipeBrowser::builder();

        if let Some(base_url) = config.base_url {
            builder = builder.base_url(base_url);
        }

        if let Some(letter) = config.default_letter {
            let mut chars = letter.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) => builder = builder.default_letter(letter),
                _ => {
                    return Err(FfiSyncError::BuilderError {
                        message: format!("default letter must be one character, got '{}'", letter),
                    })
                }
            }
        }

        if let Some(timeout_secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }

        Ok(Arc::new(FfiRecipeBrowser {
            runtime: create_runtime()?,
            browser: builder.build()?,
        }))
    }

    /// Load the default batch. Returns how many recipes were loaded.
    pub fn initialize(&self) -> Result<u32, FfiSyncError> {
        let count = self.runtime.block_on(self.browser.initialize())?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    pub fn search(&self, keyword: String) -> FfiSearchOutcome {
        self.runtime.block_on(self.browser.search(&keyword)).into()
    }

    pub fn cancel_search(&self) {
        self.browser.cancel_search();
    }

    /// New favorite value, or `None` if the recipe is not held
    pub fn toggle_favorite(&self, id: String) -> Option<bool> {
        self.browser.toggle_favorite(&id)
    }

    pub fn effective_list(&self) -> Vec<FfiRecipe> {
        self.browser
            .effective_list()
            .into_iter()
            .map(FfiRecipe::from)
            .collect()
    }

    pub fn favorites(&self) -> Vec<FfiRecipe> {
        self.browser
            .store()
            .favorites()
            .into_iter()
            .map(FfiRecipe::from)
            .collect()
    }

    pub fn add_recipe(&self, draft: FfiRecipeDraft) -> Result<FfiRecipe, FfiSyncError> {
        Ok(self.browser.add_recipe(draft.into())?.into())
    }

    /// Category names for the add-recipe form
    pub fn categories(&self) -> Result<Vec<String>, FfiSyncError> {
        let categories = self.runtime.block_on(self.browser.categories())?;
        Ok(categories.into_iter().map(|category| category.name).collect())
    }

    pub fn is_loading(&self) -> bool {
        self.browser.store().is_loading()
    }

    /// User-facing message of the last failed load or search
    pub fn error(&self) -> Option<String> {
        self.browser.store().error()
    }

    /// Serialize the collection so the host can persist it
    pub fn snapshot_json(&self) -> Result<String, FfiSyncError> {
        serde_json::to_string(&self.browser.store().snapshot())
            .map_err(|e| SyncError::from(e).into())
    }

    /// Replace the collection with one produced by `snapshot_json`
    pub fn restore_json(&self, json: String) -> Result<(), FfiSyncError> {
        let snapshot: StoreSnapshot =
            serde_json::from_str(&json).map_err(SyncError::from)?;
        self.browser.store().restore(snapshot);
        Ok(())
    }
}

/// Normalize a raw `search.php` response body without a browser object
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn normalize_meals_json(json: String) -> Result<Vec<FfiRecipe>, FfiSyncError> {
    let body: serde_json::Value = serde_json::from_str(&json).map_err(SyncError::from)?;
    let meals = body.get("meals").and_then(serde_json::Value::as_array);
    Ok(crate::normalize(meals.map(Vec::as_slice))
        .into_iter()
        .map(FfiRecipe::from)
        .collect())
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_recipe_conversion() {
        let recipe = Recipe {
            id: "52977".to_string(),
            title: "Corba".to_string(),
            category: "Side".to_string(),
            instructions: "Simmer.".to_string(),
            ingredients: vec!["450g Lamb".to_string()],
            image: "https://www.themealdb.com/images/media/meals/58oia61564916529.jpg".to_string(),
            favorite: true,
        };

        let ffi: FfiRecipe = recipe.clone().into();
        assert_eq!(ffi.id, recipe.id);
        assert_eq!(ffi.ingredients, recipe.ingredients);
        assert!(ffi.favorite);
    }

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn test_normalize_meals_json() {
        let json = r#"{"meals": [{"idMeal": "52977", "strMeal": "Corba",
            "strIngredient1": "Lamb", "strMeasure1": "450g",
            "strIngredient2": "", "strMeasure2": "1 tbsp"}]}"#;
        let recipes = normalize_meals_json(json.to_string()).unwrap();
        assert_eq!(recipes[0].ingredients, vec!["450g Lamb"]);

        assert!(normalize_meals_json(r#"{"meals": null}"#.to_string())
            .unwrap()
            .is_empty());
        assert!(matches!(
            normalize_meals_json("not json".to_string()),
            Err(FfiSyncError::DecodeError { .. })
        ));
    }

    #[test]
    fn test_invalid_recipe_error_maps() {
        let err: FfiSyncError = SyncError::InvalidRecipe("title is required".to_string()).into();
        assert_eq!(err.to_string(), "Invalid recipe: title is required");
    }

    #[test]
    fn test_browser_rejects_long_letter() {
        let result = FfiRecipeBrowser::new(Some(FfiSyncConfig {
            default_letter: Some("ab".to_string()),
            ..Default::default()
        }));
        assert!(matches!(result, Err(FfiSyncError::BuilderError { .. })));
    }

    #[test]
    fn test_browser_local_flow() {
        let browser = FfiRecipeBrowser::new(None).unwrap();
        let recipe = browser
            .add_recipe(FfiRecipeDraft {
                title: "Porridge".to_string(),
                ingredients: vec!["50g oats".to_string()],
                instructions: "Stir.".to_string(),
                image: "content://media/2".to_string(),
            })
            .unwrap();

        assert_eq!(browser.toggle_favorite(recipe.id.clone()), Some(true));
        assert_eq!(browser.favorites().len(), 1);

        let json = browser.snapshot_json().unwrap();
        let other = FfiRecipeBrowser::new(None).unwrap();
        other.restore_json(json).unwrap();
        assert_eq!(other.effective_list(), browser.effective_list());
        assert_eq!(browser.search("   ".to_string()), FfiSearchOutcome::Cleared);
    }
}
