//! Data layer of a TheMealDB-backed recipe browser: loads and caches the
//! recipe collection, runs last-search-wins keyword search, normalizes API
//! records, and hands locally composed recipes to every listening store.

pub mod api;
pub mod builder;
pub mod compose;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod normalize;
pub mod search;
pub mod store;
pub mod uniffi_bindings;

pub use api::{HttpRecipeApi, RawMeals, RecipeApi};
pub use builder::{RecipeBrowser, RecipeBrowserBuilder};
pub use compose::{RecipeComposer, RecipeDraft};
pub use config::SyncConfig;
pub use error::SyncError;
pub use events::{EventBus, EventNotifier, Subscription, NEW_RECIPE_TOPIC};
pub use model::{Category, FetchStatus, Recipe, SessionToken};
pub use normalize::normalize;
pub use search::{SearchController, SearchOutcome};
pub use store::{RecipeStore, StoreSnapshot};

// Re-export UniFFI bindings
pub use uniffi_bindings::*;
