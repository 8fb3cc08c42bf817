//! Building recipes on the device and announcing them to listening stores.

use std::sync::atomic::{AtomicU64, Ordering};

use log::info;

use crate::events::{EventBus, EventNotifier, NEW_RECIPE_TOPIC};
use crate::model::Recipe;
use crate::SyncError;

/// Prefix of ids given to recipes composed on this device
pub const LOCAL_ID_PREFIX: &str = "local-";

/// User input from the add-recipe form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: String,
    /// Free-form lines such as `"2 eggs"`; blank lines are dropped
    pub ingredients: Vec<String>,
    pub instructions: String,
    /// URI of the picked image
    pub image: String,
}

impl RecipeDraft {
    /// Check the draft and turn it into a recipe with the given id.
    ///
    /// Title, instructions and image are required, and at least one
    /// ingredient line must have text in it.
    pub fn into_recipe(self, id: String) -> Result<Recipe, SyncError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(SyncError::InvalidRecipe("title is required".to_string()));
        }
        if self.instructions.trim().is_empty() {
            return Err(SyncError::InvalidRecipe(
                "instructions are required".to_string(),
            ));
        }
        if self.image.trim().is_empty() {
            return Err(SyncError::InvalidRecipe("an image is required".to_string()));
        }

        let ingredients: Vec<String> = self
            .ingredients
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if ingredients.is_empty() {
            return Err(SyncError::InvalidRecipe(
                "at least one ingredient is required".to_string(),
            ));
        }

        Ok(Recipe {
            id,
            title: title.to_string(),
            category: String::new(),
            instructions: self.instructions,
            ingredients,
            image: self.image,
            favorite: false,
        })
    }
}

/// The add-recipe flow: validates drafts, assigns ids, and publishes the
/// result on [`NEW_RECIPE_TOPIC`].
///
/// Ids are `local-1`, `local-2`, ... and are unique among recipes produced
/// by one composer.
#[derive(Debug)]
pub struct RecipeComposer {
    notifier: EventNotifier<Recipe>,
    next_id: AtomicU64,
}

impl RecipeComposer {
    pub fn new(bus: EventBus<Recipe>) -> Self {
        Self {
            notifier: EventNotifier::new(bus, NEW_RECIPE_TOPIC),
            next_id: AtomicU64::new(1),
        }
    }

    /// Move the id counter past every `local-<n>` id already in `recipes`,
    /// e.g. after a snapshot was restored.
    pub fn skip_past(&self, recipes: &[Recipe]) {
        let highest = recipes
            .iter()
            .filter_map(|recipe| recipe.id.strip_prefix(LOCAL_ID_PREFIX)?.parse::<u64>().ok())
            .max();
        if let Some(highest) = highest {
            // u64::MAX marks the counter as used up
            self.next_id
                .fetch_max(highest.saturating_add(1), Ordering::SeqCst);
        }
    }

    fn allocate_id(&self) -> Result<String, SyncError> {
        let n = self
            .next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < u64::MAX).then(|| n + 1)
            })
            .map_err(|_| SyncError::InvalidRecipe("no local recipe ids left".to_string()))?;
        Ok(format!("{}{}", LOCAL_ID_PREFIX, n))
    }

    /// Validate `draft`, publish it, and return the published recipe.
    /// Nothing is published when validation fails or no id is left.
    pub fn submit(&self, draft: RecipeDraft) -> Result<Recipe, SyncError> {
        let recipe = draft.into_recipe(self.allocate_id()?)?;

        let delivered = self.notifier.notify(&recipe);
        info!(
            "Published new recipe '{}' ({}) to {} listeners",
            recipe.title, recipe.id, delivered
        );
        Ok(recipe)
    }
}
