use serde::{Deserialize, Serialize};

/// A dish as the browser presents it.
///
/// API-sourced recipes carry the upstream `idMeal` as `id`; locally composed
/// ones get an id that is only unique within the local collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    /// Empty for local recipes that have not been classified.
    pub category: String,
    pub instructions: String,
    /// Each entry is `"<measure> <ingredient>"`, in source order.
    pub ingredients: Vec<String>,
    /// URI or local handle, never interpreted here.
    pub image: String,
    #[serde(default)]
    pub favorite: bool,
}

/// Category entry from `/categories.php`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "strCategory")]
    pub name: String,
}

/// Identifies one search request. Only the most recently issued token is
/// ever accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionToken(pub u64);

/// Progress of the last fetch or search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_favorite_defaults_when_missing() {
        let json = r#"{
            "id": "1",
            "title": "Soup",
            "category": "",
            "instructions": "Boil.",
            "ingredients": ["1 l water"],
            "image": "file:///soup.jpg"
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(!recipe.favorite);
        assert_eq!(recipe.ingredients, vec!["1 l water"]);
    }

    #[test]
    fn test_category_uses_api_field_name() {
        let category: Category = serde_json::from_str(r#"{"strCategory": "Beef"}"#).unwrap();
        assert_eq!(category.name, "Beef");
    }

    #[test]
    fn test_session_tokens_order() {
        assert!(SessionToken(2) > SessionToken(1));
    }
}
