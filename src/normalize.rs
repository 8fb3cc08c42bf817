//! Turns the meal API's flat records into [`Recipe`]s.
//!
//! TheMealDB exposes ingredients as twenty numbered field pairs
//! (`strIngredient1`/`strMeasure1` .. `strIngredient20`/`strMeasure20`).
//! Unused slots come back as `""`, `" "` or `null`, so every pair is checked
//! on both sides before it is kept.

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::model::Recipe;

/// Number of ingredient/measure slots in a meal record
pub const INGREDIENT_SLOTS: usize = 20;

/// Normalize the `meals` array of a search or listing response.
///
/// `None` (the API answers `"meals": null` when nothing matched) and an
/// empty slice both give an empty vector. Records that are not JSON objects
/// are skipped; missing fields inside a record fall back to `""`.
pub fn normalize(raw_meals: Option<&[Value]>) -> Vec<Recipe> {
    let Some(meals) = raw_meals else {
        return Vec::new();
    };

    let recipes: Vec<Recipe> = meals
        .iter()
        .enumerate()
        .filter_map(|(index, meal)| match meal.as_object() {
            Some(fields) => Some(normalize_meal(fields)),
            None => {
                warn!("Skipping meal record {} that is not an object", index);
                None
            }
        })
        .collect();

    debug!("Normalized {} of {} meal records", recipes.len(), meals.len());
    recipes
}

/// Normalize a single meal object.
pub fn normalize_meal(meal: &Map<String, Value>) -> Recipe {
    Recipe {
        id: text_field(meal, "idMeal"),
        title: text_field(meal, "strMeal"),
        category: text_field(meal, "strCategory"),
        instructions: text_field(meal, "strInstructions"),
        ingredients: ingredient_lines(meal),
        image: text_field(meal, "strMealThumb"),
        favorite: false,
    }
}

fn ingredient_lines(meal: &Map<String, Value>) -> Vec<String> {
    (1..=INGREDIENT_SLOTS)
        .filter_map(|slot| {
            let ingredient = non_blank(meal, &format!("strIngredient{slot}"))?;
            let measure = non_blank(meal, &format!("strMeasure{slot}"))?;
            Some(format!("{measure} {ingredient}"))
        })
        .collect()
}

fn non_blank<'a>(meal: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    meal.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

// Non-string values (null, numbers from odd mirrors) count as missing.
fn text_field(meal: &Map<String, Value>, key: &str) -> String {
    meal.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_corba_drops_half_blank_pairs() {
        let meals = vec![json!({
            "idMeal": "52977",
            "strMeal": "Corba",
            "strIngredient1": "Lamb",
            "strMeasure1": "450g",
            "strIngredient2": "",
            "strMeasure2": "1 tbsp",
            "strIngredient3": "Onion",
            "strMeasure3": ""
        })];

        let recipes = normalize(Some(&meals));
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, "52977");
        assert_eq!(recipes[0].title, "Corba");
        assert_eq!(recipes[0].ingredients, vec!["450g Lamb"]);
    }

    #[test]
    fn test_null_and_empty_meals() {
        assert!(normalize(None).is_empty());
        assert!(normalize(Some(&[])).is_empty());
    }

    #[test]
    fn test_whitespace_and_null_sides_are_blank() {
        let meals = vec![json!({
            "idMeal": "1",
            "strIngredient1": "  ",
            "strMeasure1": "1 cup",
            "strIngredient2": "Salt",
            "strMeasure2": null,
            "strIngredient3": "Pepper",
            "strMeasure3": " \t"
        })];

        assert!(normalize(Some(&meals))[0].ingredients.is_empty());
    }

    #[test]
    fn test_order_follows_slot_numbers() {
        let mut meal = Map::new();
        // Insert in reverse to make sure map order does not leak through
        for slot in (1..=INGREDIENT_SLOTS).rev() {
            meal.insert(format!("strIngredient{slot}"), json!(format!("item{slot}")));
            meal.insert(format!("strMeasure{slot}"), json!(format!("{slot}g")));
        }
        meal.insert("strIngredient7".to_string(), json!(""));

        let recipe = normalize_meal(&meal);
        assert_eq!(recipe.ingredients.len(), INGREDIENT_SLOTS - 1);
        assert_eq!(recipe.ingredients[0], "1g item1");
        assert_eq!(recipe.ingredients[5], "6g item6");
        assert_eq!(recipe.ingredients[6], "8g item8");
        assert_eq!(recipe.ingredients.last().unwrap(), "20g item20");
    }

    #[test]
    fn test_slots_past_twenty_are_ignored() {
        let meals = vec![json!({
            "idMeal": "2",
            "strIngredient21": "Extra",
            "strMeasure21": "1"
        })];
        assert!(normalize(Some(&meals))[0].ingredients.is_empty());
    }

    #[test]
    fn test_missing_fields_degrade_to_empty() {
        let meals = vec![json!({ "idMeal": "3", "strMeal": null, "strCategory": 7 })];

        let recipe = &normalize(Some(&meals))[0];
        assert_eq!(recipe.id, "3");
        assert_eq!(recipe.title, "");
        assert_eq!(recipe.category, "");
        assert_eq!(recipe.instructions, "");
        assert_eq!(recipe.image, "");
        assert!(!recipe.favorite);
    }

    #[test]
    fn test_non_object_records_are_skipped() {
        let meals = vec![json!("oops"), json!({ "idMeal": "4" }), json!(null)];

        let recipes = normalize(Some(&meals));
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, "4");
    }

    #[test]
    fn test_values_are_not_trimmed_when_kept() {
        let meals = vec![json!({
            "idMeal": "5",
            "strIngredient1": "Garlic ",
            "strMeasure1": "2 cloves"
        })];
        assert_eq!(normalize(Some(&meals))[0].ingredients, vec!["2 cloves Garlic "]);
    }
}
