//! Recipe MCP Tools
//!
//! Tools for viewing a recipe in cooking form and sharing it.

use serde::Serialize;

use super::share::{quantity_label, recipe_share_text, ShareText};
use crate::db::Database;
use crate::measure::{prepare_ingredients, UnitSystem};
use crate::models::{Difficulty, IngredientCategory, Recipe};
use crate::session::Session;

/// Where a recipe comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecipeSource {
    /// Index into the session's suggestions
    Suggestion(usize),
    /// Stored favorite id
    Favorite(i64),
}

impl RecipeSource {
    /// Build from optional tool arguments; exactly one must be set
    pub fn from_args(index: Option<usize>, recipe_id: Option<i64>) -> Result<Self, String> {
        match (index, recipe_id) {
            (Some(index), None) => Ok(RecipeSource::Suggestion(index)),
            (None, Some(id)) => Ok(RecipeSource::Favorite(id)),
            _ => Err("Provide either a suggestion index or a recipe_id".to_string()),
        }
    }
}

/// One ingredient line of the cooking view
#[derive(Debug, Serialize)]
pub struct IngredientLine {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    /// Quantity and unit as a cook would read them, e.g. "1 1/2 cups"
    pub display: String,
    pub category: IngredientCategory,
    pub is_present: bool,
}

/// A recipe scaled and converted for cooking
#[derive(Debug, Serialize)]
pub struct RecipeView {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub prep_time: u32,
    pub calories: u32,
    pub base_servings: u32,
    pub servings: u32,
    pub unit_system: UnitSystem,
    pub dietary_tags: Vec<String>,
    pub ingredients: Vec<IngredientLine>,
    pub instructions: Vec<String>,
    pub image_urls: Vec<String>,
    pub is_favorite: bool,
}

/// Look up a suggestion or one of the user's favorites
pub fn resolve_recipe(
    db: &Database,
    session: &Session,
    user_id: i64,
    source: RecipeSource,
) -> Result<Recipe, String> {
    match source {
        RecipeSource::Suggestion(index) => {
            session.suggestion(index).cloned().map_err(|e| e.to_string())
        }
        RecipeSource::Favorite(id) => {
            let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
            Recipe::require_for_user(&conn, user_id, id).map_err(|e| e.to_string())
        }
    }
}

/// Scale a recipe to `servings` (default: its own) and convert to `system`
pub fn view_recipe(recipe: &Recipe, servings: Option<u32>, system: UnitSystem) -> Result<RecipeView, String> {
    let servings = servings.unwrap_or(recipe.servings);
    if servings == 0 {
        return Err("servings must be at least 1".to_string());
    }

    let ingredients = prepare_ingredients(
        &recipe.ingredients,
        recipe.servings as f64,
        servings as f64,
        system,
    )
    .into_iter()
    .map(|ingredient| IngredientLine {
        display: quantity_label(ingredient.quantity, &ingredient.unit),
        name: ingredient.name,
        quantity: ingredient.quantity,
        unit: ingredient.unit,
        category: ingredient.category,
        is_present: ingredient.is_present,
    })
    .collect();

    Ok(RecipeView {
        id: recipe.id,
        name: recipe.name.clone(),
        description: recipe.description.clone(),
        difficulty: recipe.difficulty,
        prep_time: recipe.prep_time,
        calories: recipe.calories,
        base_servings: recipe.servings,
        servings,
        unit_system: system,
        dietary_tags: recipe.dietary_tags.clone(),
        ingredients,
        instructions: recipe.instructions.clone(),
        image_urls: recipe.image_urls.clone(),
        is_favorite: recipe.is_favorite,
    })
}

/// Share text for a recipe
pub fn share_recipe(recipe: &Recipe) -> ShareText {
    recipe_share_text(recipe)
}
