//! Recipe model
//!
//! A recipe proposed by the AI engine, optionally saved as a user's favorite.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{Ingredient, IngredientDraft, ValidationError};
use crate::db::columns::{json_column, to_json_text};
use crate::db::{DbError, DbResult};
use crate::measure::scale_ingredients;

/// Recipe difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Parse from string, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("unknown difficulty '{}'", value))
    }
}

/// A recipe
///
/// `id`, `user_id`, `is_favorite` and `created_at` are only set once the recipe
/// has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub is_favorite: bool,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    /// Minutes
    pub prep_time: u32,
    /// Per serving
    pub calories: u32,
    pub servings: u32,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// Recipe as it arrives from the AI engine, before validation
///
/// Required fields are plain fields so that a missing one fails deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub name: String,
    pub description: String,
    pub difficulty: String,
    pub prep_time: f64,
    pub calories: f64,
    pub servings: f64,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    pub ingredients: Vec<IngredientDraft>,
    pub instructions: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

fn non_negative(field: &'static str, value: f64) -> Result<u32, ValidationError> {
    if !value.is_finite() || value < 0.0 || value > u32::MAX as f64 {
        return Err(ValidationError::InvalidNumber { field, value });
    }
    Ok(value.round() as u32)
}

impl RecipeDraft {
    /// Validate into a `Recipe`
    pub fn validate(self) -> Result<Recipe, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::EmptyField("recipe name"));
        }

        let difficulty = Difficulty::parse(&self.difficulty)
            .ok_or_else(|| ValidationError::UnknownDifficulty(self.difficulty.clone()))?;

        let prep_time = non_negative("prepTime", self.prep_time)?;
        let calories = non_negative("calories", self.calories)?;

        if !self.servings.is_finite() || self.servings < 1.0 || self.servings > u32::MAX as f64 {
            return Err(ValidationError::InvalidServings(self.servings));
        }
        let servings = self.servings.round() as u32;

        if self.ingredients.is_empty() {
            return Err(ValidationError::EmptyField("ingredients"));
        }
        let ingredients = self
            .ingredients
            .into_iter()
            .map(IngredientDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let instructions: Vec<String> = self
            .instructions
            .into_iter()
            .map(|step| step.trim().to_string())
            .filter(|step| !step.is_empty())
            .collect();
        if instructions.is_empty() {
            return Err(ValidationError::EmptyField("instructions"));
        }

        Ok(Recipe {
            id: None,
            user_id: None,
            is_favorite: false,
            name,
            description: self.description.trim().to_string(),
            difficulty,
            prep_time,
            calories,
            servings,
            dietary_tags: self.dietary_tags,
            ingredients,
            instructions,
            image_urls: self.image_urls,
            created_at: None,
        })
    }
}

impl Recipe {
    /// Ingredient list scaled to a number of servings; the recipe is untouched
    pub fn scaled_ingredients(&self, servings: u32) -> Vec<Ingredient> {
        scale_ingredients(&self.ingredients, self.servings as f64, servings as f64)
    }

    /// True when every tag in `tags` is on this recipe
    pub fn has_all_tags(&self, tags: &[String]) -> bool {
        tags.iter().all(|tag| self.dietary_tags.contains(tag))
    }

    /// Create a Recipe from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let difficulty: String = row.get("difficulty")?;
        let difficulty = Difficulty::parse(&difficulty).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(
                0,
                format!("difficulty '{}'", difficulty),
                rusqlite::types::Type::Text,
            )
        })?;

        Ok(Self {
            id: Some(row.get("id")?),
            user_id: Some(row.get("user_id")?),
            is_favorite: row.get::<_, i32>("is_favorite")? != 0,
            name: row.get("name")?,
            description: row.get("description")?,
            difficulty,
            prep_time: row.get("prep_time")?,
            calories: row.get("calories")?,
            servings: row.get("servings")?,
            dietary_tags: json_column(row, "dietary_tags")?,
            ingredients: json_column(row, "ingredients")?,
            instructions: json_column(row, "instructions")?,
            image_urls: json_column(row, "image_urls")?,
            created_at: Some(row.get("created_at")?),
        })
    }

    /// Store a recipe for a user
    ///
    /// Uses `INSERT OR IGNORE`, so a favorite whose name the user already has
    /// is skipped and `None` is returned.
    pub fn insert(
        conn: &Connection,
        user_id: i64,
        recipe: &Recipe,
        is_favorite: bool,
        created_at: i64,
    ) -> DbResult<Option<i64>> {
        let rows = conn.execute(
            r#"
            INSERT OR IGNORE INTO recipes (
                user_id, name, description, difficulty, prep_time, calories, servings,
                dietary_tags, ingredients, instructions, image_urls, is_favorite, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                user_id,
                recipe.name,
                recipe.description,
                recipe.difficulty.as_str(),
                recipe.prep_time,
                recipe.calories,
                recipe.servings,
                to_json_text(&recipe.dietary_tags)?,
                to_json_text(&recipe.ingredients)?,
                to_json_text(&recipe.instructions)?,
                to_json_text(&recipe.image_urls)?,
                is_favorite as i32,
                created_at,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Ok(Some(conn.last_insert_rowid()))
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row).optional()?)
    }

    /// A user's favorite with the given name
    pub fn find_favorite(conn: &Connection, user_id: i64, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM recipes WHERE user_id = ?1 AND name = ?2 AND is_favorite = 1",
        )?;
        Ok(stmt.query_row(params![user_id, name], Self::from_row).optional()?)
    }

    /// A user's favorites, newest first
    pub fn list_favorites(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM recipes WHERE user_id = ?1 AND is_favorite = 1
             ORDER BY created_at DESC, id DESC",
        )?;
        let recipes = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// Every stored recipe of a user, favorite or not, oldest first
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM recipes WHERE user_id = ?1 ORDER BY created_at, id")?;
        let recipes = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// Add the recipe to the user's favorites, or remove it if already there
    ///
    /// Returns the new favorite state.
    pub fn toggle_favorite(
        conn: &Connection,
        user_id: i64,
        recipe: &Recipe,
        now: i64,
    ) -> DbResult<bool> {
        if let Some(existing) = Self::find_favorite(conn, user_id, &recipe.name)? {
            if let Some(id) = existing.id {
                Self::delete(conn, id)?;
            }
            return Ok(false);
        }

        Self::insert(conn, user_id, recipe, true, now)?;
        Ok(true)
    }

    /// Delete a recipe
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Delete a recipe only if it belongs to the user
    pub fn delete_for_user(conn: &Connection, user_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM recipes WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }

    /// Delete every recipe of a user; returns the number removed
    pub fn delete_all(conn: &Connection, user_id: i64) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM recipes WHERE user_id = ?1", [user_id])?)
    }

    /// Fetch a user's stored recipe or fail with NotFound
    pub fn require_for_user(conn: &Connection, user_id: i64, id: i64) -> DbResult<Self> {
        match Self::get_by_id(conn, id)? {
            Some(recipe) if recipe.user_id == Some(user_id) => Ok(recipe),
            _ => Err(DbError::NotFound { entity: "Recipe", id }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{IngredientCategory, User, UserPreferences};

    pub(crate) fn sample_recipe(name: &str) -> Recipe {
        Recipe {
            id: None,
            user_id: None,
            is_favorite: false,
            name: name.to_string(),
            description: "Quick and bright".to_string(),
            difficulty: Difficulty::Easy,
            prep_time: 20,
            calories: 450,
            servings: 2,
            dietary_tags: vec!["Vegetarian".to_string()],
            ingredients: vec![
                Ingredient {
                    name: "Spaghetti".to_string(),
                    quantity: 200.0,
                    unit: "g".to_string(),
                    category: IngredientCategory::Pantry,
                    is_present: true,
                },
                Ingredient {
                    name: "Lemon".to_string(),
                    quantity: 1.0,
                    unit: "each".to_string(),
                    category: IngredientCategory::Produce,
                    is_present: false,
                },
            ],
            instructions: vec!["Boil pasta.".to_string(), "Add lemon.".to_string()],
            image_urls: Vec::new(),
            created_at: None,
        }
    }

    fn draft_json() -> serde_json::Value {
        serde_json::json!({
            "name": "Shakshuka",
            "description": "Eggs poached in tomato sauce",
            "difficulty": "medium",
            "prepTime": 25,
            "calories": 320,
            "servings": 2,
            "ingredients": [
                {"name": "Eggs", "quantity": 4, "unit": "", "category": "Dairy", "isPresent": true},
                {"name": "Tomatoes", "quantity": 400, "unit": "g", "category": "Produce", "isPresent": false}
            ],
            "instructions": ["Simmer the sauce.", "  ", "Crack in the eggs."]
        })
    }

    fn setup_user(db: &Database) -> i64 {
        db.with_conn(|conn| {
            User::create(conn, "Sam", "🍳", &UserPreferences::default(), 1_000)
        })
        .unwrap()
        .id
    }

    #[test]
    fn test_draft_without_optional_fields_validates() {
        let draft: RecipeDraft = serde_json::from_value(draft_json()).unwrap();
        let recipe = draft.validate().unwrap();
        assert_eq!(recipe.difficulty, Difficulty::Medium);
        assert!(recipe.dietary_tags.is_empty());
        assert!(recipe.image_urls.is_empty());
        assert_eq!(recipe.instructions.len(), 2);
        assert_eq!(recipe.ingredients[1].category, IngredientCategory::Produce);
    }

    #[test]
    fn test_draft_missing_required_field_fails_to_parse() {
        let mut value = draft_json();
        value.as_object_mut().unwrap().remove("servings");
        assert!(serde_json::from_value::<RecipeDraft>(value).is_err());
    }

    #[test]
    fn test_draft_validation_rejects_bad_values() {
        let mut value = draft_json();
        value["difficulty"] = "Impossible".into();
        let draft: RecipeDraft = serde_json::from_value(value).unwrap();
        assert!(matches!(draft.validate(), Err(ValidationError::UnknownDifficulty(_))));

        let mut value = draft_json();
        value["servings"] = 0.into();
        let draft: RecipeDraft = serde_json::from_value(value).unwrap();
        assert!(matches!(draft.validate(), Err(ValidationError::InvalidServings(_))));

        let mut value = draft_json();
        value["calories"] = (-5).into();
        let draft: RecipeDraft = serde_json::from_value(value).unwrap();
        assert!(matches!(draft.validate(), Err(ValidationError::InvalidNumber { .. })));

        let mut value = draft_json();
        value["ingredients"][0]["category"] = "Frozen".into();
        let draft: RecipeDraft = serde_json::from_value(value).unwrap();
        assert!(matches!(draft.validate(), Err(ValidationError::UnknownCategory(_))));
    }

    #[test]
    fn test_scaled_ingredients_leave_recipe_untouched() {
        let recipe = sample_recipe("Lemon Pasta");
        let scaled = recipe.scaled_ingredients(4);
        assert_eq!(scaled[0].quantity, 400.0);
        assert_eq!(scaled[1].quantity, 2.0);
        assert_eq!(recipe.ingredients[0].quantity, 200.0);
    }

    #[test]
    fn test_has_all_tags() {
        let recipe = sample_recipe("Lemon Pasta");
        assert!(recipe.has_all_tags(&[]));
        assert!(recipe.has_all_tags(&["Vegetarian".to_string()]));
        assert!(!recipe.has_all_tags(&["Vegetarian".to_string(), "Keto".to_string()]));
    }

    #[test]
    fn test_toggle_favorite_adds_then_removes() {
        let db = Database::in_memory().unwrap();
        let user_id = setup_user(&db);
        let recipe = sample_recipe("Lemon Pasta");

        db.with_conn(|conn| {
            assert!(Recipe::toggle_favorite(conn, user_id, &recipe, 10)?);
            let favorites = Recipe::list_favorites(conn, user_id)?;
            assert_eq!(favorites.len(), 1);
            assert!(favorites[0].is_favorite);
            assert_eq!(favorites[0].ingredients, recipe.ingredients);
            assert_eq!(favorites[0].created_at, Some(10));

            assert!(!Recipe::toggle_favorite(conn, user_id, &recipe, 20)?);
            assert!(Recipe::list_favorites(conn, user_id)?.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_one_favorite_per_user_and_name() {
        let db = Database::in_memory().unwrap();
        let user_id = setup_user(&db);
        let recipe = sample_recipe("Lemon Pasta");

        db.with_conn(|conn| {
            assert!(Recipe::insert(conn, user_id, &recipe, true, 1)?.is_some());
            assert!(Recipe::insert(conn, user_id, &recipe, true, 2)?.is_none());
            // Non-favorite rows are not constrained
            assert!(Recipe::insert(conn, user_id, &recipe, false, 3)?.is_some());
            assert_eq!(Recipe::list_favorites(conn, user_id)?.len(), 1);
            assert_eq!(Recipe::list_for_user(conn, user_id)?.len(), 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_delete_for_user_checks_owner() {
        let db = Database::in_memory().unwrap();
        let owner = setup_user(&db);
        let other = setup_user(&db);
        let recipe = sample_recipe("Lemon Pasta");

        db.with_conn(|conn| {
            let id = Recipe::insert(conn, owner, &recipe, true, 1)?.unwrap();
            assert!(!Recipe::delete_for_user(conn, other, id)?);
            assert!(matches!(
                Recipe::require_for_user(conn, other, id),
                Err(DbError::NotFound { .. })
            ));
            assert!(Recipe::delete_for_user(conn, owner, id)?);
            Ok(())
        })
        .unwrap();
    }
}
