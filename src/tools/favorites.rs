//! Favorites MCP Tools
//!
//! Tools for saving and removing favorite recipes.

use chrono::Utc;
use serde::Serialize;

use crate::db::Database;
use crate::models::Recipe;

/// Response for list_favorites
#[derive(Debug, Serialize)]
pub struct ListFavoritesResponse {
    pub recipes: Vec<Recipe>,
    pub count: usize,
}

/// Response for toggle_favorite
#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub name: String,
    pub is_favorite: bool,
    pub message: &'static str,
}

/// Response for successful delete
#[derive(Debug, Serialize)]
pub struct FavoriteDeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for clear_favorites
#[derive(Debug, Serialize)]
pub struct ClearFavoritesResponse {
    pub success: bool,
    pub deleted_count: usize,
}

/// List a user's favorites, newest first
pub fn list_favorites(db: &Database, user_id: i64) -> Result<ListFavoritesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipes = Recipe::list_favorites(&conn, user_id)
        .map_err(|e| format!("Failed to list favorites: {}", e))?;
    let count = recipes.len();

    Ok(ListFavoritesResponse { recipes, count })
}

/// Save a recipe as favorite, or remove it when already saved
pub fn toggle_favorite(
    db: &Database,
    user_id: i64,
    recipe: &Recipe,
) -> Result<ToggleFavoriteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let is_favorite = Recipe::toggle_favorite(&conn, user_id, recipe, Utc::now().timestamp_millis())
        .map_err(|e| format!("Failed to toggle favorite: {}", e))?;

    Ok(ToggleFavoriteResponse {
        name: recipe.name.clone(),
        is_favorite,
        message: if is_favorite {
            "Added to favorites"
        } else {
            "Removed from favorites"
        },
    })
}

/// Delete one favorite
pub fn delete_favorite(
    db: &Database,
    user_id: i64,
    id: i64,
) -> Result<Option<FavoriteDeleteResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Recipe::delete_for_user(&conn, user_id, id)
        .map_err(|e| format!("Failed to delete favorite: {}", e))?;

    Ok(deleted.then_some(FavoriteDeleteResponse {
        success: true,
        deleted_id: id,
    }))
}

/// Delete all of a user's saved recipes
pub fn clear_favorites(db: &Database, user_id: i64) -> Result<ClearFavoritesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted_count = Recipe::delete_all(&conn, user_id)
        .map_err(|e| format!("Failed to clear favorites: {}", e))?;

    Ok(ClearFavoritesResponse {
        success: true,
        deleted_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::tests::sample_recipe;
    use crate::tools::users::create_user;

    #[test]
    fn test_favorite_lifecycle() {
        let db = Database::in_memory().unwrap();
        let user = create_user(&db, "Lee", None, None).unwrap();

        let added = toggle_favorite(&db, user.id, &sample_recipe("Soup")).unwrap();
        assert!(added.is_favorite);
        assert_eq!(added.message, "Added to favorites");
        toggle_favorite(&db, user.id, &sample_recipe("Stew")).unwrap();

        let listed = list_favorites(&db, user.id).unwrap();
        assert_eq!(listed.count, 2);

        let removed = toggle_favorite(&db, user.id, &sample_recipe("Soup")).unwrap();
        assert!(!removed.is_favorite);

        let stew_id = list_favorites(&db, user.id).unwrap().recipes[0].id.unwrap();
        assert!(delete_favorite(&db, user.id, stew_id).unwrap().is_some());
        assert!(delete_favorite(&db, user.id, stew_id).unwrap().is_none());

        toggle_favorite(&db, user.id, &sample_recipe("Pie")).unwrap();
        assert_eq!(clear_favorites(&db, user.id).unwrap().deleted_count, 1);
        assert_eq!(list_favorites(&db, user.id).unwrap().count, 0);
    }
}
