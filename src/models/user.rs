//! User model
//!
//! Local user profiles. Each user owns their favorites and shopping list.

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::Difficulty;
use crate::db::columns::{json_column, to_json_text};
use crate::db::DbResult;

/// Currency symbol used when none is configured
pub const DEFAULT_CURRENCY: &str = "$";

/// Per-user preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub dietary_filters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_filters: Option<Vec<Difficulty>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl UserPreferences {
    pub fn currency_symbol(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}

/// A user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Emoji shown next to the name
    pub avatar: String,
    pub preferences: UserPreferences,
    /// ms since epoch
    pub created_at: i64,
}

/// Data for updating a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<UserPreferences>,
}

impl User {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            avatar: row.get("avatar")?,
            preferences: json_column(row, "preferences")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Create a new user
    pub fn create(
        conn: &Connection,
        name: &str,
        avatar: &str,
        preferences: &UserPreferences,
        created_at: i64,
    ) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO users (name, avatar, preferences, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, avatar, to_json_text(preferences)?, created_at],
        )?;

        let id = conn.last_insert_rowid();
        Ok(Self {
            id,
            name: name.to_string(),
            avatar: avatar.to_string(),
            preferences: preferences.clone(),
            created_at,
        })
    }

    /// Get a user by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row).optional()?)
    }

    /// List all users in creation order
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users ORDER BY created_at, id")?;
        let users = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Update a user
    pub fn update(conn: &Connection, id: i64, data: &UserUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(ref avatar) = data.avatar {
            updates.push(format!("avatar = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(avatar.clone()));
        }
        if let Some(ref preferences) = data.preferences {
            updates.push(format!("preferences = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(to_json_text(preferences)?));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        let sql = format!(
            "UPDATE users SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a user; their recipes and shopping items go with them
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::recipe::tests::sample_recipe;
    use crate::models::{Recipe, ShoppingListItem, ShoppingListItemCreate};

    #[test]
    fn test_preferences_tolerate_missing_fields() {
        let prefs: UserPreferences = serde_json::from_str(r#"{"darkMode": true}"#).unwrap();
        assert!(prefs.dark_mode);
        assert!(prefs.dietary_filters.is_empty());
        assert_eq!(prefs.difficulty_filters, None);
        assert_eq!(prefs.currency_symbol(), "$");
    }

    #[test]
    fn test_user_crud() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let user = User::create(conn, "Alex", "🥑", &UserPreferences::default(), 5)?;
            assert_eq!(User::get_by_id(conn, user.id)?, Some(user.clone()));

            let prefs = UserPreferences {
                dietary_filters: vec!["Vegan".to_string()],
                difficulty_filters: Some(vec![Difficulty::Easy]),
                currency: Some("€".to_string()),
                ..Default::default()
            };
            let updated = User::update(
                conn,
                user.id,
                &UserUpdate {
                    name: Some("Alexis".to_string()),
                    preferences: Some(prefs.clone()),
                    ..Default::default()
                },
            )?
            .unwrap();
            assert_eq!(updated.name, "Alexis");
            assert_eq!(updated.avatar, "🥑");
            assert_eq!(updated.preferences, prefs);

            assert_eq!(User::list(conn)?.len(), 1);
            assert!(User::delete(conn, user.id)?);
            assert_eq!(User::get_by_id(conn, user.id)?, None);
            assert!(User::update(conn, user.id, &UserUpdate::default())?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_delete_cascades_to_owned_rows() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let user = User::create(conn, "Alex", "🥑", &UserPreferences::default(), 5)?;
            Recipe::toggle_favorite(conn, user.id, &sample_recipe("Soup"), 6)?;
            ShoppingListItem::add(conn, user.id, &ShoppingListItemCreate::from_text("Milk"))?;

            User::delete(conn, user.id)?;

            assert!(Recipe::list_for_user(conn, user.id)?.is_empty());
            assert!(ShoppingListItem::list(conn, user.id)?.is_empty());
            Ok(())
        })
        .unwrap();
    }
}
