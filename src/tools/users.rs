//! User MCP Tools
//!
//! Tools for managing local user profiles.

use chrono::Utc;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Difficulty, User, UserPreferences, UserUpdate};

/// Avatar used when none is given
pub const DEFAULT_AVATAR: &str = "🧑‍🍳";

/// Response for list_users
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<User>,
    pub count: usize,
}

/// Response for successful delete
#[derive(Debug, Serialize)]
pub struct UserDeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Preference fields a caller wants to change; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct PreferenceChanges {
    pub dark_mode: Option<bool>,
    pub dietary_filters: Option<Vec<String>>,
    pub difficulty_filters: Option<Vec<String>>,
    pub currency: Option<String>,
}

impl PreferenceChanges {
    pub fn is_empty(&self) -> bool {
        self.dark_mode.is_none()
            && self.dietary_filters.is_none()
            && self.difficulty_filters.is_none()
            && self.currency.is_none()
    }

    /// Apply onto `base`; an empty currency resets it to the default
    pub fn apply(self, mut base: UserPreferences) -> Result<UserPreferences, String> {
        if let Some(dark_mode) = self.dark_mode {
            base.dark_mode = dark_mode;
        }
        if let Some(filters) = self.dietary_filters {
            base.dietary_filters = clean_tags(filters);
        }
        if let Some(filters) = self.difficulty_filters {
            let parsed = parse_difficulties(&filters)?;
            base.difficulty_filters = (!parsed.is_empty()).then_some(parsed);
        }
        if let Some(currency) = self.currency {
            let currency = currency.trim();
            base.currency = (!currency.is_empty()).then(|| currency.to_string());
        }
        Ok(base)
    }
}

/// Trim tags and drop blanks
pub fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parse difficulty labels, case-insensitive
pub fn parse_difficulties(labels: &[String]) -> Result<Vec<Difficulty>, String> {
    labels
        .iter()
        .map(|label| {
            Difficulty::parse(label).ok_or_else(|| {
                format!("Unknown difficulty '{}'. Use Easy, Medium or Hard", label)
            })
        })
        .collect()
}

fn clean_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("User name cannot be empty".to_string());
    }
    Ok(name.to_string())
}

/// Create a new user
pub fn create_user(
    db: &Database,
    name: &str,
    avatar: Option<&str>,
    preferences: Option<UserPreferences>,
) -> Result<User, String> {
    let name = clean_name(name)?;
    let avatar = avatar
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(DEFAULT_AVATAR);
    let preferences = preferences.unwrap_or_default();

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    User::create(&conn, &name, avatar, &preferences, Utc::now().timestamp_millis())
        .map_err(|e| format!("Failed to create user: {}", e))
}

/// List all users
pub fn list_users(db: &Database) -> Result<ListUsersResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let users = User::list(&conn).map_err(|e| format!("Failed to list users: {}", e))?;
    let count = users.len();

    Ok(ListUsersResponse { users, count })
}

/// Get a user by ID
pub fn get_user(db: &Database, id: i64) -> Result<Option<User>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    User::get_by_id(&conn, id).map_err(|e| format!("Failed to get user: {}", e))
}

/// Update a user's name, avatar or preferences
///
/// Preference changes are merged onto the stored preferences; fields left as
/// `None` keep their current value.
pub fn update_user(
    db: &Database,
    id: i64,
    name: Option<String>,
    avatar: Option<String>,
    changes: PreferenceChanges,
) -> Result<Option<User>, String> {
    let name = name.as_deref().map(clean_name).transpose()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let Some(user) =
        User::get_by_id(&conn, id).map_err(|e| format!("Failed to get user: {}", e))?
    else {
        return Ok(None);
    };
    let preferences = if changes.is_empty() {
        None
    } else {
        Some(changes.apply(user.preferences)?)
    };

    let data = UserUpdate {
        name,
        avatar,
        preferences,
    };
    User::update(&conn, id, &data).map_err(|e| format!("Failed to update user: {}", e))
}

/// Delete a user with all their favorites and shopping items
pub fn delete_user(db: &Database, id: i64) -> Result<Option<UserDeleteResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = User::delete(&conn, id).map_err(|e| format!("Failed to delete user: {}", e))?;

    Ok(deleted.then_some(UserDeleteResponse {
        success: true,
        deleted_id: id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_defaults() {
        let db = Database::in_memory().unwrap();
        let user = create_user(&db, "  Robin ", None, None).unwrap();
        assert_eq!(user.name, "Robin");
        assert_eq!(user.avatar, DEFAULT_AVATAR);
        assert_eq!(user.preferences, UserPreferences::default());
        assert!(user.created_at > 0);
    }

    #[test]
    fn test_create_user_rejects_blank_name() {
        let db = Database::in_memory().unwrap();
        assert!(create_user(&db, "   ", Some("🍕"), None).is_err());
        assert_eq!(list_users(&db).unwrap().count, 0);
    }

    #[test]
    fn test_update_and_delete() {
        let db = Database::in_memory().unwrap();
        let user = create_user(&db, "Robin", Some("🍕"), None).unwrap();

        let updated = update_user(
            &db,
            user.id,
            None,
            Some("🌮".to_string()),
            PreferenceChanges::default(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.avatar, "🌮");
        assert_eq!(updated.name, "Robin");
        let blank_name = Some(" ".to_string());
        assert!(update_user(&db, user.id, blank_name, None, Default::default()).is_err());

        let changes = PreferenceChanges {
            difficulty_filters: Some(vec!["easy".to_string()]),
            currency: Some("€".to_string()),
            ..Default::default()
        };
        let updated = update_user(&db, user.id, None, None, changes).unwrap().unwrap();
        assert_eq!(updated.preferences.difficulty_filters, Some(vec![Difficulty::Easy]));
        assert_eq!(updated.preferences.currency_symbol(), "€");
        assert!(!updated.preferences.dark_mode);
        assert_eq!(updated.avatar, "🌮");

        assert!(delete_user(&db, user.id).unwrap().is_some());
        assert!(delete_user(&db, user.id).unwrap().is_none());
        assert!(get_user(&db, user.id).unwrap().is_none());
        assert!(update_user(&db, user.id, None, None, PreferenceChanges::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_preference_changes() {
        let changes = PreferenceChanges {
            dietary_filters: Some(vec![" Vegan ".to_string(), "".to_string()]),
            difficulty_filters: Some(vec![]),
            currency: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());

        let base = UserPreferences {
            difficulty_filters: Some(vec![Difficulty::Hard]),
            currency: Some("£".to_string()),
            ..Default::default()
        };
        let prefs = changes.apply(base).unwrap();
        assert_eq!(prefs.dietary_filters, vec!["Vegan"]);
        assert_eq!(prefs.difficulty_filters, None);
        assert_eq!(prefs.currency_symbol(), "$");

        let bad = PreferenceChanges {
            difficulty_filters: Some(vec!["Extreme".to_string()]),
            ..Default::default()
        };
        assert!(bad.apply(UserPreferences::default()).is_err());
    }
}
