//! Backup file format
//!
//! A user's recipes and shopping list as one JSON document. Export writes
//! everything the user owns; import merges a document into another profile.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::{Recipe, ShoppingListItem, ShoppingListItemCreate, User, UserPreferences};
use crate::db::DbError;

/// Format version written by this build
pub const BACKUP_VERSION: u32 = 1;

/// Backup error types
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Invalid backup file format: {0}")]
    InvalidFormat(String),

    #[error("Backup JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backup file error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("User not found with id: {0}")]
    UserNotFound(i64),
}

impl From<rusqlite::Error> for BackupError {
    fn from(e: rusqlite::Error) -> Self {
        BackupError::Db(DbError::Sqlite(e))
    }
}

/// Profile fields carried in a backup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupUser {
    pub name: String,
    #[serde(default)]
    pub preferences: UserPreferences,
}

/// The backup document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u32,
    /// ms since epoch
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<BackupUser>,
    pub recipes: Vec<Recipe>,
    pub shopping_list: Vec<ShoppingListItem>,
}

/// What an import did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub recipes_imported: usize,
    pub recipes_skipped: usize,
    pub items_imported: usize,
    pub items_skipped: usize,
}

/// `chef-backup-<name>-<YYYY-MM-DD>.json`, with the name reduced to `[a-z0-9-]`
pub fn backup_file_name(user_name: &str, at: DateTime<Utc>) -> String {
    let safe_name: String = user_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("chef-backup-{}-{}.json", safe_name, at.format("%Y-%m-%d"))
}

impl Backup {
    /// Collect everything a user owns
    pub fn export(conn: &Connection, user_id: i64, now: DateTime<Utc>) -> Result<Self, BackupError> {
        let user = User::get_by_id(conn, user_id)?.ok_or(BackupError::UserNotFound(user_id))?;
        let recipes = Recipe::list_for_user(conn, user_id)?;
        let shopping_list = ShoppingListItem::list(conn, user_id)?;

        debug!(
            user_id,
            recipes = recipes.len(),
            items = shopping_list.len(),
            "Collected backup"
        );

        Ok(Self {
            version: BACKUP_VERSION,
            timestamp: now.timestamp_millis(),
            user: Some(BackupUser {
                name: user.name,
                preferences: user.preferences,
            }),
            recipes,
            shopping_list,
        })
    }

    /// Parse a backup document
    ///
    /// `version`, `recipes` and `shoppingList` must be present; a zero version
    /// is treated as missing.
    pub fn parse(json: &str) -> Result<Self, BackupError> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let version_ok = value
            .get("version")
            .and_then(|v| v.as_u64())
            .is_some_and(|v| v > 0);
        if !version_ok {
            return Err(BackupError::InvalidFormat("missing version".to_string()));
        }
        for key in ["recipes", "shoppingList"] {
            if !value.get(key).is_some_and(|v| v.is_array()) {
                return Err(BackupError::InvalidFormat(format!("missing {}", key)));
            }
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn to_pretty_json(&self) -> Result<String, BackupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the backup into a directory under its conventional file name
    pub fn write_to_dir(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, BackupError> {
        let user_name = self.user.as_ref().map(|u| u.name.as_str()).unwrap_or("user");
        let path = dir.join(backup_file_name(user_name, now));
        std::fs::create_dir_all(dir)?;
        std::fs::write(&path, self.to_pretty_json()?)?;
        info!("Wrote backup to {:?}", path);
        Ok(path)
    }

    /// Merge this backup into a user's data in one transaction
    ///
    /// Ids in the document are ignored. Rows that would duplicate a favorite
    /// name or a shopping item text are skipped.
    pub fn import(
        &self,
        conn: &mut Connection,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<ImportSummary, BackupError> {
        if User::get_by_id(conn, user_id)?.is_none() {
            return Err(BackupError::UserNotFound(user_id));
        }

        let tx = conn.transaction()?;
        let mut summary = ImportSummary::default();
        let now_ms = now.timestamp_millis();

        for recipe in &self.recipes {
            let created_at = recipe.created_at.unwrap_or(now_ms);
            match Recipe::insert(&tx, user_id, recipe, recipe.is_favorite, created_at)? {
                Some(_) => summary.recipes_imported += 1,
                None => summary.recipes_skipped += 1,
            }
        }

        for item in &self.shopping_list {
            match ShoppingListItem::insert(&tx, user_id, &ShoppingListItemCreate::from(item))? {
                Some(_) => summary.items_imported += 1,
                None => summary.items_skipped += 1,
            }
        }

        tx.commit()?;

        info!(
            user_id,
            recipes = summary.recipes_imported,
            items = summary.items_imported,
            "Imported backup"
        );
        Ok(summary)
    }
}
