//! Backup MCP Tools
//!
//! Export a user's data to a backup document and merge one back in.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Backup, ImportSummary};

/// Response for export_backup
#[derive(Debug, Serialize)]
pub struct ExportBackupResponse {
    pub recipe_count: usize,
    pub item_count: usize,
    /// Where the file was written, when a directory was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// The document itself, when no directory was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<Backup>,
}

/// Export a user's favorites and shopping list
pub fn export_backup(
    db: &Database,
    user_id: i64,
    output_dir: Option<&Path>,
) -> Result<ExportBackupResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let now = Utc::now();

    let backup = Backup::export(&conn, user_id, now)
        .map_err(|e| format!("Failed to export backup: {}", e))?;
    let recipe_count = backup.recipes.len();
    let item_count = backup.shopping_list.len();

    match output_dir {
        Some(dir) => {
            let path = backup
                .write_to_dir(dir, now)
                .map_err(|e| format!("Failed to write backup: {}", e))?;
            Ok(ExportBackupResponse {
                recipe_count,
                item_count,
                file_path: Some(path.display().to_string()),
                backup: None,
            })
        }
        None => Ok(ExportBackupResponse {
            recipe_count,
            item_count,
            file_path: None,
            backup: Some(backup),
        }),
    }
}

/// Merge a backup document, given inline or as a file path
pub fn import_backup(
    db: &Database,
    user_id: i64,
    json: Option<&str>,
    file_path: Option<&Path>,
) -> Result<ImportSummary, String> {
    let contents = match (json, file_path) {
        (Some(json), None) => json.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
        _ => return Err("Provide either backup JSON or a file path".to_string()),
    };

    let backup = Backup::parse(&contents).map_err(|e| e.to_string())?;

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    backup
        .import(&mut conn, user_id, Utc::now())
        .map_err(|e| format!("Failed to import backup: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::tests::sample_recipe;
    use crate::tools::favorites::toggle_favorite;
    use crate::tools::shopping_list::add_shopping_item;
    use crate::tools::users::create_user;

    #[test]
    fn test_export_then_import_into_other_user() {
        let db = Database::in_memory().unwrap();
        let source = create_user(&db, "Jo Ann", None, None).unwrap();
        let target = create_user(&db, "Kim", None, None).unwrap();

        toggle_favorite(&db, source.id, &sample_recipe("Tacos")).unwrap();
        add_shopping_item(&db, source.id, "Limes", None, None, None, None).unwrap();
        toggle_favorite(&db, target.id, &sample_recipe("Tacos")).unwrap();

        let exported = export_backup(&db, source.id, None).unwrap();
        assert_eq!(exported.recipe_count, 1);
        assert_eq!(exported.item_count, 1);
        let json = serde_json::to_string(&exported.backup.unwrap()).unwrap();

        let summary = import_backup(&db, target.id, Some(&json), None).unwrap();
        assert_eq!(summary.recipes_imported, 0);
        assert_eq!(summary.recipes_skipped, 1);
        assert_eq!(summary.items_imported, 1);
    }

    #[test]
    fn test_export_to_directory_and_import_file() {
        let db = Database::in_memory().unwrap();
        let user = create_user(&db, "Jo Ann", None, None).unwrap();
        add_shopping_item(&db, user.id, "Limes", None, None, None, None).unwrap();

        let dir = std::env::temp_dir().join(format!("culinary-backup-test-{}", std::process::id()));
        let exported = export_backup(&db, user.id, Some(&dir)).unwrap();
        let path = exported.file_path.unwrap();
        assert!(path.contains("chef-backup-jo-ann-"));

        let other = create_user(&db, "Kim", None, None).unwrap();
        let summary = import_backup(&db, other.id, None, Some(Path::new(&path))).unwrap();
        assert_eq!(summary.items_imported, 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_import_rejects_bad_input() {
        let db = Database::in_memory().unwrap();
        let user = create_user(&db, "Kim", None, None).unwrap();

        assert!(import_backup(&db, user.id, None, None).is_err());
        let err = import_backup(&db, user.id, Some(r#"{"version":1,"recipes":[]}"#), None).unwrap_err();
        assert!(err.contains("shoppingList"));
        let empty = r#"{"version":1,"recipes":[],"shoppingList":[]}"#;
        assert!(import_backup(&db, user.id + 10, Some(empty), None).is_err());
    }
}
