//! Culinary Status Tool
//!
//! Provides runtime status information and usage instructions.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Workflow instructions for AI assistants
pub const CULINARY_INSTRUCTIONS: &str = r#"
# Culinary Assistant Instructions

This guide explains how to turn a fridge photo into recipes, keep favorites and
manage a shopping list with the Culinary Assistant tools.

## 1. Pick a user

All favorites and shopping items belong to a user.

- `list_users` shows existing profiles
- `create_user` with a name and an emoji avatar creates one
- `select_user` makes a user active for the rest of the session

Selecting a user applies their saved dietary and difficulty filters when no
filters are active yet. `logout` clears the active user and the suggestions.

## 2. Get suggestions

- `analyze_fridge_photo` takes a file path or base64 image (data URLs work).
  The photo is downscaled and sent to the recipe engine, which proposes 3
  recipes based on what it sees.
- `generate_recipes` takes a list of ingredient names instead of a photo.
- `generate_recipes_from_shopping_list` uses the active user's shopping list.

Use `strategy: "append"` to add to the current suggestions instead of
replacing them. Every suggestion gets a generated picture when the engine can
make one.

`list_suggestions` returns the suggestions passing the active filters, with
the index to use in other tools. `set_filters` changes the filters:
- every dietary filter must be among a recipe's tags
- a recipe must match one of the difficulty filters, when any are set

## 3. Cook

`view_recipe` shows a suggestion (by `index`) or a favorite (by `recipe_id`)
scaled to any serving count and converted to metric or imperial units.
Quantities are shown as kitchen fractions ("1 1/2", "3/4") when possible.

`share_recipe` returns the recipe as plain text ready to paste.

## 4. Favorites

- `toggle_favorite` saves a suggestion, or removes it if a favorite with the
  same name exists
- `list_favorites`, `delete_favorite`, `clear_favorites`

## 5. Shopping list

- `add_shopping_item` for free text, `add_missing_ingredients` to add every
  ingredient of a recipe that wasn't seen in the fridge
- Adding text that is already on the list returns the existing item
- `update_shopping_item` changes text, category, quantity, unit or price
- `toggle_shopping_item`, `uncheck_all_shopping_items`
- `delete_shopping_item`, `clear_shopping_list`
- `share_shopping_list` groups items by category with an estimated total
  when prices are set

Categories: Produce, Dairy, Meat, Seafood, Pantry, Spices, Bakery, Other.

## 6. Backup

`export_backup` returns (or writes to a directory) a JSON backup of the
active user's recipes and shopping list. `import_backup` merges a backup
into the active user, skipping favorites and items that already exist.

## Errors

Recipe engine failures come back as short, user-facing messages (missing
API key, usage limit, unreadable photo, service unavailable, safety
filters). Relay them as-is.
"#;

/// Runtime status of the Culinary service
#[derive(Debug, Clone, Serialize)]
pub struct CulinaryStatus {
    #[serde(flatten)]
    pub build: BuildInfo,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Recipe engine in use
    pub ai_engine: &'static str,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Tracks service start time for uptime calculation
#[derive(Debug)]
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    ai_engine: &'static str,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf, ai_engine: &'static str) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            ai_engine,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> CulinaryStatus {
        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        CulinaryStatus {
            build: BuildInfo::current(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            ai_engine: self.ai_engine,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_missing_database() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/culinary.db"), "fake");
        let status = tracker.get_status();
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.ai_engine, "fake");
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.build.version, env!("CARGO_PKG_VERSION"));

        let json = serde_json::to_value(&status).unwrap();
        assert!(json["build_number"].is_u64());
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_instructions_mention_every_workflow() {
        for tool in [
            "select_user",
            "analyze_fridge_photo",
            "view_recipe",
            "toggle_favorite",
            "add_missing_ingredients",
            "export_backup",
        ] {
            assert!(CULINARY_INSTRUCTIONS.contains(tool), "missing {}", tool);
        }
    }
}
