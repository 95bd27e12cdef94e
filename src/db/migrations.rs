//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;
    if current_version >= SCHEMA_VERSION {
        return Ok(());
    }

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USERS
        -- Local profiles; no credentials
        -- ============================================
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            avatar TEXT NOT NULL DEFAULT '',
            preferences TEXT NOT NULL DEFAULT '{}',   -- JSON UserPreferences
            created_at INTEGER NOT NULL               -- ms since epoch
        );

        CREATE INDEX idx_users_name ON users(name);

        -- ============================================
        -- RECIPES
        -- Saved recipes, scoped to a user
        -- ============================================
        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            difficulty TEXT NOT NULL CHECK(difficulty IN ('Easy', 'Medium', 'Hard')),
            prep_time INTEGER NOT NULL DEFAULT 0,     -- minutes
            calories INTEGER NOT NULL DEFAULT 0,      -- per serving
            servings INTEGER NOT NULL DEFAULT 1,
            dietary_tags TEXT NOT NULL DEFAULT '[]',  -- JSON string array
            ingredients TEXT NOT NULL DEFAULT '[]',   -- JSON Ingredient array
            instructions TEXT NOT NULL DEFAULT '[]',  -- JSON string array
            image_urls TEXT NOT NULL DEFAULT '[]',    -- JSON string array
            is_favorite INTEGER NOT NULL DEFAULT 1,   -- boolean
            created_at INTEGER NOT NULL               -- ms since epoch
        );

        CREATE INDEX idx_recipes_user ON recipes(user_id);
        -- one favorite per (user, recipe name)
        CREATE UNIQUE INDEX idx_recipes_user_favorite_name
            ON recipes(user_id, name) WHERE is_favorite = 1;

        -- ============================================
        -- SHOPPING LIST
        -- ============================================
        CREATE TABLE shopping_list (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT 'Other',
            checked INTEGER NOT NULL DEFAULT 0,       -- boolean
            price REAL,
            ingredient TEXT,                          -- JSON Ingredient, when added from a recipe
            quantity REAL,
            unit TEXT,

            UNIQUE(user_id, text)                     -- one item per (user, text)
        );

        CREATE INDEX idx_shopping_list_user ON shopping_list(user_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }
}
