//! Utility to write a user's backup file
//!
//! Usage: export_backup <user_id> [output_dir]

use std::path::PathBuf;

use chrono::Utc;
use culinary::config::Config;
use culinary::models::Backup;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let user_id: i64 = match args.next() {
        Some(arg) => arg.parse()?,
        None => {
            eprintln!("Usage: export_backup <user_id> [output_dir]");
            std::process::exit(2);
        }
    };
    let output_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let config = Config::from_env()?;
    println!("Database path: {}", config.database_path.display());

    let database = culinary::db::Database::new(&config.database_path)?;

    // Run migrations
    database.with_conn(|conn| {
        culinary::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let now = Utc::now();
    let conn = database.get_conn()?;
    let backup = Backup::export(&conn, user_id, now)?;
    let path = backup.write_to_dir(&output_dir, now)?;

    println!("Backup written:");
    println!("  File: {}", path.display());
    println!("  Recipes: {}", backup.recipes.len());
    println!("  Shopping items: {}", backup.shopping_list.len());

    Ok(())
}
