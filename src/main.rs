//! Culinary Assistant
//!
//! An MCP server for fridge-photo recipes, favorites and shopping lists.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use culinary::config::Config;
use culinary::mcp::CulinaryService;
use culinary::build_info::BuildInfo;
use culinary::{ai, db};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("culinary=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    eprintln!("{}", BuildInfo::current().banner());
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env()?;
    let db_path = config.database_path.clone();
    eprintln!("Database path: {}", db_path.display());

    // Ensure data directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    eprintln!("Initializing database...");
    let database = db::Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let engine = ai::create_engine(&config.ai)?;
    eprintln!("Recipe engine: {}", engine.engine_name());

    // Create the Culinary service
    let service = CulinaryService::new(db_path, database, engine);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
