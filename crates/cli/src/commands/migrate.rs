//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! coral migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migration files live in `crates/sync/migrations/` and are embedded in
//! the binary at compile time.

use coral_sync::AppConfig;
use coral_sync::db::{self, MIGRATOR};

/// Run all pending database migrations.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
