//! Catalog sync commands.

use coral_sync::db::{self, PgStore};
use coral_sync::shopify::AdminClient;
use coral_sync::store::SyncStore;
use coral_sync::{AppConfig, Orchestrator, SyncOptions};

/// Run a full catalog sync for the configured store.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let store = PgStore::new(pool);
    let client = AdminClient::new(&config.shopify);

    tracing::info!(store = %config.shopify.store, "starting sync run");

    let options = SyncOptions::from_settings(&config.sync);
    let report = Orchestrator::new(&client, &store, options)
        .run_initial_sync()
        .await?;

    for outcome in &report.outcomes {
        tracing::info!(
            entity = %outcome.entity,
            status = %outcome.status,
            records_processed = outcome.records_processed,
            records_total = outcome.records_total,
            error = outcome.error.as_deref().unwrap_or(""),
            "entity sync outcome"
        );
    }

    Ok(())
}

/// Show the latest sync log per entity type, verbatim.
pub async fn status() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let store = PgStore::new(pool);

    let Some(shop_id) = store.shop_id_by_domain(&config.shopify.store).await? else {
        #[allow(clippy::print_stdout)]
        {
            println!("No sync has run yet for {}", config.shopify.store);
        }
        return Ok(());
    };

    let mut logs = store.latest_sync_logs(shop_id).await?;
    logs.sort_by_key(|log| log.entity.as_str());

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{:<12} {:<10} {:>10} {:>10}  {}",
            "ENTITY", "STATUS", "PROCESSED", "TOTAL", "STARTED AT"
        );
        for log in &logs {
            let total = log
                .records_total
                .map_or_else(|| "-".to_string(), |t| t.to_string());
            println!(
                "{:<12} {:<10} {:>10} {:>10}  {}",
                log.entity.as_str(),
                log.status.as_str(),
                log.records_processed,
                total,
                log.started_at.to_rfc3339(),
            );
            if let Some(message) = &log.error_message {
                println!("             error: {message}");
            }
        }
    }

    Ok(())
}
