//! Webhook subscription commands.

use url::Url;

use coral_sync::db::{self, PgStore};
use coral_sync::shopify::AdminClient;
use coral_sync::webhooks::{self, TopicOutcome};
use coral_sync::AppConfig;

/// Converge remote webhook subscriptions to the configured base URL.
pub async fn reconcile() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let store = PgStore::new(pool);
    let client = AdminClient::new(&config.shopify);

    let base_url = webhooks::resolve_base_url(&store, config.app_base_url.as_deref()).await?;
    tracing::info!(base_url = %base_url, "reconciling webhook subscriptions");

    let outcomes = webhooks::reconcile(&client, &base_url).await?;
    report(&outcomes);

    Ok(())
}

/// Persist a new base URL, then re-point all webhooks at it.
pub async fn set_url(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Url::parse(url)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("base URL must be http(s), got {}", parsed.scheme()).into());
    }

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let store = PgStore::new(pool);
    let client = AdminClient::new(&config.shopify);

    tracing::info!(base_url = %parsed, "re-pointing webhook subscriptions");

    let outcomes = webhooks::repoint(&client, &store, &parsed).await?;
    report(&outcomes);

    Ok(())
}

fn report(outcomes: &[TopicOutcome]) {
    #[allow(clippy::print_stdout)]
    {
        for outcome in outcomes {
            match &outcome.detail {
                Some(detail) => {
                    println!("{:<20} {:<8} {detail}", outcome.topic, outcome.status.as_str());
                }
                None => println!("{:<20} {}", outcome.topic, outcome.status.as_str()),
            }
        }
    }
}
