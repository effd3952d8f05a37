//! Settings database operations.
//!
//! Key/value JSONB storage; the engine uses it for the persisted webhook
//! base URL, which takes precedence over the `APP_BASE_URL` fallback.

use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::RepositoryError;

/// Settings key holding the webhook target base URL.
pub const BASE_URL_KEY: &str = "app_base_url";

/// Get a setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn get_setting(
    pool: &PgPool,
    key: &str,
) -> Result<Option<JsonValue>, RepositoryError> {
    let result: Option<JsonValue> = sqlx::query_scalar(
        r"
        SELECT value FROM settings
        WHERE key = $1
        ",
    )
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(result)
}

/// Set a setting value.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn set_setting(
    pool: &PgPool,
    key: &str,
    value: &JsonValue,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
        ",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}
