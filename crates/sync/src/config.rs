//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `SHOPIFY_STORE` - Store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token (HIGH PRIVILEGE)
//!
//! ## Optional
//! - `APP_BASE_URL` - Fallback webhook target base URL (the value persisted
//!   via `coral webhooks set-url` takes precedence)
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-07)
//! - `SYNC_PAGE_SIZE` - Records per page during sync (default: 50)
//! - `SYNC_CUSTOMERS` - Enable customer sync (default: false; requires
//!   elevated API scope)
//! - `SYNC_ORDERS` - Enable order sync (default: false; requires elevated
//!   API scope)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_API_VERSION: &str = "2025-07";
const DEFAULT_PAGE_SIZE: i64 = 50;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Fallback webhook target base URL (persisted setting wins)
    pub app_base_url: Option<String>,
    /// Admin API configuration
    pub shopify: ShopifyConfig,
    /// Sync run tuning
    pub sync: SyncSettings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Admin API configuration.
///
/// Implements `Debug` manually to redact the HIGH PRIVILEGE access token.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// API version (e.g., 2025-07)
    pub api_version: String,
    /// Admin API access token (HIGH PRIVILEGE - full store read access)
    pub access_token: SecretString,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Sync run tuning.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Records requested per page.
    pub page_size: i64,
    /// Whether to sync customers (off by default: the read scope may be
    /// unavailable).
    pub sync_customers: bool,
    /// Whether to sync orders (off by default, same reason).
    pub sync_orders: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sync_customers: false,
            sync_orders: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("DATABASE_URL")?);

        let app_base_url = get_optional_env("APP_BASE_URL");
        if let Some(raw) = &app_base_url {
            url::Url::parse(raw).map_err(|e| {
                ConfigError::InvalidEnvVar("APP_BASE_URL".to_string(), e.to_string())
            })?;
        }

        let shopify = ShopifyConfig::from_env()?;
        let sync = SyncSettings::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            app_base_url,
            shopify,
            sync,
            sentry_dsn,
        })
    }
}

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            access_token: SecretString::from(get_required_env("SHOPIFY_ACCESS_TOKEN")?),
        })
    }
}

impl SyncSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let page_size = get_env_or_default("SYNC_PAGE_SIZE", &DEFAULT_PAGE_SIZE.to_string())
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidEnvVar("SYNC_PAGE_SIZE".to_string(), e.to_string()))?;
        if page_size < 1 {
            return Err(ConfigError::InvalidEnvVar(
                "SYNC_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            page_size,
            sync_customers: get_env_bool("SYNC_CUSTOMERS")?,
            sync_orders: get_env_bool("SYNC_ORDERS")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an optional boolean environment variable (default false).
fn get_env_bool(key: &str) -> Result<bool, ConfigError> {
    match get_optional_env(key).as_deref() {
        None => Ok(false),
        Some(raw) => parse_bool(raw)
            .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), format!("not a boolean: {raw}"))),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
