//! Shopify Admin API GraphQL client.
//!
//! # Architecture
//!
//! - Hand-written typed query documents per entity type (see [`queries`]),
//!   deserialized into the shapes in [`types`]
//! - Direct API calls to the platform; pagination state lives in
//!   [`crate::paginator::Paginator`], never in this module
//! - Rate limiting and auth failures are surfaced as typed errors; this
//!   engine never retries on its own
//!
//! # Example
//!
//! ```rust,ignore
//! use coral_sync::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify);
//!
//! // First page of products
//! let page = client.products_page(50, None).await?;
//!
//! // Remote webhook subscriptions
//! let subscriptions = client.list_webhooks().await?;
//! ```

mod client;
pub mod queries;
pub mod types;

pub use client::AdminClient;

use thiserror::Error;

/// Errors that can occur when interacting with the platform Admin API.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the platform.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User error from a mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),
}

/// A GraphQL error returned by the platform Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError {
                message: "Field not found".to_string(),
                locations: vec![],
                path: vec![],
            },
            GraphQLError {
                message: "Invalid ID".to_string(),
                locations: vec![],
                path: vec![],
            },
        ];
        let err = RemoteError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = RemoteError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_unauthorized_error() {
        let err = RemoteError::Unauthorized("Invalid token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: Invalid token");
    }

    #[test]
    fn test_user_error() {
        let err = RemoteError::UserError("Topic already taken".to_string());
        assert_eq!(err.to_string(), "User error: Topic already taken");
    }
}
