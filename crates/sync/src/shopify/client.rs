//! Admin API GraphQL client.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use crate::config::ShopifyConfig;
use crate::source::RemoteSource;

use super::types::{
    Connection, Page, RemoteCollection, RemoteCustomer, RemoteOrder, RemoteProduct, RemoteRef,
    RemoteShop, RemoteWebhookSubscription, WebhookSubscriptionNode, topic_from_remote,
    topic_to_remote,
};
use super::{GraphQLError, GraphQLErrorLocation, RemoteError, queries};

/// Maximum webhook subscriptions fetched in one listing (the platform's
/// page ceiling; a store converged by this engine has four).
const WEBHOOK_PAGE_SIZE: i64 = 250;

/// Admin API GraphQL client.
///
/// Provides typed read access to the entity types the sync engine ingests,
/// plus the webhook subscription operations used by the reconciler. All
/// calls are blocking I/O from the engine's point of view; the underlying
/// HTTP client enforces a 30 second timeout.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    store: String,
    api_version: String,
    access_token: secrecy::SecretString,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

/// Mutation user error (invalid input, duplicate topic, ...).
#[derive(Debug, Deserialize)]
struct UserError {
    field: Option<Vec<String>>,
    message: String,
}

fn format_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| {
            let field = e.field.as_ref().map_or_else(String::new, |f| f.join("."));
            format!("{}: {}", field, e.message)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Response envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
struct ShopData {
    shop: RemoteShop,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: Connection<RemoteProduct>,
}

#[derive(Debug, Deserialize)]
struct CustomersData {
    customers: Connection<RemoteCustomer>,
}

#[derive(Debug, Deserialize)]
struct OrdersData {
    orders: Connection<RemoteOrder>,
}

#[derive(Debug, Deserialize)]
struct CollectionsData {
    collections: Connection<RemoteCollection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhooksData {
    webhook_subscriptions: Connection<WebhookSubscriptionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookCreateData {
    webhook_subscription_create: Option<WebhookCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookCreatePayload {
    webhook_subscription: Option<RemoteRef>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookDeleteData {
    webhook_subscription_delete: Option<WebhookDeletePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookDeletePayload {
    deleted_webhook_subscription_id: Option<String>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(AdminClientInner {
                client,
                store: config.store.clone(),
                api_version: config.api_version.clone(),
                access_token: config.access_token.clone(),
            }),
        }
    }

    /// Get the store domain.
    #[must_use]
    pub fn store(&self) -> &str {
        &self.inner.store
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL document against the Admin API.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<T, RemoteError> {
        let endpoint = format!(
            "https://{}/admin/api/{}/graphql.json",
            self.inner.store, self.inner.api_version
        );

        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .inner
            .client
            .post(&endpoint)
            .header(
                "X-Shopify-Access-Token",
                self.inner.access_token.expose_secret(),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(RemoteError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RemoteError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        let graphql_response: GraphQLResponse<T> = response.json().await?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(RemoteError::GraphQL(converted_errors));
        }

        graphql_response.data.ok_or_else(|| {
            RemoteError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }

    fn page_variables(first: i64, after: Option<String>) -> serde_json::Value {
        serde_json::json!({
            "first": first,
            "after": after,
        })
    }
}

impl RemoteSource for AdminClient {
    #[instrument(skip(self))]
    async fn fetch_shop(&self) -> Result<RemoteShop, RemoteError> {
        let data: ShopData = self
            .execute(queries::SHOP_QUERY, serde_json::json!({}))
            .await?;
        Ok(data.shop)
    }

    #[instrument(skip(self))]
    async fn products_page(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteProduct>, RemoteError> {
        let data: ProductsData = self
            .execute(queries::PRODUCTS_QUERY, Self::page_variables(first, after))
            .await?;
        Ok(data.products.into_page())
    }

    #[instrument(skip(self))]
    async fn customers_page(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteCustomer>, RemoteError> {
        let data: CustomersData = self
            .execute(queries::CUSTOMERS_QUERY, Self::page_variables(first, after))
            .await?;
        Ok(data.customers.into_page())
    }

    #[instrument(skip(self))]
    async fn orders_page(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteOrder>, RemoteError> {
        let data: OrdersData = self
            .execute(queries::ORDERS_QUERY, Self::page_variables(first, after))
            .await?;
        Ok(data.orders.into_page())
    }

    #[instrument(skip(self))]
    async fn collections_page(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<RemoteCollection>, RemoteError> {
        let data: CollectionsData = self
            .execute(
                queries::COLLECTIONS_QUERY,
                Self::page_variables(first, after),
            )
            .await?;
        Ok(data.collections.into_page())
    }

    #[instrument(skip(self))]
    async fn list_webhooks(&self) -> Result<Vec<RemoteWebhookSubscription>, RemoteError> {
        let data: WebhooksData = self
            .execute(
                queries::WEBHOOK_SUBSCRIPTIONS_QUERY,
                serde_json::json!({ "first": WEBHOOK_PAGE_SIZE }),
            )
            .await?;

        Ok(data
            .webhook_subscriptions
            .into_nodes()
            .into_iter()
            .map(|node| RemoteWebhookSubscription {
                id: node.id,
                topic: topic_from_remote(&node.topic),
                callback_url: node
                    .endpoint
                    .and_then(|e| e.callback_url)
                    .unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn create_webhook(
        &self,
        topic: &str,
        callback_url: &str,
    ) -> Result<String, RemoteError> {
        let variables = serde_json::json!({
            "topic": topic_to_remote(topic),
            "webhookSubscription": {
                "callbackUrl": callback_url,
                "format": "JSON",
            },
        });

        let data: WebhookCreateData = self
            .execute(queries::WEBHOOK_SUBSCRIPTION_CREATE, variables)
            .await?;

        let payload = data.webhook_subscription_create.ok_or_else(|| {
            RemoteError::GraphQL(vec![GraphQLError {
                message: "No payload returned from webhook create".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })?;

        if !payload.user_errors.is_empty() {
            return Err(RemoteError::UserError(format_user_errors(
                &payload.user_errors,
            )));
        }

        payload
            .webhook_subscription
            .map(|s| s.id)
            .ok_or_else(|| {
                RemoteError::GraphQL(vec![GraphQLError {
                    message: "No subscription returned from webhook create".to_string(),
                    locations: vec![],
                    path: vec![],
                }])
            })
    }

    #[instrument(skip(self))]
    async fn delete_webhook(&self, id: &str) -> Result<(), RemoteError> {
        let variables = serde_json::json!({ "id": id });

        let data: WebhookDeleteData = self
            .execute(queries::WEBHOOK_SUBSCRIPTION_DELETE, variables)
            .await?;

        let payload = data.webhook_subscription_delete.ok_or_else(|| {
            RemoteError::GraphQL(vec![GraphQLError {
                message: "No payload returned from webhook delete".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })?;

        if !payload.user_errors.is_empty() {
            return Err(RemoteError::UserError(format_user_errors(
                &payload.user_errors,
            )));
        }

        if payload.deleted_webhook_subscription_id.is_none() {
            return Err(RemoteError::GraphQL(vec![GraphQLError {
                message: "Webhook deletion failed".to_string(),
                locations: vec![],
                path: vec![],
            }]));
        }

        Ok(())
    }
}
