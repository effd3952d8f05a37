//! Webhook subscription reconciliation.
//!
//! The platform is the source of truth for webhook subscriptions; nothing
//! is persisted locally beyond the diff computation. Reconciliation is a
//! convergence operation, not a transaction: safe to invoke repeatedly,
//! each pass moves the remote state closer to the desired set, and a pass
//! against already-converged state performs zero creates and zero deletes.

use tracing::instrument;
use url::Url;

use crate::error::SyncError;
use crate::shopify::RemoteError;
use crate::source::RemoteSource;
use crate::store::SyncStore;

/// The desired subscription set: slash-form topic and the path under the
/// app base URL its deliveries go to.
///
/// Customer and order topics are intentionally excluded pending elevated
/// API access.
pub const DESIRED_WEBHOOKS: &[(&str, &str)] = &[
    ("products/create", "/webhooks/products/create"),
    ("products/update", "/webhooks/products/update"),
    ("app/uninstalled", "/webhooks/app/uninstalled"),
    ("app/scopes_update", "/webhooks/app/scopes-update"),
];

/// How one desired topic ended up after a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicStatus {
    /// A subscription was created this pass.
    Created,
    /// A subscription pointing at the current base URL already existed.
    Exists,
    /// The create call failed; see the outcome's detail.
    Failed,
}

impl TopicStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Exists => "exists",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-topic result of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct TopicOutcome {
    pub topic: String,
    pub status: TopicStatus,
    pub detail: Option<String>,
}

/// Converge the platform's webhook subscriptions to [`DESIRED_WEBHOOKS`]
/// under `base_url`.
///
/// One pass: list remote subscriptions; delete every subscription whose
/// callback URL does not contain the current base URL (best effort - a
/// failed delete is logged and does not abort the others); create every
/// desired topic that has no subscription pointing at the current base
/// URL.
///
/// # Errors
///
/// Returns the remote error if the subscription listing itself fails;
/// individual create failures are reported per topic instead.
#[instrument(skip(source))]
pub async fn reconcile<S: RemoteSource>(
    source: &S,
    base_url: &str,
) -> Result<Vec<TopicOutcome>, RemoteError> {
    let existing = source.list_webhooks().await?;

    let (stale, current): (Vec<_>, Vec<_>) = existing
        .into_iter()
        .partition(|sub| !sub.callback_url.contains(base_url));

    for sub in &stale {
        match source.delete_webhook(&sub.id).await {
            Ok(()) => {
                tracing::info!(topic = %sub.topic, callback_url = %sub.callback_url, "deleted stale webhook");
            }
            Err(err) => {
                tracing::warn!(topic = %sub.topic, error = %err, "failed to delete stale webhook");
            }
        }
    }

    let trimmed_base = base_url.trim_end_matches('/');
    let mut outcomes = Vec::with_capacity(DESIRED_WEBHOOKS.len());

    for (topic, path) in DESIRED_WEBHOOKS {
        let already_present = current
            .iter()
            .any(|sub| sub.topic == *topic && sub.callback_url.contains(base_url));

        if already_present {
            outcomes.push(TopicOutcome {
                topic: (*topic).to_string(),
                status: TopicStatus::Exists,
                detail: None,
            });
            continue;
        }

        let callback_url = format!("{trimmed_base}{path}");
        match source.create_webhook(topic, &callback_url).await {
            Ok(id) => {
                tracing::info!(topic = %topic, callback_url = %callback_url, "created webhook");
                outcomes.push(TopicOutcome {
                    topic: (*topic).to_string(),
                    status: TopicStatus::Created,
                    detail: Some(id),
                });
            }
            Err(err) => {
                tracing::warn!(topic = %topic, error = %err, "failed to create webhook");
                outcomes.push(TopicOutcome {
                    topic: (*topic).to_string(),
                    status: TopicStatus::Failed,
                    detail: Some(err.to_string()),
                });
            }
        }
    }

    Ok(outcomes)
}

/// Resolve the webhook base URL: the persisted setting wins, then the
/// configured fallback.
///
/// # Errors
///
/// Returns [`SyncError::BaseUrlUnresolved`] if neither source yields a
/// URL, so callers fail fast with a descriptive error instead of
/// registering webhooks nowhere.
pub async fn resolve_base_url<R: SyncStore>(
    store: &R,
    fallback: Option<&str>,
) -> Result<String, SyncError> {
    if let Some(url) = store.base_url().await? {
        return Ok(url);
    }
    fallback
        .map(str::to_string)
        .ok_or(SyncError::BaseUrlUnresolved)
}

/// Re-point all webhooks at a new base URL: persist it, then converge.
///
/// # Errors
///
/// Returns a persistence error if the URL cannot be stored and a remote
/// error if the subscription listing fails.
pub async fn repoint<S: RemoteSource, R: SyncStore>(
    source: &S,
    store: &R,
    new_base_url: &Url,
) -> Result<Vec<TopicOutcome>, SyncError> {
    let base = new_base_url.as_str().trim_end_matches('/').to_string();
    store.set_base_url(&base).await?;
    Ok(reconcile(source, &base).await?)
}
