//! Unified error handling for the sync engine.

use coral_core::ShopId;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::mapper::MapError;
use crate::shopify::RemoteError;

/// Top-level error type for sync and reconciliation runs.
///
/// Entity-type-level failures are caught at the orchestrator boundary and
/// written to the sync log; this type surfaces the failures that abort a
/// whole run (shop-level sync, sync-log bookkeeping, configuration).
#[derive(Debug, Error)]
pub enum SyncError {
    /// Upstream platform API call failed.
    #[error("remote API error: {0}")]
    Remote(#[from] RemoteError),

    /// A remote record could not be mapped onto the local schema.
    #[error("mapping error: {0}")]
    Map(#[from] MapError),

    /// Repository write or read failed.
    #[error("persistence error: {0}")]
    Store(#[from] RepositoryError),

    /// Another sync run for this shop has a `started` sync log without a
    /// completion; only one active run per tenant is allowed.
    #[error("a sync is already running for shop {0}")]
    AlreadyRunning(ShopId),

    /// No webhook base URL is configured anywhere.
    #[error("no webhook base url configured: set APP_BASE_URL or run `coral webhooks set-url`")]
    BaseUrlUnresolved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_running_display() {
        let err = SyncError::AlreadyRunning(ShopId::new(3));
        assert_eq!(err.to_string(), "a sync is already running for shop 3");
    }

    #[test]
    fn test_base_url_unresolved_display() {
        let err = SyncError::BaseUrlUnresolved;
        assert!(err.to_string().contains("APP_BASE_URL"));
    }
}
