//! Cursor pagination over the remote API.
//!
//! Each response carries an opaque cursor and a `has_next_page` flag; the
//! next request passes the cursor back. Termination is the flag, never an
//! empty page. A paginator is restartable only from the beginning: no
//! mid-run resume token is persisted, so a failed run starts the whole
//! entity type over on the next invocation.

use crate::shopify::RemoteError;
use crate::shopify::types::Page;

/// One entity type's page-fetch operation.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    /// The raw record type this fetcher yields.
    type Node;

    /// Fetch one page: `first` records after the opaque `after` cursor.
    async fn fetch(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<Self::Node>, RemoteError>;
}

impl<F: PageFetcher> PageFetcher for &F {
    type Node = F::Node;

    async fn fetch(
        &self,
        first: i64,
        after: Option<String>,
    ) -> Result<Page<Self::Node>, RemoteError> {
        (*self).fetch(first, after).await
    }
}

/// Lazy, finite, strictly sequential page walker.
///
/// Once a page reports `has_next_page == false`, every subsequent
/// `next_page` call returns `Ok(None)` without issuing another request.
/// Remote errors propagate verbatim; the paginator itself stays usable
/// only from a fresh instance after a failure.
pub struct Paginator<F> {
    fetcher: F,
    page_size: i64,
    cursor: Option<String>,
    exhausted: bool,
}

impl<F: PageFetcher> Paginator<F> {
    /// Create a paginator starting from the first page.
    pub const fn new(fetcher: F, page_size: i64) -> Self {
        Self {
            fetcher,
            page_size,
            cursor: None,
            exhausted: false,
        }
    }

    /// Fetch the next page of records, or `None` after the final page.
    ///
    /// # Errors
    ///
    /// Propagates the remote error unchanged (rate limit, auth expiry,
    /// malformed response). The caller decides whether to retry or abort.
    pub async fn next_page(&mut self) -> Result<Option<Vec<F::Node>>, RemoteError> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self.fetcher.fetch(self.page_size, self.cursor.take()).await?;
        self.cursor = page.end_cursor;
        self.exhausted = !page.has_next_page;
        Ok(Some(page.nodes))
    }
}
