pub mod cache;
pub mod config;
pub mod currency;
pub mod date_util;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod records;
pub mod report;
pub mod storage;

pub use cache::{Clock, SummaryCache, SystemClock};
pub use error::{Error, Result};
pub use fetch::http::HttpProvider;
pub use fetch::{Credentials, FetchPhase, FetchProgress, NoopProgress, Provider, Resource};
pub use metrics::{aggregate, MonthActivity, Summary};
pub use records::{RawConversation, RawOrder, RawPurchase, RawRecords};
pub use storage::Database;

/// Main entry point: serves the cached summary or rebuilds it from the provider.
pub struct Wrapped<P: Provider> {
    cache: SummaryCache,
    provider: P,
}

impl<P: Provider> Wrapped<P> {
    pub fn new(db: Database, provider: P) -> Self {
        Self::with_cache(SummaryCache::new(db), provider)
    }

    pub fn with_cache(cache: SummaryCache, provider: P) -> Self {
        Self { cache, provider }
    }

    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    /// The cached summary, if it is still fresh. Never contacts the provider.
    pub async fn cached(&self) -> Result<Option<Summary>> {
        self.cache.read().await
    }

    /// Serve the cached summary when fresh, otherwise fetch and rebuild it.
    ///
    /// A cache hit reports no phase: nothing is fetched.
    pub async fn load(
        &self,
        credentials: &Credentials,
        progress: &dyn FetchProgress,
    ) -> Result<Summary> {
        self.load_with(|| Ok(credentials.clone()), progress).await
    }

    /// Like [`Wrapped::load`], but credentials are only requested on a cache miss.
    pub async fn load_with<F>(
        &self,
        credentials: F,
        progress: &dyn FetchProgress,
    ) -> Result<Summary>
    where
        F: FnOnce() -> Result<Credentials>,
    {
        if let Some(summary) = self.cache.read().await? {
            return Ok(summary);
        }
        let credentials = credentials()?;
        self.refresh(&credentials, progress).await
    }

    /// Fetch all records, aggregate them, and replace the cached summary.
    ///
    /// A failed fetch leaves the cache untouched.
    pub async fn refresh(
        &self,
        credentials: &Credentials,
        progress: &dyn FetchProgress,
    ) -> Result<Summary> {
        let records = fetch::fetch_all(&self.provider, credentials, progress).await?;
        let summary = metrics::aggregate_records(&records);

        if let Err(e) = self.cache.write(&summary).await {
            log::warn!("Could not cache summary: {e}");
        }
        Ok(summary)
    }

    /// Drop the cached summary. Returns whether there was one.
    pub async fn clear_cache(&self) -> Result<bool> {
        self.cache.clear().await
    }
}
