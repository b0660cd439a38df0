//! Single-slot cache of the last computed summary.
//!
//! The entry is reused while it is younger than the freshness window. An
//! expired, unreadable, or older-schema entry is deleted on the read that
//! finds it, in the same transaction.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metrics::Summary;
use crate::storage::repository;
use crate::storage::Database;

/// How long a cached summary stays valid.
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Bumped whenever the persisted `Summary` layout changes.
pub const CACHE_VERSION: u32 = 1;

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Persisted layout: the summary fields plus `timestamp` and `version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedSummary {
    #[serde(flatten)]
    summary: Summary,
    timestamp: i64,
    #[serde(default)]
    version: u32,
}

enum Lookup {
    Absent,
    Fresh(Box<CachedSummary>),
    Expired(i64),
    OtherVersion(u32),
    Corrupt(String),
}

fn classify(payload: &str, now: i64, ttl_ms: i64) -> Lookup {
    match serde_json::from_str::<CachedSummary>(payload) {
        Err(e) => Lookup::Corrupt(e.to_string()),
        Ok(entry) if entry.version != CACHE_VERSION => Lookup::OtherVersion(entry.version),
        Ok(entry) if now - entry.timestamp < ttl_ms => Lookup::Fresh(Box::new(entry)),
        Ok(entry) => Lookup::Expired(entry.timestamp),
    }
}

#[derive(Clone)]
pub struct SummaryCache {
    db: Database,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
}

impl SummaryCache {
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            ttl_ms: CACHE_TTL.as_millis() as i64,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = ttl.as_millis() as i64;
        self
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Return the cached summary if it is still fresh.
    ///
    /// Anything else found in the slot (expired, corrupt, other version) is
    /// removed before returning `None`.
    pub async fn read(&self) -> Result<Option<Summary>> {
        let now = self.clock.now_millis();
        let ttl_ms = self.ttl_ms;

        let lookup = self
            .db
            .writer()
            .call(move |conn| {
                let tx = conn.transaction()?;
                let lookup = match repository::get_cached_summary(&tx)? {
                    None => Lookup::Absent,
                    Some((payload, _)) => {
                        let lookup = classify(&payload, now, ttl_ms);
                        if !matches!(lookup, Lookup::Fresh(_)) {
                            repository::delete_cached_summary(&tx)?;
                        }
                        lookup
                    }
                };
                tx.commit()?;
                Ok::<Lookup, rusqlite::Error>(lookup)
            })
            .await?;

        match lookup {
            Lookup::Absent => {
                log::info!("No cached summary found");
                Ok(None)
            }
            Lookup::Fresh(entry) => {
                log::info!("Using cached summary from {}", format_millis(entry.timestamp));
                Ok(Some(entry.summary))
            }
            Lookup::Expired(timestamp) => {
                log::info!(
                    "Cached summary from {} expired, needs refresh",
                    format_millis(timestamp)
                );
                Ok(None)
            }
            Lookup::OtherVersion(version) => {
                log::warn!(
                    "Dropping cached summary with schema version {version} \
                     (expected {CACHE_VERSION})"
                );
                Ok(None)
            }
            Lookup::Corrupt(reason) => {
                log::warn!("Dropping unreadable cached summary: {reason}");
                Ok(None)
            }
        }
    }

    /// Stamp the summary with the current time and replace the cached entry.
    pub async fn write(&self, summary: &Summary) -> Result<()> {
        let entry = CachedSummary {
            summary: summary.clone(),
            timestamp: self.clock.now_millis(),
            version: CACHE_VERSION,
        };
        let payload = serde_json::to_string(&entry)?;
        let timestamp = entry.timestamp;

        self.db
            .writer()
            .call(move |conn| repository::put_cached_summary(conn, &payload, timestamp))
            .await?;
        log::debug!("Cached summary at {}", format_millis(timestamp));
        Ok(())
    }

    /// Remove the cached entry. Returns whether there was one.
    pub async fn clear(&self) -> Result<bool> {
        let removed = self
            .db
            .writer()
            .call(|conn| repository::delete_cached_summary(conn))
            .await?;
        Ok(removed)
    }

    /// When the current entry was written, without checking freshness.
    pub async fn cached_at(&self) -> Result<Option<DateTime<Utc>>> {
        let entry = self
            .db
            .reader()
            .call(|conn| repository::get_cached_summary(conn))
            .await?;
        Ok(entry.and_then(|(_, ts)| DateTime::from_timestamp_millis(ts)))
    }

    /// Whether an entry written at `cached_at` would still be served now.
    pub fn is_fresh(&self, cached_at: DateTime<Utc>) -> bool {
        self.clock.now_millis() - cached_at.timestamp_millis() < self.ttl_ms
    }
}

fn format_millis(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}


#[cfg(test)]
mod tests {
    use super::test_clock::ManualClock;
    use super::*;
    use crate::metrics::{aggregate, MonthActivity};
    use crate::records::{Price, RawConversation, RawOrder};

    const HOUR_MS: i64 = 60 * 60 * 1000;
    const START: i64 = 1_718_000_000_000;

    fn sample_summary() -> Summary {
        let orders = vec![RawOrder {
            status: "completed".into(),
            transaction_user_status: "completed".into(),
            price: Some(Price {
                amount: "19.99".into(),
                currency_code: "GBP".into(),
            }),
            date: "2024-06-10T12:00:00Z".into(),
            brand: Some("Patagonia".into()),
        }];
        aggregate(&orders, &[], &[RawConversation { unread: true }])
    }

    async fn cache_with_clock() -> (SummaryCache, Arc<ManualClock>) {
        let db = Database::open_memory().await.unwrap();
        let clock = Arc::new(ManualClock::new(START));
        (SummaryCache::with_clock(db, clock.clone()), clock)
    }

    async fn row_count(cache: &SummaryCache) -> i64 {
        cache
            .db()
            .reader()
            .call(|conn| {
                conn.query_row("SELECT COUNT(*) FROM summary_cache", [], |row| row.get(0))
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_read_empty() {
        let (cache, _) = cache_with_clock().await;
        assert_eq!(cache.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_round_trip_within_window() {
        let (cache, clock) = cache_with_clock().await;
        let summary = sample_summary();

        cache.write(&summary).await.unwrap();
        assert_eq!(cache.read().await.unwrap(), Some(summary.clone()));

        clock.advance_ms(24 * HOUR_MS - 1);
        assert_eq!(cache.read().await.unwrap(), Some(summary));
    }

    #[tokio::test]
    async fn test_round_trip_keeps_full_precision_sums() {
        let (cache, _) = cache_with_clock().await;
        let orders: Vec<RawOrder> = ["0.10", "0.20"]
            .iter()
            .map(|amount| RawOrder {
                status: "completed".into(),
                transaction_user_status: String::new(),
                price: Some(Price {
                    amount: amount.to_string(),
                    currency_code: "EUR".into(),
                }),
                date: "2024-06-10T12:00:00Z".into(),
                brand: None,
            })
            .collect();
        let mut summary = aggregate(&orders, &[], &[]);
        assert_eq!(summary.total_sales, 0.1 + 0.2);
        summary.total_spent = 1737.3700000000001;
        summary.most_expensive_sale = 2.0 / 3.0;

        cache.write(&summary).await.unwrap();
        let back = cache.read().await.unwrap().unwrap();
        assert_eq!(back.total_sales.to_bits(), summary.total_sales.to_bits());
        assert_eq!(back.total_spent.to_bits(), summary.total_spent.to_bits());
        assert_eq!(
            back.most_expensive_sale.to_bits(),
            summary.most_expensive_sale.to_bits()
        );
        assert_eq!(back, summary);
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed() {
        let (cache, clock) = cache_with_clock().await;
        cache.write(&sample_summary()).await.unwrap();

        clock.advance_ms(24 * HOUR_MS);
        assert_eq!(cache.read().await.unwrap(), None);
        assert_eq!(row_count(&cache).await, 0);
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_entry() {
        let (cache, clock) = cache_with_clock().await;
        cache.write(&sample_summary()).await.unwrap();

        clock.advance_ms(23 * HOUR_MS);
        let mut newer = sample_summary();
        newer.most_active_month = MonthActivity {
            month: "July".into(),
            activity: 9,
        };
        cache.write(&newer).await.unwrap();

        // Freshness counts from the second write.
        clock.advance_ms(2 * HOUR_MS);
        assert_eq!(cache.read().await.unwrap(), Some(newer));
        assert_eq!(row_count(&cache).await, 1);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_treated_as_absent() {
        let (cache, _) = cache_with_clock().await;
        cache
            .db()
            .writer()
            .call(|conn| repository::put_cached_summary(conn, "{not json", START))
            .await
            .unwrap();

        assert_eq!(cache.read().await.unwrap(), None);
        assert_eq!(row_count(&cache).await, 0);
    }

    #[tokio::test]
    async fn test_other_version_is_dropped() {
        let (cache, _) = cache_with_clock().await;
        let mut value = serde_json::to_value(sample_summary()).unwrap();
        value["timestamp"] = serde_json::json!(START);
        let payload = value.to_string();
        cache
            .db()
            .writer()
            .call(move |conn| repository::put_cached_summary(conn, &payload, START))
            .await
            .unwrap();

        assert_eq!(cache.read().await.unwrap(), None);
        assert_eq!(row_count(&cache).await, 0);
    }

    #[tokio::test]
    async fn test_payload_layout() {
        let (cache, _) = cache_with_clock().await;
        cache.write(&sample_summary()).await.unwrap();

        let (payload, cached_at) = cache
            .db()
            .reader()
            .call(|conn| repository::get_cached_summary(conn))
            .await
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["timestamp"], serde_json::json!(START));
        assert_eq!(value["version"], serde_json::json!(CACHE_VERSION));
        assert_eq!(value["currency"], serde_json::json!("GBP"));
        assert_eq!(value["totalSales"], serde_json::json!(19.99));
        assert_eq!(cached_at, START);
    }

    #[tokio::test]
    async fn test_clear_and_cached_at() {
        let (cache, clock) = cache_with_clock().await;
        assert_eq!(cache.cached_at().await.unwrap(), None);

        cache.write(&sample_summary()).await.unwrap();
        let at = cache.cached_at().await.unwrap().unwrap();
        assert_eq!(at.timestamp_millis(), START);
        assert!(cache.is_fresh(at));

        clock.advance_ms(25 * HOUR_MS);
        assert!(!cache.is_fresh(at));
        // Peeking does not expire the entry.
        assert!(cache.cached_at().await.unwrap().is_some());

        assert!(cache.clear().await.unwrap());
        assert!(!cache.clear().await.unwrap());
        assert_eq!(cache.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_custom_ttl() {
        let db = Database::open_memory().await.unwrap();
        let clock = Arc::new(ManualClock::new(START));
        let cache = SummaryCache::with_clock(db, clock.clone()).with_ttl(Duration::from_secs(60));

        cache.write(&sample_summary()).await.unwrap();
        clock.advance_ms(61_000);
        assert_eq!(cache.read().await.unwrap(), None);
    }
}
