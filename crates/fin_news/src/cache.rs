use std::fmt;
use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use fin_core::{Error, NewsArticle, Result};
use tokio::sync::RwLock;
use tracing::{debug, info};
use crate::marketaux::NewsSource;
use crate::query::NewsQuery;
use crate::API_KEY_ENV;

pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    articles: Vec<NewsArticle>,
    fetched_at: DateTime<Utc>,
}

/// One cached article list in front of the news API.
///
/// The slot is not keyed by query: while it is fresh every caller gets it,
/// whatever filters they asked for. The lock is never held across the
/// upstream call, so two callers arriving after expiry may both fetch; the
/// last write wins.
pub struct NewsCache {
    source: Arc<dyn NewsSource>,
    clock: Arc<dyn Clock>,
    api_key: Option<String>,
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl NewsCache {
    pub fn new(source: Arc<dyn NewsSource>, api_key: Option<String>) -> Self {
        Self::with_clock(
            source,
            api_key,
            Arc::new(SystemClock),
            Duration::seconds(DEFAULT_TTL_SECS),
        )
    }

    pub fn with_clock(
        source: Arc<dyn NewsSource>,
        api_key: Option<String>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            clock,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub async fn get_articles(&self, query: &NewsQuery) -> Result<Vec<NewsArticle>> {
        let now = self.clock.now();
        if let Some(entry) = self.entry.read().await.as_ref() {
            if now - entry.fetched_at < self.ttl {
                info!("🗞️ Serving {} cached articles", entry.articles.len());
                return Ok(entry.articles.clone());
            }
            debug!("News cache is stale (fetched at {})", entry.fetched_at);
        }

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config(format!("{} is not set", API_KEY_ENV)))?;

        let articles: Vec<NewsArticle> = self
            .source
            .fetch(api_key, query)
            .await?
            .into_iter()
            .map(NewsArticle::from)
            .collect();
        info!("🗞️ Fetched {} articles", articles.len());

        *self.entry.write().await = Some(CacheEntry {
            articles: articles.clone(),
            fetched_at: now,
        });
        Ok(articles)
    }
}

impl fmt::Debug for NewsCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsCache")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketaux::{UpstreamArticle, UpstreamEntity};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ManualClock(Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Mutex::new(Utc::now()))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl NewsSource for CountingSource {
        async fn fetch(&self, _api_key: &str, query: &NewsQuery) -> Result<Vec<UpstreamArticle>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(status) = self.fail_with {
                return Err(Error::Upstream { status, detail: "down".to_string() });
            }
            Ok(vec![UpstreamArticle {
                uuid: format!("fetch-{}", call),
                title: format!("News about {}", query.q),
                published_at: "2024-06-01T00:00:00Z".to_string(),
                url: "https://news.example".to_string(),
                source: Some("wire".to_string()),
                entities: vec![UpstreamEntity {
                    symbol: Some("SPY".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }])
        }
    }

    fn cache(
        source: &Arc<CountingSource>,
        clock: &Arc<ManualClock>,
        key: Option<&str>,
    ) -> NewsCache {
        NewsCache::with_clock(
            source.clone(),
            key.map(str::to_string),
            clock.clone(),
            Duration::seconds(DEFAULT_TTL_SECS),
        )
    }

    #[tokio::test]
    async fn test_fresh_entry_served_without_fetch() {
        let source = Arc::new(CountingSource::default());
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&source, &clock, Some("key"));

        let first = cache.get_articles(&NewsQuery::default()).await.unwrap();
        clock.advance(Duration::seconds(299));
        let second = cache.get_articles(&NewsQuery::default()).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(first[0].tickers, vec!["SPY"]);
        assert_eq!(first[0].source, "wire");
    }

    #[tokio::test]
    async fn test_stale_entry_is_refreshed() {
        let source = Arc::new(CountingSource::default());
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&source, &clock, Some("key"));

        cache.get_articles(&NewsQuery::default()).await.unwrap();
        clock.advance(Duration::seconds(DEFAULT_TTL_SECS));
        let refreshed = cache.get_articles(&NewsQuery::default()).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(refreshed[0].id, "fetch-2");
    }

    #[tokio::test]
    async fn test_cache_ignores_query_while_fresh() {
        let source = Arc::new(CountingSource::default());
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&source, &clock, Some("key"));

        let query = NewsQuery { q: "oil".to_string(), ..NewsQuery::default() };
        cache.get_articles(&query).await.unwrap();
        let other = NewsQuery { q: "gold".to_string(), ..NewsQuery::default() };
        let served = cache.get_articles(&other).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(served[0].title, "News about oil");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_fetch() {
        let source = Arc::new(CountingSource::default());
        let clock = Arc::new(ManualClock::new());

        for key in [None, Some("  ")] {
            let cache = cache(&source, &clock, key);
            match cache.get_articles(&NewsQuery::default()).await {
                Err(Error::Config(message)) => assert!(message.contains("MARKETAUX_API_KEY")),
                other => panic!("unexpected result {:?}", other),
            }
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_cache_empty() {
        let source = Arc::new(CountingSource { fail_with: Some(429), ..Default::default() });
        let clock = Arc::new(ManualClock::new());
        let cache = cache(&source, &clock, Some("key"));

        assert!(matches!(
            cache.get_articles(&NewsQuery::default()).await,
            Err(Error::Upstream { status: 429, .. })
        ));
        assert!(cache.get_articles(&NewsQuery::default()).await.is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
