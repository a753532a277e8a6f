use std::fmt;
use async_trait::async_trait;
use fin_core::{Error, NewsArticle, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};
use crate::query::NewsQuery;

pub const MARKETAUX_NEWS_URL: &str = "https://api.marketaux.com/v1/news/all";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamEntity {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// An article as the news API returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamArticle {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub entities: Vec<UpstreamEntity>,
}

impl From<UpstreamArticle> for NewsArticle {
    fn from(article: UpstreamArticle) -> Self {
        Self {
            id: article.uuid,
            title: article.title,
            source: article
                .source
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            date: article.published_at,
            url: article.url,
            tickers: article
                .entities
                .into_iter()
                .filter_map(|entity| entity.symbol)
                .filter(|symbol| !symbol.is_empty())
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct MarketauxResponse {
    #[serde(default)]
    data: Vec<UpstreamArticle>,
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch one page of articles matching `query`
    async fn fetch(&self, api_key: &str, query: &NewsQuery) -> Result<Vec<UpstreamArticle>>;
}

pub struct MarketauxClient {
    client: Client,
    endpoint: String,
}

impl MarketauxClient {
    pub fn new() -> Self {
        Self::with_endpoint(MARKETAUX_NEWS_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for MarketauxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarketauxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketauxClient")
            .field("client", &"<reqwest::Client>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl NewsSource for MarketauxClient {
    async fn fetch(&self, api_key: &str, query: &NewsQuery) -> Result<Vec<UpstreamArticle>> {
        info!("📰 Fetching news from {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&query.to_pairs(api_key))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("News API returned {}", status);
            return Err(Error::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.json::<MarketauxResponse>().await?;
        Ok(body.data)
    }
}
