pub mod cache;
pub mod marketaux;
pub mod query;

pub use cache::{Clock, NewsCache, SystemClock, DEFAULT_TTL_SECS};
pub use marketaux::{MarketauxClient, NewsSource, UpstreamArticle, UpstreamEntity};
pub use query::{NewsParams, NewsQuery};

pub const API_KEY_ENV: &str = "MARKETAUX_API_KEY";

pub mod prelude {
    pub use super::{MarketauxClient, NewsCache, NewsQuery, NewsSource};
    pub use fin_core::{NewsArticle, Result};
}
