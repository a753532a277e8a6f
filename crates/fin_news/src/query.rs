use serde::Deserialize;

pub const DEFAULT_COUNTRIES: &str = "gb,us";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_LIMIT: u32 = 9;
pub const DEFAULT_SORT: &str = "published_at:desc";

/// Query string as received; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsParams {
    pub q: Option<String>,
    pub tickers: Option<String>,
    pub countries: Option<String>,
    pub language: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

/// Filters for one upstream fetch, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    pub q: String,
    pub tickers: String,
    pub countries: String,
    pub language: String,
    pub limit: u32,
    pub sort: String,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            tickers: String::new(),
            countries: DEFAULT_COUNTRIES.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            limit: DEFAULT_LIMIT,
            sort: DEFAULT_SORT.to_string(),
        }
    }
}

impl From<NewsParams> for NewsQuery {
    fn from(params: NewsParams) -> Self {
        let or = |value: Option<String>, default: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self {
            q: or(params.q, ""),
            tickers: or(params.tickers, ""),
            countries: or(params.countries, DEFAULT_COUNTRIES),
            language: or(params.language, DEFAULT_LANGUAGE),
            limit: params
                .limit
                .and_then(|l| l.trim().parse().ok())
                .filter(|l| *l > 0)
                .unwrap_or(DEFAULT_LIMIT),
            sort: or(params.sort, DEFAULT_SORT),
        }
    }
}

impl NewsQuery {
    /// Upstream query pairs. `search` and `symbols` only appear when set.
    pub fn to_pairs(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("api_token", api_key.to_string()),
            ("countries", self.countries.clone()),
            ("language", self.language.clone()),
            ("sort", self.sort.clone()),
            ("limit", self.limit.to_string()),
        ];
        if !self.q.is_empty() {
            pairs.push(("search", self.q.clone()));
        }
        if !self.tickers.is_empty() {
            pairs.push(("symbols", self.tickers.clone()));
        }
        pairs.push(("topics", "finance".to_string()));
        pairs
    }
}
