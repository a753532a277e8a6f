use fin_core::{Error, Result};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_UPLOAD_PATH: &str = "/api/upload";
pub const DEFAULT_ANALYZE_PATH: &str = "/api/analyze";

/// Where the AI/OCR backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    base_url: String,
    upload_path: String,
    analyze_path: String,
}

impl BackendConfig {
    pub fn new(
        base_url: impl Into<String>,
        upload_path: impl Into<String>,
        analyze_path: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("Invalid backend base URL '{}': {}", base_url, e)))?;

        Ok(Self {
            base_url,
            upload_path: normalize_path(upload_path.into()),
            analyze_path: normalize_path(analyze_path.into()),
        })
    }

    /// Reads `BACKEND_BASE_URL`, `BACKEND_UPLOAD_PATH` and
    /// `BACKEND_ANALYZE_PATH`; unset or empty values take the defaults.
    pub fn from_env() -> Result<Self> {
        Self::new(
            env_or("BACKEND_BASE_URL", DEFAULT_BASE_URL),
            env_or("BACKEND_UPLOAD_PATH", DEFAULT_UPLOAD_PATH),
            env_or("BACKEND_ANALYZE_PATH", DEFAULT_ANALYZE_PATH),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_url(&self) -> String {
        format!("{}{}", self.base_url, self.upload_path)
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.base_url, self.analyze_path)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            analyze_path: DEFAULT_ANALYZE_PATH.to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn normalize_path(path: String) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
