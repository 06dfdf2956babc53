use serde::{Deserialize, Serialize};

pub const BASE_URL_ENV: &str = "SECTION_FINDER_API_URL";
pub const TIMEOUT_ENV: &str = "SECTION_FINDER_TIMEOUT_SECS";

/// Origin used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

pub const MIN_TOP_N: u32 = 1;
pub const MAX_TOP_N: u32 = 20;
pub const DEFAULT_TOP_N: u32 = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub default_top_n: u32,
    pub use_query_expansion: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 60,
            default_top_n: DEFAULT_TOP_N,
            use_query_expansion: true,
        }
    }
}

impl ClientConfig {
    /// Reads `.env` if present, then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }

        match lookup(TIMEOUT_ENV).map(|v| v.trim().parse::<u64>()) {
            Some(Ok(secs)) if secs > 0 => config.request_timeout_secs = secs,
            Some(_) => tracing::warn!(
                var = TIMEOUT_ENV,
                "ignoring invalid timeout, using {}s",
                config.request_timeout_secs
            ),
            None => {}
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
