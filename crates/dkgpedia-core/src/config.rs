//! Runtime configuration.
//!
//! Values resolve in three layers: built-in defaults, an optional TOML file,
//! then environment variables. The environment names match the ones the
//! web front-end has always used (`NEXT_PUBLIC_DKG_API_URL`, `ANALYZE_API_URL`,
//! `OPENAI_API_KEY`) so existing deployments keep working.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::cache::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use crate::error::{DkgError, DkgResult};

/// Default knowledge-graph service URL.
pub const DEFAULT_DKG_API_URL: &str = "http://localhost:9200";

/// Default analysis engine URL.
pub const DEFAULT_ANALYZE_API_URL: &str = "http://localhost:8000";

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default language model for term substitution.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Gateway configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dkg_api_url: String,
    pub analyze_api_url: String,
    /// Article scraper base URL. Falls back to `analyze_api_url`.
    pub scraper_api_url: Option<String>,
    /// Suggestion service base URL. Falls back to `analyze_api_url`.
    pub suggestions_api_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub host: String,
    pub port: u16,
    pub poll_interval_secs: u64,
    pub max_poll_attempts: u32,
    pub publish_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
    pub search_limit: usize,
    /// Pre-signed X-PAYMENT header used as the connected wallet.
    pub payment_header: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dkg_api_url: DEFAULT_DKG_API_URL.to_string(),
            analyze_api_url: DEFAULT_ANALYZE_API_URL.to_string(),
            scraper_api_url: None,
            suggestions_api_url: None,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            poll_interval_secs: 25,
            max_poll_attempts: 48,
            publish_timeout_secs: 30 * 60,
            cache_ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            search_limit: 10,
            payment_header: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("dkg_api_url", &self.dkg_api_url)
            .field("analyze_api_url", &self.analyze_api_url)
            .field("scraper_api_url", &self.scraper_url())
            .field("suggestions_api_url", &self.suggestions_url())
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("publish_timeout_secs", &self.publish_timeout_secs)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("cache_capacity", &self.cache_capacity)
            .field("search_limit", &self.search_limit)
            .field("payment_header", &self.payment_header.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Load configuration from an optional TOML file, then apply the process environment.
    pub fn load(path: Option<&Path>) -> DkgResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Configuration from the process environment only.
    pub fn from_env() -> DkgResult<Self> {
        Self::load(None)
    }

    /// Parse a TOML file. Missing keys keep their defaults.
    pub fn from_toml_file(path: &Path) -> DkgResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> DkgResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Overlay values from an environment lookup function.
    pub fn apply_env<F>(&mut self, lookup: F) -> DkgResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("NEXT_PUBLIC_DKG_API_URL").or_else(|| get("DKG_API_URL")) {
            self.dkg_api_url = url;
        }
        if let Some(url) = get("ANALYZE_API_URL") {
            self.analyze_api_url = url;
        }
        if let Some(url) = get("SCRAPER_API_URL") {
            self.scraper_api_url = Some(url);
        }
        if let Some(url) = get("SUGGESTIONS_API_URL") {
            self.suggestions_api_url = Some(url);
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.openai_base_url = url;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.openai_model = model;
        }
        if let Some(host) = get("DKGPEDIA_HOST") {
            self.host = host;
        }
        if let Some(port) = get("DKGPEDIA_PORT") {
            self.port = port
                .parse()
                .map_err(|_| DkgError::Config(format!("DKGPEDIA_PORT is not a valid port: {port}")))?;
        }
        if let Some(header) = get("DKGPEDIA_PAYMENT_HEADER") {
            self.payment_header = Some(header);
        }
        Ok(())
    }

    pub fn scraper_url(&self) -> &str {
        self.scraper_api_url.as_deref().unwrap_or(&self.analyze_api_url)
    }

    pub fn suggestions_url(&self) -> &str {
        self.suggestions_api_url.as_deref().unwrap_or(&self.analyze_api_url)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
