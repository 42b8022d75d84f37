use crate::extract::ItemErrorPolicy;
use serde::Deserialize;

/// Default per-element wait, matching what listing pages usually need to render
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

/// Default request timeout for API calls
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for Forge-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub scraper: Option<ScraperConfig>,
    #[serde(default)]
    pub page: Option<PageConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Repository-hosting API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://api.github.com`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Account owning the bound repository
    pub owner: String,

    /// Repository the client is bound to
    pub repository: String,

    /// Literal bearer token
    #[serde(default)]
    pub token: Option<String>,

    /// Name of an environment variable holding the bearer token
    #[serde(rename = "token-env", default)]
    pub token_env: Option<String>,

    #[serde(rename = "user-agent", default = "default_api_user_agent")]
    pub user_agent: String,

    #[serde(rename = "timeout-secs", default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Resolves the bearer token from `token` or the variable named by `token-env`
    ///
    /// A literal `token` wins over `token-env`.
    pub fn resolve_token(&self) -> Result<String, crate::ConfigError> {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }

        match &self.token_env {
            Some(var) => std::env::var(var)
                .ok()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    crate::ConfigError::MissingToken(format!(
                        "environment variable '{}' is unset or empty",
                        var
                    ))
                }),
            None => Err(crate::ConfigError::MissingToken(
                "set either 'token' or 'token-env' in [api]".to_string(),
            )),
        }
    }
}

/// Listing-page batch scrape configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Listing page to enumerate items from
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Selector matching each item container
    #[serde(rename = "item-selector")]
    pub item_selector: String,

    /// Price selector, scoped to an item
    #[serde(rename = "price-selector")]
    pub price_selector: String,

    /// Image selector, scoped to an item; its `alt` attribute is read
    #[serde(rename = "image-selector")]
    pub image_selector: String,

    /// Maximum wait for the item container (milliseconds)
    #[serde(rename = "wait-timeout-ms", default = "default_wait_timeout")]
    pub wait_timeout_ms: u64,

    /// What to do when one item's field cannot be read
    #[serde(rename = "on-item-error", default)]
    pub on_item_error: ItemErrorPolicy,

    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

/// Single-page extraction configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    #[serde(rename = "price-selector")]
    pub price_selector: String,

    #[serde(rename = "image-selector")]
    pub image_selector: String,

    /// Maximum wait per field (milliseconds)
    #[serde(rename = "wait-timeout-ms", default = "default_wait_timeout")]
    pub wait_timeout_ms: u64,

    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON records file
    #[serde(rename = "records-path", default = "default_records_path")]
    pub records_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_path: default_records_path(),
        }
    }
}

fn default_api_user_agent() -> String {
    format!("forge-harvest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_api_timeout() -> u64 {
    DEFAULT_API_TIMEOUT_SECS
}

fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_MS
}

fn default_records_path() -> String {
    "product_data.json".to_string()
}
