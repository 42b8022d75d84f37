use crate::config::types::{ApiConfig, Config, OutputConfig, PageConfig, ScraperConfig};
use crate::ConfigError;
use url::Url;

const MIN_WAIT_TIMEOUT_MS: u64 = 100;
const MAX_WAIT_TIMEOUT_MS: u64 = 120_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(api) = &config.api {
        validate_api_config(api)?;
    }
    if let Some(scraper) = &config.scraper {
        validate_scraper_config(scraper)?;
    }
    if let Some(page) = &config.page {
        validate_page_config(page)?;
    }
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates API configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    validate_http_url("base-url", &config.base_url)?;
    validate_path_segment("owner", &config.owner)?;
    validate_path_segment("repository", &config.repository)?;

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates batch scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    validate_http_url("listing-url", &config.listing_url)?;
    validate_selector("item-selector", &config.item_selector)?;
    validate_selector("price-selector", &config.price_selector)?;
    validate_selector("image-selector", &config.image_selector)?;
    validate_wait_timeout(config.wait_timeout_ms)?;
    Ok(())
}

/// Validates single-page extraction configuration
fn validate_page_config(config: &PageConfig) -> Result<(), ConfigError> {
    validate_selector("price-selector", &config.price_selector)?;
    validate_selector("image-selector", &config.image_selector)?;
    validate_wait_timeout(config.wait_timeout_ms)?;
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.records_path.is_empty() {
        return Err(ConfigError::Validation(
            "records-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

/// Owner and repository names are interpolated into URL paths verbatim
fn validate_path_segment(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ConfigError::Validation(format!(
            "{} must contain only ASCII letters, digits, '-', '_' or '.', got '{}'",
            field, value
        )));
    }

    if value == "." || value == ".." {
        return Err(ConfigError::Validation(format!(
            "{} cannot be '{}'",
            field, value
        )));
    }

    Ok(())
}

fn validate_selector(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }

    scraper::Selector::parse(value).map_err(|e| {
        ConfigError::Validation(format!("{} '{}' is not a valid selector: {:?}", field, value, e))
    })?;

    Ok(())
}

fn validate_wait_timeout(timeout_ms: u64) -> Result<(), ConfigError> {
    if !(MIN_WAIT_TIMEOUT_MS..=MAX_WAIT_TIMEOUT_MS).contains(&timeout_ms) {
        return Err(ConfigError::Validation(format!(
            "wait-timeout-ms must be between {} and {}, got {}",
            MIN_WAIT_TIMEOUT_MS, MAX_WAIT_TIMEOUT_MS, timeout_ms
        )));
    }
    Ok(())
}
