//! Forge-Harvest: typed access to a repository-hosting API and listing pages
//!
//! This crate turns two only partially-controlled surfaces into typed data:
//! a GitHub-shaped REST API (through [`api::RepositoryClient`]) and rendered
//! listing pages (through [`extract::Extractor`] and [`extract::BatchScraper`]).
//! Both sides talk to the outside world through narrow capability traits
//! ([`transport::Transport`] and [`page::PageAccessor`]) so any conforming
//! implementation, or a test stub, can be plugged in.

pub mod api;
pub mod config;
pub mod extract;
pub mod page;
pub mod transport;

use thiserror::Error;

/// Main error type for Forge-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] transport::TransportError),

    #[error("Page error: {0}")]
    Page(#[from] page::PageError),

    #[error("Item container never appeared on {url}: {source}")]
    Enumeration {
        url: String,
        source: page::PageError,
    },

    #[error("Failed to read item {index} on {url}: {source}")]
    ItemRead {
        url: String,
        index: usize,
        source: page::PageError,
    },

    #[error("Sink error: {0}")]
    Sink(#[from] extract::SinkError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing [{0}] section in config")]
    MissingSection(&'static str),

    #[error("No API token configured: {0}")]
    MissingToken(String),
}

/// Result type alias for Forge-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{RepositoryClient, ResourceIdentity};
pub use config::Config;
pub use extract::{BatchScraper, ExtractedRecord, Extractor, RecordCollection};
pub use transport::{ApiResponse, ReqwestTransport, Transport};
