//! Page access capabilities and error types
//!
//! This module defines the trait interface the extractor and batch scraper
//! are written against. A browser driver, a static-HTML fetcher, or a test
//! stub all fit behind these traits.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum PageError {
    #[error("Timed out after {timeout_ms}ms waiting for '{selector}'")]
    Timeout { selector: String, timeout_ms: u64 },

    #[error("No element matches '{selector}'")]
    ElementNotFound { selector: String },

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid selector '{0}'")]
    InvalidSelector(String),

    #[error("Failed to start browsing session: {0}")]
    Launch(String),

    #[error("Page has not been navigated yet")]
    NotNavigated,

    #[error("Browsing session is closed")]
    Closed,
}

impl PageError {
    /// True for errors meaning "the element is not there", as opposed to the
    /// page itself being unusable
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            PageError::Timeout { .. } | PageError::ElementNotFound { .. }
        )
    }
}

/// Result type for page operations
pub type PageResult<T> = Result<T, PageError>;

/// One element found on a page
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Concatenated text of the element and its descendants
    async fn text_content(&self) -> PageResult<Option<String>>;

    /// Value of attribute `name`, `None` when the attribute is absent
    async fn get_attribute(&self, name: &str) -> PageResult<Option<String>>;

    /// First descendant matching `selector`
    async fn query_selector(&self, selector: &str) -> PageResult<Option<Box<dyn ElementHandle>>>;
}

/// A navigable page
#[async_trait]
pub trait PageAccessor: Send {
    async fn navigate(&mut self, url: &str) -> PageResult<()>;

    /// Waits until `selector` matches, failing with `PageError::Timeout`
    /// once `timeout` has elapsed
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> PageResult<()>;

    /// First element matching `selector`
    async fn query_selector(&self, selector: &str) -> PageResult<Option<Box<dyn ElementHandle>>>;

    /// All elements matching `selector`, in document order
    async fn query_all(&self, selector: &str) -> PageResult<Vec<Box<dyn ElementHandle>>>;
}

/// An acquired browsing session
///
/// Must be closed on every exit path; holders call `close` explicitly
/// because release is asynchronous.
#[async_trait]
pub trait BrowserSession: Send {
    async fn new_page(&mut self) -> PageResult<Box<dyn PageAccessor>>;

    async fn close(&mut self) -> PageResult<()>;
}

/// Acquires browsing sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> PageResult<Box<dyn BrowserSession>>;
}
