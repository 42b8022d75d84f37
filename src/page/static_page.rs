//! Static-HTML page accessor
//!
//! Fetches pages with `reqwest` and queries them with `scraper`. There is no
//! script execution: waiting for a selector re-fetches the page at a fixed
//! interval until the selector matches or the timeout runs out, which is
//! enough for server-rendered listings.

use crate::page::{BrowserSession, ElementHandle, PageAccessor, PageError, PageResult, SessionLauncher};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Desktop browser user agent sent when none is configured
pub const DEFAULT_BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches static-HTML sessions
#[derive(Debug, Clone)]
pub struct StaticLauncher {
    user_agent: String,
    poll_interval: Duration,
    request_timeout: Duration,
}

impl StaticLauncher {
    pub fn new(user_agent: Option<&str>) -> Self {
        Self {
            user_agent: user_agent.unwrap_or(DEFAULT_BROWSER_USER_AGENT).to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets how often a pending wait re-fetches the page
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl Default for StaticLauncher {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl SessionLauncher for StaticLauncher {
    async fn launch(&self) -> PageResult<Box<dyn BrowserSession>> {
        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| PageError::Launch(e.to_string()))?;

        tracing::debug!("Static browsing session started");
        Ok(Box::new(StaticSession {
            client,
            poll_interval: self.poll_interval,
            closed: false,
        }))
    }
}

/// Session sharing one HTTP client across its pages
#[derive(Debug)]
pub struct StaticSession {
    client: Client,
    poll_interval: Duration,
    closed: bool,
}

#[async_trait]
impl BrowserSession for StaticSession {
    async fn new_page(&mut self) -> PageResult<Box<dyn PageAccessor>> {
        if self.closed {
            return Err(PageError::Closed);
        }
        Ok(Box::new(StaticPage::new(
            self.client.clone(),
            self.poll_interval,
        )))
    }

    async fn close(&mut self) -> PageResult<()> {
        self.closed = true;
        tracing::debug!("Static browsing session closed");
        Ok(())
    }
}

/// One fetched document
#[derive(Debug)]
pub struct StaticPage {
    client: Client,
    poll_interval: Duration,
    url: Option<String>,
    html: Option<Arc<str>>,
}

impl StaticPage {
    pub fn new(client: Client, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
            url: None,
            html: None,
        }
    }

    /// Builds a page over already-fetched HTML
    pub fn from_html(client: Client, url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            client,
            poll_interval: DEFAULT_POLL_INTERVAL,
            url: Some(url.into()),
            html: Some(Arc::from(html.into())),
        }
    }

    async fn fetch(&self, url: &str) -> PageResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| PageError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PageError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| PageError::Http {
            url: url.to_string(),
            source,
        })
    }

    fn source(&self) -> PageResult<&Arc<str>> {
        self.html.as_ref().ok_or(PageError::NotNavigated)
    }

    // Html is not Send, so every parse stays inside a synchronous helper.
    fn matches(&self, selector: &Selector) -> PageResult<bool> {
        let document = Html::parse_document(self.source()?);
        let found = document.select(selector).next().is_some();
        Ok(found)
    }

    fn collect(&self, selector: &Selector, limit: usize) -> PageResult<Vec<StaticElement>> {
        let source = self.source()?;
        let document = Html::parse_document(source);
        let elements = document_elements(&document)
            .filter(|(_, element)| selector.matches(element))
            .take(limit)
            .map(|(position, element)| StaticElement::capture(source, position, element))
            .collect();
        Ok(elements)
    }
}

#[async_trait]
impl PageAccessor for StaticPage {
    async fn navigate(&mut self, url: &str) -> PageResult<()> {
        tracing::debug!("Navigating to {}", url);
        let html = self.fetch(url).await?;
        self.url = Some(url.to_string());
        self.html = Some(Arc::from(html));
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> PageResult<()> {
        let parsed = parse_selector(selector)?;
        let deadline = Instant::now() + timeout;

        loop {
            if self.matches(&parsed)? {
                return Ok(());
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(wait_timed_out(selector, timeout));
            }

            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;

            if let Some(url) = self.url.clone() {
                // The reload counts against the same deadline as the wait
                let remaining = deadline.saturating_duration_since(Instant::now());
                match tokio::time::timeout(remaining, self.fetch(&url)).await {
                    Ok(html) => self.html = Some(Arc::from(html?)),
                    Err(_) => return Err(wait_timed_out(selector, timeout)),
                }
            }
        }
    }

    async fn query_selector(&self, selector: &str) -> PageResult<Option<Box<dyn ElementHandle>>> {
        let parsed = parse_selector(selector)?;
        let element = self.collect(&parsed, 1)?.into_iter().next();
        Ok(element.map(|e| Box::new(e) as Box<dyn ElementHandle>))
    }

    async fn query_all(&self, selector: &str) -> PageResult<Vec<Box<dyn ElementHandle>>> {
        let parsed = parse_selector(selector)?;
        let elements = self.collect(&parsed, usize::MAX)?;
        Ok(elements
            .into_iter()
            .map(|e| Box::new(e) as Box<dyn ElementHandle>)
            .collect())
    }
}

/// Owned snapshot of an element: its text and attributes, plus where it sits
/// in the document it came from
///
/// Scoped queries re-parse the whole owning document rather than the
/// element's own markup, so rows, cells and options keep their table or
/// select context.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticElement {
    document: Arc<str>,
    /// Index among the document's elements, in document order
    position: usize,
    text: String,
    attributes: Vec<(String, String)>,
}

impl fmt::Debug for StaticElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticElement")
            .field("position", &self.position)
            .field("text", &self.text)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl StaticElement {
    fn capture(document: &Arc<str>, position: usize, element: ElementRef<'_>) -> Self {
        Self {
            document: Arc::clone(document),
            position,
            text: element.text().collect(),
            attributes: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    fn find_descendant(&self, selector: &Selector) -> Option<StaticElement> {
        let document = Html::parse_document(&self.document);
        let (_, own) = document_elements(&document).nth(self.position)?;

        // Descendants follow their ancestor directly in document order,
        // so offsets within the subtree map back onto document positions.
        let found = own
            .descendants()
            .filter_map(ElementRef::wrap)
            .enumerate()
            .skip(1)
            .find(|(_, candidate)| selector.matches(candidate))
            .map(|(offset, candidate)| {
                StaticElement::capture(&self.document, self.position + offset, candidate)
            });
        found
    }
}

/// Every element of `document` in document order, with its position
fn document_elements(document: &Html) -> impl Iterator<Item = (usize, ElementRef<'_>)> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .enumerate()
}

fn wait_timed_out(selector: &str, timeout: Duration) -> PageError {
    PageError::Timeout {
        selector: selector.to_string(),
        timeout_ms: timeout.as_millis() as u64,
    }
}

#[async_trait]
impl ElementHandle for StaticElement {
    async fn text_content(&self) -> PageResult<Option<String>> {
        Ok(Some(self.text.clone()))
    }

    async fn get_attribute(&self, name: &str) -> PageResult<Option<String>> {
        Ok(self
            .attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.clone()))
    }

    async fn query_selector(&self, selector: &str) -> PageResult<Option<Box<dyn ElementHandle>>> {
        let parsed = parse_selector(selector)?;
        Ok(self
            .find_descendant(&parsed)
            .map(|e| Box::new(e) as Box<dyn ElementHandle>))
    }
}

fn parse_selector(selector: &str) -> PageResult<Selector> {
    Selector::parse(selector).map_err(|_| PageError::InvalidSelector(selector.to_string()))
}
