//! Listing-page batch scrape
//!
//! One run launches a session, waits for the item containers, reads every
//! item, writes the whole collection to a sink, and closes the session on
//! every exit path. Records are only persisted after the last item is read.

use crate::config::ScraperConfig;
use crate::extract::extractor::{read_element, FieldRead, FieldSelectors};
use crate::extract::{ExtractedRecord, RecordCollection, RecordSink};
use crate::page::{BrowserSession, ElementHandle, PageError, PageResult, SessionLauncher};
use crate::{HarvestError, Result};
use serde::Deserialize;
use std::time::Duration;

/// What a batch run does when one item's field cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemErrorPolicy {
    /// Stop the run; nothing is written
    #[default]
    Abort,
    /// Leave the field empty and keep going
    Recover,
}

/// Scrapes every item of one listing page
#[derive(Debug, Clone)]
pub struct BatchScraper {
    listing_url: String,
    item_selector: String,
    selectors: FieldSelectors,
    wait_timeout: Duration,
    item_errors: ItemErrorPolicy,
}

impl BatchScraper {
    pub fn new(
        listing_url: impl Into<String>,
        item_selector: impl Into<String>,
        selectors: FieldSelectors,
    ) -> Self {
        Self {
            listing_url: listing_url.into(),
            item_selector: item_selector.into(),
            selectors,
            wait_timeout: Duration::from_millis(crate::config::DEFAULT_WAIT_TIMEOUT_MS),
            item_errors: ItemErrorPolicy::default(),
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            config.listing_url.clone(),
            config.item_selector.clone(),
            FieldSelectors {
                price: config.price_selector.clone(),
                image: config.image_selector.clone(),
            },
        )
        .with_wait_timeout(Duration::from_millis(config.wait_timeout_ms))
        .with_item_error_policy(config.on_item_error)
    }

    /// Sets the maximum wait for the item containers
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    pub fn with_item_error_policy(mut self, policy: ItemErrorPolicy) -> Self {
        self.item_errors = policy;
        self
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    /// Runs a full scrape and writes the records to `sink`
    ///
    /// The session from `launcher` is closed whether or not the scrape
    /// succeeded. A close failure is reported only when the scrape itself
    /// succeeded; otherwise the scrape error wins and the close failure is
    /// logged.
    ///
    /// # Errors
    ///
    /// * `HarvestError::Enumeration` - the item containers never appeared
    /// * `HarvestError::ItemRead` - an item could not be read under
    ///   `ItemErrorPolicy::Abort`
    /// * `HarvestError::Page` - launch or navigation failed
    /// * `HarvestError::Sink` - the records could not be written
    pub async fn run(
        &self,
        launcher: &dyn SessionLauncher,
        sink: &dyn RecordSink,
    ) -> Result<RecordCollection> {
        tracing::info!("Launching browser session...");
        let mut session = match launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to launch browser session: {}", e);
                return Err(e.into());
            }
        };

        let outcome = self.scrape_and_store(session.as_mut(), sink).await;

        tracing::info!("Closing browser session...");
        let closed = session.close().await;

        match (outcome, closed) {
            (Ok(records), Ok(())) => Ok(records),
            (Ok(_), Err(e)) => {
                tracing::error!("Failed to close browser session: {}", e);
                Err(e.into())
            }
            (Err(e), closed) => {
                if let Err(close_error) = closed {
                    tracing::warn!("Failed to close browser session: {}", close_error);
                }
                Err(e)
            }
        }
    }

    async fn scrape_and_store(
        &self,
        session: &mut dyn BrowserSession,
        sink: &dyn RecordSink,
    ) -> Result<RecordCollection> {
        let records = match self.scrape(session).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Scraping failed: {}", e);
                return Err(e);
            }
        };

        sink.write(&records)?;
        tracing::info!("Saved {} records", records.len());
        Ok(records)
    }

    /// Reads every item on the listing page without persisting anything
    pub async fn scrape(&self, session: &mut dyn BrowserSession) -> Result<RecordCollection> {
        let mut page = session.new_page().await?;

        tracing::info!("Navigating to listing page {}", self.listing_url);
        page.navigate(&self.listing_url).await?;

        page.wait_for_selector(&self.item_selector, self.wait_timeout)
            .await
            .map_err(|source| HarvestError::Enumeration {
                url: self.listing_url.clone(),
                source,
            })?;

        let items = page.query_all(&self.item_selector).await?;
        tracing::info!("Found {} items", items.len());

        let mut records = RecordCollection::new();
        for (index, item) in items.iter().enumerate() {
            records.push(self.read_item(index, item.as_ref()).await?);
        }

        Ok(records)
    }

    async fn read_item(&self, index: usize, item: &dyn ElementHandle) -> Result<ExtractedRecord> {
        let price = self
            .read_scoped(item, &self.selectors.price, FieldRead::Text)
            .await;
        let price = self.settle(index, &self.selectors.price, price)?;

        let image_alt = self
            .read_scoped(item, &self.selectors.image, FieldRead::Attribute("alt"))
            .await;
        let image_alt = self.settle(index, &self.selectors.image, image_alt)?;

        Ok(ExtractedRecord {
            price,
            image_alt_text: image_alt,
            source_url: self.listing_url.clone(),
        })
    }

    /// A missing sub-element is an error; a missing attribute or text is ""
    async fn read_scoped(
        &self,
        item: &dyn ElementHandle,
        selector: &str,
        field: FieldRead,
    ) -> PageResult<String> {
        let element = item
            .query_selector(selector)
            .await?
            .ok_or_else(|| PageError::ElementNotFound {
                selector: selector.to_string(),
            })?;

        Ok(read_element(element.as_ref(), field)
            .await?
            .unwrap_or_default())
    }

    fn settle(&self, index: usize, selector: &str, read: PageResult<String>) -> Result<String> {
        match (read, self.item_errors) {
            (Ok(value), _) => Ok(value),
            (Err(source), ItemErrorPolicy::Abort) => Err(HarvestError::ItemRead {
                url: self.listing_url.clone(),
                index,
                source,
            }),
            (Err(source), ItemErrorPolicy::Recover) => {
                tracing::warn!(
                    "Item {} on {}: leaving '{}' empty: {}",
                    index,
                    self.listing_url,
                    selector,
                    source
                );
                Ok(String::new())
            }
        }
    }
}
