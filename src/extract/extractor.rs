//! Single-page extraction
//!
//! Reads the price and image alt text of one product page. A field whose
//! element never shows up is left empty; any other failure is logged and the
//! record gathered so far is returned. Extraction itself never fails.

use crate::config::PageConfig;
use crate::extract::ExtractedRecord;
use crate::page::{ElementHandle, PageAccessor, PageResult};
use std::time::Duration;

/// Selectors locating the fields of one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelectors {
    /// Element whose trimmed text is the price
    pub price: String,
    /// Image whose `alt` attribute is read
    pub image: String,
}

/// How a field's value is read off its element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldRead {
    /// Text content, trimmed
    Text,
    Attribute(&'static str),
}

pub(crate) async fn read_element(
    element: &dyn ElementHandle,
    field: FieldRead,
) -> PageResult<Option<String>> {
    match field {
        FieldRead::Text => Ok(element
            .text_content()
            .await?
            .map(|text| text.trim().to_string())),
        FieldRead::Attribute(name) => element.get_attribute(name).await,
    }
}

/// Extracts one record per page
#[derive(Debug, Clone)]
pub struct Extractor {
    selectors: FieldSelectors,
    wait_timeout: Duration,
}

impl Extractor {
    pub fn new(selectors: FieldSelectors, wait_timeout: Duration) -> Self {
        Self {
            selectors,
            wait_timeout,
        }
    }

    pub fn from_config(config: &PageConfig) -> Self {
        Self::new(
            FieldSelectors {
                price: config.price_selector.clone(),
                image: config.image_selector.clone(),
            },
            Duration::from_millis(config.wait_timeout_ms),
        )
    }

    /// Navigates `page` to `url` and reads every field
    pub async fn extract(&self, page: &mut dyn PageAccessor, url: &str) -> ExtractedRecord {
        tracing::info!("Scraping: {}", url);

        let mut record = ExtractedRecord::for_url(url);
        match self.fill(page, url, &mut record).await {
            Ok(()) => tracing::debug!("Scraped data: {:?}", record),
            Err(e) => tracing::error!("Error scraping {}: {}", url, e),
        }
        record
    }

    async fn fill(
        &self,
        page: &mut dyn PageAccessor,
        url: &str,
        record: &mut ExtractedRecord,
    ) -> PageResult<()> {
        page.navigate(url).await?;

        if let Some(price) = self
            .read_field(page, &self.selectors.price, FieldRead::Text)
            .await?
        {
            record.price = price;
        }

        if let Some(alt) = self
            .read_field(page, &self.selectors.image, FieldRead::Attribute("alt"))
            .await?
        {
            record.image_alt_text = alt;
        }

        Ok(())
    }

    /// `Ok(None)` when the element is absent or the wait timed out
    async fn read_field(
        &self,
        page: &mut dyn PageAccessor,
        selector: &str,
        field: FieldRead,
    ) -> PageResult<Option<String>> {
        match page.wait_for_selector(selector, self.wait_timeout).await {
            Ok(()) => {}
            Err(e) if e.is_absence() => {
                tracing::debug!("Leaving field empty: {}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        }

        let Some(element) = page.query_selector(selector).await? else {
            return Ok(None);
        };
        read_element(element.as_ref(), field).await
    }
}
