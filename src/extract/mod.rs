//! Extraction module for turning rendered pages into records
//!
//! This module contains:
//! - The single-page extractor, which never fails a page for a missing field
//! - The listing-page batch scraper
//! - Record types and the sinks they are persisted to

mod batch;
mod extractor;
mod record;
mod sink;

pub use batch::{BatchScraper, ItemErrorPolicy};
pub use extractor::{Extractor, FieldSelectors};
pub use record::{ExtractedRecord, RecordCollection};
pub use sink::{JsonFileSink, MemorySink, RecordSink, SinkError, SinkResult};
