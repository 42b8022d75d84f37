//! Durable destinations for a run's records

use crate::extract::RecordCollection;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors that can occur while persisting records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Receives the full collection once, at the end of a run
pub trait RecordSink: Send + Sync {
    fn write(&self, records: &RecordCollection) -> SinkResult<()>;
}

/// Writes records as a pretty-printed JSON array, replacing the file
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonFileSink {
    fn write(&self, records: &RecordCollection) -> SinkResult<()> {
        let json = records.to_json()?;
        let io_error = |source: std::io::Error| SinkError::Io {
            path: self.path.display().to_string(),
            source,
        };

        let mut file = File::create(&self.path).map_err(io_error)?;
        file.write_all(json.as_bytes()).map_err(io_error)?;
        Ok(())
    }
}

/// Keeps every written collection in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    writes: Mutex<Vec<RecordCollection>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collections written so far, oldest first
    pub fn writes(&self) -> Vec<RecordCollection> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RecordSink for MemorySink {
    fn write(&self, records: &RecordCollection) -> SinkResult<()> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(records.clone());
        Ok(())
    }
}
