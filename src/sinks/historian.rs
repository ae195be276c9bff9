//! Historian sinks
//!
//! The acquisition loop hands every admitted measurement to
//! [`HistorianSink::accept`] and every flushed batch to
//! [`HistorianSink::accept_batch`]. Implementations should fail fast; the
//! loop logs the error and carries on.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::SinkError;
use crate::batch::Batch;
use crate::types::Measurement;

#[async_trait]
pub trait HistorianSink: Send {
    /// Accept a single quality-flagged measurement.
    async fn accept(&mut self, measurement: &Measurement) -> Result<(), SinkError>;

    /// Accept a flushed batch.
    async fn accept_batch(&mut self, batch: &Batch) -> Result<(), SinkError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Tracing Historian
// ============================================================================

/// Writes measurements and batch summaries to the log. Default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHistorian;

#[async_trait]
impl HistorianSink for TracingHistorian {
    async fn accept(&mut self, m: &Measurement) -> Result<(), SinkError> {
        debug!(
            tag = %m.tag,
            value = ?m.value,
            unit = %m.unit,
            quality = %m.quality,
            device = %m.device_id,
            "Historian: measurement"
        );
        Ok(())
    }

    async fn accept_batch(&mut self, batch: &Batch) -> Result<(), SinkError> {
        info!(
            batch_id = %batch.id,
            size = batch.len(),
            started_at = %batch.started_at,
            "Historian: batch stored"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

// ============================================================================
// JSON Lines Historian
// ============================================================================

/// Appends each flushed batch as one JSON object per line.
///
/// Individual measurements are not written; they reach the file as part of
/// their batch.
#[derive(Debug, Clone)]
pub struct JsonLinesHistorian {
    path: PathBuf,
}

impl JsonLinesHistorian {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HistorianSink for JsonLinesHistorian {
    async fn accept(&mut self, _measurement: &Measurement) -> Result<(), SinkError> {
        Ok(())
    }

    async fn accept_batch(&mut self, batch: &Batch) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(batch)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), batch_id = %batch.id, "Batch appended");
        Ok(())
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}

// ============================================================================
// Memory Historian
// ============================================================================

#[derive(Debug, Default)]
struct MemoryRecord {
    measurements: Vec<Measurement>,
    batches: Vec<Batch>,
    reject: bool,
}

/// In-memory historian. Clones share the same record, so a caller can keep
/// one handle for inspection after moving another into the loop.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistorian {
    inner: Arc<Mutex<MemoryRecord>>,
}

impl MemoryHistorian {
    pub fn new() -> Self {
        Self::default()
    }

    /// A historian that rejects every write, for failure-isolation checks.
    pub fn rejecting() -> Self {
        let historian = Self::default();
        if let Ok(mut rec) = historian.inner.lock() {
            rec.reject = true;
        }
        historian
    }

    pub fn measurements(&self) -> Vec<Measurement> {
        self.inner
            .lock()
            .map(|rec| rec.measurements.clone())
            .unwrap_or_default()
    }

    pub fn batches(&self) -> Vec<Batch> {
        self.inner
            .lock()
            .map(|rec| rec.batches.clone())
            .unwrap_or_default()
    }

    fn with_record<F>(&self, f: F) -> Result<(), SinkError>
    where
        F: FnOnce(&mut MemoryRecord),
    {
        let mut rec = self
            .inner
            .lock()
            .map_err(|_| SinkError::Historian("memory historian lock poisoned".to_string()))?;
        if rec.reject {
            return Err(SinkError::Historian("memory historian is rejecting writes".to_string()));
        }
        f(&mut rec);
        Ok(())
    }
}

#[async_trait]
impl HistorianSink for MemoryHistorian {
    async fn accept(&mut self, measurement: &Measurement) -> Result<(), SinkError> {
        self.with_record(|rec| rec.measurements.push(measurement.clone()))
    }

    async fn accept_batch(&mut self, batch: &Batch) -> Result<(), SinkError> {
        self.with_record(|rec| rec.batches.push(batch.clone()))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
