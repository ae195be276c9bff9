//! Outbound telemetry uplink
//!
//! Network egress is not granted to the acquisition host. [`DeniedUplink`]
//! stands in for the cloud forwarder: it is called on every batch flush so
//! the attempt is observable, and it always fails with
//! [`SinkError::CapabilityDenied`]. No socket is ever opened.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use super::SinkError;
use crate::batch::Batch;

#[async_trait]
pub trait TelemetryUplink: Send {
    /// Forward a flushed batch off-host.
    async fn forward(&mut self, batch: &Batch) -> Result<(), SinkError>;

    /// Destination, for logging.
    fn endpoint(&self) -> &str;
}

/// Uplink that refuses every forward.
#[derive(Debug, Clone)]
pub struct DeniedUplink {
    endpoint: String,
    attempts: Arc<AtomicU64>,
}

impl DeniedUplink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of forward calls made so far (shared across clones).
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }
}

impl Default for DeniedUplink {
    fn default() -> Self {
        Self::new(crate::config::defaults::DEFAULT_UPLINK_ENDPOINT)
    }
}

#[async_trait]
impl TelemetryUplink for DeniedUplink {
    async fn forward(&mut self, batch: &Batch) -> Result<(), SinkError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        debug!(endpoint = %self.endpoint, batch_id = %batch.id, "Uplink forward refused");
        Err(SinkError::CapabilityDenied {
            endpoint: self.endpoint.clone(),
        })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
