//! Downstream sinks for acquired data
//!
//! Two collaborator seams sit after the batch aggregator:
//!
//! - [`HistorianSink`]: local, best-effort storage of measurements and
//!   flushed batches. Failures are logged by the caller and never fatal.
//! - [`TelemetryUplink`]: outbound network forwarding. Outbound traffic is a
//!   denied capability on this host; the only implementation,
//!   [`DeniedUplink`], fails every call with [`SinkError::CapabilityDenied`]
//!   so that the attempt stays observable.

pub mod historian;
pub mod uplink;

pub use historian::{HistorianSink, JsonLinesHistorian, MemoryHistorian, TracingHistorian};
pub use uplink::{DeniedUplink, TelemetryUplink};

/// Sink failures
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Outbound telemetry to {endpoint} denied: network egress is not a permitted capability")]
    CapabilityDenied { endpoint: String },

    #[error("Historian rejected write: {0}")]
    Historian(String),

    #[error("Historian I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Historian serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl SinkError {
    pub fn is_capability_denied(&self) -> bool {
        matches!(self, SinkError::CapabilityDenied { .. })
    }
}
