//! Acquisition pipeline
//!
//! One [`AcquisitionLoop`] drives one sensor stream:
//!
//! ```text
//! Transport -> QualityGate -> RollingStatistics -> SpcDetector (alarms)
//!                         \-> HistorianSink
//!                         \-> BatchAggregator -> HistorianSink + TelemetryUplink (denied)
//! ```
//!
//! The loop owns its statistics engine and batch buffer outright. To watch
//! several streams concurrently, run one loop per stream.

mod acquisition_loop;
mod state;

pub use acquisition_loop::AcquisitionLoop;
pub use state::{SessionOutcome, SessionReport, SessionState, SessionStats, StopReason};

use crate::acquisition::TransientFault;

/// Errors surfaced to the caller of the loop. Transport faults during
/// polling never appear here; they end in [`SessionOutcome::SafeMode`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid session state: expected {expected}, was {actual}")]
    InvalidState {
        expected: SessionState,
        actual: SessionState,
    },

    #[error("Connect failed: {0}")]
    ConnectFailed(TransientFault),
}
