//! procwatch: process telemetry quality control
//!
//! Real-time quality control and condition assessment for industrial process
//! sensors (pressure, temperature, flow, vibration, current).
//!
//! ## Architecture
//!
//! - **Quality Gate**: engineering-range check and quality flag per reading
//! - **Rolling Statistics**: per-tag FIFO windows with mean ± 3σ control limits
//! - **SPC Detector**: single-point three-sigma alarms against those limits
//! - **Batch Aggregator**: groups measurements for historian handoff
//! - **Acquisition Loop**: timed polling, bounded retry, safe mode
//! - **Classification Engine**: health status, anomaly category and RUL from
//!   model scores

pub mod acquisition;
pub mod batch;
pub mod classification;
pub mod config;
pub mod pipeline;
pub mod quality;
pub mod sinks;
pub mod statistics;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, PipelineConfig};

// Re-export commonly used types
pub use types::{
    AnomalyCategory, EngineeringRange, HealthStatus, InferenceResult, Measurement, Quality,
    RawReading, SensorFrame, SourceStatus,
};

// Re-export core components
pub use acquisition::{FrameEvent, Transport, TransientFault};
pub use batch::{Batch, BatchAggregator};
pub use classification::{classify, estimate_rul_hours, ClassificationEngine, HealthModel};
pub use pipeline::{AcquisitionLoop, PipelineError, SessionOutcome, SessionReport, SessionState};
pub use quality::QualityGate;
pub use sinks::{HistorianSink, SinkError, TelemetryUplink};
pub use statistics::{ControlStatistics, RollingStatistics, SpcDetector, SpcViolation};
