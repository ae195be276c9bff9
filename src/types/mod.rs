//! Shared data structures for process telemetry quality control
//!
//! This module defines the core types flowing through the pipeline:
//! - Acquisition: RawReading (transport output) -> Measurement (quality gated)
//! - Condition assessment: SensorFrame (model input) -> InferenceResult

mod measurement;
mod inference;

pub use measurement::*;
pub use inference::*;
