//! Sensor data acquisition
//!
//! The device transport is an external collaborator: the acquisition loop
//! only needs "connect" and "read one frame", and treats every failure as a
//! retryable [`TransientFault`]. Two transports are provided:
//!
//! - [`ReplayTransport`]: a scripted sequence of frames and faults
//! - [`JsonLinesTransport`]: one JSON object per line from stdin or a file

pub mod json_lines;
pub mod replay;

pub use json_lines::JsonLinesTransport;
pub use replay::ReplayTransport;

use async_trait::async_trait;
use std::time::Duration;

use crate::types::RawReading;

/// Transport read/connect failure. Every kind is retryable within the
/// consecutive-error budget; the loop does not branch on the kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransientFault {
    #[error("Transport not connected")]
    NotConnected,

    #[error("Read timed out after {0:?}")]
    Timeout(Duration),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Malformed frame: {0}")]
    Malformed(String),

    #[error("Device fault: {0}")]
    Device(String),
}

impl From<std::io::Error> for TransientFault {
    fn from(err: std::io::Error) -> Self {
        TransientFault::Io(err.to_string())
    }
}

/// Events produced by a transport read.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// One poll cycle's readings
    Frame(Vec<RawReading>),
    /// Finite source has no more data
    EndOfStream,
}

/// Where raw readings come from.
#[async_trait]
pub trait Transport: Send {
    /// Establish the device session. Called once; the caller retries.
    async fn connect(&mut self) -> Result<(), TransientFault>;

    /// Read one frame of readings.
    async fn read_frame(&mut self) -> Result<FrameEvent, TransientFault>;

    /// Human-readable name for logging (e.g. "replay", "stdin").
    fn name(&self) -> &str;
}
