//! Scripted replay transport
//!
//! Plays back a literal sequence of frames and faults, then reports end of
//! stream. Used for deterministic tests and for replaying captured sessions.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{FrameEvent, Transport, TransientFault};
use crate::types::RawReading;

type Step = Result<Vec<RawReading>, TransientFault>;

pub struct ReplayTransport {
    steps: VecDeque<Step>,
    reads: Arc<AtomicUsize>,
    connect_fault: Option<TransientFault>,
    delay: Duration,
    connected: bool,
}

impl ReplayTransport {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            reads: Arc::new(AtomicUsize::new(0)),
            connect_fault: None,
            delay: Duration::ZERO,
            connected: false,
        }
    }

    /// Replay frames only.
    pub fn from_frames(frames: Vec<Vec<RawReading>>) -> Self {
        Self::new(frames.into_iter().map(Ok).collect())
    }

    /// Make `connect()` fail with `fault`.
    pub fn with_connect_fault(mut self, fault: TransientFault) -> Self {
        self.connect_fault = Some(fault);
        self
    }

    /// Wait `delay` before answering each read (exercises the read timeout).
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared counter of `read_frame` calls, readable after the transport
    /// has been moved into a loop.
    pub fn read_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reads)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ReplayTransport {
    async fn connect(&mut self) -> Result<(), TransientFault> {
        if let Some(fault) = self.connect_fault.clone() {
            return Err(fault);
        }
        self.connected = true;
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<FrameEvent, TransientFault> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.connected {
            return Err(TransientFault::NotConnected);
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.steps.pop_front() {
            Some(Ok(readings)) => Ok(FrameEvent::Frame(readings)),
            Some(Err(fault)) => Err(fault),
            None => Ok(FrameEvent::EndOfStream),
        }
    }

    fn name(&self) -> &str {
        "replay"
    }
}
