//! Acquisition Loop: timed polling with bounded retry and safe mode.
//!
//! ## Per-iteration work
//!
//! 1. Read one frame from the transport (bounded by `read_timeout`)
//! 2. For each reading: quality gate, then statistics and SPC check, then
//!    historian `accept`, then batch `add`
//! 3. When the batch is full: historian `accept_batch`, then uplink `forward`
//! 4. Sleep `poll_interval`
//!
//! ## Fault policy
//!
//! A failed or timed-out read bumps the consecutive-error counter and waits
//! `retry_backoff` before the next attempt. Any successful read resets the
//! counter. Reaching `max_consecutive_errors` ends the session in
//! [`SessionState::SafeMode`] with no further reads.
//!
//! Historian and uplink failures are logged and counted only. They never
//! touch the counter or the state machine.
//!
//! Cancellation is checked between iterations and interrupts the poll and
//! back-off sleeps; it never pre-empts a frame mid-processing.

use chrono::Utc;
use std::collections::VecDeque;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::state::{SessionOutcome, SessionReport, SessionState, SessionStats, StopReason};
use super::PipelineError;
use crate::acquisition::{FrameEvent, Transport, TransientFault};
use crate::batch::{Batch, BatchAggregator};
use crate::config::PipelineConfig;
use crate::quality::QualityGate;
use crate::sinks::{DeniedUplink, HistorianSink, JsonLinesHistorian, TelemetryUplink, TracingHistorian};
use crate::statistics::{RollingStatistics, SpcAlarm, SpcDetector};
use crate::types::{Measurement, RawReading};

/// Owns everything one acquisition session needs.
///
/// Built with [`new()`](AcquisitionLoop::new), optionally given other sinks
/// via [`with_historian()`](AcquisitionLoop::with_historian) and
/// [`with_uplink()`](AcquisitionLoop::with_uplink), then
/// [`connect()`](AcquisitionLoop::connect)ed and [`run()`](AcquisitionLoop::run).
pub struct AcquisitionLoop<T: Transport> {
    transport: T,
    gate: QualityGate,
    statistics: RollingStatistics,
    detector: SpcDetector,
    batches: BatchAggregator,
    historian: Box<dyn HistorianSink>,
    uplink: Box<dyn TelemetryUplink>,

    state: SessionState,
    consecutive_errors: u32,
    max_consecutive_errors: u32,
    poll_interval: Duration,
    retry_backoff: Duration,
    read_timeout: Duration,

    alarms: VecDeque<SpcAlarm>,
    alarm_history_size: usize,
    stats: SessionStats,
}

impl<T: Transport> AcquisitionLoop<T> {
    pub fn new(transport: T, config: &PipelineConfig) -> Self {
        let acq = &config.acquisition;
        let historian: Box<dyn HistorianSink> = match &config.historian.path {
            Some(path) => Box::new(JsonLinesHistorian::new(path)),
            None => Box::new(TracingHistorian),
        };

        Self {
            transport,
            gate: QualityGate::new(&config.station.device_id, &config.tags),
            statistics: RollingStatistics::new(config.statistics.window_size),
            detector: SpcDetector::new(),
            batches: BatchAggregator::new(config.batch.size),
            historian,
            uplink: Box::new(DeniedUplink::new(config.uplink.endpoint.clone())),
            state: SessionState::Init,
            consecutive_errors: 0,
            max_consecutive_errors: acq.max_consecutive_errors.max(1),
            poll_interval: acq.poll_interval(),
            retry_backoff: acq.retry_backoff(),
            read_timeout: acq.read_timeout(),
            alarms: VecDeque::new(),
            alarm_history_size: acq.alarm_history_size.max(1),
            stats: SessionStats::default(),
        }
    }

    /// Replace the historian sink.
    pub fn with_historian(mut self, historian: Box<dyn HistorianSink>) -> Self {
        self.historian = historian;
        self
    }

    /// Replace the telemetry uplink.
    pub fn with_uplink(mut self, uplink: Box<dyn TelemetryUplink>) -> Self {
        self.uplink = uplink;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn statistics(&self) -> &RollingStatistics {
        &self.statistics
    }

    /// The batch still being filled (not yet flushed).
    pub fn pending_batch(&self) -> &Batch {
        self.batches.current()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// Most recent alarms, oldest first.
    pub fn recent_alarms(&self) -> &VecDeque<SpcAlarm> {
        &self.alarms
    }

    /// INIT -> CONNECTED. A single attempt; on failure the loop stays in
    /// INIT and the caller may try again.
    pub async fn connect(&mut self) -> Result<(), PipelineError> {
        if self.state != SessionState::Init {
            return Err(PipelineError::InvalidState {
                expected: SessionState::Init,
                actual: self.state,
            });
        }

        match tokio::time::timeout(self.read_timeout, self.transport.connect()).await {
            Ok(Ok(())) => {}
            Ok(Err(fault)) => return Err(PipelineError::ConnectFailed(fault)),
            Err(_) => return Err(PipelineError::ConnectFailed(TransientFault::Timeout(self.read_timeout))),
        }

        self.state = SessionState::Connected;
        info!(transport = %self.transport.name(), "Transport connected");
        Ok(())
    }

    /// Poll until cancelled, the source is exhausted, or safe mode.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<SessionReport, PipelineError> {
        if self.state != SessionState::Connected {
            return Err(PipelineError::InvalidState {
                expected: SessionState::Connected,
                actual: self.state,
            });
        }
        self.state = SessionState::Polling;

        info!(
            transport = %self.transport.name(),
            poll_ms = self.poll_interval.as_millis() as u64,
            max_errors = self.max_consecutive_errors,
            "📊 Polling started"
        );
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let outcome = loop {
            if cancel.is_cancelled() {
                info!("[AcquisitionLoop] Stop signal received");
                break SessionOutcome::Stopped {
                    reason: StopReason::Cancelled,
                };
            }

            let read = tokio::time::timeout(self.read_timeout, self.transport.read_frame())
                .await
                .unwrap_or(Err(TransientFault::Timeout(self.read_timeout)));

            match read {
                Ok(FrameEvent::Frame(readings)) => {
                    self.consecutive_errors = 0;
                    self.process_frame(readings).await;
                }
                Ok(FrameEvent::EndOfStream) => {
                    info!(
                        frames = self.stats.frames_processed,
                        "[AcquisitionLoop] Source reached end"
                    );
                    break SessionOutcome::Stopped {
                        reason: StopReason::SourceExhausted,
                    };
                }
                Err(fault) => {
                    self.stats.transport_faults += 1;
                    self.consecutive_errors += 1;
                    warn!(
                        error = %fault,
                        consecutive = self.consecutive_errors,
                        max = self.max_consecutive_errors,
                        "Transport read failed"
                    );

                    if self.consecutive_errors >= self.max_consecutive_errors {
                        error!(
                            consecutive = self.consecutive_errors,
                            last_fault = %fault,
                            "🛑 Entering SAFE MODE: consecutive fault budget exhausted"
                        );
                        break SessionOutcome::SafeMode {
                            consecutive_errors: self.consecutive_errors,
                            last_fault: fault,
                        };
                    }

                    if pause(self.retry_backoff, &cancel).await {
                        break SessionOutcome::Stopped {
                            reason: StopReason::Cancelled,
                        };
                    }
                    continue;
                }
            }

            if pause(self.poll_interval, &cancel).await {
                info!("[AcquisitionLoop] Stop signal received");
                break SessionOutcome::Stopped {
                    reason: StopReason::Cancelled,
                };
            }
        };

        self.state = outcome.final_state();
        self.log_summary(&outcome);

        Ok(SessionReport {
            outcome,
            stats: self.stats.clone(),
        })
    }

    // ========================================================================
    // Per-frame work
    // ========================================================================

    async fn process_frame(&mut self, readings: Vec<RawReading>) {
        self.stats.frames_processed += 1;
        let timestamp = Utc::now();

        for reading in readings {
            let measurement = self.gate.admit(reading, timestamp);
            self.stats.record_quality(measurement.quality);
            self.track(&measurement);

            if let Err(e) = self.historian.accept(&measurement).await {
                self.stats.historian_failures += 1;
                warn!(sink = %self.historian.name(), tag = %measurement.tag, error = %e, "Historian accept failed");
            }

            self.batches.add(measurement);
            if self.batches.should_flush() {
                self.flush_batch().await;
            }
        }
    }

    /// Observe then check. The check therefore runs against limits that
    /// already include the value being checked.
    fn track(&mut self, m: &Measurement) {
        // Out-of-range values are judged but kept out of the window
        if let Some(value) = m.usable_value() {
            self.statistics.observe(&m.tag, value);
        }
        let Some(value) = m.value else {
            return;
        };

        if let Some(violation) = self.detector.check(&self.statistics, &m.tag, value) {
            self.stats.alarms += 1;
            warn!(
                tag = %m.tag,
                value,
                limit = violation.limit,
                kind = %violation.kind,
                quality = %m.quality,
                "⚠️ SPC alarm"
            );
            if self.alarms.len() >= self.alarm_history_size {
                self.alarms.pop_front();
            }
            self.alarms.push_back(SpcAlarm {
                tag: m.tag.clone(),
                violation,
                timestamp: m.timestamp,
            });
        }
    }

    async fn flush_batch(&mut self) {
        let batch = self.batches.flush();
        self.stats.batches_flushed += 1;
        debug!(batch_id = %batch.id, size = batch.len(), "Batch flushed");

        if let Err(e) = self.historian.accept_batch(&batch).await {
            self.stats.historian_failures += 1;
            warn!(sink = %self.historian.name(), batch_id = %batch.id, error = %e, "Historian batch write failed");
        }

        // Attempted on every flush; the local path above is already done.
        match self.uplink.forward(&batch).await {
            Ok(()) => debug!(endpoint = %self.uplink.endpoint(), "Batch forwarded"),
            Err(e) if e.is_capability_denied() => {
                self.stats.uplink_denials += 1;
                warn!(endpoint = %self.uplink.endpoint(), batch_id = %batch.id, "Uplink denied: {}", e);
            }
            Err(e) => {
                warn!(endpoint = %self.uplink.endpoint(), error = %e, "Uplink forward failed");
            }
        }
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    fn log_summary(&self, outcome: &SessionOutcome) {
        let s = &self.stats;
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!("📊 SESSION SUMMARY ({})", self.state);
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        match outcome {
            SessionOutcome::Stopped { reason } => info!("   Outcome:             stopped ({:?})", reason),
            SessionOutcome::SafeMode {
                consecutive_errors,
                last_fault,
            } => info!(
                "   Outcome:             SAFE MODE after {} faults (last: {})",
                consecutive_errors, last_fault
            ),
        }
        info!("   Frames Processed:    {}", s.frames_processed);
        info!(
            "   Measurements:        {} (good {}, uncertain {}, bad {}, n/c {})",
            s.measurements, s.good, s.uncertain, s.bad, s.not_connected
        );
        info!("   SPC Alarms:          {}", s.alarms);
        info!("   Transport Faults:    {}", s.transport_faults);
        info!("   Batches Flushed:     {}", s.batches_flushed);
        info!("   Historian Failures:  {}", s.historian_failures);
        info!("   Uplink Denials:      {}", s.uplink_denials);

        for tag in self.statistics.tags() {
            if let Some(c) = self.statistics.statistics(tag) {
                info!(
                    "   {:<20} mean {:>10.3}  σ {:>8.3}  LCL {:>10.3}  UCL {:>10.3}  (n={})",
                    tag, c.mean, c.std_dev, c.lower_control_limit, c.upper_control_limit, c.count
                );
            }
        }
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }
}

/// Sleep for `duration` unless cancelled first. Returns true on cancellation.
async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = cancel.cancelled() => true,
        () = tokio::time::sleep(duration) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::ReplayTransport;
    use crate::config::TagConfig;
    use crate::sinks::MemoryHistorian;

    fn fast_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.acquisition.poll_interval_ms = 1;
        config.acquisition.retry_backoff_ms = 1;
        config.acquisition.read_timeout_ms = 500;
        config.batch.size = 3;
        config.tags = vec![TagConfig::new("pressure", "PSI", 0.0, 5000.0)];
        config
    }

    fn frame(v: f64) -> Vec<RawReading> {
        vec![RawReading::ok("pressure", v)]
    }

    #[tokio::test]
    async fn test_run_requires_connect() {
        let mut acq = AcquisitionLoop::new(ReplayTransport::from_frames(vec![]), &fast_config());
        let err = acq.run(CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_connect_failure_stays_in_init() {
        let transport = ReplayTransport::from_frames(vec![])
            .with_connect_fault(TransientFault::Io("refused".to_string()));
        let mut acq = AcquisitionLoop::new(transport, &fast_config());
        assert!(matches!(acq.connect().await, Err(PipelineError::ConnectFailed(_))));
        assert_eq!(acq.state(), SessionState::Init);
    }

    #[tokio::test]
    async fn test_double_connect_rejected() {
        let mut acq = AcquisitionLoop::new(ReplayTransport::from_frames(vec![]), &fast_config());
        acq.connect().await.unwrap();
        assert!(matches!(acq.connect().await, Err(PipelineError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_bad_values_checked_but_not_observed() {
        let frames = vec![frame(100.0), frame(101.0), frame(99.0), frame(9000.0)];
        let mut acq = AcquisitionLoop::new(ReplayTransport::from_frames(frames), &fast_config());
        acq.connect().await.unwrap();
        let report = acq.run(CancellationToken::new()).await.unwrap();

        assert_eq!(report.stats.bad, 1);
        assert_eq!(acq.statistics().window("pressure").unwrap().len(), 3);
        // 9000 is far outside limits built from 99..101
        assert_eq!(report.stats.alarms, 1);
        assert_eq!(acq.recent_alarms().len(), 1);
        assert_eq!(acq.recent_alarms()[0].violation.value, 9000.0);
    }

    #[tokio::test]
    async fn test_disconnected_readings_bypass_statistics() {
        let frames = vec![
            vec![RawReading::disconnected("pressure")],
            vec![RawReading::disconnected("pressure")],
        ];
        let historian = MemoryHistorian::new();
        let mut acq = AcquisitionLoop::new(ReplayTransport::from_frames(frames), &fast_config())
            .with_historian(Box::new(historian.clone()));
        acq.connect().await.unwrap();
        let report = acq.run(CancellationToken::new()).await.unwrap();

        assert_eq!(report.stats.not_connected, 2);
        assert!(acq.statistics().window("pressure").is_none());
        // Still delivered to the historian
        assert_eq!(historian.measurements().len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_fault() {
        let mut config = fast_config();
        config.acquisition.read_timeout_ms = 10;
        config.acquisition.max_consecutive_errors = 1;
        let transport = ReplayTransport::from_frames(vec![frame(1.0)])
            .with_read_delay(Duration::from_millis(500));
        let mut acq = AcquisitionLoop::new(transport, &config);
        acq.connect().await.unwrap();

        let report = acq.run(CancellationToken::new()).await.unwrap();
        match report.outcome {
            SessionOutcome::SafeMode { last_fault, .. } => {
                assert!(matches!(last_fault, TransientFault::Timeout(_)));
            }
            other => panic!("expected safe mode, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_alarm_history_is_bounded() {
        let mut config = fast_config();
        config.acquisition.alarm_history_size = 2;
        // Alternating in-range baseline and far-out BAD spikes
        let mut frames = Vec::new();
        for _ in 0..5 {
            frames.push(frame(100.0));
            frames.push(frame(101.0));
            frames.push(frame(-50.0));
        }
        let mut acq = AcquisitionLoop::new(ReplayTransport::from_frames(frames), &config);
        acq.connect().await.unwrap();
        let report = acq.run(CancellationToken::new()).await.unwrap();

        assert_eq!(report.stats.alarms, 5);
        assert_eq!(acq.recent_alarms().len(), 2);
    }
}
