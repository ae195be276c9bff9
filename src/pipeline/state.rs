//! Session state machine and reporting types

use serde::{Deserialize, Serialize};

use crate::acquisition::TransientFault;
use crate::types::Quality;

// ============================================================================
// Session State
// ============================================================================

/// Lifecycle of one acquisition session.
///
/// `Init -> Connected -> Polling -> (SafeMode | Stopped)`. Both terminal
/// states end the session; a new session needs a new loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    #[default]
    Init,
    Connected,
    Polling,
    SafeMode,
    Stopped,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::SafeMode | SessionState::Stopped)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Init => write!(f, "INIT"),
            SessionState::Connected => write!(f, "CONNECTED"),
            SessionState::Polling => write!(f, "POLLING"),
            SessionState::SafeMode => write!(f, "SAFE_MODE"),
            SessionState::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Why a session stopped without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Operator stop signal
    Cancelled,
    /// A finite transport reported end of stream
    SourceExhausted,
}

/// Terminal result of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Stopped { reason: StopReason },
    /// Consecutive-fault budget exhausted
    SafeMode {
        consecutive_errors: u32,
        last_fault: TransientFault,
    },
}

impl SessionOutcome {
    /// Safe mode is a reported failure; a stop is not.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionOutcome::SafeMode { .. })
    }

    pub fn final_state(&self) -> SessionState {
        match self {
            SessionOutcome::Stopped { .. } => SessionState::Stopped,
            SessionOutcome::SafeMode { .. } => SessionState::SafeMode,
        }
    }
}

// ============================================================================
// Session Statistics
// ============================================================================

/// Counters accumulated over one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Successful transport reads
    pub frames_processed: u64,
    pub measurements: u64,
    pub good: u64,
    pub uncertain: u64,
    pub bad: u64,
    pub not_connected: u64,
    /// SPC limit violations raised
    pub alarms: u64,
    pub transport_faults: u64,
    pub historian_failures: u64,
    pub batches_flushed: u64,
    /// Refused uplink forwards
    pub uplink_denials: u64,
}

impl SessionStats {
    pub(crate) fn record_quality(&mut self, quality: Quality) {
        self.measurements += 1;
        match quality {
            Quality::Good => self.good += 1,
            Quality::Uncertain => self.uncertain += 1,
            Quality::Bad => self.bad += 1,
            Quality::NotConnected => self.not_connected += 1,
        }
    }
}

/// What `run` hands back when the session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub stats: SessionStats,
}
