//! SPC Alarm Detector
//!
//! Single-point three-sigma rule (Western Electric rule 1) against the most
//! recently computed control limits of a tag. This is the base rule of the
//! Western Electric set only; run-length and zone rules are not evaluated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ControlStatistics, RollingStatistics};

/// Which control limit a value crossed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// value > UCL
    AboveUpperLimit,
    /// value < LCL
    BelowLowerLimit,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationKind::AboveUpperLimit => write!(f, "above UCL"),
            ViolationKind::BelowLowerLimit => write!(f, "below LCL"),
        }
    }
}

/// A control-limit violation for one value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpcViolation {
    pub kind: ViolationKind,
    pub value: f64,
    /// The limit that was crossed
    pub limit: f64,
}

/// A violation attributed to a tag and time, as retained by the acquisition loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpcAlarm {
    pub tag: String,
    pub violation: SpcViolation,
    pub timestamp: DateTime<Utc>,
}

/// Apply the three-sigma single-point rule to `value`.
///
/// Limits are exclusive: a value exactly on UCL or LCL is not a violation.
pub fn check_limits(value: f64, stats: &ControlStatistics) -> Option<SpcViolation> {
    if value > stats.upper_control_limit {
        Some(SpcViolation {
            kind: ViolationKind::AboveUpperLimit,
            value,
            limit: stats.upper_control_limit,
        })
    } else if value < stats.lower_control_limit {
        Some(SpcViolation {
            kind: ViolationKind::BelowLowerLimit,
            value,
            limit: stats.lower_control_limit,
        })
    } else {
        None
    }
}

/// Stateless detector reading limits from a [`RollingStatistics`] engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpcDetector;

impl SpcDetector {
    pub fn new() -> Self {
        Self
    }

    /// Check `value` against the tag's latest limits.
    ///
    /// Returns `None` when the tag has no statistics yet; that is not an error.
    pub fn check(&self, engine: &RollingStatistics, tag: &str, value: f64) -> Option<SpcViolation> {
        engine
            .statistics(tag)
            .and_then(|stats| check_limits(value, stats))
    }
}
