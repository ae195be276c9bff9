//! Measurement types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Quality Flag
// ============================================================================

/// Discrete confidence tag attached to a measurement, independent of its value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quality {
    /// Inside engineering range and the source reported success
    Good,
    /// Source reported reduced confidence, or no engineering range is known
    Uncertain,
    /// Outside engineering range (or not a finite number)
    Bad,
    /// Transport read failed for this tag; no value is carried
    NotConnected,
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quality::Good => write!(f, "GOOD"),
            Quality::Uncertain => write!(f, "UNCERTAIN"),
            Quality::Bad => write!(f, "BAD"),
            Quality::NotConnected => write!(f, "NOT_CONNECTED"),
        }
    }
}

// ============================================================================
// Engineering Range
// ============================================================================

/// Inclusive engineering limits `[low, high]` for a measurement tag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EngineeringRange {
    pub low: f64,
    pub high: f64,
}

impl EngineeringRange {
    /// Accepts every finite value. Used to gate tags with no engineering
    /// definition; never stored on a [`Measurement`].
    pub const UNBOUNDED: Self = Self {
        low: f64::NEG_INFINITY,
        high: f64::INFINITY,
    };

    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// True when `value` lies within `[low, high]`. NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn is_bounded(&self) -> bool {
        self.low.is_finite() && self.high.is_finite()
    }
}

// ============================================================================
// Raw Reading (transport output)
// ============================================================================

/// Status the source attached to a successful read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    #[default]
    Ok,
    /// Device answered but flagged the value (e.g. sensor in calibration)
    Uncertain,
}

/// One tag's value as delivered by a transport, before quality gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub tag: String,
    /// `None` when the device could not supply this tag
    pub value: Option<f64>,
    #[serde(default)]
    pub status: SourceStatus,
}

impl RawReading {
    pub fn ok(tag: impl Into<String>, value: f64) -> Self {
        Self {
            tag: tag.into(),
            value: Some(value),
            status: SourceStatus::Ok,
        }
    }

    pub fn uncertain(tag: impl Into<String>, value: f64) -> Self {
        Self {
            tag: tag.into(),
            value: Some(value),
            status: SourceStatus::Uncertain,
        }
    }

    pub fn disconnected(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: None,
            status: SourceStatus::Ok,
        }
    }
}

// ============================================================================
// Measurement (a.k.a. process variable)
// ============================================================================

/// A quality-gated process variable, created once per poll cycle.
///
/// `value` is the raw reading passed through unchanged; it is `None` only
/// when `quality` is [`Quality::NotConnected`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Tag name (unique key, e.g. "pressure")
    pub tag: String,
    pub value: Option<f64>,
    pub unit: String,
    pub quality: Quality,
    pub timestamp: DateTime<Utc>,
    /// Source device identifier
    pub device_id: String,
    /// `None` for tags with no engineering definition
    pub range: Option<EngineeringRange>,
}

impl Measurement {
    /// Value usable for statistics: present and not flagged BAD.
    pub fn usable_value(&self) -> Option<f64> {
        match self.quality {
            Quality::Good | Quality::Uncertain => self.value,
            Quality::Bad | Quality::NotConnected => None,
        }
    }
}
