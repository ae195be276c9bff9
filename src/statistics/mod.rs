//! Rolling Statistics Engine - per-tag windows and control limits
//!
//! Each tag keeps a FIFO window of its last `capacity` values. After every
//! observation the tag's [`ControlStatistics`] snapshot is recomputed in full
//! from the current window contents; it is never updated incrementally, so
//! floating-point drift cannot accumulate over a long session.
//!
//! ## Numeric policy
//!
//! - Population standard deviation (divide by N)
//! - Control limits at exactly mean ± 3σ (fixed, not configurable)
//! - Statistics are undefined until a window holds at least 2 samples
//!
//! ## Look-ahead
//!
//! The snapshot stored by [`RollingStatistics::observe`] already includes the
//! value just observed, and the acquisition loop checks that same value
//! against it. The new value therefore pulls the limits toward itself before
//! it is judged, so single-point alarms are less sensitive than a check
//! against the prior window. With a full window of `n` samples the largest
//! reachable deviation is `sqrt(n - 1)` sigma.
//!
//! ```ignore
//! let mut engine = RollingStatistics::new(100);
//! engine.observe("pressure", 2847.3);
//! engine.observe("pressure", 2851.9);
//! let stats = engine.statistics("pressure").unwrap();
//! assert!(stats.upper_control_limit > stats.mean);
//! ```

pub mod spc;

pub use spc::{check_limits, SpcAlarm, SpcDetector, SpcViolation, ViolationKind};

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

use crate::config::defaults::{CONTROL_LIMIT_SIGMA, MIN_SAMPLES_FOR_STATISTICS};

// ============================================================================
// Control Statistics
// ============================================================================

/// Descriptive statistics and control limits for one tag's window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlStatistics {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// mean + 3σ
    pub upper_control_limit: f64,
    /// mean − 3σ
    pub lower_control_limit: f64,
}

impl ControlStatistics {
    /// Compute statistics from a window. `None` with fewer than 2 samples.
    pub fn from_window(window: &VecDeque<f64>) -> Option<Self> {
        if window.len() < MIN_SAMPLES_FOR_STATISTICS {
            return None;
        }

        let mean = <_ as Statistics<f64>>::mean(window.iter());
        let std_dev = <_ as Statistics<f64>>::population_std_dev(window.iter());
        let min = <_ as Statistics<f64>>::min(window.iter());
        let max = <_ as Statistics<f64>>::max(window.iter());

        Some(Self {
            count: window.len(),
            mean,
            std_dev,
            min,
            max,
            upper_control_limit: mean + CONTROL_LIMIT_SIGMA * std_dev,
            lower_control_limit: mean - CONTROL_LIMIT_SIGMA * std_dev,
        })
    }

    /// Build a snapshot from explicit limits (e.g. a reference control chart).
    ///
    /// Mean is the midpoint and σ one sixth of the band width.
    pub fn from_limits(lower_control_limit: f64, upper_control_limit: f64) -> Self {
        let mean = (upper_control_limit + lower_control_limit) / 2.0;
        let std_dev = (upper_control_limit - lower_control_limit) / (2.0 * CONTROL_LIMIT_SIGMA);
        Self {
            count: 0,
            mean,
            std_dev,
            min: lower_control_limit,
            max: upper_control_limit,
            upper_control_limit,
            lower_control_limit,
        }
    }
}

// ============================================================================
// Rolling Statistics Engine
// ============================================================================

/// Fixed-capacity windows and latest control statistics, keyed by tag.
///
/// Owned by exactly one acquisition loop; no internal synchronisation.
#[derive(Debug, Clone)]
pub struct RollingStatistics {
    capacity: usize,
    windows: HashMap<String, VecDeque<f64>>,
    snapshots: HashMap<String, ControlStatistics>,
}

impl RollingStatistics {
    /// Create an engine whose windows hold at most `capacity` values (min 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            windows: HashMap::new(),
            snapshots: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append `value` to the tag's window (evicting the oldest at capacity)
    /// and recompute the tag's snapshot from the full window.
    ///
    /// Non-finite values are rejected without touching the window.
    /// Returns the refreshed snapshot, `None` while fewer than 2 samples.
    pub fn observe(&mut self, tag: &str, value: f64) -> Option<&ControlStatistics> {
        if !value.is_finite() {
            debug!(tag = %tag, value, "Rejected non-finite value");
            return self.snapshots.get(tag);
        }

        let window = self
            .windows
            .entry(tag.to_string())
            .or_default();
        if window.len() >= self.capacity {
            window.pop_front();
        }
        window.push_back(value);

        match ControlStatistics::from_window(window) {
            Some(stats) => {
                self.snapshots.insert(tag.to_string(), stats);
                self.snapshots.get(tag)
            }
            None => None,
        }
    }

    /// Latest snapshot for `tag`; absent until its window holds 2 samples.
    pub fn statistics(&self, tag: &str) -> Option<&ControlStatistics> {
        self.snapshots.get(tag)
    }

    /// Current window contents for `tag`, oldest first.
    pub fn window(&self, tag: &str) -> Option<&VecDeque<f64>> {
        self.windows.get(tag)
    }

    /// Tags with at least one observed value, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.windows.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl Default for RollingStatistics {
    fn default() -> Self {
        Self::new(crate::config::defaults::DEFAULT_WINDOW_SIZE)
    }
}
