//! Classification Engine - condition assessment from model scores
//!
//! Turns a model's continuous anomaly and health scores into a discrete
//! anomaly category, health status, recommended action and remaining useful
//! life (RUL) estimate.
//!
//! ## Thresholds (defaults)
//!
//! | anomaly score | category   |   | health score | status   |
//! |---------------|------------|---|--------------|----------|
//! | > 0.85        | POINT      |   | > 0.8        | HEALTHY  |
//! | > 0.6         | CONTEXTUAL |   | > 0.6        | DEGRADED |
//! | otherwise     | NONE       |   | > 0.4        | WARNING  |
//! |               |            |   | otherwise    | CRITICAL |
//!
//! All comparisons are strictly greater-than, so a score exactly on a
//! threshold falls to the lower class. A NaN score matches no threshold and
//! resolves to NONE / CRITICAL. COLLECTIVE is never produced: it needs a
//! sequence-level detector that is not part of this engine.
//!
//! ## RUL
//!
//! `max(10, 5000 - anomaly * 4000)` hours. This is a bounded linear decay
//! placeholder, not a calibrated degradation model.

mod engine;
mod model;

pub use engine::{
    AssessmentSummary, ClassificationEngine, FeatureSource, FrameReplay, JsonLinesFeatureSource,
};
pub use model::{HealthModel, LinearHealthModel, ModelError, ModelScores};

use serde::{Deserialize, Serialize};

use crate::config::defaults::{
    DEFAULT_CONTEXTUAL_ANOMALY_THRESHOLD, DEFAULT_DEGRADED_THRESHOLD, DEFAULT_HEALTHY_THRESHOLD,
    DEFAULT_POINT_ANOMALY_THRESHOLD, DEFAULT_WARNING_THRESHOLD, RUL_DECAY_HOURS, RUL_FLOOR_HOURS,
    RUL_MAX_HOURS,
};
use crate::config::ClassificationConfig;
use crate::types::{AnomalyCategory, HealthStatus};

/// Score cut-offs for category and status.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    pub point_anomaly: f64,
    pub contextual_anomaly: f64,
    pub healthy: f64,
    pub degraded: f64,
    pub warning: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            point_anomaly: DEFAULT_POINT_ANOMALY_THRESHOLD,
            contextual_anomaly: DEFAULT_CONTEXTUAL_ANOMALY_THRESHOLD,
            healthy: DEFAULT_HEALTHY_THRESHOLD,
            degraded: DEFAULT_DEGRADED_THRESHOLD,
            warning: DEFAULT_WARNING_THRESHOLD,
        }
    }
}

impl From<&ClassificationConfig> for ClassificationThresholds {
    fn from(c: &ClassificationConfig) -> Self {
        Self {
            point_anomaly: c.point_anomaly_threshold,
            contextual_anomaly: c.contextual_anomaly_threshold,
            healthy: c.healthy_threshold,
            degraded: c.degraded_threshold,
            warning: c.warning_threshold,
        }
    }
}

impl ClassificationThresholds {
    pub fn category(&self, anomaly_score: f64) -> AnomalyCategory {
        if anomaly_score > self.point_anomaly {
            AnomalyCategory::Point
        } else if anomaly_score > self.contextual_anomaly {
            AnomalyCategory::Contextual
        } else {
            AnomalyCategory::None
        }
    }

    pub fn status(&self, health_score: f64) -> HealthStatus {
        if health_score > self.healthy {
            HealthStatus::Healthy
        } else if health_score > self.degraded {
            HealthStatus::Degraded
        } else if health_score > self.warning {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        }
    }

    /// Pure mapping from scores to (category, status, action).
    pub fn classify(
        &self,
        anomaly_score: f64,
        health_score: f64,
    ) -> (AnomalyCategory, HealthStatus, &'static str) {
        let status = self.status(health_score);
        (self.category(anomaly_score), status, status.recommended_action())
    }
}

/// [`ClassificationThresholds::classify`] with the default thresholds.
pub fn classify(anomaly_score: f64, health_score: f64) -> (AnomalyCategory, HealthStatus, &'static str) {
    ClassificationThresholds::default().classify(anomaly_score, health_score)
}

/// Remaining useful life in hours for an anomaly score.
///
/// 5000 h at 0, 1000 h at 1, never below 10 h.
pub fn estimate_rul_hours(anomaly_score: f64) -> f64 {
    (RUL_MAX_HOURS - anomaly_score * RUL_DECAY_HOURS).max(RUL_FLOOR_HOURS)
}
