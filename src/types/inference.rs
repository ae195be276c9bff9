//! Condition-assessment types (model input and output)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Sensor Frame
// ============================================================================

/// Feature names in the fixed order used by [`SensorFrame::as_array`].
pub const FEATURE_NAMES: [&str; 8] = [
    "pressure",
    "temperature",
    "flow",
    "vibration_x",
    "vibration_y",
    "vibration_z",
    "current_draw",
    "runtime_hours",
];

/// One inference cycle's model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorFrame {
    /// Process pressure (PSI)
    pub pressure: f64,
    /// Process temperature (°C)
    pub temperature: f64,
    /// Flow rate (GPM)
    pub flow: f64,
    /// Vibration velocity per axis (mm/s)
    pub vibration_x: f64,
    pub vibration_y: f64,
    pub vibration_z: f64,
    /// Motor current (A)
    pub current_draw: f64,
    /// Accumulated equipment runtime (hours)
    pub runtime_hours: f64,
}

impl SensorFrame {
    /// Features in [`FEATURE_NAMES`] order.
    pub fn as_array(&self) -> [f64; 8] {
        [
            self.pressure,
            self.temperature,
            self.flow,
            self.vibration_x,
            self.vibration_y,
            self.vibration_z,
            self.current_draw,
            self.runtime_hours,
        ]
    }
}

// ============================================================================
// Classification Outputs
// ============================================================================

/// Kind of anomaly indicated by the anomaly score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyCategory {
    #[default]
    None,
    /// Single reading far outside normal behaviour
    Point,
    /// Unusual for the current operating context
    Contextual,
    /// Reserved for multi-frame pattern detection; not produced by score thresholds
    Collective,
}

impl std::fmt::Display for AnomalyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyCategory::None => write!(f, "NONE"),
            AnomalyCategory::Point => write!(f, "POINT"),
            AnomalyCategory::Contextual => write!(f, "CONTEXTUAL"),
            AnomalyCategory::Collective => write!(f, "COLLECTIVE"),
        }
    }
}

/// Discrete equipment health status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Warning,
    Critical,
    /// Model confidence too low to classify
    Unknown,
}

impl HealthStatus {
    /// Maintenance action recommended for this status.
    pub fn recommended_action(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "continue normal operation",
            HealthStatus::Degraded => "schedule maintenance within 30 days",
            HealthStatus::Warning => "inspection within 7 days",
            HealthStatus::Critical => "immediate maintenance required",
            HealthStatus::Unknown => "verify sensor inputs",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "HEALTHY"),
            HealthStatus::Degraded => write!(f, "DEGRADED"),
            HealthStatus::Warning => write!(f, "WARNING"),
            HealthStatus::Critical => write!(f, "CRITICAL"),
            HealthStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ============================================================================
// Inference Result
// ============================================================================

/// Output of one condition-assessment cycle. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub model_id: String,
    pub model_version: String,
    /// Model scoring latency (milliseconds)
    pub latency_ms: f64,
    /// Anomaly score in [0, 1]
    pub anomaly_score: f64,
    pub anomaly_category: AnomalyCategory,
    pub health_status: HealthStatus,
    /// Model confidence in [0, 1]
    pub confidence: f64,
    /// Remaining useful life estimate; absent when status is Unknown
    pub rul_hours: Option<f64>,
    pub recommended_action: String,
    pub timestamp: DateTime<Utc>,
}
