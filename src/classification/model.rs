//! Health models
//!
//! A [`HealthModel`] scores one [`SensorFrame`]. The engine never looks
//! inside the model, so any scorer (a trained network, a rules table, a test
//! double returning literal scores) can be injected.

use crate::config::{FeatureBaseline, ModelConfig};
use crate::types::SensorFrame;

/// Raw model output, before classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelScores {
    /// 0 = nominal, 1 = maximally anomalous
    pub anomaly_score: f64,
    /// 1 = as new, 0 = failed
    pub health_score: f64,
    /// Trust in the scores, 0..=1
    pub confidence: f64,
}

impl ModelScores {
    /// Reject non-finite scores and clamp the rest into `0..=1`.
    pub fn bounded(self) -> Result<Self, ModelError> {
        let named = [
            ("anomaly", self.anomaly_score),
            ("health", self.health_score),
            ("confidence", self.confidence),
        ];
        if let Some((name, value)) = named.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ModelError::Model(format!("non-finite {name} score ({value})")));
        }

        Ok(Self {
            anomaly_score: self.anomaly_score.clamp(0.0, 1.0),
            health_score: self.health_score.clamp(0.0, 1.0),
            confidence: self.confidence.clamp(0.0, 1.0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Frame cannot be scored: {0}")]
    InvalidFrame(String),

    #[error("Model produced unusable scores: {0}")]
    Model(String),
}

pub trait HealthModel: Send {
    fn model_id(&self) -> &str;
    fn version(&self) -> &str;
    fn score(&self, frame: &SensorFrame) -> Result<ModelScores, ModelError>;
}

// ============================================================================
// Linear Health Model
// ============================================================================

/// Deterministic deviation-from-nominal model.
///
/// - `d` = largest `|x - nominal| / tolerance` over the finite process features
/// - anomaly = `d / (1 + d)`, or 1 when `d` overflows
/// - wear = `runtime_hours / rated_life_hours`, clamped to 0..=1
/// - health = `(1 - wear) * (1 - anomaly / 2)`
/// - confidence = share of the 8 features that are finite
///
/// Not calibrated against failure data; it gives a reproducible baseline.
#[derive(Debug, Clone)]
pub struct LinearHealthModel {
    model_id: String,
    version: String,
    rated_life_hours: f64,
    /// Baselines in frame order, excluding runtime
    baselines: [FeatureBaseline; 7],
}

impl LinearHealthModel {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            model_id: config.model_id.clone(),
            version: config.version.clone(),
            rated_life_hours: config.rated_life_hours,
            baselines: [
                config.pressure,
                config.temperature,
                config.flow,
                config.vibration,
                config.vibration,
                config.vibration,
                config.current_draw,
            ],
        }
    }
}

impl Default for LinearHealthModel {
    fn default() -> Self {
        Self::from_config(&ModelConfig::default())
    }
}

impl HealthModel for LinearHealthModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn score(&self, frame: &SensorFrame) -> Result<ModelScores, ModelError> {
        let features = frame.as_array();
        let finite = features.iter().filter(|v| v.is_finite()).count();

        let deviation = features[..7]
            .iter()
            .zip(self.baselines.iter())
            .filter(|(x, _)| x.is_finite())
            .map(|(x, b)| (x - b.nominal).abs() / b.tolerance)
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.max(d))))
            .ok_or_else(|| ModelError::InvalidFrame("no finite process features".to_string()))?;

        let anomaly_score = if deviation.is_finite() {
            deviation / (1.0 + deviation)
        } else {
            1.0
        };

        let runtime = frame.runtime_hours;
        let wear = if runtime.is_finite() && self.rated_life_hours > 0.0 {
            (runtime / self.rated_life_hours).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let health_score = (1.0 - wear) * (1.0 - anomaly_score / 2.0);

        Ok(ModelScores {
            anomaly_score,
            health_score,
            confidence: finite as f64 / features.len() as f64,
        })
    }
}
