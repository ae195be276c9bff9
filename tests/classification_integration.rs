//! Classification Integration Tests
//!
//! Condition assessment from sensor frames through the built-in linear model,
//! plus the fixed threshold policy and RUL curve seen from outside the crate.

use procwatch::classification::{
    classify, estimate_rul_hours, ClassificationEngine, FrameReplay, HealthModel,
    JsonLinesFeatureSource, ModelError, ModelScores,
};
use procwatch::config::{ClassificationConfig, PipelineConfig};
use procwatch::types::{AnomalyCategory, HealthStatus, SensorFrame};
use tokio_util::sync::CancellationToken;

fn nominal() -> SensorFrame {
    SensorFrame {
        pressure: 2847.0,
        temperature: 67.8,
        flow: 1250.0,
        vibration_x: 2.0,
        vibration_y: 2.0,
        vibration_z: 2.0,
        current_draw: 45.0,
        runtime_hours: 0.0,
    }
}

/// Scores supplied literally, in order.
struct ScriptedModel {
    scores: std::sync::Mutex<std::vec::IntoIter<ModelScores>>,
}

impl ScriptedModel {
    fn new(scores: Vec<ModelScores>) -> Self {
        Self {
            scores: std::sync::Mutex::new(scores.into_iter()),
        }
    }
}

impl HealthModel for ScriptedModel {
    fn model_id(&self) -> &str {
        "scripted"
    }
    fn version(&self) -> &str {
        "test"
    }
    fn score(&self, _frame: &SensorFrame) -> Result<ModelScores, ModelError> {
        self.scores
            .lock()
            .unwrap()
            .next()
            .ok_or_else(|| ModelError::InvalidFrame("script exhausted".to_string()))
    }
}

fn scores(anomaly_score: f64, health_score: f64) -> ModelScores {
    ModelScores {
        anomaly_score,
        health_score,
        confidence: 0.9,
    }
}

// ============================================================================
// Threshold policy
// ============================================================================

#[test]
fn threshold_table_with_strict_tie_break() {
    let cases = [
        (0.86, 0.81, AnomalyCategory::Point, HealthStatus::Healthy),
        (0.85, 0.80, AnomalyCategory::Contextual, HealthStatus::Degraded),
        (0.61, 0.61, AnomalyCategory::Contextual, HealthStatus::Degraded),
        (0.60, 0.60, AnomalyCategory::None, HealthStatus::Warning),
        (0.00, 0.41, AnomalyCategory::None, HealthStatus::Warning),
        (0.00, 0.40, AnomalyCategory::None, HealthStatus::Critical),
        (1.00, 0.00, AnomalyCategory::Point, HealthStatus::Critical),
    ];
    for (a, h, category, status) in cases {
        let (c, s, action) = classify(a, h);
        assert_eq!((c, s), (category, status), "classify({a}, {h})");
        assert_eq!(action, status.recommended_action());
    }
}

#[test]
fn rul_is_monotonic_decreasing_and_floored() {
    let mut previous = f64::INFINITY;
    for step in 0..=20 {
        let a = f64::from(step) * 0.1;
        let rul = estimate_rul_hours(a);
        assert!(rul <= previous);
        assert!(rul >= 10.0);
        previous = rul;
    }
    assert_eq!(estimate_rul_hours(0.0), 5000.0);
    assert_eq!(estimate_rul_hours(1.0), 1000.0);
    assert_eq!(estimate_rul_hours(2.0), 10.0);
}

// ============================================================================
// Engine with injected model
// ============================================================================

#[test]
fn injected_scores_map_to_results() {
    let model = ScriptedModel::new(vec![scores(0.1, 0.9), scores(0.7, 0.65), scores(0.95, 0.2)]);
    let mut engine = ClassificationEngine::new(model, &ClassificationConfig::default());

    let r1 = engine.assess(&nominal()).unwrap();
    assert_eq!(r1.health_status, HealthStatus::Healthy);
    assert_eq!(r1.recommended_action, "continue normal operation");
    assert_eq!(r1.rul_hours, Some(4600.0));

    let r2 = engine.assess(&nominal()).unwrap();
    assert_eq!(r2.anomaly_category, AnomalyCategory::Contextual);
    assert_eq!(r2.health_status, HealthStatus::Degraded);

    let r3 = engine.assess(&nominal()).unwrap();
    assert_eq!(r3.anomaly_category, AnomalyCategory::Point);
    assert_eq!(r3.health_status, HealthStatus::Critical);
    assert_eq!(r3.recommended_action, "immediate maintenance required");
    assert_eq!(r3.model_id, "scripted");
    assert_eq!(r3.model_version, "test");

    assert_eq!(engine.history().len(), 3);
    assert!(engine.assess(&nominal()).is_err());
    assert_eq!(engine.history().len(), 3, "failed assessments are not recorded");
}

#[test]
fn collective_category_is_never_produced() {
    let mut engine = ClassificationEngine::from_config(&PipelineConfig::default());
    for k in 0..50 {
        let mut frame = nominal();
        frame.vibration_x = 2.0 + f64::from(k);
        frame.runtime_hours = f64::from(k) * 400.0;
        let r = engine.assess(&frame).unwrap();
        assert_ne!(r.anomaly_category, AnomalyCategory::Collective);
        assert!((0.0..=1.0).contains(&r.anomaly_score));
    }
}

// ============================================================================
// Linear model end to end
// ============================================================================

#[test]
fn nominal_new_pump_is_healthy() {
    let mut engine = ClassificationEngine::from_config(&PipelineConfig::default());
    let r = engine.assess(&nominal()).unwrap();
    assert_eq!(r.anomaly_category, AnomalyCategory::None);
    assert_eq!(r.health_status, HealthStatus::Healthy);
    assert_eq!(r.confidence, 1.0);
    assert_eq!(r.rul_hours, Some(5000.0));
    assert_eq!(r.model_id, "linear-health");
}

#[test]
fn worn_pump_degrades_without_anomaly() {
    let mut engine = ClassificationEngine::from_config(&PipelineConfig::default());
    let mut frame = nominal();
    // 30% of rated life
    frame.runtime_hours = 6_000.0;
    let r = engine.assess(&frame).unwrap();
    assert_eq!(r.anomaly_category, AnomalyCategory::None);
    assert_eq!(r.health_status, HealthStatus::Degraded);
}

#[tokio::test]
async fn assess_file_of_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.jsonl");
    let lines = [
        // nominal
        r#"{"pressure": 2847.0, "temperature": 67.8, "flow": 1250.0, "vibration_x": 2.0, "vibration_y": 2.0, "vibration_z": 2.0, "current_draw": 45.0, "runtime_hours": 500.0}"#,
        // bearing vibration 10 tolerances out: anomaly 10/11, health ~0.53
        r#"{"pressure": 2847.0, "temperature": 67.8, "flow": 1250.0, "vibration_x": 32.0, "vibration_y": 2.0, "vibration_z": 2.0, "current_draw": 45.0, "runtime_hours": 500.0}"#,
        // half the sensors offline
        r#"{"pressure": 2847.0, "temperature": null, "flow": null, "vibration_x": 2.0, "current_draw": 45.0}"#,
    ];
    tokio::fs::write(&path, lines.join("\n")).await.unwrap();

    let mut source = JsonLinesFeatureSource::open(&path).await.unwrap();
    let mut engine = ClassificationEngine::from_config(&PipelineConfig::default());
    let summary = engine.run(&mut source, CancellationToken::new()).await.unwrap();

    assert_eq!(summary.frames, 3);
    assert_eq!(summary.healthy, 1);
    assert_eq!(summary.anomalies, 1);
    assert_eq!(summary.warning, 1);
    assert_eq!(summary.unknown, 1);
    assert_eq!(summary.rejected, 0);

    let latest = engine.latest().unwrap();
    assert_eq!(latest.health_status, HealthStatus::Unknown);
    assert_eq!(latest.recommended_action, "verify sensor inputs");
    assert!(latest.rul_hours.is_none());
}

#[tokio::test]
async fn replayed_frames_are_all_assessed() {
    let mut source = FrameReplay::new(vec![nominal(); 4]);
    let mut engine = ClassificationEngine::from_config(&PipelineConfig::default());
    let summary = engine.run(&mut source, CancellationToken::new()).await.unwrap();
    assert_eq!(summary.frames, 4);
    assert_eq!(summary.healthy, 4);
}
