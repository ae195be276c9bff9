//! Assessment engine and feature sources

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::model::{HealthModel, LinearHealthModel, ModelError};
use super::{estimate_rul_hours, ClassificationThresholds};
use crate::config::{ClassificationConfig, PipelineConfig};
use crate::types::{AnomalyCategory, HealthStatus, InferenceResult, SensorFrame};

// ============================================================================
// Feature Sources
// ============================================================================

/// Where sensor frames for assessment come from.
#[async_trait]
pub trait FeatureSource: Send {
    /// Next frame, or `None` once the source is exhausted.
    async fn next_frame(&mut self) -> Result<Option<SensorFrame>>;

    fn name(&self) -> &str;
}

/// Replays literal frames.
pub struct FrameReplay {
    frames: std::vec::IntoIter<SensorFrame>,
}

impl FrameReplay {
    pub fn new(frames: Vec<SensorFrame>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

#[async_trait]
impl FeatureSource for FrameReplay {
    async fn next_frame(&mut self) -> Result<Option<SensorFrame>> {
        Ok(self.frames.next())
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Frame line with optional features; missing or null become NaN.
#[derive(Debug, Deserialize)]
struct JsonFrame {
    pressure: Option<f64>,
    temperature: Option<f64>,
    flow: Option<f64>,
    vibration_x: Option<f64>,
    vibration_y: Option<f64>,
    vibration_z: Option<f64>,
    current_draw: Option<f64>,
    runtime_hours: Option<f64>,
}

impl From<JsonFrame> for SensorFrame {
    fn from(j: JsonFrame) -> Self {
        let f = |v: Option<f64>| v.unwrap_or(f64::NAN);
        Self {
            pressure: f(j.pressure),
            temperature: f(j.temperature),
            flow: f(j.flow),
            vibration_x: f(j.vibration_x),
            vibration_y: f(j.vibration_y),
            vibration_z: f(j.vibration_z),
            current_draw: f(j.current_draw),
            runtime_hours: f(j.runtime_hours),
        }
    }
}

/// Reads one JSON sensor frame per line. Malformed lines are logged and
/// skipped.
pub struct JsonLinesFeatureSource {
    name: String,
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
    line_buffer: String,
    skipped: u64,
}

impl JsonLinesFeatureSource {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Self {
            name: path.display().to_string(),
            reader: Box::new(BufReader::new(file)),
            line_buffer: String::with_capacity(512),
            skipped: 0,
        })
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        Self {
            name: "reader".to_string(),
            reader: Box::new(reader),
            line_buffer: String::with_capacity(512),
            skipped: 0,
        }
    }

    /// Lines skipped as malformed so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

#[async_trait]
impl FeatureSource for JsonLinesFeatureSource {
    async fn next_frame(&mut self) -> Result<Option<SensorFrame>> {
        loop {
            self.line_buffer.clear();
            let bytes = self.reader.read_line(&mut self.line_buffer).await?;
            if bytes == 0 {
                return Ok(None);
            }
            let line = self.line_buffer.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<JsonFrame>(line) {
                Ok(frame) => return Ok(Some(frame.into())),
                Err(e) => {
                    self.skipped += 1;
                    warn!(source = %self.name, "Failed to parse sensor frame: {}", e);
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Classification Engine
// ============================================================================

/// Counts per outcome over one [`ClassificationEngine::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    pub frames: u64,
    pub healthy: u64,
    pub degraded: u64,
    pub warning: u64,
    pub critical: u64,
    pub unknown: u64,
    /// Frames whose category was not NONE
    pub anomalies: u64,
    /// Frames the model refused to score
    pub rejected: u64,
}

impl AssessmentSummary {
    fn record(&mut self, result: &InferenceResult) {
        self.frames += 1;
        match result.health_status {
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Degraded => self.degraded += 1,
            HealthStatus::Warning => self.warning += 1,
            HealthStatus::Critical => self.critical += 1,
            HealthStatus::Unknown => self.unknown += 1,
        }
        if result.anomaly_category != AnomalyCategory::None {
            self.anomalies += 1;
        }
    }
}

/// Scores frames with a [`HealthModel`] and classifies the result.
pub struct ClassificationEngine<M: HealthModel = LinearHealthModel> {
    model: M,
    thresholds: ClassificationThresholds,
    min_confidence: f64,
    history: VecDeque<InferenceResult>,
    history_size: usize,
}

impl ClassificationEngine<LinearHealthModel> {
    /// Engine with the built-in linear model, configured from `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(LinearHealthModel::from_config(&config.model), &config.classification)
    }
}

impl<M: HealthModel> ClassificationEngine<M> {
    pub fn new(model: M, config: &ClassificationConfig) -> Self {
        let history_size = config.history_size.max(1);
        Self {
            model,
            thresholds: ClassificationThresholds::from(config),
            min_confidence: config.min_confidence,
            history: VecDeque::new(),
            history_size,
        }
    }

    pub fn thresholds(&self) -> &ClassificationThresholds {
        &self.thresholds
    }

    /// Retained results, oldest first.
    pub fn history(&self) -> &VecDeque<InferenceResult> {
        &self.history
    }

    pub fn latest(&self) -> Option<&InferenceResult> {
        self.history.back()
    }

    /// Score, classify and record one frame.
    ///
    /// Below `min_confidence` the status is UNKNOWN with no RUL estimate.
    /// Non-finite model scores are an error; scores outside `0..=1` are
    /// clamped before classification.
    pub fn assess(&mut self, frame: &SensorFrame) -> Result<InferenceResult, ModelError> {
        let started = Instant::now();
        let raw = self.model.score(frame)?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let scores = raw.bounded()?;
        if scores != raw {
            warn!(model = %self.model.model_id(), ?raw, "Model scores outside 0..=1, clamped");
        }

        let anomaly_category = self.thresholds.category(scores.anomaly_score);
        let (health_status, rul_hours) = if scores.confidence < self.min_confidence {
            (HealthStatus::Unknown, None)
        } else {
            (
                self.thresholds.status(scores.health_score),
                Some(estimate_rul_hours(scores.anomaly_score)),
            )
        };

        let result = InferenceResult {
            model_id: self.model.model_id().to_string(),
            model_version: self.model.version().to_string(),
            latency_ms,
            anomaly_score: scores.anomaly_score,
            anomaly_category,
            health_status,
            confidence: scores.confidence,
            rul_hours,
            recommended_action: health_status.recommended_action().to_string(),
            timestamp: Utc::now(),
        };

        if anomaly_category != AnomalyCategory::None {
            warn!(
                category = ?anomaly_category,
                score = result.anomaly_score,
                status = ?health_status,
                action = %result.recommended_action,
                "🚨 Anomaly detected"
            );
        } else {
            debug!(status = ?health_status, health = scores.health_score, "Frame assessed");
        }

        if self.history.len() >= self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(result.clone());
        Ok(result)
    }

    /// Assess frames until the source is exhausted or `cancel` fires.
    ///
    /// Frames the model rejects are counted and skipped; a source error ends
    /// the run with that error.
    pub async fn run<S: FeatureSource>(
        &mut self,
        source: &mut S,
        cancel: CancellationToken,
    ) -> Result<AssessmentSummary> {
        let mut summary = AssessmentSummary::default();
        info!(source = %source.name(), model = %self.model.model_id(), "Assessment started");

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("[ClassificationEngine] Stop signal received");
                    break;
                }
                next = source.next_frame() => next?,
            };
            let Some(frame) = next else {
                break;
            };

            match self.assess(&frame) {
                Ok(result) => summary.record(&result),
                Err(e) => {
                    summary.rejected += 1;
                    warn!(error = %e, "Frame rejected by model");
                }
            }
        }

        info!(
            frames = summary.frames,
            healthy = summary.healthy,
            degraded = summary.degraded,
            warning = summary.warning,
            critical = summary.critical,
            unknown = summary.unknown,
            anomalies = summary.anomalies,
            rejected = summary.rejected,
            "Assessment finished"
        );
        Ok(summary)
    }
}
