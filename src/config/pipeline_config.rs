//! Pipeline Configuration - station, acquisition, statistics and model settings
//!
//! Every policy number that was previously hardcoded is a field in this module.
//! Each struct implements `Default` with the values from [`super::defaults`],
//! so a missing file or a partial file behaves exactly like the built-in policy.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults::*;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one acquisition station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Station identification
    #[serde(default)]
    pub station: StationConfig,

    /// Polling cadence and fault budget
    #[serde(default)]
    pub acquisition: AcquisitionConfig,

    /// Rolling window settings
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Batch forwarding settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// Anomaly / health thresholds
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Built-in health model parameters
    #[serde(default)]
    pub model: ModelConfig,

    /// Local historian output
    #[serde(default)]
    pub historian: HistorianConfig,

    /// Outbound telemetry (always denied)
    #[serde(default)]
    pub uplink: UplinkConfig,

    /// Engineering definitions per measurement tag
    #[serde(default = "default_tags")]
    pub tags: Vec<TagConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            station: StationConfig::default(),
            acquisition: AcquisitionConfig::default(),
            statistics: StatisticsConfig::default(),
            batch: BatchConfig::default(),
            classification: ClassificationConfig::default(),
            model: ModelConfig::default(),
            historian: HistorianConfig::default(),
            uplink: UplinkConfig::default(),
            tags: default_tags(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration using the standard search order:
    /// 1. `explicit` path, when given
    /// 2. `$PROCWATCH_CONFIG` environment variable
    /// 3. `./procwatch.toml` in the current working directory
    /// 4. Built-in defaults
    ///
    /// A file that exists but fails to load is an error, never a fallback.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // 1. Explicit path must exist
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), station = %config.station.name, "Loaded config");
            return Ok(config);
        }

        // 2. Env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                let config = Self::load_from_file(&p)?;
                info!(path = %p.display(), station = %config.station.name, "Loaded config from {}", CONFIG_ENV_VAR);
                return Ok(config);
            }
            warn!(path = %path, "{} points to non-existent file, ignoring", CONFIG_ENV_VAR);
        }

        // 3. Working directory
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!(station = %config.station.name, "Loaded config from ./{}", DEFAULT_CONFIG_FILE);
            return Ok(config);
        }

        // 4. Defaults
        info!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
        Ok(Self::default())
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are reported as warnings only.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let typo_warnings = super::validation::validate_unknown_keys(contents);
        for w in &typo_warnings {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Look up the engineering definition of a tag.
    pub fn tag(&self, name: &str) -> Option<&TagConfig> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// Validate all settings for internal consistency.
    ///
    /// Every violation is collected so the operator sees the full list at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        // Acquisition
        let a = &self.acquisition;
        if a.poll_interval_ms == 0 {
            errors.push("acquisition.poll_interval_ms must be > 0".to_string());
        }
        if a.max_consecutive_errors == 0 {
            errors.push("acquisition.max_consecutive_errors must be > 0".to_string());
        }
        if a.retry_backoff_ms == 0 {
            errors.push("acquisition.retry_backoff_ms must be > 0".to_string());
        }
        if a.read_timeout_ms == 0 {
            errors.push("acquisition.read_timeout_ms must be > 0".to_string());
        }
        if a.alarm_history_size == 0 {
            errors.push("acquisition.alarm_history_size must be > 0".to_string());
        }

        // Statistics
        if self.statistics.window_size < MIN_SAMPLES_FOR_STATISTICS {
            errors.push(format!(
                "statistics.window_size ({}) must be >= {}",
                self.statistics.window_size, MIN_SAMPLES_FOR_STATISTICS
            ));
        }

        // Batch
        if self.batch.size == 0 {
            errors.push("batch.size must be > 0".to_string());
        }

        // Buffer sizes
        for (name, size) in [
            ("acquisition.alarm_history_size", a.alarm_history_size),
            ("statistics.window_size", self.statistics.window_size),
            ("batch.size", self.batch.size),
            ("classification.history_size", self.classification.history_size),
        ] {
            if size > MAX_BUFFER_SIZE {
                errors.push(format!("{name} ({size}) must be <= {MAX_BUFFER_SIZE}"));
            }
        }

        // Classification thresholds: all in (0, 1) and ordered
        let c = &self.classification;
        for (name, value) in [
            ("point_anomaly_threshold", c.point_anomaly_threshold),
            ("contextual_anomaly_threshold", c.contextual_anomaly_threshold),
            ("healthy_threshold", c.healthy_threshold),
            ("degraded_threshold", c.degraded_threshold),
            ("warning_threshold", c.warning_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 || value >= 1.0 {
                errors.push(format!(
                    "classification.{name} ({value}) must be a finite number in (0, 1)"
                ));
            }
        }
        Self::check_ordering(
            c.contextual_anomaly_threshold,
            c.point_anomaly_threshold,
            "classification.contextual_anomaly_threshold",
            "point_anomaly_threshold",
            &mut errors,
        );
        Self::check_ordering(
            c.warning_threshold,
            c.degraded_threshold,
            "classification.warning_threshold",
            "degraded_threshold",
            &mut errors,
        );
        Self::check_ordering(
            c.degraded_threshold,
            c.healthy_threshold,
            "classification.degraded_threshold",
            "healthy_threshold",
            &mut errors,
        );
        if !(0.0..=1.0).contains(&c.min_confidence) {
            errors.push(format!(
                "classification.min_confidence ({}) must be in [0, 1]",
                c.min_confidence
            ));
        }
        if c.history_size == 0 {
            errors.push("classification.history_size must be > 0".to_string());
        }

        // Model: tolerances are divisors
        let m = &self.model;
        if !m.rated_life_hours.is_finite() || m.rated_life_hours <= 0.0 {
            errors.push("model.rated_life_hours must be > 0 (used as divisor)".to_string());
        }
        for (name, baseline) in m.baselines() {
            if !baseline.nominal.is_finite() {
                errors.push(format!("model.{name}.nominal must be finite"));
            }
            if !baseline.tolerance.is_finite() || baseline.tolerance <= 0.0 {
                errors.push(format!(
                    "model.{name}.tolerance ({}) must be > 0 (used as divisor)",
                    baseline.tolerance
                ));
            }
        }

        // Tags
        let mut seen: HashSet<&str> = HashSet::new();
        for tag in &self.tags {
            if tag.name.trim().is_empty() {
                errors.push("tags: tag name must not be empty".to_string());
                continue;
            }
            if !seen.insert(tag.name.as_str()) {
                errors.push(format!("tags: duplicate tag '{}'", tag.name));
            }
            if !tag.low.is_finite() || !tag.high.is_finite() {
                errors.push(format!("tags.{}: range bounds must be finite", tag.name));
            } else if tag.low >= tag.high {
                errors.push(format!(
                    "tags.{}: low ({}) must be < high ({})",
                    tag.name, tag.low, tag.high
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_ordering(
        lower: f64,
        upper: f64,
        lower_name: &str,
        upper_name: &str,
        errors: &mut Vec<String>,
    ) {
        // NaN comparisons pass here; the range checks above flag them
        if lower.is_finite() && upper.is_finite() && lower >= upper {
            errors.push(format!(
                "{lower_name} ({lower:.3}) must be < {upper_name} ({upper:.3})"
            ));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Station
// ============================================================================

/// Identification metadata, stamped on every measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Station / unit name
    #[serde(default = "default_station_name")]
    pub name: String,

    /// Source device identifier stamped on measurements
    #[serde(default = "default_device_id")]
    pub device_id: String,
}

fn default_station_name() -> String {
    "station-1".to_string()
}

fn default_device_id() -> String {
    "PLC-01".to_string()
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: default_station_name(),
            device_id: default_device_id(),
        }
    }
}

// ============================================================================
// Acquisition
// ============================================================================

/// Acquisition loop cadence and fault budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Delay between poll iterations (ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Consecutive transport faults before safe mode
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,

    /// Fixed back-off after a transport fault (ms)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Transport read timeout (ms)
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// Recent alarms kept in memory
    #[serde(default = "default_alarm_history_size")]
    pub alarm_history_size: usize,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_max_consecutive_errors() -> u32 {
    DEFAULT_MAX_CONSECUTIVE_ERRORS
}

fn default_retry_backoff_ms() -> u64 {
    DEFAULT_RETRY_BACKOFF_MS
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_alarm_history_size() -> usize {
    DEFAULT_ALARM_HISTORY_SIZE
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_consecutive_errors: default_max_consecutive_errors(),
            retry_backoff_ms: default_retry_backoff_ms(),
            read_timeout_ms: default_read_timeout_ms(),
            alarm_history_size: default_alarm_history_size(),
        }
    }
}

impl AcquisitionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

// ============================================================================
// Statistics / Batch
// ============================================================================

/// Rolling statistics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsConfig {
    /// Samples retained per tag (FIFO)
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
        }
    }
}

/// Batch aggregation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Measurements per batch before flush
    #[serde(default = "default_batch_size")]
    pub size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            size: default_batch_size(),
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Score thresholds for anomaly category and health status.
///
/// Comparisons are strictly greater-than: a score exactly on a threshold
/// resolves to the lower class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    #[serde(default = "default_point_anomaly_threshold")]
    pub point_anomaly_threshold: f64,
    #[serde(default = "default_contextual_anomaly_threshold")]
    pub contextual_anomaly_threshold: f64,
    #[serde(default = "default_healthy_threshold")]
    pub healthy_threshold: f64,
    #[serde(default = "default_degraded_threshold")]
    pub degraded_threshold: f64,
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
    /// Confidence below which health is reported as UNKNOWN
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
    /// Inference results retained (FIFO)
    #[serde(default = "default_inference_history_size")]
    pub history_size: usize,
}

fn default_point_anomaly_threshold() -> f64 {
    DEFAULT_POINT_ANOMALY_THRESHOLD
}

fn default_contextual_anomaly_threshold() -> f64 {
    DEFAULT_CONTEXTUAL_ANOMALY_THRESHOLD
}

fn default_healthy_threshold() -> f64 {
    DEFAULT_HEALTHY_THRESHOLD
}

fn default_degraded_threshold() -> f64 {
    DEFAULT_DEGRADED_THRESHOLD
}

fn default_warning_threshold() -> f64 {
    DEFAULT_WARNING_THRESHOLD
}

fn default_min_confidence() -> f64 {
    DEFAULT_MIN_CONFIDENCE
}

fn default_inference_history_size() -> usize {
    DEFAULT_INFERENCE_HISTORY_SIZE
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            point_anomaly_threshold: default_point_anomaly_threshold(),
            contextual_anomaly_threshold: default_contextual_anomaly_threshold(),
            healthy_threshold: default_healthy_threshold(),
            degraded_threshold: default_degraded_threshold(),
            warning_threshold: default_warning_threshold(),
            min_confidence: default_min_confidence(),
            history_size: default_inference_history_size(),
        }
    }
}

// ============================================================================
// Model
// ============================================================================

/// Expected operating point of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureBaseline {
    /// Nominal operating value
    pub nominal: f64,
    /// Deviation that counts as one unit of abnormality
    pub tolerance: f64,
}

impl FeatureBaseline {
    pub const fn new(nominal: f64, tolerance: f64) -> Self {
        Self { nominal, tolerance }
    }
}

/// Parameters of the built-in linear health model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_model_version")]
    pub version: String,
    /// Runtime at which wear reaches 100% (hours)
    #[serde(default = "default_rated_life_hours")]
    pub rated_life_hours: f64,
    #[serde(default = "default_pressure_baseline")]
    pub pressure: FeatureBaseline,
    #[serde(default = "default_temperature_baseline")]
    pub temperature: FeatureBaseline,
    #[serde(default = "default_flow_baseline")]
    pub flow: FeatureBaseline,
    /// Applied to all three vibration axes
    #[serde(default = "default_vibration_baseline")]
    pub vibration: FeatureBaseline,
    #[serde(default = "default_current_draw_baseline")]
    pub current_draw: FeatureBaseline,
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

fn default_model_version() -> String {
    DEFAULT_MODEL_VERSION.to_string()
}

fn default_rated_life_hours() -> f64 {
    DEFAULT_RATED_LIFE_HOURS
}

fn default_pressure_baseline() -> FeatureBaseline {
    FeatureBaseline::new(2847.0, 150.0)
}

fn default_temperature_baseline() -> FeatureBaseline {
    FeatureBaseline::new(67.8, 5.0)
}

fn default_flow_baseline() -> FeatureBaseline {
    FeatureBaseline::new(1250.0, 150.0)
}

fn default_vibration_baseline() -> FeatureBaseline {
    FeatureBaseline::new(2.0, 3.0)
}

fn default_current_draw_baseline() -> FeatureBaseline {
    FeatureBaseline::new(45.0, 10.0)
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            version: default_model_version(),
            rated_life_hours: default_rated_life_hours(),
            pressure: default_pressure_baseline(),
            temperature: default_temperature_baseline(),
            flow: default_flow_baseline(),
            vibration: default_vibration_baseline(),
            current_draw: default_current_draw_baseline(),
        }
    }
}

impl ModelConfig {
    /// Named baselines, for validation and reporting.
    pub fn baselines(&self) -> [(&'static str, FeatureBaseline); 5] {
        [
            ("pressure", self.pressure),
            ("temperature", self.temperature),
            ("flow", self.flow),
            ("vibration", self.vibration),
            ("current_draw", self.current_draw),
        ]
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Local historian output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorianConfig {
    /// JSON-lines file receiving flushed batches; logs only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Outbound telemetry settings. The uplink is always denied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UplinkConfig {
    #[serde(default = "default_uplink_endpoint")]
    pub endpoint: String,
}

fn default_uplink_endpoint() -> String {
    DEFAULT_UPLINK_ENDPOINT.to_string()
}

impl Default for UplinkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_uplink_endpoint(),
        }
    }
}

// ============================================================================
// Tags
// ============================================================================

/// Engineering definition of one measurement tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagConfig {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub low: f64,
    pub high: f64,
}

impl TagConfig {
    pub fn new(name: &str, unit: &str, low: f64, high: f64) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            low,
            high,
        }
    }
}

fn default_tags() -> Vec<TagConfig> {
    vec![
        TagConfig::new("pressure", "PSI", 0.0, 5000.0),
        TagConfig::new("temperature", "degC", -40.0, 150.0),
        TagConfig::new("flow", "GPM", 0.0, 2000.0),
        TagConfig::new("vibration", "mm/s", 0.0, 50.0),
        TagConfig::new("current", "A", 0.0, 100.0),
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_default_tags_present() {
        let config = PipelineConfig::default();
        assert_eq!(config.tags.len(), 5);
        let pressure = config.tag("pressure").expect("pressure tag");
        assert_eq!(pressure.unit, "PSI");
        assert_eq!(pressure.high, 5000.0);
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: PipelineConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config.statistics.window_size, 100);
        assert_eq!(config.batch.size, 10);
        assert_eq!(config.acquisition.max_consecutive_errors, 3);
        assert_eq!(config.classification.point_anomaly_threshold, 0.85);
        assert_eq!(config.tags.len(), 5);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[station]
name = "Compressor-7"

[acquisition]
poll_interval_ms = 250

[[tags]]
name = "suction_pressure"
unit = "bar"
low = 0.0
high = 16.0
"#;
        let config = PipelineConfig::from_toml_str(toml_str).expect("partial TOML should load");
        assert_eq!(config.station.name, "Compressor-7");
        assert_eq!(config.station.device_id, "PLC-01");
        assert_eq!(config.acquisition.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.acquisition.retry_backoff_ms, 1000);
        // Explicit tags replace the default list
        assert_eq!(config.tags.len(), 1);
        assert!(config.tag("pressure").is_none());
    }

    #[test]
    fn test_validation_catches_inverted_health_thresholds() {
        let mut config = PipelineConfig::default();
        config.classification.degraded_threshold = 0.9;
        let result = config.validate();
        assert!(result.is_err(), "degraded above healthy should fail validation");
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("degraded_threshold")));
        }
    }

    #[test]
    fn test_validation_collects_multiple_errors() {
        let mut config = PipelineConfig::default();
        config.statistics.window_size = 1;
        config.batch.size = 0;
        config.acquisition.max_consecutive_errors = 0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3, "{errors:?}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_catches_bad_tag_range() {
        let mut config = PipelineConfig::default();
        config.tags.push(TagConfig::new("level", "%", 100.0, 0.0));
        config.tags.push(TagConfig::new("pressure", "PSI", 0.0, 10.0));
        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expected validation failure");
        };
        assert!(errors.iter().any(|e| e.contains("tags.level")));
        assert!(errors.iter().any(|e| e.contains("duplicate tag 'pressure'")));
    }

    #[test]
    fn test_validation_rejects_zero_tolerance() {
        let mut config = PipelineConfig::default();
        config.model.flow.tolerance = 0.0;
        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expected validation failure");
        };
        assert!(errors.iter().any(|e| e.contains("model.flow.tolerance")));
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let config = PipelineConfig::default();
        let rendered = config.to_toml().expect("defaults serialize");
        let parsed = PipelineConfig::from_toml_str(&rendered).expect("rendered config loads");
        assert_eq!(parsed.statistics.window_size, config.statistics.window_size);
        assert_eq!(parsed.tags, config.tags);
    }
}
