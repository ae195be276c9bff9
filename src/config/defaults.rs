//! System-wide default constants.
//!
//! Centralises the policy numbers used across the pipeline.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Configuration Loading
// ============================================================================

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "PROCWATCH_CONFIG";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "procwatch.toml";

// ============================================================================
// Acquisition
// ============================================================================

/// Delay between poll iterations (ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;

/// Consecutive transport faults tolerated before entering safe mode.
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Fixed back-off after a transport fault (ms). One time unit.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 1_000;

/// Transport read timeout (ms). An elapsed read is a transient fault.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 2_000;

/// Recent SPC alarms retained by an acquisition session.
pub const DEFAULT_ALARM_HISTORY_SIZE: usize = 100;

/// Upper bound accepted for any in-memory buffer size setting
/// (window, alarm history, inference history, batch).
pub const MAX_BUFFER_SIZE: usize = 100_000;

// ============================================================================
// Statistics
// ============================================================================

/// Rolling window capacity per tag (samples).
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Minimum window length before control statistics are defined.
pub const MIN_SAMPLES_FOR_STATISTICS: usize = 2;

/// Control limit width in standard deviations (mean ± 3σ).
///
/// Fixed policy, not a tunable.
pub const CONTROL_LIMIT_SIGMA: f64 = 3.0;

// ============================================================================
// Batching
// ============================================================================

/// Measurements per batch before a flush is due.
pub const DEFAULT_BATCH_SIZE: usize = 10;

// ============================================================================
// Classification
// ============================================================================

/// Anomaly score above which a reading is a point anomaly.
pub const DEFAULT_POINT_ANOMALY_THRESHOLD: f64 = 0.85;

/// Anomaly score above which a reading is a contextual anomaly.
pub const DEFAULT_CONTEXTUAL_ANOMALY_THRESHOLD: f64 = 0.6;

/// Health score above which equipment is healthy.
pub const DEFAULT_HEALTHY_THRESHOLD: f64 = 0.8;

/// Health score above which equipment is degraded (else warning or worse).
pub const DEFAULT_DEGRADED_THRESHOLD: f64 = 0.6;

/// Health score above which equipment is in warning (else critical).
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.4;

/// Model confidence below which the health status is reported as unknown.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Inference results retained in the assessment history.
pub const DEFAULT_INFERENCE_HISTORY_SIZE: usize = 100;

/// RUL at anomaly score 0 (hours).
pub const RUL_MAX_HOURS: f64 = 5_000.0;

/// RUL lost per unit of anomaly score (hours). RUL(1) = 1000 h.
pub const RUL_DECAY_HOURS: f64 = 4_000.0;

/// RUL never reported below this floor (hours).
pub const RUL_FLOOR_HOURS: f64 = 10.0;

// ============================================================================
// Model
// ============================================================================

/// Identifier of the built-in linear health model.
pub const DEFAULT_MODEL_ID: &str = "linear-health";

/// Version of the built-in linear health model.
pub const DEFAULT_MODEL_VERSION: &str = "1.0.0";

/// Rated equipment life used for wear (hours).
pub const DEFAULT_RATED_LIFE_HOURS: f64 = 20_000.0;

// ============================================================================
// Uplink
// ============================================================================

/// Vendor cloud endpoint that outbound telemetry would target. Always denied.
pub const DEFAULT_UPLINK_ENDPOINT: &str = "1.1.1.1:80";
