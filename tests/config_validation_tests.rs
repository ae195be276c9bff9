//! Config Validation Tests
//!
//! File-based loading and validation, exercised through the public API the
//! binary uses. Typo detection is checked separately from serde parsing.

use procwatch::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use procwatch::config::{ConfigError, PipelineConfig};
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn explicit_file_overrides_defaults() {
    let file = write_config(
        r#"
[station]
name = "Pump House 3"

[acquisition]
poll_interval_ms = 500
max_consecutive_errors = 5

[statistics]
window_size = 20

[[tags]]
name = "pressure"
unit = "bar"
low = 0.0
high = 350.0
"#,
    );

    let config = PipelineConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.station.name, "Pump House 3");
    assert_eq!(config.station.device_id, "PLC-01", "unspecified keys keep defaults");
    assert_eq!(config.acquisition.poll_interval_ms, 500);
    assert_eq!(config.acquisition.max_consecutive_errors, 5);
    assert_eq!(config.statistics.window_size, 20);
    assert_eq!(config.batch.size, 10);
    assert_eq!(config.tags.len(), 1, "[[tags]] replaces the default tag list");
    assert_eq!(config.tag("pressure").unwrap().unit, "bar");
}

#[test]
fn missing_explicit_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = PipelineConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_, _)));
}

#[test]
fn malformed_file_reports_its_path() {
    let file = write_config("[acquisition\npoll_interval_ms = ");
    match PipelineConfig::load_from_file(file.path()) {
        Err(ConfigError::Parse(path, _)) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn wrong_type_is_parse_error() {
    let file = write_config("[batch]\nsize = \"ten\"\n");
    assert!(matches!(
        PipelineConfig::load_from_file(file.path()),
        Err(ConfigError::Parse(_, _))
    ));
}

#[test]
fn invalid_values_are_fatal_and_all_listed() {
    let file = write_config(
        r#"
[acquisition]
max_consecutive_errors = 0

[batch]
size = 0

[classification]
contextual_anomaly_threshold = 0.9
point_anomaly_threshold = 0.85
"#,
    );
    match PipelineConfig::load(Some(file.path())) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("max_consecutive_errors")));
            assert!(errors.iter().any(|e| e.contains("batch.size")));
            assert!(errors.iter().any(|e| e.contains("contextual_anomaly_threshold")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn oversized_buffers_are_rejected() {
    let file = write_config(
        r#"
[acquisition]
alarm_history_size = 4398046511104

[statistics]
window_size = 4398046511104

[classification]
history_size = 100001
"#,
    );
    match PipelineConfig::load(Some(file.path())) {
        Err(ConfigError::Validation(errors)) => {
            assert_eq!(errors.len(), 3, "{errors:?}");
            assert!(errors.iter().any(|e| e.starts_with("statistics.window_size")));
            assert!(errors.iter().any(|e| e.starts_with("acquisition.alarm_history_size")));
            assert!(errors.iter().any(|e| e.starts_with("classification.history_size")));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn unknown_keys_do_not_break_loading() {
    let file = write_config("[statistics]\nwindow_size = 50\nwindw_size = 60\n");
    let config = PipelineConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.statistics.window_size, 50);
}

#[test]
fn effective_config_reloads_identically() {
    let mut config = PipelineConfig::default();
    config.batch.size = 25;
    config.historian.path = Some("/var/lib/procwatch/history.jsonl".into());

    let file = write_config(&config.to_toml().unwrap());
    let reloaded = PipelineConfig::load(Some(file.path())).unwrap();
    assert_eq!(reloaded.batch.size, 25);
    assert_eq!(reloaded.historian.path, config.historian.path);
    assert_eq!(reloaded.tags.len(), config.tags.len());
}

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_acquisition_section_warns_with_suggestion() {
    let warnings = validate_unknown_keys("[acquisition]\npoll_intervel_ms = 250\n");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "acquisition.poll_intervel_ms");
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("acquisition.poll_interval_ms")
    );
}

#[test]
fn typo_in_nested_model_baseline_warns() {
    let warnings = validate_unknown_keys("[model.vibration]\ntolerence = 4.0\n");
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("model.vibration.tolerance")
    );
}

#[test]
fn complete_valid_config_has_no_warnings() {
    let toml = PipelineConfig::default().to_toml().unwrap();
    assert!(validate_unknown_keys(&toml).is_empty(), "{toml}");
}

#[test]
fn every_known_key_suggests_itself() {
    let known = known_config_keys();
    for key in &known {
        assert_eq!(suggest_correction(key, &known).as_deref(), Some(*key));
    }
}
