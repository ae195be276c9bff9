//! Config validation: unknown-key detection with Levenshtein suggestions.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, unknown section).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for PipelineConfig.
///
/// Maintained by hand to match the struct hierarchy in pipeline_config.rs.
/// Keys inside `[[tags]]` entries appear once, without an index.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [station]
        "station",
        "station.name",
        "station.device_id",
        // [acquisition]
        "acquisition",
        "acquisition.poll_interval_ms",
        "acquisition.max_consecutive_errors",
        "acquisition.retry_backoff_ms",
        "acquisition.read_timeout_ms",
        "acquisition.alarm_history_size",
        // [statistics]
        "statistics",
        "statistics.window_size",
        // [batch]
        "batch",
        "batch.size",
        // [classification]
        "classification",
        "classification.point_anomaly_threshold",
        "classification.contextual_anomaly_threshold",
        "classification.healthy_threshold",
        "classification.degraded_threshold",
        "classification.warning_threshold",
        "classification.min_confidence",
        "classification.history_size",
        // [model]
        "model",
        "model.model_id",
        "model.version",
        "model.rated_life_hours",
        "model.pressure",
        "model.pressure.nominal",
        "model.pressure.tolerance",
        "model.temperature",
        "model.temperature.nominal",
        "model.temperature.tolerance",
        "model.flow",
        "model.flow.nominal",
        "model.flow.tolerance",
        "model.vibration",
        "model.vibration.nominal",
        "model.vibration.tolerance",
        "model.current_draw",
        "model.current_draw.nominal",
        "model.current_draw.tolerance",
        // [historian]
        "historian",
        "historian.path",
        // [uplink]
        "uplink",
        "uplink.endpoint",
        // [[tags]]
        "tags",
        "tags.name",
        "tags.unit",
        "tags.low",
        "tags.high",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
///
/// Tables inside an array (`[[a]]`) are walked under the array's own path,
/// each distinct key reported once: `[[a]] b = 1` twice yields `["a", "a.b"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            match v {
                toml::Value::Table(_) => keys.extend(walk_toml_keys(v, &path)),
                toml::Value::Array(items) => {
                    for key in items.iter().flat_map(|item| walk_toml_keys(item, &path)) {
                        if !keys.contains(&key) {
                            keys.push(key);
                        }
                    }
                }
                _ => {}
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexicographically smallest key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), *k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns. Parse errors are
/// left for the serde pass to report.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let known = known_config_keys();
    let mut warnings = Vec::new();

    for key in walk_toml_keys(&value, "") {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(&key, &known);
            warnings.push(ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_identical() {
        assert_eq!(levenshtein("window", "window"), 0);
    }

    #[test]
    fn test_levenshtein_one_edit() {
        assert_eq!(levenshtein("windw_size", "window_size"), 1);
    }

    #[test]
    fn test_levenshtein_empty() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [model]
            [model.flow]
            tolerance = 100.0
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"model".to_string()));
        assert!(keys.contains(&"model.flow".to_string()));
        assert!(keys.contains(&"model.flow.tolerance".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let toml_str = r#"
[statistics]
windw_size = 50
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "statistics.windw_size");
        assert_eq!(
            warnings[0].suggestion.as_deref(),
            Some("statistics.window_size")
        );
    }

    #[test]
    fn test_tags_array_is_not_flagged() {
        let toml_str = r#"
[[tags]]
name = "pressure"
unit = "PSI"
low = 0.0
high = 5000.0
"#;
        assert!(validate_unknown_keys(toml_str).is_empty());
    }

    #[test]
    fn test_typo_inside_tags_entry_warns_once() {
        let toml_str = r#"
[[tags]]
name = "pressure"
unti = "PSI"
low = 0.0
high = 5000.0

[[tags]]
name = "flow"
unti = "GPM"
low = 0.0
high = 2000.0
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "tags.unti");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("tags.unit"));
    }

    #[test]
    fn test_unknown_section_produces_warning() {
        let toml_str = r#"
[cloud]
api_key = "secret"
"#;
        let warnings = validate_unknown_keys(toml_str);
        assert!(warnings.iter().any(|w| w.field == "cloud"));
        assert!(warnings.iter().any(|w| w.field == "cloud.api_key"));
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key_xyz", &known).is_none());
    }

    #[test]
    fn test_malformed_toml_yields_no_warnings() {
        assert!(validate_unknown_keys("[[[ not toml").is_empty());
    }
}
