//! Quality Gate
//!
//! Validates a single reading against its tag's engineering limits and
//! assigns a quality flag. Never fails and never clamps: an out-of-range
//! reading is flagged BAD but its raw value is passed through unchanged so
//! downstream consumers see the true reading.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::config::TagConfig;
use crate::types::{EngineeringRange, Measurement, Quality, RawReading, SourceStatus};

/// Evaluate a successfully read value against an engineering range.
///
/// GOOD inside `[low, high]` (inclusive); BAD outside or when not finite.
pub fn evaluate(raw_value: f64, range: &EngineeringRange) -> (f64, Quality) {
    let quality = if raw_value.is_finite() && range.contains(raw_value) {
        Quality::Good
    } else {
        Quality::Bad
    };
    (raw_value, quality)
}

/// Turns transport readings into quality-flagged measurements.
#[derive(Debug, Clone)]
pub struct QualityGate {
    device_id: String,
    tags: HashMap<String, TagConfig>,
}

impl QualityGate {
    pub fn new(device_id: &str, tags: &[TagConfig]) -> Self {
        Self {
            device_id: device_id.to_string(),
            tags: tags.iter().map(|t| (t.name.clone(), t.clone())).collect(),
        }
    }

    /// Engineering definition for `tag`, if one is configured.
    pub fn tag(&self, tag: &str) -> Option<&TagConfig> {
        self.tags.get(tag)
    }

    /// Build the measurement for one reading.
    ///
    /// - no value: NOT_CONNECTED, no value carried
    /// - out of range or non-finite: BAD (takes precedence over source status)
    /// - unknown tag or source flagged uncertain: UNCERTAIN
    /// - otherwise GOOD
    pub fn admit(&self, reading: RawReading, timestamp: DateTime<Utc>) -> Measurement {
        let definition = self.tags.get(&reading.tag);
        let range = definition.map(|t| EngineeringRange::new(t.low, t.high));
        let unit = definition.map(|t| t.unit.clone()).unwrap_or_default();

        let (value, quality) = match reading.value {
            None => (None, Quality::NotConnected),
            Some(raw) => {
                let bounds = range.unwrap_or(EngineeringRange::UNBOUNDED);
                let (value, quality) = evaluate(raw, &bounds);
                let quality = match quality {
                    Quality::Good
                        if definition.is_none() || reading.status == SourceStatus::Uncertain =>
                    {
                        Quality::Uncertain
                    }
                    other => other,
                };
                (Some(value), quality)
            }
        };

        Measurement {
            tag: reading.tag,
            value,
            unit,
            quality,
            timestamp,
            device_id: self.device_id.clone(),
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> QualityGate {
        QualityGate::new("PLC-01", &[TagConfig::new("pressure", "PSI", 0.0, 5000.0)])
    }

    #[test]
    fn test_evaluate_in_range_is_good() {
        let range = EngineeringRange::new(0.0, 5000.0);
        assert_eq!(evaluate(2847.3, &range), (2847.3, Quality::Good));
        assert_eq!(evaluate(5000.0, &range), (5000.0, Quality::Good));
    }

    #[test]
    fn test_evaluate_out_of_range_passes_value_through() {
        let range = EngineeringRange::new(0.0, 5000.0);
        let (value, quality) = evaluate(5200.5, &range);
        assert_eq!(quality, Quality::Bad);
        assert_eq!(value, 5200.5, "value must not be clamped");
    }

    #[test]
    fn test_evaluate_nan_is_bad() {
        let range = EngineeringRange::UNBOUNDED;
        let (_, quality) = evaluate(f64::NAN, &range);
        assert_eq!(quality, Quality::Bad);
    }

    #[test]
    fn test_admit_stamps_unit_range_and_device() {
        let now = Utc::now();
        let m = gate().admit(RawReading::ok("pressure", 2847.3), now);
        assert_eq!(m.quality, Quality::Good);
        assert_eq!(m.unit, "PSI");
        assert_eq!(m.device_id, "PLC-01");
        assert_eq!(m.range, Some(EngineeringRange::new(0.0, 5000.0)));
        assert_eq!(m.timestamp, now);
    }

    #[test]
    fn test_admit_disconnected_carries_no_value() {
        let m = gate().admit(RawReading::disconnected("pressure"), Utc::now());
        assert_eq!(m.quality, Quality::NotConnected);
        assert!(m.value.is_none());
    }

    #[test]
    fn test_admit_source_uncertain() {
        let m = gate().admit(RawReading::uncertain("pressure", 100.0), Utc::now());
        assert_eq!(m.quality, Quality::Uncertain);
        // Out of range still wins over source status
        let m = gate().admit(RawReading::uncertain("pressure", -1.0), Utc::now());
        assert_eq!(m.quality, Quality::Bad);
    }

    #[test]
    fn test_admit_unknown_tag_is_uncertain() {
        let m = gate().admit(RawReading::ok("level", 42.0), Utc::now());
        assert_eq!(m.quality, Quality::Uncertain);
        assert_eq!(m.range, None);
        assert_eq!(m.value, Some(42.0));
    }
}
