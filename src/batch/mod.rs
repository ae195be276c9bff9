//! Batch Aggregator
//!
//! Groups consecutive measurements for bulk handoff to the historian. The
//! aggregator performs no I/O: [`BatchAggregator::flush`] hands ownership of
//! the full batch to the caller and starts a fresh, empty one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Measurement;

/// An ordered run of measurements with an identifier and start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub measurements: Vec<Measurement>,
}

impl Batch {
    /// Empty batch with a fresh v4 identifier.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            measurements: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects measurements until `threshold` is reached.
#[derive(Debug, Clone)]
pub struct BatchAggregator {
    threshold: usize,
    current: Batch,
}

impl BatchAggregator {
    /// Create an aggregator flushing at `threshold` measurements (min 1).
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            current: Batch::new(),
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// The batch currently being filled.
    pub fn current(&self) -> &Batch {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn add(&mut self, measurement: Measurement) {
        self.current.measurements.push(measurement);
    }

    /// True once the current batch has reached the threshold.
    pub fn should_flush(&self) -> bool {
        self.current.len() >= self.threshold
    }

    /// Take the current batch and replace it with an empty one (new id).
    pub fn flush(&mut self) -> Batch {
        std::mem::take(&mut self.current)
    }
}

impl Default for BatchAggregator {
    fn default() -> Self {
        Self::new(crate::config::defaults::DEFAULT_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EngineeringRange, Quality};

    fn measurement(value: f64) -> Measurement {
        Measurement {
            tag: "pressure".to_string(),
            value: Some(value),
            unit: "PSI".to_string(),
            quality: Quality::Good,
            timestamp: Utc::now(),
            device_id: "PLC-01".to_string(),
            range: Some(EngineeringRange::new(0.0, 5000.0)),
        }
    }

    #[test]
    fn test_flush_due_exactly_at_threshold() {
        let mut agg = BatchAggregator::new(3);
        agg.add(measurement(1.0));
        assert!(!agg.should_flush());
        agg.add(measurement(2.0));
        assert!(!agg.should_flush());
        agg.add(measurement(3.0));
        assert!(agg.should_flush());
    }

    #[test]
    fn test_flush_returns_full_batch_and_starts_fresh() {
        let mut agg = BatchAggregator::new(2);
        let first_id = agg.current().id;
        agg.add(measurement(1.0));
        agg.add(measurement(2.0));

        let flushed = agg.flush();
        assert_eq!(flushed.id, first_id);
        assert_eq!(flushed.len(), 2);
        assert_eq!(flushed.measurements[1].value, Some(2.0));

        assert!(agg.is_empty());
        assert!(!agg.should_flush());
        assert_ne!(agg.current().id, first_id, "new batch must get a distinct id");
    }

    #[test]
    fn test_order_preserved() {
        let mut agg = BatchAggregator::new(10);
        for v in [5.0, 3.0, 9.0] {
            agg.add(measurement(v));
        }
        let values: Vec<_> = agg.flush().measurements.iter().filter_map(|m| m.value).collect();
        assert_eq!(values, vec![5.0, 3.0, 9.0]);
    }

    #[test]
    fn test_zero_threshold_clamped() {
        assert_eq!(BatchAggregator::new(0).threshold(), 1);
    }
}
