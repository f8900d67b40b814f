//! Core data models for zone anomaly detection

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// One historical metric sample for a zone
///
/// The wire shape is a flat object: metric names mapped to numeric values,
/// plus an optional `timestamp` (ISO-8601 string) consumed only by
/// [`crate::AnomalyDetector::filter_recent_data`]. Records missing a metric
/// key are skipped during extraction, never treated as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub metrics: HashMap<String, f64>,
}

impl MetricSample {
    /// Create a sample without a timestamp
    pub fn new(metrics: HashMap<String, f64>) -> Self {
        Self {
            timestamp: None,
            metrics,
        }
    }

    /// Create a timestamped sample
    pub fn at(timestamp: impl Into<String>, metrics: HashMap<String, f64>) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            metrics,
        }
    }

    /// Create a sample carrying a single metric
    pub fn single(metric_name: impl Into<String>, value: f64) -> Self {
        let mut metrics = HashMap::new();
        metrics.insert(metric_name.into(), value);
        Self::new(metrics)
    }

    /// Value for a metric, if this sample carries it
    pub fn value(&self, metric_name: &str) -> Option<f64> {
        self.metrics.get(metric_name).copied()
    }
}

/// Severity levels for detected anomalies
///
/// Ordered by sigma magnitude. `Info` is defined for aggregation paths but
/// never emitted by detection: sub-warning deviations produce no anomaly
/// record at all.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyLevel {
    Info,
    Warning,
    HighRisk,
    Critical,
}

impl AnomalyLevel {
    /// All defined levels, in ascending severity order
    pub const ALL: [AnomalyLevel; 4] = [
        AnomalyLevel::Info,
        AnomalyLevel::Warning,
        AnomalyLevel::HighRisk,
        AnomalyLevel::Critical,
    ];

    /// Serialized string value (`"info"`, `"warning"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyLevel::Info => "info",
            AnomalyLevel::Warning => "warning",
            AnomalyLevel::HighRisk => "high_risk",
            AnomalyLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for AnomalyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyLevel::Info => write!(f, "INFO"),
            AnomalyLevel::Warning => write!(f, "WARNING"),
            AnomalyLevel::HighRisk => write!(f, "HIGH_RISK"),
            AnomalyLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Direction of a deviation relative to the baseline
///
/// The string values are kept from the source system, where the dashboard
/// consumed them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Augmentation,
    Diminution,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Augmentation => write!(f, "augmentation"),
            Direction::Diminution => write!(f, "diminution"),
        }
    }
}

/// Auxiliary detail attached to an anomaly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyMetadata {
    /// Percent change from baseline, rounded to 1 decimal (0 when the
    /// baseline is zero)
    pub percentage_change: f64,
    pub direction: Direction,
    /// Number of historical values the baseline was computed from
    pub data_points: usize,
}

/// A detected deviation for one zone metric
///
/// Created once per (zone, metric, timestamp) detection that clears a
/// threshold and never mutated afterwards; the detector retains nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub timestamp: DateTime<Utc>,
    pub zone_id: String,
    pub zone_name: String,
    pub metric_name: String,
    pub current_value: f64,
    pub baseline_value: f64,
    pub std_deviation: f64,
    /// Deviation in standard-deviation units; infinite for zero-variance
    /// history. Rounded to 2 decimals on serialization.
    #[serde(serialize_with = "serialize_sigma")]
    pub sigma_deviation: f64,
    pub level: AnomalyLevel,
    /// Human-readable summary: level, direction, metric, zone, percent
    /// change and sigma
    pub description: String,
    pub metadata: AnomalyMetadata,
}

fn serialize_sigma<S>(sigma: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let rounded = if sigma.is_finite() {
        (sigma * 100.0).round() / 100.0
    } else {
        *sigma
    };
    serializer.serialize_f64(rounded)
}
