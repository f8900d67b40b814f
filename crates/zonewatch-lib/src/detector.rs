//! Statistical anomaly detection for zone metrics
//!
//! Compares current metric readings against a rolling historical baseline
//! (mean and sample standard deviation) and classifies deviations, in
//! sigma units, against configurable per-zone thresholds.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing::{debug, info, warn};

use crate::config::{AnomalyDetectionConfig, Thresholds};
use crate::error::DetectorError;
use crate::models::{Anomaly, AnomalyLevel, AnomalyMetadata, Direction, MetricSample};

/// Detects metric deviations exceeding sigma thresholds
///
/// Holds only immutable configuration; every operation takes `&self` and
/// mutates nothing, so one instance can be shared across threads freely.
pub struct AnomalyDetector {
    config: AnomalyDetectionConfig,
}

impl AnomalyDetector {
    /// Create a detector with the given configuration
    pub fn new(config: AnomalyDetectionConfig) -> Self {
        Self { config }
    }

    /// The configuration this detector was built with
    pub fn config(&self) -> &AnomalyDetectionConfig {
        &self.config
    }

    /// Detect anomalies for one zone's current readings
    ///
    /// # Arguments
    /// * `current_metrics` - Ordered (metric name, current value) pairs;
    ///   the returned list follows this order
    /// * `historical_data` - Historical samples, already windowed by the
    ///   caller (see [`Self::filter_recent_data`]); records missing a
    ///   metric are skipped for that metric
    /// * `timestamp` - Stamp for produced anomalies, defaulting to now
    ///
    /// Returns an empty list when the zone has fewer than
    /// `min_data_points` historical samples overall. This gate is applied
    /// once per call, before any per-metric count is looked at.
    pub fn detect_anomalies(
        &self,
        zone_id: &str,
        zone_name: &str,
        current_metrics: &[(String, f64)],
        historical_data: &[MetricSample],
        timestamp: Option<DateTime<Utc>>,
    ) -> Vec<Anomaly> {
        if historical_data.len() < self.config.min_data_points {
            warn!(
                zone_id,
                available = historical_data.len(),
                required = self.config.min_data_points,
                "insufficient historical data, skipping detection"
            );
            return Vec::new();
        }

        let timestamp = timestamp.unwrap_or_else(Utc::now);
        let mut anomalies = Vec::new();

        for (metric_name, current_value) in current_metrics {
            if let Some(anomaly) = self.detect_metric_anomaly(
                zone_id,
                zone_name,
                metric_name,
                *current_value,
                historical_data,
                timestamp,
            ) {
                info!(
                    zone_id,
                    metric = %anomaly.metric_name,
                    level = %anomaly.level,
                    sigma = anomaly.sigma_deviation,
                    "anomaly detected"
                );
                anomalies.push(anomaly);
            }
        }

        anomalies
    }

    /// Detect a single metric's deviation, if it clears a threshold
    fn detect_metric_anomaly(
        &self,
        zone_id: &str,
        zone_name: &str,
        metric_name: &str,
        current_value: f64,
        historical_data: &[MetricSample],
        timestamp: DateTime<Utc>,
    ) -> Option<Anomaly> {
        let historical_values: Vec<f64> = historical_data
            .iter()
            .filter_map(|sample| sample.value(metric_name))
            .collect();

        if historical_values.len() < self.config.min_data_points {
            debug!(
                zone_id,
                metric_name,
                available = historical_values.len(),
                "metric has too few samples, skipped"
            );
            return None;
        }

        let (baseline, std_dev) = baseline_stats(&historical_values);

        let sigma = if std_dev == 0.0 {
            // No variation to measure against; only a departure from the
            // constant history is reportable, and it is off the scale.
            if current_value == baseline {
                return None;
            }
            f64::INFINITY
        } else {
            (current_value - baseline).abs() / std_dev
        };

        let thresholds = self.config.thresholds_for(zone_id);
        let level = classify(sigma, &thresholds)?;

        let direction = if current_value > baseline {
            Direction::Augmentation
        } else {
            Direction::Diminution
        };
        let percentage = if baseline != 0.0 {
            (current_value - baseline).abs() / baseline * 100.0
        } else {
            0.0
        };

        let description = format!(
            "{} anomaly: {} {} of {:.1}% in zone {} ({:.1} sigma)",
            level, metric_name, direction, percentage, zone_name, sigma
        );

        Some(Anomaly {
            timestamp,
            zone_id: zone_id.to_string(),
            zone_name: zone_name.to_string(),
            metric_name: metric_name.to_string(),
            current_value,
            baseline_value: baseline,
            std_deviation: std_dev,
            sigma_deviation: sigma,
            level,
            description,
            metadata: AnomalyMetadata {
                percentage_change: (percentage * 10.0).round() / 10.0,
                direction,
                data_points: historical_values.len(),
            },
        })
    }

    /// Baseline mean and sample standard deviation for one metric
    ///
    /// Standalone helper; unlike full detection it only needs 2 values,
    /// returning `(0.0, 0.0)` below that.
    pub fn calculate_baseline(
        &self,
        metric_name: &str,
        historical_data: &[MetricSample],
    ) -> (f64, f64) {
        let values: Vec<f64> = historical_data
            .iter()
            .filter_map(|sample| sample.value(metric_name))
            .collect();

        if values.len() < 2 {
            return (0.0, 0.0);
        }
        baseline_stats(&values)
    }

    /// Keep samples whose timestamp falls within `hours` of now (UTC)
    ///
    /// Defaults to the configured `baseline_window_hours`. Samples without
    /// a timestamp are excluded; malformed timestamps fail the whole call.
    /// Detection does not window its input itself - callers apply this (or
    /// their own windowing) first.
    pub fn filter_recent_data(
        &self,
        historical_data: &[MetricSample],
        hours: Option<f64>,
    ) -> Result<Vec<MetricSample>, DetectorError> {
        let window_hours = hours.unwrap_or(self.config.baseline_window_hours);
        let cutoff = Utc::now() - chrono::Duration::seconds((window_hours * 3600.0).round() as i64);

        let mut filtered = Vec::new();
        for sample in historical_data {
            let Some(raw) = &sample.timestamp else {
                continue;
            };
            if parse_timestamp(raw)? >= cutoff {
                filtered.push(sample.clone());
            }
        }
        Ok(filtered)
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(AnomalyDetectionConfig::default())
    }
}

/// Classify a sigma deviation against effective thresholds
///
/// Sub-warning deviations are not reported at all (no INFO anomalies).
fn classify(sigma: f64, thresholds: &Thresholds) -> Option<AnomalyLevel> {
    if sigma >= thresholds.critical {
        Some(AnomalyLevel::Critical)
    } else if sigma >= thresholds.high_risk {
        Some(AnomalyLevel::HighRisk)
    } else if sigma >= thresholds.warning {
        Some(AnomalyLevel::Warning)
    } else {
        None
    }
}

/// Mean and sample standard deviation (Bessel's correction)
///
/// A run of identical values short-circuits to (value, 0.0) so that the
/// mean carries no floating-point drift; the zero-variance detection rule
/// compares the current value against it exactly.
fn baseline_stats(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    if values.windows(2).all(|pair| pair[0] == pair[1]) {
        return (values[0], 0.0);
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);

    (mean, variance.sqrt())
}

/// Parse an ISO-8601 timestamp, RFC 3339 or naive (assumed UTC)
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DetectorError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    value
        .parse::<NaiveDateTime>()
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|source| DetectorError::MalformedTimestamp {
            value: value.to_string(),
            source,
        })
}
