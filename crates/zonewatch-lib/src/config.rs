//! Detection configuration
//!
//! `AnomalyDetectionConfig` is constructed once, validated, and handed to
//! the detector by value. Per-zone threshold overrides are resolved
//! field-by-field against the global thresholds at lookup time; there is no
//! mutable global state.

use std::collections::HashMap;

use anyhow::Result;
use serde::Deserialize;

use crate::error::DetectorError;

/// Sigma thresholds effective for one zone after override resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warning: f64,
    pub high_risk: f64,
    pub critical: f64,
}

/// Partial per-zone threshold override
///
/// Absent fields fall back to the global thresholds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ThresholdOverrides {
    #[serde(default)]
    pub warning: Option<f64>,
    #[serde(default)]
    pub high_risk: Option<f64>,
    #[serde(default)]
    pub critical: Option<f64>,
}

/// Anomaly detection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnomalyDetectionConfig {
    /// Rolling window used for baseline computation, in hours
    #[serde(default = "default_baseline_window_hours")]
    pub baseline_window_hours: f64,

    /// Sigma cutoff for WARNING
    #[serde(default = "default_threshold_warning")]
    pub threshold_warning: f64,

    /// Sigma cutoff for HIGH_RISK
    #[serde(default = "default_threshold_high_risk")]
    pub threshold_high_risk: f64,

    /// Sigma cutoff for CRITICAL
    #[serde(default = "default_threshold_critical")]
    pub threshold_critical: f64,

    /// Minimum historical samples before detection is attempted
    #[serde(default = "default_min_data_points")]
    pub min_data_points: usize,

    /// Caller polling cadence in minutes; informational, not enforced here
    #[serde(default = "default_detection_interval_minutes")]
    pub detection_interval_minutes: u64,

    /// Per-zone threshold overrides keyed by zone id
    #[serde(default)]
    pub zone_thresholds: HashMap<String, ThresholdOverrides>,
}

fn default_baseline_window_hours() -> f64 {
    24.0
}

fn default_threshold_warning() -> f64 {
    2.0
}

fn default_threshold_high_risk() -> f64 {
    3.0
}

fn default_threshold_critical() -> f64 {
    4.0
}

fn default_min_data_points() -> usize {
    10
}

fn default_detection_interval_minutes() -> u64 {
    60
}

impl Default for AnomalyDetectionConfig {
    fn default() -> Self {
        Self {
            baseline_window_hours: default_baseline_window_hours(),
            threshold_warning: default_threshold_warning(),
            threshold_high_risk: default_threshold_high_risk(),
            threshold_critical: default_threshold_critical(),
            min_data_points: default_min_data_points(),
            detection_interval_minutes: default_detection_interval_minutes(),
            zone_thresholds: HashMap::new(),
        }
    }
}

impl AnomalyDetectionConfig {
    /// Load configuration from `zonewatch.toml` (optional) and
    /// `ZONEWATCH_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("zonewatch").required(false))
            .add_source(config::Environment::with_prefix("ZONEWATCH"))
            .build()?;

        let config: AnomalyDetectionConfig = config
            .try_deserialize()
            .unwrap_or_else(|_| AnomalyDetectionConfig::default());
        config.validate()?;
        Ok(config)
    }

    /// Check that the global thresholds are strictly increasing
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.threshold_warning < self.threshold_high_risk
            && self.threshold_high_risk < self.threshold_critical
        {
            Ok(())
        } else {
            Err(DetectorError::InvalidThresholds {
                warning: self.threshold_warning,
                high_risk: self.threshold_high_risk,
                critical: self.threshold_critical,
            })
        }
    }

    /// Effective thresholds for a zone
    ///
    /// Fields absent from the zone's override (or the whole zone being
    /// absent) fall back to the global thresholds.
    pub fn thresholds_for(&self, zone_id: &str) -> Thresholds {
        let overrides = self.zone_thresholds.get(zone_id);
        Thresholds {
            warning: overrides
                .and_then(|o| o.warning)
                .unwrap_or(self.threshold_warning),
            high_risk: overrides
                .and_then(|o| o.high_risk)
                .unwrap_or(self.threshold_high_risk),
            critical: overrides
                .and_then(|o| o.critical)
                .unwrap_or(self.threshold_critical),
        }
    }
}
