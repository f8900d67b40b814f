//! Aggregate statistics over detected anomalies
//!
//! Dashboard payloads batch anomalies across zones and metrics per scan
//! cycle; this rolls a batch up into counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Anomaly, AnomalyLevel};

/// Aggregate counts for a batch of anomalies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total: usize,
    /// Count per severity level; every defined level is present, zero or
    /// not, INFO included even though detection never emits it
    pub by_level: BTreeMap<String, usize>,
    /// Count per distinct zone name seen in the batch
    pub by_zone: BTreeMap<String, usize>,
    pub critical_count: usize,
    pub high_risk_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

impl AnomalySummary {
    /// Summarize a batch of anomalies; an empty batch yields all zeros
    pub fn from_anomalies(anomalies: &[Anomaly]) -> Self {
        let mut by_level: BTreeMap<String, usize> = AnomalyLevel::ALL
            .iter()
            .map(|level| (level.as_str().to_string(), 0))
            .collect();
        let mut by_zone: BTreeMap<String, usize> = BTreeMap::new();

        for anomaly in anomalies {
            *by_level
                .entry(anomaly.level.as_str().to_string())
                .or_insert(0) += 1;
            *by_zone.entry(anomaly.zone_name.clone()).or_insert(0) += 1;
        }

        let count_for =
            |level: AnomalyLevel| by_level.get(level.as_str()).copied().unwrap_or(0);
        let critical_count = count_for(AnomalyLevel::Critical);
        let high_risk_count = count_for(AnomalyLevel::HighRisk);
        let warning_count = count_for(AnomalyLevel::Warning);
        let info_count = count_for(AnomalyLevel::Info);

        Self {
            total: anomalies.len(),
            by_level,
            by_zone,
            critical_count,
            high_risk_count,
            warning_count,
            info_count,
        }
    }
}

impl Default for AnomalySummary {
    fn default() -> Self {
        Self::from_anomalies(&[])
    }
}
