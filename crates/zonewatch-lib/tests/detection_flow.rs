//! End-to-end detection flow tests
//!
//! Exercises the library the way the embedding scan layer does: window the
//! history, run detection per zone, batch the results into a summary, and
//! serialize the payload.

use chrono::{TimeZone, Utc};
use zonewatch_lib::{
    AnomalyDetectionConfig, AnomalyDetector, AnomalyLevel, AnomalySummary, Direction, MetricSample,
};

fn activity_history(values: &[f64]) -> Vec<MetricSample> {
    values
        .iter()
        .map(|v| MetricSample::single("total_activity", *v))
        .collect()
}

#[test]
fn test_nato_activity_spike_end_to_end() {
    let detector = AnomalyDetector::default();
    let historical = activity_history(&[
        0.20, 0.22, 0.19, 0.21, 0.23, 0.20, 0.18, 0.22, 0.21, 0.20,
    ]);
    let stamp = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();

    let anomalies = detector.detect_anomalies(
        "nato",
        "NATO",
        &[("total_activity".to_string(), 0.28)],
        &historical,
        Some(stamp),
    );

    assert_eq!(anomalies.len(), 1);
    let anomaly = &anomalies[0];
    assert_eq!(anomaly.level, AnomalyLevel::Critical);
    assert_eq!(anomaly.metric_name, "total_activity");
    assert_eq!(anomaly.zone_name, "NATO");
    assert_eq!(anomaly.metadata.direction, Direction::Augmentation);
    assert_eq!(anomaly.metadata.data_points, 10);
    assert!((anomaly.baseline_value - 0.206).abs() < 1e-9);
    assert!(anomaly.sigma_deviation > 4.0);
    assert_eq!(anomaly.timestamp, stamp);
}

#[test]
fn test_windowed_scan_cycle_with_summary() {
    let detector = AnomalyDetector::new(AnomalyDetectionConfig::default());
    let now = Utc::now();

    // 10 in-window samples plus one stale record that windowing drops
    let mut historical: Vec<MetricSample> = (0..10)
        .map(|i| {
            let mut sample = MetricSample::single("total_activity", 0.20 + (i % 3) as f64 * 0.01);
            sample.timestamp = Some((now - chrono::Duration::hours(i + 1)).to_rfc3339());
            sample
        })
        .collect();
    historical.push(MetricSample::at(
        (now - chrono::Duration::hours(72)).to_rfc3339(),
        [("total_activity".to_string(), 9.0)].into_iter().collect(),
    ));

    let windowed = detector.filter_recent_data(&historical, None).unwrap();
    assert_eq!(windowed.len(), 10);

    // The stale outlier no longer distorts the baseline
    let (baseline, _) = detector.calculate_baseline("total_activity", &windowed);
    assert!(baseline < 0.25);

    let mut batch = detector.detect_anomalies(
        "nato",
        "NATO",
        &[("total_activity".to_string(), 0.9)],
        &windowed,
        None,
    );
    batch.extend(detector.detect_anomalies(
        "baltic",
        "Baltic",
        &[("total_activity".to_string(), 0.9)],
        &windowed,
        None,
    ));

    let summary = AnomalySummary::from_anomalies(&batch);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.critical_count, 2);
    assert_eq!(summary.by_zone["NATO"], 1);
    assert_eq!(summary.by_zone["Baltic"], 1);
    assert_eq!(summary.info_count, 0);
}

#[test]
fn test_anomaly_payload_contract() {
    let detector = AnomalyDetector::default();
    let historical = activity_history(&[
        0.20, 0.22, 0.19, 0.21, 0.23, 0.20, 0.18, 0.22, 0.21, 0.20,
    ]);
    let stamp = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();

    let anomalies = detector.detect_anomalies(
        "nato",
        "NATO",
        &[("total_activity".to_string(), 0.28)],
        &historical,
        Some(stamp),
    );

    let payload = serde_json::to_value(&anomalies).unwrap();
    let record = &payload[0];

    assert_eq!(record["timestamp"], "2026-02-01T12:00:00Z");
    assert_eq!(record["zone_id"], "nato");
    assert_eq!(record["zone_name"], "NATO");
    assert_eq!(record["metric_name"], "total_activity");
    assert_eq!(record["level"], "critical");
    assert_eq!(record["metadata"]["direction"], "augmentation");
    assert_eq!(record["metadata"]["data_points"], 10);

    // Sigma is rounded to 2 decimals on the wire
    let sigma = record["sigma_deviation"].as_f64().unwrap();
    assert_eq!(sigma, (sigma * 100.0).round() / 100.0);
}

#[test]
fn test_shared_detector_across_threads() {
    let detector = std::sync::Arc::new(AnomalyDetector::default());
    let historical = std::sync::Arc::new(activity_history(&[
        0.20, 0.22, 0.19, 0.21, 0.23, 0.20, 0.18, 0.22, 0.21, 0.20,
    ]));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let detector = detector.clone();
            let historical = historical.clone();
            std::thread::spawn(move || {
                detector.detect_anomalies(
                    &format!("zone{i}"),
                    &format!("Zone {i}"),
                    &[("total_activity".to_string(), 0.28)],
                    &historical,
                    None,
                )
            })
        })
        .collect();

    for handle in handles {
        let anomalies = handle.join().unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].level, AnomalyLevel::Critical);
    }
}
