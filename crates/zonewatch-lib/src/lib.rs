//! Anomaly detection library for zone activity metrics
//!
//! This crate provides the core functionality for:
//! - Rolling baseline computation (mean, sample standard deviation)
//! - Sigma-unit deviation classification with per-zone thresholds
//! - Batch summarization for dashboard payloads
//!
//! The detector is a pure computation over caller-supplied samples: it
//! performs no I/O, holds no mutable state, and is safe to share across
//! threads. Data acquisition, scheduling, and persistence belong to the
//! embedding service.

pub mod config;
pub mod detector;
pub mod error;
pub mod models;
pub mod summary;

pub use config::{AnomalyDetectionConfig, ThresholdOverrides, Thresholds};
pub use detector::AnomalyDetector;
pub use error::DetectorError;
pub use models::{Anomaly, AnomalyLevel, AnomalyMetadata, Direction, MetricSample};
pub use summary::AnomalySummary;
