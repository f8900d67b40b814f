//! Error types for the detection library

use thiserror::Error;

/// Errors surfaced by the anomaly detection library
///
/// The taxonomy is deliberately narrow: detection itself is a pure
/// computation and never fails. Insufficient or zero-variance data is
/// handled in-band (no anomaly), not as an error.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// A historical sample carried a timestamp that is neither RFC 3339
    /// nor naive ISO-8601
    #[error("malformed timestamp {value:?}")]
    MalformedTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Configured sigma thresholds are not strictly increasing
    #[error(
        "invalid thresholds: expected warning < high_risk < critical, \
         got {warning} / {high_risk} / {critical}"
    )]
    InvalidThresholds {
        warning: f64,
        high_risk: f64,
        critical: f64,
    },
}
