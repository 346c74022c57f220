//! Error types for the analytics core

use thiserror::Error;

/// Errors that can occur while deriving series, matrices, or metrics
///
/// Numerical degeneracies (zero denominators, missing benchmark) are not
/// errors; those surface as `None` on the affected metric.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No data: {0}")]
    NoData(String),

    #[error("No overlap: {0}")]
    NoOverlap(String),

    #[error("Invalid range: start year {start} must be before end year {end}")]
    InvalidRange { start: i32, end: i32 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Ticker not found: {0}")]
    TickerNotFound(String),

    #[error("Price provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_yaml::Error> for AnalyticsError {
    fn from(err: serde_yaml::Error) -> Self {
        AnalyticsError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        AnalyticsError::ConfigError(err.to_string())
    }
}

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_message() {
        let err = AnalyticsError::InvalidRange { start: 2020, end: 2010 };
        assert_eq!(
            err.to_string(),
            "Invalid range: start year 2020 must be before end year 2010"
        );
    }

    #[test]
    fn test_yaml_error_maps_to_config_error() {
        let err: AnalyticsError = serde_yaml::from_str::<Vec<f64>>("{not: [a list")
            .unwrap_err()
            .into();
        assert!(matches!(err, AnalyticsError::ConfigError(_)));
    }
}
