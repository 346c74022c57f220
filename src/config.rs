use crate::error::{AnalyticsError, Result};
use crate::matrix::ReturnMetric;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Analytics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Annual risk-free rate (decimal)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    /// VaR/CVaR tail probability
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Return matrix configuration
    #[serde(default)]
    pub matrix: MatrixConfig,

    /// Benchmark ticker for relative metrics and comparisons
    #[serde(default = "default_benchmark")]
    pub benchmark: Option<String>,

    /// Length of the trailing window built by `ReturnsAnalyzer::default_range`
    #[serde(default = "default_history_years")]
    pub history_years: u32,

    /// Price cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Return matrix configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Metric computed per period
    #[serde(default)]
    pub metric: ReturnMetric,

    /// First year shown (defaults to the first year of data)
    #[serde(default)]
    pub start_year: Option<i32>,

    /// Last year shown (defaults to the last year of data)
    #[serde(default)]
    pub end_year: Option<i32>,
}

/// Price cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable price caching
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Cache TTL in seconds
    #[serde(default = "default_cache_ttl_sec")]
    pub ttl_sec: u64,
}

impl CacheConfig {
    /// Get cache TTL as Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_sec)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_sec: default_cache_ttl_sec(),
        }
    }
}

// Default value functions
fn default_risk_free_rate() -> f64 {
    0.02
}

fn default_confidence() -> f64 {
    0.05
}

fn default_benchmark() -> Option<String> {
    Some("SPY".to_string())
}

/// Upper bound accepted for `history_years`
pub const MAX_HISTORY_YEARS: u32 = 200;

fn default_history_years() -> u32 {
    25
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl_sec() -> u64 {
    3600
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: default_risk_free_rate(),
            confidence: default_confidence(),
            matrix: MatrixConfig::default(),
            benchmark: default_benchmark(),
            history_years: default_history_years(),
            cache: CacheConfig::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AnalyticsError::ConfigError(format!("{}: {}", path, e)))?;

        Self::from_yaml(&contents)
    }

    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AnalyticsConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AnalyticsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)
            .map_err(|e| AnalyticsError::ConfigError(format!("{}: {}", path, e)))?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() || self.risk_free_rate <= -1.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "risk_free_rate must be finite and above -1, got {}",
                self.risk_free_rate
            )));
        }

        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(AnalyticsError::InvalidParameter(format!(
                "confidence must be between 0 and 1, got {}",
                self.confidence
            )));
        }

        if let (Some(start), Some(end)) = (self.matrix.start_year, self.matrix.end_year) {
            if start >= end {
                return Err(AnalyticsError::InvalidRange { start, end });
            }
        }

        if self.history_years == 0 || self.history_years > MAX_HISTORY_YEARS {
            return Err(AnalyticsError::InvalidParameter(format!(
                "history_years must be between 1 and {}, got {}",
                MAX_HISTORY_YEARS, self.history_years
            )));
        }

        Ok(())
    }
}
