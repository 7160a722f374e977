//! Configuration types for the assessment engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for assessment runs and review routing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// Minimum pass ratio over conclusive scored judgments for an
    /// overall pass verdict
    pub quality_threshold: f64,

    /// Maximum number of inconclusive (errored) scored judges
    /// tolerated before the verdict degrades to fail
    pub inconclusive_tolerance: usize,

    /// Half-width of the band around the quality threshold within
    /// which a guideline score counts as borderline
    pub borderline_band: f64,

    /// Fraction of passing, non-borderline traces escalated anyway as
    /// a calibration sample for human reviewers
    pub sampling_rate: f64,

    /// Deadline for a single judge invocation; a judge that exceeds it
    /// is recorded as an error judgment with a "timeout" detail
    #[serde(with = "humantime_serde")]
    pub judge_timeout: Duration,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            quality_threshold: 0.7,
            inconclusive_tolerance: 1,
            borderline_band: 0.1,
            sampling_rate: 0.02,
            judge_timeout: Duration::from_secs(30),
        }
    }
}

impl AssessmentConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (krisis.toml or path from KRISIS_CONFIG_PATH)
    /// 3. Environment variable overrides (KRISIS_ prefix)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is invalid or values
    /// are out of range.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(AssessmentConfig::default()))
            .merge(Toml::file("krisis.toml"));

        // A custom config path replaces krisis.toml, not the env overrides
        if let Ok(path) = std::env::var("KRISIS_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: AssessmentConfig = figment.merge(Env::prefixed("KRISIS_")).extract().map_err(|e| {
            crate::error::KrisisError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: AssessmentConfig = Figment::from(Serialized::defaults(AssessmentConfig::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                crate::error::KrisisError::Configuration(format!(
                    "Failed to load configuration file: {}",
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is out of range.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            return Err(crate::error::KrisisError::Configuration(format!(
                "quality_threshold must be within [0, 1], got {}",
                self.quality_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.sampling_rate) {
            return Err(crate::error::KrisisError::Configuration(format!(
                "sampling_rate must be within [0, 1], got {}",
                self.sampling_rate
            )));
        }
        if self.borderline_band < 0.0 || self.borderline_band > 0.5 {
            return Err(crate::error::KrisisError::Configuration(format!(
                "borderline_band must be within [0, 0.5], got {}",
                self.borderline_band
            )));
        }
        if self.judge_timeout.is_zero() {
            return Err(crate::error::KrisisError::Configuration(
                "judge_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for AssessmentConfig
pub struct ConfigBuilder {
    config: AssessmentConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self {
            config: AssessmentConfig::default(),
        }
    }

    /// Set the quality threshold
    pub fn quality_threshold(mut self, threshold: f64) -> Self {
        self.config.quality_threshold = threshold;
        self
    }

    /// Set the inconclusive tolerance
    pub fn inconclusive_tolerance(mut self, tolerance: usize) -> Self {
        self.config.inconclusive_tolerance = tolerance;
        self
    }

    /// Set the borderline band width
    pub fn borderline_band(mut self, band: f64) -> Self {
        self.config.borderline_band = band;
        self
    }

    /// Set the calibration sampling rate
    pub fn sampling_rate(mut self, rate: f64) -> Self {
        self.config.sampling_rate = rate;
        self
    }

    /// Set the per-judge timeout
    pub fn judge_timeout(mut self, timeout: Duration) -> Self {
        self.config.judge_timeout = timeout;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the assembled configuration is invalid.
    pub fn build(self) -> crate::error::Result<AssessmentConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AssessmentConfig::default();
        assert_eq!(config.quality_threshold, 0.7);
        assert_eq!(config.inconclusive_tolerance, 1);
        assert_eq!(config.borderline_band, 0.1);
        assert_eq!(config.sampling_rate, 0.02);
        assert_eq!(config.judge_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ConfigBuilder::new()
            .quality_threshold(0.8)
            .inconclusive_tolerance(2)
            .judge_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.quality_threshold, 0.8);
        assert_eq!(config.inconclusive_tolerance, 2);
        assert_eq!(config.judge_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(ConfigBuilder::new().quality_threshold(1.5).build().is_err());
        assert!(ConfigBuilder::new().sampling_rate(-0.1).build().is_err());
        assert!(ConfigBuilder::new()
            .judge_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "quality_threshold = 0.6\nsampling_rate = 0.05\njudge_timeout = \"10s\""
        )
        .unwrap();

        let config = AssessmentConfig::from_file(file.path()).unwrap();
        assert_eq!(config.quality_threshold, 0.6);
        assert_eq!(config.sampling_rate, 0.05);
        assert_eq!(config.judge_timeout, Duration::from_secs(10));
        // Unspecified values keep their defaults
        assert_eq!(config.inconclusive_tolerance, 1);
    }

    #[test]
    fn test_env_overrides_custom_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "quality_threshold = 0.9\nsampling_rate = 0.04").unwrap();

        std::env::set_var("KRISIS_CONFIG_PATH", file.path());
        std::env::set_var("KRISIS_QUALITY_THRESHOLD", "0.5");
        let config = AssessmentConfig::load();
        std::env::remove_var("KRISIS_CONFIG_PATH");
        std::env::remove_var("KRISIS_QUALITY_THRESHOLD");

        let config = config.unwrap();
        // Env wins over the file named by KRISIS_CONFIG_PATH
        assert_eq!(config.quality_threshold, 0.5);
        // File values without an env override still apply
        assert_eq!(config.sampling_rate, 0.04);
    }
}
