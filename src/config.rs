//! Threshold configuration for silence trimming and normalization

use crate::error::CleanError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Calibration values for the silence/burst scan and the normalizer
///
/// Every field can be overridden independently; missing keys in a JSON
/// config fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Slices with RMS at or below this level are silent (default: -50.0 dB)
    pub silence_threshold_db: f32,

    /// A noise run whose peak exceeds this level is real signal rather than
    /// a click (default: -20.0 dB)
    pub burst_threshold_db: f32,

    /// Width of one analysis slice in milliseconds (default: 10)
    pub silence_slice_ms: u32,

    /// Span a noise run must exceed before it is confirmed as the speech
    /// boundary (default: 100)
    pub max_gap_ms: u32,

    /// Audio kept after the detected end boundary (default: 200)
    pub trailing_margin_ms: u32,

    /// Peak margin below full scale left by normalization (default: 0.3 dB)
    pub headroom_db: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            silence_threshold_db: -50.0,
            burst_threshold_db: -20.0,
            silence_slice_ms: 10,
            max_gap_ms: 100,
            trailing_margin_ms: 200,
            headroom_db: 0.3,
        }
    }
}

impl ThresholdConfig {
    /// Build a config from the two dB thresholds, keeping the other defaults
    ///
    /// # Errors
    ///
    /// Returns `CleanError::ConfigInvariantViolation` if
    /// `burst_threshold_db <= silence_threshold_db`.
    ///
    /// # Example
    ///
    /// ```
    /// use clean_audio::ThresholdConfig;
    ///
    /// let config = ThresholdConfig::new(-45.0, -15.0)?;
    /// assert_eq!(config.max_gap_ms, 100);
    /// assert!(ThresholdConfig::new(-20.0, -50.0).is_err());
    /// # Ok::<(), clean_audio::CleanError>(())
    /// ```
    pub fn new(silence_threshold_db: f32, burst_threshold_db: f32) -> Result<Self, CleanError> {
        let config = Self {
            silence_threshold_db,
            burst_threshold_db,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the config invariants before any scan runs
    pub fn validate(&self) -> Result<(), CleanError> {
        if !self.silence_threshold_db.is_finite() || !self.burst_threshold_db.is_finite() {
            return Err(CleanError::InvalidInput(
                "Thresholds must be finite dB values".to_string(),
            ));
        }

        if self.burst_threshold_db <= self.silence_threshold_db {
            return Err(CleanError::ConfigInvariantViolation(format!(
                "burst threshold ({} dB) must be above silence threshold ({} dB)",
                self.burst_threshold_db, self.silence_threshold_db
            )));
        }

        if self.silence_slice_ms == 0 {
            return Err(CleanError::InvalidInput(
                "silence_slice_ms must be at least 1".to_string(),
            ));
        }

        if !self.headroom_db.is_finite() || self.headroom_db < 0.0 {
            return Err(CleanError::InvalidInput(format!(
                "headroom_db must be a non-negative dB value, got {}",
                self.headroom_db
            )));
        }

        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, CleanError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CleanError::InvalidInput(format!("Malformed config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn from_json_file(path: &Path) -> Result<Self, CleanError> {
        let json = std::fs::read_to_string(path)?;
        log::debug!("Loaded threshold config from {}", path.display());
        Self::from_json_str(&json)
    }
}
