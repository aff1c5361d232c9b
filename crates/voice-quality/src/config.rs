//! Quality test configuration
//!
//! Defaults mirror the click-to-call widget: a test call lasts at least 10
//! seconds and at most 20, statistics are polled once per second, and the
//! score is computed by the SBC unless the browser test is selected.
//!
//! # Example
//!
//! ```rust
//! use c2c_voice_quality::config::{QualityTestConfig, ScoreSource};
//!
//! let config = QualityTestConfig::from_toml_str(r#"
//!     min_duration_secs = 5
//!     max_duration_secs = 15
//!     score_source = "browser"
//! "#).unwrap();
//!
//! assert_eq!(config.min_duration_secs, 5);
//! assert_eq!(config.score_source, ScoreSource::Browser);
//! assert_eq!(config.poll_interval_ms, 1000);
//! assert!(config.validate().is_ok());
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QualityError, Result};

/// Who computes the voice quality score of a test call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    /// Computed locally from `getStats()` reports
    Browser,
    /// Computed by the SBC and returned in the `X-VoiceQuality` header
    #[default]
    Sbc,
}

/// Quality test configuration
///
/// `max_duration_secs >= min_duration_secs` is a contract of the caller; the
/// sampler does not check it. Use [`QualityTestConfig::validate`] when loading
/// configuration from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityTestConfig {
    /// Stop as soon as a score is available after this many seconds
    pub min_duration_secs: u32,
    /// Stop after this many polls in any case
    pub max_duration_secs: u32,
    /// Time between two statistics polls
    pub poll_interval_ms: u64,
    /// Who computes the score
    pub score_source: ScoreSource,
    /// Text shown for each SBC quality color
    pub sbc_quality_text: BTreeMap<String, String>,
}

impl Default for QualityTestConfig {
    fn default() -> Self {
        let sbc_quality_text = [("green", "Good"), ("yellow", "Fair"), ("red", "Low"), ("gray", "N/A")]
            .into_iter()
            .map(|(color, text)| (color.to_string(), text.to_string()))
            .collect();

        Self {
            min_duration_secs: 10,
            max_duration_secs: 20,
            poll_interval_ms: 1000,
            score_source: ScoreSource::default(),
            sbc_quality_text,
        }
    }
}

impl QualityTestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_duration(mut self, secs: u32) -> Self {
        self.min_duration_secs = secs;
        self
    }

    pub fn with_max_duration(mut self, secs: u32) -> Self {
        self.max_duration_secs = secs;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_score_source(mut self, source: ScoreSource) -> Self {
        self.score_source = source;
        self
    }

    pub fn with_sbc_quality_text(mut self, color: impl Into<String>, text: impl Into<String>) -> Self {
        self.sbc_quality_text.insert(color.into().to_lowercase(), text.into());
        self
    }

    pub fn min_duration(&self) -> Duration {
        Duration::from_secs(self.min_duration_secs as u64)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Test duration requested from the SBC, in milliseconds
    pub fn sbc_test_duration_ms(&self) -> u64 {
        self.min_duration_secs as u64 * 1000
    }

    /// Check the configuration contract
    pub fn validate(&self) -> Result<()> {
        if self.min_duration_secs == 0 {
            return Err(QualityError::Config(
                "min_duration_secs must be a positive number of seconds".into(),
            ));
        }
        if self.max_duration_secs < self.min_duration_secs {
            return Err(QualityError::Config(format!(
                "max_duration_secs ({}) must not be less than min_duration_secs ({})",
                self.max_duration_secs, self.min_duration_secs
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(QualityError::Config("poll_interval_ms must be positive".into()));
        }
        Ok(())
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load and validate a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Score source to use with the given browser, or `None` when no test
    /// call should be offered
    pub fn effective_score_source(&self, browser: &str, os: &str) -> Option<ScoreSource> {
        match self.score_source {
            ScoreSource::Sbc => Some(ScoreSource::Sbc),
            ScoreSource::Browser if browser_test_supported(browser, os) => Some(ScoreSource::Browser),
            ScoreSource::Browser => None,
        }
    }
}

/// Whether the browser reports `remote-inbound-rtp`, which the browser test needs
///
/// Safari and every iOS browser leave it out of `getStats()`.
pub fn browser_test_supported(browser: &str, os: &str) -> bool {
    !browser.eq_ignore_ascii_case("safari") && !os.eq_ignore_ascii_case("ios")
}
