//! Configuration types for vcr-handler

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Result, VcrError};

/// Default redirect limit for stacks built by [`crate::turn_on`]
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Upper bound accepted for `max_redirects`
pub const MAX_REDIRECTS_LIMIT: usize = 50;

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Record mode: forward to the real transport and persist responses
    Record,
    /// Replay mode: serve responses from the cassette
    Replay,
}

impl Mode {
    /// Pick the mode for a cassette path: replay if the file exists,
    /// record otherwise
    #[must_use]
    pub fn for_cassette(path: &Path) -> Self {
        if path.exists() {
            Mode::Replay
        } else {
            Mode::Record
        }
    }

    /// Check if mode is Record
    #[must_use]
    pub fn is_record(&self) -> bool {
        matches!(self, Mode::Record)
    }

    /// Check if mode is Replay
    #[must_use]
    pub fn is_replay(&self) -> bool {
        matches!(self, Mode::Replay)
    }
}

/// Cassette encoding configuration
///
/// Passed explicitly to [`crate::turn_on`] and threaded into every body
/// encode/decode. The same value must be used at record and replay time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcrConfig {
    /// Only base64-encode bodies that look binary; store the rest as text
    pub only_encode_binary: bool,
    /// Redirect limit for the `follow_redirects` stage
    pub max_redirects: usize,
}

impl Default for VcrConfig {
    fn default() -> Self {
        Self {
            only_encode_binary: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl VcrConfig {
    /// Config that stores non-binary bodies as plain text
    #[must_use]
    pub fn only_encode_binary() -> Self {
        Self {
            only_encode_binary: true,
            ..Self::default()
        }
    }

    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, parsed or validated
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VcrError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| VcrError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if self.max_redirects > MAX_REDIRECTS_LIMIT {
            return Err(VcrError::ConfigError(format!(
                "max_redirects {} exceeds limit of {MAX_REDIRECTS_LIMIT}",
                self.max_redirects
            )));
        }

        Ok(())
    }
}
