//! TOML-based configuration for announce ingestion.

use std::path::Path;

use serde::Deserialize;

use crate::aspect::Aspect;
use crate::error::AnnounceError;

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnounceConfig {
    #[serde(default)]
    pub announce: AnnounceSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl AnnounceConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, AnnounceError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self, AnnounceError> {
        toml::from_str(s).map_err(|e| AnnounceError::Config(format!("failed to parse config: {e}")))
    }
}

/// The `[announce]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnounceSection {
    /// Aspects to register handlers for.
    #[serde(default = "default_aspects")]
    pub aspects: Vec<Aspect>,
    /// Capacity of the notification channel handed to the outer layer.
    #[serde(default = "default_notify_channel_capacity")]
    pub notify_channel_capacity: usize,
}

impl AnnounceSection {
    /// Configured aspects with duplicates removed, first occurrence wins.
    #[must_use]
    pub fn unique_aspects(&self) -> Vec<Aspect> {
        let mut seen = Vec::with_capacity(self.aspects.len());
        for aspect in &self.aspects {
            if !seen.contains(aspect) {
                seen.push(*aspect);
            }
        }
        seen
    }
}

fn default_aspects() -> Vec<Aspect> {
    Aspect::ALL.to_vec()
}

fn default_notify_channel_capacity() -> usize {
    256
}

impl Default for AnnounceSection {
    fn default() -> Self {
        Self {
            aspects: default_aspects(),
            notify_channel_capacity: default_notify_channel_capacity(),
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
