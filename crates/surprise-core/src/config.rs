#![forbid(unsafe_code)]

//! Director configuration.
//!
//! [`RevealConfig::default`] reproduces the stock behaviour. With the
//! `config` feature the same struct loads from TOML; every field is optional
//! and falls back to its default. A hold threshold shorter than the reveal
//! run is rejected at load time.
//!
//! ```toml
//! hold_threshold_ms = 4000
//! trigger = "enter"
//! replacement_text = "Happy birthday!"
//! required = ["cats-left", "cats-right", "heading-wow"]
//! ```

#[cfg(feature = "config")]
use std::path::Path;
use std::time::Duration;

use crate::hold::DEFAULT_HOLD_THRESHOLD;
use crate::input::Key;
use crate::node::NodeId;

/// Text the heading switches to when a hold completes.
pub const DEFAULT_REPLACEMENT_TEXT: &str = "Make a wish!";

/// Tunables for a [`RevealDirector`](crate::director::RevealDirector).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RevealConfig {
    /// Press length that completes a hold. Never shorter than
    /// [`reveal_duration`](crate::script::reveal_duration).
    #[cfg_attr(
        feature = "config",
        serde(rename = "hold_threshold_ms", with = "duration_ms")
    )]
    pub hold_threshold: Duration,
    /// Key whose press drives the hold.
    pub trigger: Key,
    pub replacement_text: String,
    /// Nodes that must all exist before the reveal starts. Empty disables
    /// the reveal.
    pub required: Vec<NodeId>,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            hold_threshold: DEFAULT_HOLD_THRESHOLD,
            trigger: Key::Space,
            replacement_text: DEFAULT_REPLACEMENT_TEXT.to_string(),
            required: NodeId::ALL.to_vec(),
        }
    }
}

#[cfg(feature = "config")]
impl RevealConfig {
    /// Parse from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints the parser cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let minimum = crate::script::reveal_duration();
        if self.hold_threshold < minimum {
            return Err(ConfigError::HoldThresholdTooShort {
                threshold_ms: u64::try_from(self.hold_threshold.as_millis()).unwrap_or(u64::MAX),
                minimum_ms: u64::try_from(minimum.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }

    /// Load from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::TomlSer)
    }
}

/// Errors from loading a [`RevealConfig`].
#[cfg(feature = "config")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[source] std::io::Error),
    #[error("config TOML parse error: {0}")]
    Toml(#[source] toml::de::Error),
    #[error("config TOML serialize error: {0}")]
    TomlSer(#[source] toml::ser::Error),
    #[error("hold_threshold_ms = {threshold_ms} is shorter than the {minimum_ms} ms reveal")]
    HoldThresholdTooShort { threshold_ms: u64, minimum_ms: u64 },
}

#[cfg(feature = "config")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
