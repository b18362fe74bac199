//! Player configuration: options bag, localization strings and injected
//! platform capabilities

use crate::{
    error::MediaErrorKind,
    types::{ContainerFormat, SourceDescriptor, TrackDescriptor},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options recognized by the player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerOptions {
    /// Show native controls
    pub controls: bool,
    pub autoplay: bool,
    #[serde(rename = "loop")]
    pub loop_playback: bool,
    /// Stretch the element to its container
    pub fit: bool,
    /// Poster image path
    pub poster: Option<String>,
    /// Offset applied on the first transition into playing (seconds)
    #[serde(rename = "startAt")]
    pub start_at: Option<f64>,
    pub tracks: Vec<TrackDescriptor>,
}

/// Localized error messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Localization {
    pub aborted: String,
    pub network_failure: String,
    pub cannot_decode: String,
    pub format_not_supported: String,
    pub media_encrypted: String,
    pub unknown_error: String,
}

impl Default for Localization {
    fn default() -> Self {
        Self {
            aborted: "Media playback has been aborted.".to_string(),
            network_failure: "Network failure.".to_string(),
            cannot_decode: "Unable to decode media.".to_string(),
            format_not_supported: "Video format not supported.".to_string(),
            media_encrypted: "Media encrypted.".to_string(),
            unknown_error: "Unknown error.".to_string(),
        }
    }
}

impl Localization {
    /// Message for a media error kind. Empty strings fall back to the
    /// unknown-error message.
    pub fn message(&self, kind: MediaErrorKind) -> &str {
        let message = match kind {
            MediaErrorKind::Aborted => &self.aborted,
            MediaErrorKind::NetworkFailure => &self.network_failure,
            MediaErrorKind::DecodeFailure => &self.cannot_decode,
            MediaErrorKind::SourceNotSupported => &self.format_not_supported,
            MediaErrorKind::MediaEncrypted => &self.media_encrypted,
            MediaErrorKind::Unknown => &self.unknown_error,
        };
        if message.is_empty() {
            &self.unknown_error
        } else {
            message
        }
    }
}

/// Platform capabilities decided once by the embedding environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Capabilities {
    /// Defer `loaded` and resume seeks until the next duration change.
    /// Needed on legacy Android stock browsers.
    pub needs_deferred_loaded_workaround: bool,
    /// Container kept as representative when a quality has several sources
    pub preferred_format: ContainerFormat,
}

/// Everything needed to construct a controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub sources: Vec<SourceDescriptor>,
    pub options: PlayerOptions,
    pub l10n: Localization,
    pub capabilities: Capabilities,
}

impl PlayerConfig {
    /// Load a JSON config file; absent keys take their defaults
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: PlayerConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(start_at) = self.options.start_at {
            if !start_at.is_finite() || start_at < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "startAt must be a non-negative number, got {}",
                    start_at
                )));
            }
        }
        Ok(())
    }
}
