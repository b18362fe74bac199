//! Core types for Kino Quality

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Playback rates offered to the UI
pub const PLAYBACK_RATES: [f64; 6] = [0.25, 0.5, 1.0, 1.25, 1.5, 2.0];

/// Unique identifier for a controller instance, used in log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named quality bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualityTag {
    /// Stable identifier, e.g. `q1`
    pub name: String,
    /// Human-readable label
    pub label: String,
}

impl QualityTag {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }

    /// Tag minted for untagged sources: `q<N>` / `Quality <N>`
    pub fn numbered(index: usize) -> Self {
        Self::new(format!("q{}", index), format!("Quality {}", index))
    }
}

/// A candidate media source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Media URL or path
    pub path: String,
    /// Declared MIME type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    /// Declared codecs string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codecs: Option<String>,
    /// Quality tag, assigned by classification when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<QualityTag>,
    /// Resolved type string, stamped by classification
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
}

impl SourceDescriptor {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime: None,
            codecs: None,
            quality: None,
            source_type: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    pub fn with_codecs(mut self, codecs: impl Into<String>) -> Self {
        self.codecs = Some(codecs.into());
        self
    }

    pub fn with_quality(mut self, quality: QualityTag) -> Self {
        self.quality = Some(quality);
        self
    }
}

/// Declared text track (captions, subtitles, descriptions)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    /// Track kind, e.g. `captions`
    #[serde(default)]
    pub kind: String,
    /// Track file path
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, rename = "srcLang", skip_serializing_if = "Option::is_none")]
    pub src_lang: Option<String>,
}

impl TrackDescriptor {
    /// A track needs both a kind and a path to be attached
    pub fn is_valid(&self) -> bool {
        !self.kind.is_empty() && !self.path.is_empty()
    }
}

/// Track as attached to the media element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTrack {
    pub kind: String,
    pub src: String,
    pub label: Option<String>,
    pub src_lang: Option<String>,
    pub default: bool,
}

/// Normalized playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No state has been observed yet
    #[default]
    Unstarted,
    Buffering,
    Playing,
    Paused,
    Ended,
    Error,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Unstarted => write!(f, "unstarted"),
            PlaybackState::Buffering => write!(f, "buffering"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Ended => write!(f, "ended"),
            PlaybackState::Error => write!(f, "error"),
        }
    }
}

/// Answer of a media engine capability query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanPlay {
    #[default]
    Empty,
    Maybe,
    Probably,
}

impl CanPlay {
    pub fn is_playable(self) -> bool {
        self != CanPlay::Empty
    }
}

impl From<&str> for CanPlay {
    fn from(s: &str) -> Self {
        match s {
            "probably" => CanPlay::Probably,
            "maybe" => CanPlay::Maybe,
            _ => CanPlay::Empty,
        }
    }
}

/// Container format preferred when several sources share a quality
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    #[default]
    Mp4,
    Webm,
    Other(String),
}

impl ContainerFormat {
    /// Default preference for a platform. Chrome-class engines outside
    /// Android have trouble with some mp4 codecs and prefer webm.
    pub fn for_platform(is_android: bool, is_chrome_class: bool) -> Self {
        if !is_android && is_chrome_class {
            ContainerFormat::Webm
        } else {
            ContainerFormat::Mp4
        }
    }

    /// MIME subtype this format matches
    pub fn subtype(&self) -> &str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Webm => "webm",
            ContainerFormat::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.subtype())
    }
}

/// Buffered time ranges reported by a media element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeRanges {
    ranges: Vec<(f64, f64)>,
}

impl TimeRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, start: f64, end: f64) {
        self.ranges.push((start, end));
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn start(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(s, _)| *s)
    }

    pub fn end(&self, index: usize) -> Option<f64> {
        self.ranges.get(index).map(|(_, e)| *e)
    }

    /// End of the first range strictly containing `position`
    pub fn end_containing(&self, position: f64) -> Option<f64> {
        self.ranges
            .iter()
            .find(|(start, end)| position > *start && position < *end)
            .map(|(_, end)| *end)
    }
}

impl FromIterator<(f64, f64)> for TimeRanges {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}
