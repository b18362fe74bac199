//! Error types for Kino Quality

use thiserror::Error;

/// Result type alias for quality and playback operations
pub type Result<T> = std::result::Result<T, Error>;

/// Library error types
///
/// Media engine failures are not represented here: they are reported by the
/// element as a [`MediaErrorCode`] and leave the normalizer as a localized
/// message on [`crate::PlayerEvent::Error`].
#[derive(Error, Debug)]
pub enum Error {
    // Persistence errors
    #[error("Preference storage failed: {0}")]
    Storage(String),

    #[error("Malformed stored entry: {0}")]
    MalformedEntry(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Playback errors
    #[error("Playback refused: {0}")]
    PlaybackRefused(String),

    #[error("Media engine rejected playback: {0}")]
    PlayRejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }

    /// Returns the error code for log fields
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Storage(_) => "STORAGE",
            Error::MalformedEntry(_) => "MALFORMED_ENTRY",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Serialization(_) => "SERIALIZATION",
            Error::PlaybackRefused(_) => "PLAYBACK_REFUSED",
            Error::PlayRejected(_) => "PLAY_REJECTED",
            Error::Io(_) => "IO",
        }
    }
}

/// Native error codes reported by a media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MediaErrorCode {
    Aborted = 1,
    Network = 2,
    Decode = 3,
    SrcNotSupported = 4,
    Encrypted = 5,
}

impl MediaErrorCode {
    /// Map a host's numeric `MediaError.code` to a known code.
    ///
    /// Used when a raw error event carries a number instead of a name.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(MediaErrorCode::Aborted),
            2 => Some(MediaErrorCode::Network),
            3 => Some(MediaErrorCode::Decode),
            4 => Some(MediaErrorCode::SrcNotSupported),
            5 => Some(MediaErrorCode::Encrypted),
            _ => None,
        }
    }
}

/// Normalized media error taxonomy. Every kind is terminal for the current
/// load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MediaErrorKind {
    Aborted,
    NetworkFailure,
    DecodeFailure,
    SourceNotSupported,
    MediaEncrypted,
    Unknown,
}

impl From<Option<MediaErrorCode>> for MediaErrorKind {
    fn from(code: Option<MediaErrorCode>) -> Self {
        match code {
            Some(MediaErrorCode::Aborted) => MediaErrorKind::Aborted,
            Some(MediaErrorCode::Network) => MediaErrorKind::NetworkFailure,
            Some(MediaErrorCode::Decode) => MediaErrorKind::DecodeFailure,
            Some(MediaErrorCode::SrcNotSupported) => MediaErrorKind::SourceNotSupported,
            Some(MediaErrorCode::Encrypted) => MediaErrorKind::MediaEncrypted,
            None => MediaErrorKind::Unknown,
        }
    }
}

impl std::fmt::Display for MediaErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaErrorKind::Aborted => write!(f, "aborted"),
            MediaErrorKind::NetworkFailure => write!(f, "network-failure"),
            MediaErrorKind::DecodeFailure => write!(f, "decode-failure"),
            MediaErrorKind::SourceNotSupported => write!(f, "source-not-supported"),
            MediaErrorKind::MediaEncrypted => write!(f, "media-encrypted"),
            MediaErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_codes_map_to_taxonomy() {
        assert_eq!(
            MediaErrorKind::from(MediaErrorCode::from_code(2)),
            MediaErrorKind::NetworkFailure
        );
        assert_eq!(
            MediaErrorKind::from(MediaErrorCode::from_code(5)),
            MediaErrorKind::MediaEncrypted
        );
        assert_eq!(MediaErrorKind::from(MediaErrorCode::from_code(42)), MediaErrorKind::Unknown);
        assert_eq!(MediaErrorKind::from(None), MediaErrorKind::Unknown);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::storage("disk full").error_code(), "STORAGE");
        assert_eq!(
            Error::PlaybackRefused("error displayed".into()).error_code(),
            "PLAYBACK_REFUSED"
        );
    }
}
