//! Error types for tubescript.

use std::path::PathBuf;
use thiserror::Error;

/// Library-level error type for tubescript operations.
#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidInput(String),

    #[error("Could not retrieve video title: {0}")]
    MetadataUnavailable(MetadataFailure),

    #[error("Could not retrieve video transcript: {0}")]
    TranscriptUnavailable(TranscriptFailure),

    #[error("Error saving transcript to {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ScribeError {
    /// Process exit code for this class of failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            ScribeError::InvalidInput(_) => 2,
            ScribeError::MetadataUnavailable(_) => 3,
            ScribeError::TranscriptUnavailable(_) => 4,
            ScribeError::Persistence { .. } => 5,
            ScribeError::Config(_) | ScribeError::TomlParse(_) => 6,
        }
    }
}

/// Why the video title could not be resolved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetadataFailure {
    /// The listing returned no items (deleted, private or unknown video).
    #[error("no video found with ID {0}")]
    NotFound(String),

    #[error("request failed: {0}")]
    Request(String),

    /// The API answered with an error (bad key, quota, forbidden).
    #[error("API returned {status}{}: {message}", reason_suffix(.reason))]
    Api {
        status: u16,
        reason: Option<String>,
        message: String,
    },

    #[error("unexpected response: {0}")]
    Decode(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default()
}

/// Why the transcript could not be retrieved.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranscriptFailure {
    #[error("subtitles are disabled for video {0}")]
    Disabled(String),

    #[error("no transcript found for video {video_id} (available: {})", .available.join(", "))]
    NoTranscript {
        video_id: String,
        available: Vec<String>,
    },

    #[error("video {0} is unavailable")]
    VideoUnavailable(String),

    #[error("video {0} is age restricted")]
    AgeRestricted(String),

    /// Covers region locks and other playback refusals.
    #[error("video {video_id} is unplayable: {reason}")]
    Unplayable { video_id: String, reason: String },

    #[error("YouTube is blocking requests for video {0}")]
    RequestBlocked(String),

    #[error("captions for video {0} require a PO token")]
    PoTokenRequired(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("could not parse YouTube response: {0}")]
    Parse(String),
}

/// Result type alias for tubescript operations.
pub type Result<T> = std::result::Result<T, ScribeError>;
