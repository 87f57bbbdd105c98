//! Data models for transcripts.

use serde::{Deserialize, Serialize};

/// A complete caption track for one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Video ID this transcript belongs to.
    pub video_id: String,
    /// Language code of the caption track (e.g. "en").
    pub language_code: String,
    /// Whether the track was generated by speech recognition.
    pub is_generated: bool,
    /// Caption cues in playback order.
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Create a new transcript from segments.
    pub fn new(
        video_id: impl Into<String>,
        language_code: impl Into<String>,
        is_generated: bool,
        segments: Vec<TranscriptSegment>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            language_code: language_code.into(),
            is_generated,
            segments,
        }
    }

    /// Cue texts in order, one per line, without timestamps.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// End of the last cue in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.end_seconds())
            .fold(0.0f64, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A single timed caption cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// How long the cue is shown, in seconds.
    pub duration_seconds: f64,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(text: impl Into<String>, start_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            text: text.into(),
            start_seconds,
            duration_seconds,
        }
    }

    /// End time in seconds.
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }
}
