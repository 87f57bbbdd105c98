//! Transcript output formatting (plain text, JSON, SRT, VTT).

use super::Transcript;
use serde::{Deserialize, Serialize};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Cue texts only, one per line.
    #[default]
    Text,
    Json,
    Srt,
    Vtt,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use text, json, srt, or vtt.", s)),
        }
    }
}

/// JSON-serializable transcript for export.
#[derive(Debug, Serialize)]
pub struct TranscriptExport<'a> {
    pub video_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    pub language_code: &'a str,
    pub is_generated: bool,
    pub duration_seconds: f64,
    pub segments: Vec<SegmentExport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SegmentExport<'a> {
    pub text: &'a str,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

/// Format a transcript for output. The title is only used by JSON.
pub fn format_transcript(
    transcript: &Transcript,
    title: Option<&str>,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => transcript.plain_text(),
        OutputFormat::Json => format_json(transcript, title),
        OutputFormat::Srt => format_srt(transcript),
        OutputFormat::Vtt => format_vtt(transcript),
    }
}

fn format_json(transcript: &Transcript, title: Option<&str>) -> String {
    let export = TranscriptExport {
        video_id: &transcript.video_id,
        title,
        language_code: &transcript.language_code,
        is_generated: transcript.is_generated,
        duration_seconds: transcript.duration_seconds(),
        segments: transcript
            .segments
            .iter()
            .map(|s| SegmentExport {
                text: &s.text,
                start_seconds: s.start_seconds,
                end_seconds: s.end_seconds(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

/// Format as SRT (SubRip).
fn format_srt(transcript: &Transcript) -> String {
    let mut output = String::new();

    for (i, segment) in transcript.segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_timestamp(segment.start_seconds),
            format_srt_timestamp(segment.end_seconds())
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// Format as WebVTT.
fn format_vtt(transcript: &Transcript) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for (i, segment) in transcript.segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_timestamp(segment.start_seconds),
            format_vtt_timestamp(segment.end_seconds())
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// Format timestamp for SRT (00:00:00,000).
fn format_srt_timestamp(seconds: f64) -> String {
    let (hours, minutes, secs, ms) = split_timestamp(seconds);
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, ms)
}

/// Format timestamp for VTT (00:00:00.000).
fn format_vtt_timestamp(seconds: f64) -> String {
    let (hours, minutes, secs, ms) = split_timestamp(seconds);
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, ms)
}

fn split_timestamp(seconds: f64) -> (u64, u64, u64, u64) {
    let total_ms = (seconds * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}
