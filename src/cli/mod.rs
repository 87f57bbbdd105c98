//! CLI module for tubescript.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::{MissingTranscriptPolicy, Settings, TitlePolicy, API_KEY_ENV};
use crate::filename::SanitizerKind;
use crate::transcript::OutputFormat;
use clap::Parser;

/// tubescript - YouTube Video Transcript Extractor
///
/// Resolves the video ID from a YouTube URL, looks up the video title and
/// saves the video's captions to a file named after the title.
#[derive(Parser, Debug)]
#[command(name = "tubescript")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// YouTube video URL
    pub url: String,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// YouTube Data API key (overrides the config file)
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory to write the transcript to
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Filename strategy (slugify, strip-reserved)
    #[arg(long)]
    pub sanitizer: Option<SanitizerKind>,

    /// Output format (text, json, srt, vtt)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Preferred caption language; repeat to give a fallback order
    #[arg(short, long = "language")]
    pub languages: Vec<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Save the transcript even when the title cannot be retrieved
    #[arg(long)]
    pub allow_missing_title: bool,

    /// Write a .no_transcript marker file when no transcript is available
    #[arg(long)]
    pub sentinel: bool,
}

impl Cli {
    /// Overlay command-line flags on top of file settings.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(key) = &self.api_key {
            settings.youtube.api_key = Some(key.clone());
        }
        if let Some(dir) = &self.output_dir {
            settings.output.dir = dir.clone();
        }
        if let Some(sanitizer) = self.sanitizer {
            settings.output.sanitizer = sanitizer;
        }
        if let Some(format) = self.format {
            settings.output.format = format;
        }
        if !self.languages.is_empty() {
            settings.youtube.languages = self.languages.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.youtube.timeout_secs = timeout;
        }
        if self.allow_missing_title {
            settings.output.title_policy = TitlePolicy::Optional;
        }
        if self.sentinel {
            settings.output.on_missing_transcript = MissingTranscriptPolicy::Sentinel;
        }
    }
}
