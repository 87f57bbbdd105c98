//! Pipeline orchestrator for tubescript.
//!
//! Coordinates one run: resolve the video ID, look up the title, fetch the
//! transcript and write it to disk.

use crate::config::{MissingTranscriptPolicy, OutputSettings, Settings, TitlePolicy};
use crate::error::{MetadataFailure, Result, ScribeError, TranscriptFailure};
use crate::filename::FilenameSanitizer;
use crate::transcript::{format_transcript, Transcript};
use crate::youtube::http::create_client_with_timeout;
use crate::youtube::{
    CaptionClient, MetadataService, TranscriptService, VideoId, VideoIdResolver, YoutubeDataApi,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Marker written when no transcript could be retrieved.
pub const SENTINEL_FILE: &str = ".no_transcript";

/// The main orchestrator for the tubescript pipeline.
pub struct Orchestrator {
    resolver: VideoIdResolver,
    metadata: Arc<dyn MetadataService>,
    transcripts: Arc<dyn TranscriptService>,
    sanitizer: Box<dyn FilenameSanitizer>,
    output: OutputSettings,
}

impl Orchestrator {
    /// Create an orchestrator talking to YouTube with the given API key.
    pub fn new(settings: &Settings, api_key: &str) -> Result<Self> {
        let client =
            create_client_with_timeout(Duration::from_secs(settings.youtube.timeout_secs))?;

        let metadata = Arc::new(YoutubeDataApi::new(
            client.clone(),
            &settings.youtube.api_base_url,
            api_key,
        )?);
        let transcripts = Arc::new(CaptionClient::new(
            client,
            &settings.youtube.site_base_url,
            settings.youtube.languages.clone(),
        )?);

        info!(
            "Using {} sanitizer, {:?} output in {}",
            settings.output.sanitizer, settings.output.format, settings.output.dir
        );

        Ok(Self::with_components(
            metadata,
            transcripts,
            settings.output.sanitizer.build(),
            settings.output.clone(),
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        metadata: Arc<dyn MetadataService>,
        transcripts: Arc<dyn TranscriptService>,
        sanitizer: Box<dyn FilenameSanitizer>,
        output: OutputSettings,
    ) -> Self {
        Self {
            resolver: VideoIdResolver::new(),
            metadata,
            transcripts,
            sanitizer,
            output,
        }
    }

    /// Fetch the transcript for `url` and save it.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn run(&self, url: &str) -> Result<RunReport> {
        let video_id = self
            .resolver
            .resolve(url)
            .ok_or_else(|| ScribeError::InvalidInput(url.to_string()))?;
        info!("Resolved video ID {}", video_id);

        let title = self.resolve_title(&video_id).await?;

        let transcript = match self.fetch_transcript(&video_id).await {
            Ok(transcript) => transcript,
            Err(ScribeError::TranscriptUnavailable(failure))
                if self.output.on_missing_transcript == MissingTranscriptPolicy::Sentinel =>
            {
                warn!("No transcript: {}", failure);
                let sentinel = self.write_sentinel(url)?;
                return Ok(RunReport {
                    video_id,
                    title,
                    outcome: RunOutcome::NoTranscript { failure, sentinel },
                });
            }
            Err(e) => return Err(e),
        };

        let stem = match &title {
            Some(title) => self.sanitizer.sanitize(title),
            None => video_id.to_string(),
        };
        let path = self
            .output_dir()
            .join(format!("{}.{}", stem, self.output.format.extension()));

        let content = format_transcript(&transcript, title.as_deref(), self.output.format);
        self.write_file(&path, &content)?;
        info!("Transcript saved to {}", path.display());

        Ok(RunReport {
            video_id,
            title,
            outcome: RunOutcome::Saved {
                path,
                segments: transcript.segments.len(),
                bytes: content.len(),
            },
        })
    }

    /// Look up the title and apply the title policy.
    async fn resolve_title(&self, video_id: &VideoId) -> Result<Option<String>> {
        let failure = match self.metadata.fetch_title(video_id).await {
            Ok(Some(title)) => {
                info!("Title: {}", title);
                return Ok(Some(title));
            }
            Ok(None) => MetadataFailure::NotFound(video_id.to_string()),
            Err(ScribeError::MetadataUnavailable(failure)) => failure,
            Err(e) => return Err(e),
        };

        match self.output.title_policy {
            TitlePolicy::Required => Err(ScribeError::MetadataUnavailable(failure)),
            TitlePolicy::Optional => {
                warn!(
                    "Could not retrieve video title ({}); naming the file after {}",
                    failure, video_id
                );
                Ok(None)
            }
        }
    }

    /// Fetch the transcript, treating an empty caption track as missing.
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript> {
        let transcript = self.transcripts.fetch_transcript(video_id).await?;
        if transcript.is_empty() {
            return Err(ScribeError::TranscriptUnavailable(
                TranscriptFailure::NoTranscript {
                    video_id: video_id.to_string(),
                    available: vec![transcript.language_code],
                },
            ));
        }
        info!(
            "Transcript: {} cues ({})",
            transcript.segments.len(),
            transcript.language_code
        );
        Ok(transcript)
    }

    fn output_dir(&self) -> PathBuf {
        self.output.dir_path()
    }

    /// Record the URL in the `.no_transcript` marker file.
    fn write_sentinel(&self, url: &str) -> Result<PathBuf> {
        let path = self.output_dir().join(SENTINEL_FILE);
        self.write_file(&path, &format!("No transcript available for video: {}", url))?;
        Ok(path)
    }

    /// Write `content` as UTF-8, creating the parent directory if needed.
    ///
    /// A failed write may leave a truncated file behind.
    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        let persistence = |source| ScribeError::Persistence {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(persistence)?;
        }
        std::fs::write(path, content).map_err(persistence)
    }
}

/// Result of one run.
#[derive(Debug)]
pub struct RunReport {
    pub video_id: VideoId,
    /// Title, if it was resolved.
    pub title: Option<String>,
    pub outcome: RunOutcome,
}

/// How a run ended when it did not fail outright.
#[derive(Debug)]
pub enum RunOutcome {
    /// The transcript was written to `path`.
    Saved {
        path: PathBuf,
        segments: usize,
        bytes: usize,
    },
    /// No transcript was available; a marker file was written instead.
    NoTranscript {
        failure: TranscriptFailure,
        sentinel: PathBuf,
    },
}
