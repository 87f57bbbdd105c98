//! Fetch command implementation.

use crate::cli::output::format_bytes;
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::ScribeError;
use crate::orchestrator::{Orchestrator, RunOutcome};
use anyhow::Result;

/// Run the fetch command and return the process exit code.
pub async fn run_fetch(url: &str, settings: Settings) -> Result<u8> {
    let api_key = preflight::check(&settings).inspect_err(|e| {
        Output::error(&e.to_string());
        Output::info("Run with -v for details on which config file was loaded.");
    })?;

    let orchestrator =
        Orchestrator::new(&settings, &api_key).inspect_err(|e| Output::error(&e.to_string()))?;

    Output::info(&format!("Processing: {}", url));
    let spinner = Output::spinner("Fetching title and transcript...");
    let result = orchestrator.run(url).await;
    spinner.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            report_failure(&e);
            return Err(e.into());
        }
    };

    if let Some(title) = &report.title {
        Output::kv("Title", title);
    } else {
        Output::warning("Could not retrieve video title");
    }
    Output::kv("Video", report.video_id.as_str());

    match report.outcome {
        RunOutcome::Saved {
            path,
            segments,
            bytes,
        } => {
            Output::success(&format!(
                "Transcript saved to {} ({} cues, {})",
                path.display(),
                segments,
                format_bytes(bytes)
            ));
            Ok(0)
        }
        RunOutcome::NoTranscript { failure, sentinel } => {
            Output::error(&format!("Could not retrieve video transcript: {}", failure));
            Output::info(&format!("Created {}", sentinel.display()));
            Ok(ScribeError::TranscriptUnavailable(failure).exit_code())
        }
    }
}

fn report_failure(e: &ScribeError) {
    Output::error(&e.to_string());
    match e {
        ScribeError::InvalidInput(_) => {
            Output::info("Expected a youtube.com/watch?v=..., youtu.be/... or /embed/... URL.");
        }
        ScribeError::MetadataUnavailable(_) => {
            Output::info("Use --allow-missing-title to save the transcript under the video ID.");
        }
        _ => {}
    }
}
