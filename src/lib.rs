//! tubescript - YouTube transcript extractor
//!
//! A small CLI tool that saves the captions of a YouTube video to a text
//! file named after the video's title.
//!
//! # Architecture
//!
//! - `youtube` - Video ID resolution, title lookup and caption retrieval
//! - `transcript` - Transcript model and export formats
//! - `filename` - Title to filename sanitization
//! - `orchestrator` - Runs the pipeline and writes the output
//! - `config` - Configuration management
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use tubescript::config::Settings;
//! use tubescript::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let api_key = settings.api_key().unwrap_or_default();
//!     let orchestrator = Orchestrator::new(&settings, &api_key)?;
//!
//!     let report = orchestrator.run("https://youtu.be/dQw4w9WgXcQ").await?;
//!     println!("{:?}", report.outcome);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod filename;
pub mod orchestrator;
pub mod transcript;
pub mod youtube;

pub use error::{Result, ScribeError};
