//! Transcript model and export formats.

mod format;
mod models;

pub use format::{format_transcript, OutputFormat, SegmentExport, TranscriptExport};
pub use models::{Transcript, TranscriptSegment};
