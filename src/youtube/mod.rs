//! YouTube collaborators: video ID resolution, title lookup and captions.
//!
//! The metadata and transcript clients sit behind traits so the orchestrator
//! can be driven by fakes in tests.

mod captions;
pub mod http;
mod metadata;
mod timedtext;
mod video_id;

pub use captions::{select_track, CaptionClient, CaptionTrack, TranscriptService};
pub use metadata::{MetadataService, YoutubeDataApi};
pub use timedtext::parse_timedtext;
pub use video_id::{VideoId, VideoIdResolver, VIDEO_ID_LEN};
