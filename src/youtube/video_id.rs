//! Video ID resolution from YouTube URLs.

use regex::Regex;
use std::sync::LazyLock;

/// Characters allowed in a video ID.
const ID_CHARS: &str = "[0-9A-Za-z_-]";

/// Length of every YouTube video ID.
pub const VIDEO_ID_LEN: usize = 11;

/// Path words of ID length that never name a video (`/embed/videoseries?list=`).
const NOT_VIDEO_IDS: &[&str] = &["videoseries"];

/// Patterns tried in order; the first match wins.
///
/// Specific shapes come before the generic trailing path segment so that
/// e.g. `/embed/<id>` never resolves to a different segment of the URL.
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // watch?v=<id>, also when v is not the first query parameter
        format!(r"[?&]v=({ID_CHARS}{{11}})"),
        // /embed/<id>, /v/<id>, /shorts/<id>, /live/<id>, youtu.be/<id>
        format!(r"(?:/(?:embed|v|shorts|live)/|youtu\.be/)({ID_CHARS}{{11}})(?:[?#&/]|$)"),
        // any path segment that is exactly 11 ID characters
        format!(r"/({ID_CHARS}{{11}})(?:[?#&/]|$)"),
        // bare video ID
        format!(r"^({ID_CHARS}{{11}})$"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("video ID pattern is valid"))
    .collect()
});

/// An 11-character YouTube video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Accept a string only if it is exactly a well-formed video ID.
    pub fn parse(id: &str) -> Option<Self> {
        let valid = id.len() == VIDEO_ID_LEN
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        valid.then(|| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts video IDs from the URL shapes YouTube hands out.
#[derive(Debug, Clone, Copy, Default)]
pub struct VideoIdResolver;

impl VideoIdResolver {
    pub fn new() -> Self {
        Self
    }

    /// Extract the video ID from a URL (or bare ID), if any pattern matches.
    pub fn resolve(&self, input: &str) -> Option<VideoId> {
        let input = input.trim();
        PATTERNS
            .iter()
            .filter_map(|re| re.captures(input))
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|candidate| !NOT_VIDEO_IDS.contains(candidate))
            .and_then(VideoId::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    fn resolve(url: &str) -> Option<String> {
        VideoIdResolver::new().resolve(url).map(|id| id.to_string())
    }

    #[test]
    fn test_supported_shapes() {
        let urls = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=30s",
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ#comments",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abcdef",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ?version=3",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ?feature=share",
            "https://www.youtube-nocookie.com/dQw4w9WgXcQ",
            "youtube.com/watch?v=dQw4w9WgXcQ",
            "  https://youtu.be/dQw4w9WgXcQ  ",
            "dQw4w9WgXcQ",
        ];

        for url in urls {
            assert_eq!(resolve(url).as_deref(), Some(ID), "failed for {}", url);
        }
    }

    #[test]
    fn test_trailing_params_are_not_part_of_the_id() {
        assert_eq!(
            resolve("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123&index=2").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_query_param_wins_over_path_segment() {
        assert_eq!(
            resolve("https://www.youtube.com/abcdefghijk?v=dQw4w9WgXcQ").as_deref(),
            Some(ID)
        );
    }

    #[test]
    fn test_unrecognized_urls() {
        assert_eq!(resolve("https://example.com/video"), None);
        assert_eq!(resolve("https://www.youtube.com/channel/UCuAXFkgsw1L7xaCfnd5JJOw"), None);
        assert_eq!(resolve("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(resolve("not-a-video-id"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn test_playlist_embed_is_not_a_video() {
        assert_eq!(
            resolve("https://www.youtube.com/embed/videoseries?list=PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG"),
            None
        );
        assert_eq!(resolve("https://www.youtube.com/embed/dQw4w9WgXcQxyz"), None);
    }

    #[test]
    fn test_video_id_parse() {
        assert!(VideoId::parse(ID).is_some());
        assert!(VideoId::parse("dQw4w9WgXc").is_none());
        assert!(VideoId::parse("dQw4w9WgXc!").is_none());
        assert_eq!(VideoId::parse(ID).unwrap().as_str(), ID);
    }
}
