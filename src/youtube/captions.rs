//! Caption retrieval through the YouTube web player.
//!
//! The flow mirrors what the watch page does:
//!
//! 1. load the watch page and read the `INNERTUBE_API_KEY`
//! 2. ask the player endpoint for the video's caption tracks
//! 3. pick a track and download its timedtext XML

use super::http::parse_base_url;
use super::timedtext::{is_timedtext, parse_timedtext};
use super::VideoId;
use crate::error::{Result, ScribeError, TranscriptFailure};
use crate::transcript::Transcript;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};

static INNERTUBE_API_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid innertube key regex")
});

/// Client identity sent to the player endpoint.
const PLAYER_CLIENT_NAME: &str = "ANDROID";
const PLAYER_CLIENT_VERSION: &str = "20.10.38";

/// Retrieves a video's transcript.
#[async_trait]
pub trait TranscriptService: Send + Sync {
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript>;
}

/// Scrapes caption tracks the way the YouTube web player does.
pub struct CaptionClient {
    client: reqwest::Client,
    site_base_url: url::Url,
    languages: Vec<String>,
}

/// One caption track advertised by the player.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    /// Automatic speech recognition track.
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    #[serde(default)]
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

fn unavailable(failure: TranscriptFailure) -> ScribeError {
    ScribeError::TranscriptUnavailable(failure)
}

fn request_failed(context: &str, e: reqwest::Error) -> ScribeError {
    unavailable(TranscriptFailure::Request(format!("{}: {}", context, e)))
}

impl CaptionClient {
    /// Create a client. `languages` is the preference order for caption tracks.
    pub fn new(client: reqwest::Client, site_base_url: &str, languages: Vec<String>) -> Result<Self> {
        Ok(Self {
            client,
            site_base_url: parse_base_url(site_base_url)?,
            languages,
        })
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        self.site_base_url
            .join(path)
            .map_err(|e| ScribeError::Config(format!("Invalid site base URL: {}", e)))
    }

    fn check_status(response: &reqwest::Response, video_id: &VideoId) -> Result<()> {
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(unavailable(TranscriptFailure::RequestBlocked(video_id.to_string())));
        }
        if !status.is_success() {
            return Err(unavailable(TranscriptFailure::Request(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            ))));
        }
        Ok(())
    }

    async fn fetch_watch_page(&self, video_id: &VideoId) -> Result<String> {
        let mut url = self.endpoint("watch")?;
        url.query_pairs_mut().append_pair("v", video_id.as_str());

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US")
            .send()
            .await
            .map_err(|e| request_failed("failed to fetch watch page", e))?;

        Self::check_status(&response, video_id)?;

        response
            .text()
            .await
            .map_err(|e| request_failed("failed to read watch page", e))
    }

    async fn fetch_player(&self, video_id: &VideoId, api_key: &str) -> Result<PlayerResponse> {
        let mut url = self.endpoint("youtubei/v1/player")?;
        url.query_pairs_mut().append_pair("key", api_key);

        let body = serde_json::json!({
            "context": {
                "client": {
                    "clientName": PLAYER_CLIENT_NAME,
                    "clientVersion": PLAYER_CLIENT_VERSION
                }
            },
            "videoId": video_id.as_str()
        });

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed("failed to query player", e))?;

        Self::check_status(&response, video_id)?;

        response
            .json()
            .await
            .map_err(|e| unavailable(TranscriptFailure::Parse(format!("player response: {}", e))))
    }

    async fn fetch_track(&self, video_id: &VideoId, track: &CaptionTrack) -> Result<Transcript> {
        let response = self
            .client
            .get(&track.base_url)
            .send()
            .await
            .map_err(|e| request_failed("failed to fetch captions", e))?;

        Self::check_status(&response, video_id)?;

        let xml = response
            .text()
            .await
            .map_err(|e| request_failed("failed to read captions", e))?;

        if !is_timedtext(&xml) {
            return Err(unavailable(TranscriptFailure::Parse(
                "caption track is not timedtext XML".to_string(),
            )));
        }

        let segments = parse_timedtext(&xml);
        Ok(Transcript::new(
            video_id.as_str(),
            track.language_code.clone(),
            track.is_generated(),
            segments,
        ))
    }
}

/// Pull the player API key out of the watch page.
fn extract_api_key(html: &str, video_id: &VideoId) -> Result<String> {
    if html.contains("class=\"g-recaptcha\"") {
        return Err(unavailable(TranscriptFailure::RequestBlocked(video_id.to_string())));
    }

    INNERTUBE_API_KEY
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            unavailable(TranscriptFailure::Parse(
                "INNERTUBE_API_KEY not found in watch page".to_string(),
            ))
        })
}

/// Map a non-OK playability status to a failure.
fn check_playability(status: Option<&PlayabilityStatus>, video_id: &VideoId) -> Result<()> {
    let Some(status) = status else {
        return Ok(());
    };
    if status.status == "OK" {
        return Ok(());
    }

    let reason = status.reason.clone().unwrap_or_default();
    let id = video_id.to_string();
    let failure = match status.status.as_str() {
        "LOGIN_REQUIRED" if reason.contains("not a bot") => TranscriptFailure::RequestBlocked(id),
        "LOGIN_REQUIRED" if reason.contains("inappropriate") => TranscriptFailure::AgeRestricted(id),
        "ERROR" if reason.contains("unavailable") => TranscriptFailure::VideoUnavailable(id),
        _ => TranscriptFailure::Unplayable {
            video_id: id,
            reason: if reason.is_empty() {
                status.status.clone()
            } else {
                reason
            },
        },
    };
    Err(unavailable(failure))
}

/// Pick a caption track: manual tracks in preference order, then generated
/// ones, then whatever the video offers first.
pub fn select_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    let find = |generated: bool| {
        languages.iter().find_map(|lang| {
            tracks
                .iter()
                .find(|t| t.is_generated() == generated && &t.language_code == lang)
        })
    };

    find(false).or_else(|| find(true)).or_else(|| {
        let fallback = tracks.first();
        if let Some(track) = fallback {
            if !languages.is_empty() {
                warn!(
                    "No caption track in {}; falling back to '{}'",
                    languages.join(", "),
                    track.language_code
                );
            }
        }
        fallback
    })
}

#[async_trait]
impl TranscriptService for CaptionClient {
    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn fetch_transcript(&self, video_id: &VideoId) -> Result<Transcript> {
        let html = self.fetch_watch_page(video_id).await?;
        let api_key = extract_api_key(&html, video_id)?;
        debug!("Found player API key");

        let player = self.fetch_player(video_id, &api_key).await?;
        check_playability(player.playability_status.as_ref(), video_id)?;

        let tracks = player
            .captions
            .and_then(|c| c.player_captions_tracklist_renderer)
            .map(|r| r.caption_tracks)
            .unwrap_or_default();

        if tracks.is_empty() {
            return Err(unavailable(TranscriptFailure::Disabled(video_id.to_string())));
        }

        let track = select_track(&tracks, &self.languages).ok_or_else(|| {
            unavailable(TranscriptFailure::NoTranscript {
                video_id: video_id.to_string(),
                available: tracks.iter().map(|t| t.language_code.clone()).collect(),
            })
        })?;

        if track.base_url.contains("&exp=xpe") {
            return Err(unavailable(TranscriptFailure::PoTokenRequired(video_id.to_string())));
        }

        info!(
            language = %track.language_code,
            generated = track.is_generated(),
            "Downloading caption track"
        );
        let mut track = track.clone();
        track.base_url = track.base_url.replace("&fmt=srv3", "");

        let transcript = self.fetch_track(video_id, &track).await?;
        debug!(cues = transcript.segments.len(), "Transcript parsed");
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const WATCH_HTML: &str =
        r#"<html><script>ytcfg.set({"INNERTUBE_API_KEY": "AIzaTestKey_123","OTHER":1});</script></html>"#;

    const TIMEDTEXT: &str = r#"<?xml version="1.0" encoding="utf-8" ?><transcript><text start="0.0" dur="1.5">First line</text><text start="1.5" dur="2.0">second &amp;amp; last</text></transcript>"#;

    fn video_id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    fn track(lang: &str, kind: Option<&str>) -> CaptionTrack {
        CaptionTrack {
            base_url: format!("https://example.com/{}", lang),
            language_code: lang.to_string(),
            kind: kind.map(str::to_string),
        }
    }

    fn player_body(server_url: &str, tracks: &str) -> String {
        let tracks = tracks.replace("{base}", server_url);
        format!(
            r#"{{"playabilityStatus":{{"status":"OK"}},"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":{}}}}}}}"#,
            tracks
        )
    }

    async fn mock_watch(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/watch")
            .match_query(Matcher::UrlEncoded("v".into(), "dQw4w9WgXcQ".into()))
            .with_body(WATCH_HTML)
            .create_async()
            .await
    }

    fn client(server: &mockito::ServerGuard) -> CaptionClient {
        CaptionClient::new(reqwest::Client::new(), &server.url(), vec!["en".to_string()]).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_transcript() {
        let mut server = mockito::Server::new_async().await;
        mock_watch(&mut server).await;
        let player = server
            .mock("POST", "/youtubei/v1/player")
            .match_query(Matcher::UrlEncoded("key".into(), "AIzaTestKey_123".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({"videoId": "dQw4w9WgXcQ"})))
            .with_body(player_body(
                &server.url(),
                r#"[{"baseUrl":"{base}/api/timedtext?v=dQw4w9WgXcQ&lang=en&fmt=srv3","languageCode":"en"}]"#,
            ))
            .create_async()
            .await;
        let captions = server
            .mock("GET", "/api/timedtext")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("v".into(), "dQw4w9WgXcQ".into()),
                Matcher::UrlEncoded("lang".into(), "en".into()),
            ]))
            .with_body(TIMEDTEXT)
            .create_async()
            .await;

        let transcript = client(&server).fetch_transcript(&video_id()).await.unwrap();

        player.assert_async().await;
        captions.assert_async().await;
        assert_eq!(transcript.language_code, "en");
        assert!(!transcript.is_generated);
        assert_eq!(transcript.plain_text(), "First line\nsecond & last");
    }

    #[tokio::test]
    async fn test_captions_disabled() {
        let mut server = mockito::Server::new_async().await;
        mock_watch(&mut server).await;
        server
            .mock("POST", "/youtubei/v1/player")
            .match_query(Matcher::Any)
            .with_body(r#"{"playabilityStatus":{"status":"OK"}}"#)
            .create_async()
            .await;

        let err = client(&server).fetch_transcript(&video_id()).await.unwrap_err();
        assert!(matches!(
            err,
            ScribeError::TranscriptUnavailable(TranscriptFailure::Disabled(_))
        ));
    }

    #[tokio::test]
    async fn test_video_unavailable() {
        let mut server = mockito::Server::new_async().await;
        mock_watch(&mut server).await;
        server
            .mock("POST", "/youtubei/v1/player")
            .match_query(Matcher::Any)
            .with_body(r#"{"playabilityStatus":{"status":"ERROR","reason":"This video is unavailable"}}"#)
            .create_async()
            .await;

        let err = client(&server).fetch_transcript(&video_id()).await.unwrap_err();
        assert!(matches!(
            err,
            ScribeError::TranscriptUnavailable(TranscriptFailure::VideoUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_region_lock_is_unplayable() {
        let mut server = mockito::Server::new_async().await;
        mock_watch(&mut server).await;
        server
            .mock("POST", "/youtubei/v1/player")
            .match_query(Matcher::Any)
            .with_body(r#"{"playabilityStatus":{"status":"UNPLAYABLE","reason":"The uploader has not made this video available in your country"}}"#)
            .create_async()
            .await;

        let err = client(&server).fetch_transcript(&video_id()).await.unwrap_err();
        match err {
            ScribeError::TranscriptUnavailable(TranscriptFailure::Unplayable { reason, .. }) => {
                assert!(reason.contains("your country"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_watch_page() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/watch")
            .match_query(Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let err = client(&server).fetch_transcript(&video_id()).await.unwrap_err();
        assert!(matches!(
            err,
            ScribeError::TranscriptUnavailable(TranscriptFailure::RequestBlocked(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_in_page() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/watch")
            .match_query(Matcher::Any)
            .with_body("<html></html>")
            .create_async()
            .await;

        let err = client(&server).fetch_transcript(&video_id()).await.unwrap_err();
        assert!(matches!(
            err,
            ScribeError::TranscriptUnavailable(TranscriptFailure::Parse(_))
        ));
    }

    #[test]
    fn test_select_track_prefers_manual_in_language_order() {
        let tracks = vec![
            track("en", Some("asr")),
            track("de", None),
            track("en", None),
        ];
        let langs = vec!["en".to_string(), "de".to_string()];
        let selected = select_track(&tracks, &langs).unwrap();
        assert_eq!(selected.language_code, "en");
        assert!(!selected.is_generated());
    }

    #[test]
    fn test_select_track_falls_back_to_generated_then_first() {
        let tracks = vec![track("fr", None), track("en", Some("asr"))];
        let selected = select_track(&tracks, &["en".to_string()]).unwrap();
        assert!(selected.is_generated());

        let tracks = vec![track("fr", None), track("es", None)];
        let selected = select_track(&tracks, &["en".to_string()]).unwrap();
        assert_eq!(selected.language_code, "fr");

        assert!(select_track(&[], &["en".to_string()]).is_none());
    }

    #[test]
    fn test_extract_api_key() {
        assert_eq!(extract_api_key(WATCH_HTML, &video_id()).unwrap(), "AIzaTestKey_123");

        let blocked = r#"<div class="g-recaptcha"></div>"#;
        assert!(matches!(
            extract_api_key(blocked, &video_id()),
            Err(ScribeError::TranscriptUnavailable(TranscriptFailure::RequestBlocked(_)))
        ));
    }
}
