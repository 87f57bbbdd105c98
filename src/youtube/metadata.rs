//! Video title lookup through the YouTube Data API v3.

use super::http::parse_base_url;
use super::VideoId;
use crate::error::{MetadataFailure, Result, ScribeError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Looks up a video's display title.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// `Ok(None)` means the service knows no such video.
    async fn fetch_title(&self, video_id: &VideoId) -> Result<Option<String>>;
}

/// `videos.list` client authenticated with an API key.
pub struct YoutubeDataApi {
    client: reqwest::Client,
    videos_url: url::Url,
    api_key: String,
}

impl YoutubeDataApi {
    pub fn new(client: reqwest::Client, api_base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        let videos_url = parse_base_url(api_base_url)?
            .join("videos")
            .map_err(|e| ScribeError::Config(format!("Invalid API base URL: {}", e)))?;

        Ok(Self {
            client,
            videos_url,
            api_key: api_key.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    reason: Option<String>,
}

fn unavailable(failure: MetadataFailure) -> ScribeError {
    ScribeError::MetadataUnavailable(failure)
}

#[async_trait]
impl MetadataService for YoutubeDataApi {
    #[instrument(skip(self), fields(video_id = %video_id))]
    async fn fetch_title(&self, video_id: &VideoId) -> Result<Option<String>> {
        debug!("Requesting video snippet");

        let response = self
            .client
            .get(self.videos_url.clone())
            .query(&[
                ("part", "snippet"),
                ("id", video_id.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| unavailable(MetadataFailure::Request(e.without_url().to_string())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| unavailable(MetadataFailure::Request(e.without_url().to_string())))?;

        if !status.is_success() {
            let (reason, message) = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => (
                    err.error.errors.into_iter().find_map(|d| d.reason),
                    err.error.message,
                ),
                Err(_) => (None, status.canonical_reason().unwrap_or("unknown error").to_string()),
            };
            return Err(unavailable(MetadataFailure::Api {
                status: status.as_u16(),
                reason,
                message,
            }));
        }

        let listing: VideoListResponse = serde_json::from_str(&body)
            .map_err(|e| unavailable(MetadataFailure::Decode(e.to_string())))?;

        let title = listing.items.into_iter().next().map(|item| item.snippet.title);
        debug!(found = title.is_some(), "Video snippet received");
        Ok(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn video_id() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    fn api(server: &mockito::ServerGuard) -> YoutubeDataApi {
        YoutubeDataApi::new(reqwest::Client::new(), &server.url(), "test-key").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_title() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/videos")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("part".into(), "snippet".into()),
                Matcher::UrlEncoded("id".into(), "dQw4w9WgXcQ".into()),
                Matcher::UrlEncoded("key".into(), "test-key".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(r#"{"items":[{"id":"dQw4w9WgXcQ","snippet":{"title":"Never Gonna Give You Up"}}]}"#)
            .create_async()
            .await;

        let title = api(&server).fetch_title(&video_id()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(title.as_deref(), Some("Never Gonna Give You Up"));
    }

    #[tokio::test]
    async fn test_empty_items_is_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/videos")
            .match_query(Matcher::Any)
            .with_body(r#"{"kind":"youtube#videoListResponse","items":[]}"#)
            .create_async()
            .await;

        let title = api(&server).fetch_title(&video_id()).await.unwrap();
        assert_eq!(title, None);
    }

    #[tokio::test]
    async fn test_api_error_keeps_reason() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/videos")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(
                r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota.","errors":[{"reason":"quotaExceeded"}]}}"#,
            )
            .create_async()
            .await;

        let err = api(&server).fetch_title(&video_id()).await.unwrap_err();
        match err {
            ScribeError::MetadataUnavailable(MetadataFailure::Api { status, reason, .. }) => {
                assert_eq!(status, 403);
                assert_eq!(reason.as_deref(), Some("quotaExceeded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unparseable_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/videos")
            .match_query(Matcher::Any)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = api(&server).fetch_title(&video_id()).await.unwrap_err();
        assert!(matches!(
            err,
            ScribeError::MetadataUnavailable(MetadataFailure::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_failure() {
        // Nothing listens on port 9 (discard) in the test environment.
        let api = YoutubeDataApi::new(reqwest::Client::new(), "http://127.0.0.1:9", "k").unwrap();
        let err = api.fetch_title(&video_id()).await.unwrap_err();
        assert!(matches!(
            err,
            ScribeError::MetadataUnavailable(MetadataFailure::Request(_))
        ));
    }
}
