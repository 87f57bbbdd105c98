//! Shared HTTP client configuration.

use crate::error::{Result, ScribeError};
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Create an HTTP client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ScribeError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Parse a configured base URL, making sure relative joins append to its path.
pub fn parse_base_url(base: &str) -> Result<url::Url> {
    let with_slash = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    url::Url::parse(&with_slash)
        .map_err(|e| ScribeError::Config(format!("Invalid base URL '{}': {}", base, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_keeps_path() {
        let base = parse_base_url("https://www.googleapis.com/youtube/v3").unwrap();
        assert_eq!(
            base.join("videos").unwrap().as_str(),
            "https://www.googleapis.com/youtube/v3/videos"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(matches!(parse_base_url("not a url"), Err(ScribeError::Config(_))));
    }

    #[test]
    fn test_create_client() {
        assert!(create_client_with_timeout(Duration::from_secs(1)).is_ok());
    }
}
