//! Pre-flight checks before any network call.
//!
//! Validates that the configuration needed for a run is present so the run
//! does not fail midway.

use crate::config::{Settings, API_KEY_ENV};
use crate::error::{Result, ScribeError};
use crate::youtube::http::parse_base_url;

/// Run pre-flight checks and return the resolved API key.
pub fn check(settings: &Settings) -> Result<String> {
    let api_key = check_api_key(settings)?;
    check_base_urls(settings)?;
    check_timeout(settings)?;
    Ok(api_key)
}

/// Check that a YouTube Data API key is configured.
fn check_api_key(settings: &Settings) -> Result<String> {
    settings.api_key().ok_or_else(|| {
        ScribeError::Config(format!(
            "YouTube API key not found. Set it with: export {}='...' \
             or add `api_key` under [youtube] in the config file",
            API_KEY_ENV
        ))
    })
}

fn check_base_urls(settings: &Settings) -> Result<()> {
    parse_base_url(&settings.youtube.api_base_url)?;
    parse_base_url(&settings.youtube.site_base_url)?;
    Ok(())
}

fn check_timeout(settings: &Settings) -> Result<()> {
    if settings.youtube.timeout_secs == 0 {
        return Err(ScribeError::Config(
            "youtube.timeout_secs must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
