//! Configuration settings for tubescript.

use crate::filename::SanitizerKind;
use crate::transcript::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the YouTube Data API key.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

/// Config file looked up in the working directory before the user config dir.
const LOCAL_CONFIG_FILE: &str = "tubescript.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    #[serde(alias = "YouTube")]
    pub youtube: YoutubeSettings,
    pub output: OutputSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// YouTube service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// YouTube Data API key. `YOUTUBE_API_KEY` takes precedence when set.
    pub api_key: Option<String>,
    /// Base URL of the YouTube Data API v3.
    pub api_base_url: String,
    /// Base URL of the YouTube website (watch page and player endpoint).
    pub site_base_url: String,
    /// Preferred caption languages, most preferred first.
    pub languages: Vec<String>,
    /// Timeout for each HTTP request, in seconds.
    pub timeout_secs: u64,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            site_base_url: "https://www.youtube.com".to_string(),
            languages: vec!["en".to_string()],
            timeout_secs: 30,
        }
    }
}

/// What to do when the video title cannot be resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TitlePolicy {
    /// Abort the run.
    #[default]
    Required,
    /// Continue and name the output file after the video ID.
    Optional,
}

/// What to do when no transcript can be retrieved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingTranscriptPolicy {
    /// Report the failure and stop.
    #[default]
    Abort,
    /// Also write a `.no_transcript` marker file recording the URL.
    Sentinel,
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory transcripts are written to (created if absent).
    pub dir: String,
    /// Filename sanitization strategy.
    pub sanitizer: SanitizerKind,
    /// Format of the saved transcript.
    pub format: OutputFormat,
    pub title_policy: TitlePolicy,
    pub on_missing_transcript: MissingTranscriptPolicy,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: "transcripts".to_string(),
            sanitizer: SanitizerKind::default(),
            format: OutputFormat::default(),
            title_policy: TitlePolicy::default(),
            on_missing_transcript: MissingTranscriptPolicy::default(),
        }
    }
}

impl OutputSettings {
    /// Get the expanded output directory path.
    pub fn dir_path(&self) -> PathBuf {
        Settings::expand_path(&self.dir)
    }
}

impl Settings {
    /// Load settings from the first configuration file found.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or the default lookup if None.
    ///
    /// An explicit path must exist. Without one, `./tubescript.toml` is tried,
    /// then the user config directory, then built-in defaults.
    pub fn load_from(path: Option<&Path>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => {
                return Err(crate::error::ScribeError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            Some(p) => Some(p.to_path_buf()),
            None => Self::discover_config_path(),
        };

        match config_path {
            Some(config_path) => {
                tracing::debug!("Loading config from {}", config_path.display());
                let content = std::fs::read_to_string(&config_path).map_err(|e| {
                    crate::error::ScribeError::Config(format!(
                        "cannot read config file {}: {}",
                        config_path.display(),
                        e
                    ))
                })?;
                Self::from_toml(&content)
            }
            None => Ok(Settings::default()),
        }
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> crate::error::Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tubescript")
            .join("config.toml")
    }

    fn discover_config_path() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        let user = Self::default_config_path();
        user.exists().then_some(user)
    }

    /// Resolve the API key: the environment wins over the config file.
    pub fn api_key(&self) -> Option<String> {
        Self::pick_api_key(std::env::var(API_KEY_ENV).ok(), self.youtube.api_key.clone())
    }

    fn pick_api_key(from_env: Option<String>, from_file: Option<String>) -> Option<String> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or(from_file.filter(|k| !k.trim().is_empty()))
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}
