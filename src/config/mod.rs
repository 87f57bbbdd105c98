//! Configuration module for tubescript.
//!
//! Handles loading application settings from TOML and resolving the API key.

mod settings;

pub use settings::{
    GeneralSettings, MissingTranscriptPolicy, OutputSettings, Settings, TitlePolicy,
    YoutubeSettings, API_KEY_ENV,
};
