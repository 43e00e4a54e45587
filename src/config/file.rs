//! TOML configuration file loading
//!
//! Supports `~/.config/quote-gateway/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{Error, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Speech provider configuration
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// Share formatting configuration
    #[serde(default)]
    pub share: ShareFileConfig,
}

/// HTTP server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Directory holding the widget front-end
    pub static_dir: Option<String>,

    /// Global request limit per minute
    pub rate_limit_per_minute: Option<u32>,
}

/// Speech provider configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// Provider API key (prefer `ELEVENLABS_API_KEY`)
    pub api_key: Option<String>,

    /// Provider base URL
    pub base_url: Option<String>,

    /// Voice identifier
    pub voice_id: Option<String>,

    /// Model identifier
    pub model_id: Option<String>,

    /// Seconds to wait for the provider to respond
    pub timeout_secs: Option<u64>,

    /// Maximum accepted text length in characters
    pub max_text_chars: Option<usize>,
}

/// Share formatting configuration
#[derive(Debug, Default, Deserialize)]
pub struct ShareFileConfig {
    /// Hashtags appended to shared quotes, with or without `#`
    pub hashtags: Option<Vec<String>>,

    /// Character limit for share text
    pub max_length: Option<usize>,
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the content is not valid TOML for the schema
pub fn parse_config_file(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConfigFile {
    config_file_path().map_or_else(ConfigFile::default, |path| load_config_file_from(&path))
}

/// Load the config file at the default path, tolerating problems
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file_from(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }

    read_config_file(path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using default configuration");
        ConfigFile::default()
    })
}

/// Read a config file the operator named explicitly
///
/// # Errors
///
/// Returns `Error::Config` if the file is missing, unreadable or invalid
pub fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("failed to read config file {}: {e}", path.display()))
    })?;

    let config = parse_config_file(&content).map_err(|e| {
        Error::Config(format!("failed to parse config file {}: {e}", path.display()))
    })?;

    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/quote-gateway/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("quote-gateway").join("config.toml"))
}
