//! Configuration management for the quote gateway
//!
//! Values resolve env > TOML file > default. Environment access goes through
//! a lookup function so configuration can be built in tests without touching
//! the process environment.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::quotes::DEFAULT_SHARE_LENGTH;
use crate::speech::{DEFAULT_BASE_URL, DEFAULT_MAX_TEXT_CHARS, DEFAULT_MODEL_ID, DEFAULT_VOICE_ID};
use crate::{Error, Result};
use file::ConfigFile;

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 3000;

/// Provider timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Hashtags appended to shared quotes by default
pub const DEFAULT_HASHTAGS: &[&str] = &["quotes", "inspiration"];

/// Quote gateway configuration
#[derive(Debug)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Speech proxy configuration
    pub speech: SpeechConfig,

    /// Share formatting configuration
    pub share: ShareConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (widget front-end)
    pub static_dir: Option<PathBuf>,

    /// Global rate limit; `None` disables limiting
    pub rate_limit_per_minute: Option<u32>,
}

/// Speech proxy configuration
#[derive(Debug)]
pub struct SpeechConfig {
    /// Provider credential, never logged
    pub api_key: Option<SecretString>,

    /// Provider base URL
    pub base_url: Url,

    /// Provider voice identifier
    pub voice_id: String,

    /// Provider model identifier
    pub model_id: String,

    /// Upper bound on waiting for the provider to respond
    pub timeout: Duration,

    /// Maximum accepted text length in characters
    pub max_text_chars: usize,
}

/// Share formatting configuration
#[derive(Debug, Clone)]
pub struct ShareConfig {
    /// Hashtags appended to shared quotes
    pub hashtags: Vec<String>,

    /// Character limit for share text
    pub max_length: usize,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            hashtags: DEFAULT_HASHTAGS.iter().map(ToString::to_string).collect(),
            max_length: DEFAULT_SHARE_LENGTH,
        }
    }
}

impl Config {
    /// Load configuration from the environment and the default config file
    ///
    /// # Errors
    ///
    /// Returns error if a configured value is invalid
    pub fn load() -> Result<Self> {
        Self::from_sources(file::load_config_file(), |key| std::env::var(key).ok())
    }

    /// Load configuration from the environment and an explicit config file
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing or invalid, or a configured
    /// value is invalid
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        Self::from_sources(file::read_config_file(path)?, |key| {
            std::env::var(key).ok()
        })
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if the base URL cannot be parsed or a numeric env value
    /// is malformed
    pub fn from_sources<F>(fc: ConfigFile, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Server config (env > toml > default)
        let port_var = ["QUOTE_GATEWAY_PORT", "PORT"]
            .into_iter()
            .find_map(|key| env(key).map(|raw| (key, raw)));
        let port = match port_var {
            Some((key, raw)) => parse_env(key, &raw)?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };
        let rate_limit_per_minute = match env("QUOTE_GATEWAY_RATE_LIMIT") {
            Some(raw) => Some(parse_env("QUOTE_GATEWAY_RATE_LIMIT", &raw)?),
            None => fc.server.rate_limit_per_minute,
        }
        .filter(|rpm| *rpm > 0);
        let server = ServerConfig {
            port,
            static_dir: env("QUOTE_GATEWAY_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from),
            rate_limit_per_minute,
        };

        // Speech config (env > toml > default)
        let api_key = env("ELEVENLABS_API_KEY")
            .or(fc.speech.api_key.filter(|k| !k.trim().is_empty()))
            .map(SecretString::from);
        let raw_base_url = env("ELEVENLABS_BASE_URL")
            .or(fc.speech.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&raw_base_url).map_err(|e| {
            Error::Config(format!("invalid speech base URL {raw_base_url:?}: {e}"))
        })?;
        let timeout_secs = match env("QUOTE_GATEWAY_TTS_TIMEOUT") {
            Some(raw) => parse_env("QUOTE_GATEWAY_TTS_TIMEOUT", &raw)?,
            None => fc.speech.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        let speech = SpeechConfig {
            api_key,
            base_url,
            voice_id: env("ELEVENLABS_VOICE_ID")
                .or(fc.speech.voice_id)
                .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            model_id: env("ELEVENLABS_MODEL_ID")
                .or(fc.speech.model_id)
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            timeout: Duration::from_secs(timeout_secs.max(1)),
            max_text_chars: fc.speech.max_text_chars.unwrap_or(DEFAULT_MAX_TEXT_CHARS),
        };

        // Share config (toml > default)
        let defaults = ShareConfig::default();
        let share = ShareConfig {
            hashtags: fc.share.hashtags.unwrap_or(defaults.hashtags),
            max_length: fc.share.max_length.unwrap_or(defaults.max_length),
        };

        Ok(Self {
            server,
            speech,
            share,
        })
    }
}

fn parse_env<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid {key} value {raw:?}: {e}")))
}
