//! Text-to-speech proxy
//!
//! Validates caller text, attaches the server-held credential and a fixed
//! voice configuration, and forwards exactly one request to the synthesis
//! provider. Audio is handed back as a byte stream so large clips are never
//! buffered in full.

mod elevenlabs;

pub use elevenlabs::{DEFAULT_BASE_URL, ElevenLabsClient, MAX_ERROR_BODY_BYTES};

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, TryStreamExt};
use secrecy::SecretString;
use serde::Serialize;
use thiserror::Error;

use crate::Result;
use crate::config::SpeechConfig;

/// Content type used when the provider does not report an audio type
pub const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Default ElevenLabs voice ("Rachel")
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

/// Default ElevenLabs model
pub const DEFAULT_MODEL_ID: &str = "eleven_monolingual_v1";

/// Default upper bound on text length, in characters
pub const DEFAULT_MAX_TEXT_CHARS: usize = 5000;

/// Streamed audio body
pub type AudioBytes = BoxStream<'static, std::io::Result<Bytes>>;

/// Audio returned by the provider
pub struct AudioStream {
    /// MIME type of the audio
    pub content_type: String,

    /// Raw audio chunks, forwarded verbatim
    pub body: AudioBytes,
}

impl AudioStream {
    /// Drain the stream into memory
    ///
    /// # Errors
    ///
    /// Returns error if the provider connection fails mid-stream
    pub async fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        self.body
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
    }
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStream")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Speech synthesis failures
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Caller sent empty or oversized text
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Server has no provider credential
    #[error("speech synthesis is not configured: {0}")]
    Misconfigured(String),

    /// Provider rejected the request
    #[error("speech provider returned {status_code}: {body}")]
    Upstream { status_code: u16, body: String },

    /// Transport failure or timeout before the provider answered
    #[error("network error: {0}")]
    Network(String),
}

impl SpeechError {
    /// Stable machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Misconfigured(_) => "misconfigured",
            Self::Upstream { .. } => "upstream_error",
            Self::Network(_) => "network_error",
        }
    }
}

/// Fixed synthesis parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

/// A single synthesis call as sent to the provider
#[derive(Debug, Clone, Copy)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub voice_id: &'a str,
    pub model_id: &'a str,
    pub voice_settings: &'a VoiceSettings,
}

/// Outbound synthesis provider
///
/// Implementations make exactly one attempt per call and never retry.
#[async_trait]
pub trait SpeechUpstream: Send + Sync {
    /// Synthesize `request` with the given credential
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Upstream` for non-success responses and
    /// `SpeechError::Network` for transport failures or timeouts
    async fn synthesize(
        &self,
        api_key: &SecretString,
        request: &SynthesisRequest<'_>,
    ) -> std::result::Result<AudioStream, SpeechError>;
}

/// Stateless text-to-speech forwarder
pub struct SpeechProxy {
    upstream: Arc<dyn SpeechUpstream>,
    api_key: Option<SecretString>,
    voice_id: String,
    model_id: String,
    voice_settings: VoiceSettings,
    max_text_chars: usize,
}

impl SpeechProxy {
    /// Create a proxy over `upstream` with default voice configuration
    #[must_use]
    pub fn new(upstream: Arc<dyn SpeechUpstream>, api_key: Option<SecretString>) -> Self {
        Self {
            upstream,
            api_key,
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            voice_settings: VoiceSettings::default(),
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }

    /// Create a proxy backed by the ElevenLabs HTTP API
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not encrypted or the HTTP client
    /// cannot be built
    pub fn from_config(config: &SpeechConfig) -> Result<Self> {
        let client = ElevenLabsClient::new(config.base_url.clone(), config.timeout)?;

        if config.api_key.is_none() {
            tracing::warn!("ELEVENLABS_API_KEY not set, speech synthesis disabled");
        }

        Ok(Self::new(Arc::new(client), config.api_key.clone())
            .voice_id(config.voice_id.clone())
            .model_id(config.model_id.clone())
            .max_text_chars(config.max_text_chars))
    }

    /// Set the provider voice identifier
    #[must_use]
    pub fn voice_id(mut self, voice_id: String) -> Self {
        self.voice_id = voice_id;
        self
    }

    /// Set the provider model identifier
    #[must_use]
    pub fn model_id(mut self, model_id: String) -> Self {
        self.model_id = model_id;
        self
    }

    /// Set the maximum accepted text length in characters
    #[must_use]
    pub fn max_text_chars(mut self, max: usize) -> Self {
        self.max_text_chars = max;
        self
    }

    /// Whether a credential is configured; performs no network call
    #[must_use]
    pub const fn speech_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Synthesize `text` into an audio stream
    ///
    /// Input is validated and the credential checked before any outbound
    /// call is made.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for blank or oversized text, `Misconfigured`
    /// without a credential, otherwise whatever the upstream reports
    pub async fn synthesize(&self, text: &str) -> std::result::Result<AudioStream, SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::InvalidInput("text is required".to_string()));
        }

        let chars = text.chars().count();
        if chars > self.max_text_chars {
            return Err(SpeechError::InvalidInput(format!(
                "text is {chars} characters, limit is {}",
                self.max_text_chars
            )));
        }

        let Some(api_key) = &self.api_key else {
            tracing::warn!("speech requested but no API key is configured");
            return Err(SpeechError::Misconfigured("missing API key".to_string()));
        };

        let request = SynthesisRequest {
            text,
            voice_id: &self.voice_id,
            model_id: &self.model_id,
            voice_settings: &self.voice_settings,
        };

        tracing::debug!(chars, voice_id = %self.voice_id, "forwarding synthesis request");

        self.upstream
            .synthesize(api_key, &request)
            .await
            .inspect_err(|e| tracing::warn!(code = e.code(), error = %e, "speech synthesis failed"))
    }
}

impl std::fmt::Debug for SpeechProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechProxy")
            .field("speech_enabled", &self.speech_enabled())
            .field("voice_id", &self.voice_id)
            .field("model_id", &self.model_id)
            .field("max_text_chars", &self.max_text_chars)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Records what it receives and answers with a canned audio chunk
    #[derive(Default)]
    struct RecordingUpstream {
        calls: AtomicUsize,
        last: Mutex<Option<(String, String, String, VoiceSettings)>>,
    }

    #[async_trait]
    impl SpeechUpstream for RecordingUpstream {
        async fn synthesize(
            &self,
            _api_key: &SecretString,
            request: &SynthesisRequest<'_>,
        ) -> std::result::Result<AudioStream, SpeechError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((
                request.text.to_string(),
                request.voice_id.to_string(),
                request.model_id.to_string(),
                *request.voice_settings,
            ));
            Ok(AudioStream {
                content_type: DEFAULT_AUDIO_CONTENT_TYPE.to_string(),
                body: Box::pin(futures::stream::iter([Ok::<_, std::io::Error>(
                    Bytes::from_static(b"ID3"),
                )])),
            })
        }
    }

    fn proxy(upstream: &Arc<RecordingUpstream>, key: Option<&str>) -> SpeechProxy {
        SpeechProxy::new(upstream.clone(), key.map(|k| SecretString::from(k.to_string())))
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_upstream() {
        let upstream = Arc::new(RecordingUpstream::default());
        let proxy = proxy(&upstream, Some("key"));

        for text in ["", "   \n"] {
            let err = proxy.synthesize(text).await.unwrap_err();
            assert!(matches!(err, SpeechError::InvalidInput(_)));
        }
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_text_is_rejected() {
        let upstream = Arc::new(RecordingUpstream::default());
        let proxy = proxy(&upstream, Some("key")).max_text_chars(5);

        let err = proxy.synthesize("too long").await.unwrap_err();
        assert_eq!(err.code(), "invalid_input");
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);

        assert!(proxy.synthesize("fits").await.is_ok());
    }

    #[tokio::test]
    async fn invalid_input_takes_precedence_over_missing_key() {
        let upstream = Arc::new(RecordingUpstream::default());
        let err = proxy(&upstream, None).synthesize("").await.unwrap_err();
        assert!(matches!(err, SpeechError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn missing_key_is_misconfigured() {
        let upstream = Arc::new(RecordingUpstream::default());
        let proxy = proxy(&upstream, None);

        assert!(!proxy.speech_enabled());
        let err = proxy.synthesize("hello").await.unwrap_err();
        assert!(matches!(err, SpeechError::Misconfigured(_)));
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn forwards_trimmed_text_with_voice_configuration() {
        let upstream = Arc::new(RecordingUpstream::default());
        let proxy = proxy(&upstream, Some("key")).voice_id("voice-1".to_string());

        let audio = proxy.synthesize("  hello  ").await.unwrap();
        assert_eq!(audio.content_type, "audio/mpeg");
        assert_eq!(audio.into_bytes().await.unwrap(), b"ID3");

        let (text, voice, model, settings) = upstream.last.lock().unwrap().clone().unwrap();
        assert_eq!(text, "hello");
        assert_eq!(voice, "voice-1");
        assert_eq!(model, DEFAULT_MODEL_ID);
        assert_eq!(settings, VoiceSettings::default());
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn debug_output_hides_key() {
        let upstream = Arc::new(RecordingUpstream::default());
        let rendered = format!("{:?}", proxy(&upstream, Some("super-secret")));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("speech_enabled: true"));
    }

    fn speech_config(api_key: Option<&str>) -> SpeechConfig {
        SpeechConfig {
            api_key: api_key.map(|key| SecretString::from(key.to_string())),
            base_url: url::Url::parse(DEFAULT_BASE_URL).unwrap(),
            voice_id: "voice-9".to_string(),
            model_id: "model-9".to_string(),
            timeout: std::time::Duration::from_secs(5),
            max_text_chars: 12,
        }
    }

    #[test]
    fn from_config_carries_credential_and_limits() {
        let proxy = SpeechProxy::from_config(&speech_config(Some("from-config"))).unwrap();
        assert!(proxy.speech_enabled());

        let rendered = format!("{proxy:?}");
        assert!(!rendered.contains("from-config"));
        assert!(rendered.contains("voice-9"));

        let disabled = SpeechProxy::from_config(&speech_config(None)).unwrap();
        assert!(!disabled.speech_enabled());
    }
}
