//! ElevenLabs streaming TTS client

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use url::{Host, Url};

use super::{
    AudioStream, DEFAULT_AUDIO_CONTENT_TYPE, SpeechError, SpeechUpstream, SynthesisRequest,
    VoiceSettings,
};
use crate::{Error, Result};

/// Public ElevenLabs API
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Most bytes of a provider error body kept for the caller
pub const MAX_ERROR_BODY_BYTES: usize = 4096;

/// Synthesizes speech through the ElevenLabs streaming endpoint
#[derive(Debug, Clone)]
pub struct ElevenLabsClient {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ElevenLabsClient {
    /// Create a client against `base_url`
    ///
    /// `timeout` bounds connecting and waiting for response headers; once
    /// audio starts flowing the stream is not cut off.
    ///
    /// # Errors
    ///
    /// Returns error if `base_url` is plain http to a non-loopback host, or
    /// the HTTP client cannot be built
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        ensure_encrypted(&base_url)?;

        let client = reqwest::Client::builder().connect_timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Streaming endpoint for a voice
    fn endpoint(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{voice_id}/stream",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SpeechUpstream for ElevenLabsClient {
    async fn synthesize(
        &self,
        api_key: &SecretString,
        request: &SynthesisRequest<'_>,
    ) -> std::result::Result<AudioStream, SpeechError> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
            voice_settings: &'a VoiceSettings,
        }

        let body = ElevenLabsRequest {
            text: request.text,
            model_id: request.model_id,
            voice_settings: request.voice_settings,
        };

        let send = self
            .client
            .post(self.endpoint(request.voice_id))
            .header("xi-api-key", api_key.expose_secret())
            .header(ACCEPT, DEFAULT_AUDIO_CONTENT_TYPE)
            .json(&body)
            .send();

        let response = match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(SpeechError::Network(e.to_string())),
            Err(_) => {
                return Err(SpeechError::Network(format!(
                    "no response within {}ms",
                    self.timeout.as_millis()
                )));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = tokio::time::timeout(self.timeout, read_error_body(response))
                .await
                .unwrap_or_default();
            return Err(SpeechError::Upstream {
                status_code: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|ct| ct.starts_with("audio/"))
            .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE)
            .to_string();

        tracing::debug!(status = status.as_u16(), %content_type, "streaming synthesized audio");

        Ok(AudioStream {
            content_type,
            body: response
                .bytes_stream()
                .map(|chunk| chunk.map_err(std::io::Error::other))
                .boxed(),
        })
    }
}

/// Reject unencrypted provider URLs, except loopback hosts for local testing
fn ensure_encrypted(url: &Url) -> Result<()> {
    match url.scheme() {
        "https" => Ok(()),
        "http" if is_loopback(url) => Ok(()),
        scheme => Err(Error::Config(format!(
            "speech base URL must use https, got {scheme}://{}",
            url.host_str().unwrap_or_default()
        ))),
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}


/// Read at most `MAX_ERROR_BODY_BYTES` of an error response
///
/// A transport failure mid-body keeps whatever was read so far.
async fn read_error_body(response: reqwest::Response) -> String {
    let mut body = Vec::new();
    let mut chunks = response.bytes_stream();

    while let Some(Ok(chunk)) = chunks.next().await {
        let room = MAX_ERROR_BODY_BYTES - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            break;
        }
        body.extend_from_slice(&chunk);
    }

    truncate_lossy(&body)
}

/// Decode bytes as UTF-8, dropping a multi-byte character split by the cap
fn truncate_lossy(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) if e.error_len().is_none() => {
            String::from_utf8_lossy(&bytes[..e.valid_up_to()]).into_owned()
        }
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> Result<ElevenLabsClient> {
        ElevenLabsClient::new(Url::parse(url).unwrap(), Duration::from_secs(5))
    }

    #[test]
    fn accepts_https_and_loopback_http() {
        assert!(client(DEFAULT_BASE_URL).is_ok());
        assert!(client("http://127.0.0.1:8080").is_ok());
        assert!(client("http://localhost:9000").is_ok());
        assert!(client("http://[::1]:9000").is_ok());
    }

    #[test]
    fn rejects_plain_http_to_remote_host() {
        let err = client("http://api.elevenlabs.io").unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("https")));
    }

    #[test]
    fn builds_stream_endpoint() {
        let with_slash = client("https://tts.example.com/").unwrap();
        assert_eq!(
            with_slash.endpoint("abc"),
            "https://tts.example.com/v1/text-to-speech/abc/stream"
        );

        let with_prefix = client("https://proxy.example.com/eleven").unwrap();
        assert_eq!(
            with_prefix.endpoint("abc"),
            "https://proxy.example.com/eleven/v1/text-to-speech/abc/stream"
        );
    }

    #[test]
    fn truncated_error_body_drops_split_character() {
        let body = "ab\u{e9}".as_bytes();
        assert_eq!(truncate_lossy(&body[..3]), "ab");
        assert_eq!(truncate_lossy(body), "ab\u{e9}");
    }
}
