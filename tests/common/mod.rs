//! Shared test utilities

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::response::Response;
use bytes::Bytes;
use quote_gateway::api::ApiServerBuilder;
use quote_gateway::{
    AudioStream, QuoteCatalog, QuoteRecord, SpeechError, SpeechProxy, SpeechUpstream,
    SynthesisRequest,
};
use secrecy::SecretString;

/// What the mock provider does when called
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream these chunks as `audio/mpeg`
    Audio(Vec<&'static [u8]>),
    /// Reject with a status and body
    Status(u16, &'static str),
    /// Fail before any response arrives
    NetworkFailure,
}

/// Counting stand-in for the synthesis provider
#[derive(Debug)]
pub struct MockUpstream {
    calls: AtomicUsize,
    response: MockResponse,
}

impl MockUpstream {
    pub fn new(response: MockResponse) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            response,
        })
    }

    pub fn audio() -> Arc<Self> {
        Self::new(MockResponse::Audio(vec![&b"ID3-"[..], &b"frames"[..]]))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechUpstream for MockUpstream {
    async fn synthesize(
        &self,
        _api_key: &SecretString,
        _request: &SynthesisRequest<'_>,
    ) -> Result<AudioStream, SpeechError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.response {
            MockResponse::Audio(chunks) => {
                let chunks: Vec<std::io::Result<Bytes>> =
                    chunks.iter().map(|c| Ok(Bytes::from_static(*c))).collect();
                Ok(AudioStream {
                    content_type: "audio/mpeg".to_string(),
                    body: Box::pin(futures::stream::iter(chunks)),
                })
            }
            MockResponse::Status(status_code, body) => Err(SpeechError::Upstream {
                status_code: *status_code,
                body: (*body).to_string(),
            }),
            MockResponse::NetworkFailure => {
                Err(SpeechError::Network("connection refused".to_string()))
            }
        }
    }
}

/// Small catalog with distinct texts and tags
pub fn sample_catalog() -> Arc<QuoteCatalog> {
    Arc::new(
        QuoteCatalog::new(vec![
            QuoteRecord::new("Stay hungry.", "Ada").with_tags(["work"]),
            QuoteRecord::new("Stay foolish.", "Grace").with_tags(["life", "work"]),
            QuoteRecord::new("Keep going.", "Linus").with_tags(["persistence"]),
        ])
        .expect("valid sample catalog"),
    )
}

/// Speech proxy over a mock upstream
pub fn speech_proxy(upstream: &Arc<MockUpstream>, api_key: Option<&str>) -> Arc<SpeechProxy> {
    Arc::new(SpeechProxy::new(
        upstream.clone(),
        api_key.map(|k| SecretString::from(k.to_string())),
    ))
}

/// Test server builder with a mock upstream and configured key
pub fn test_builder(upstream: &Arc<MockUpstream>, api_key: Option<&str>) -> ApiServerBuilder {
    ApiServerBuilder::new(sample_catalog(), speech_proxy(upstream, api_key), 0)
}

/// Build the full router with a mock upstream
pub fn build_test_router(upstream: &Arc<MockUpstream>, api_key: Option<&str>) -> axum::Router {
    test_builder(upstream, api_key).build().router()
}

/// Read a response body as JSON
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&body).expect("json body")
}

/// Read a response body as raw bytes
pub async fn body_bytes(response: Response) -> Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body")
}
