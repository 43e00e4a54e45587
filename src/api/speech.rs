//! Text-to-speech endpoint

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;

use super::ApiState;
use crate::speech::SpeechError;

/// Build speech router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/tts", post(synthesize))
        .with_state(state)
}

/// Synthesis request
#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    #[serde(default)]
    pub text: String,
}

/// Synthesize text to speech
///
/// Streams the provider's audio back as it arrives
async fn synthesize(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<SynthesizeRequest>, JsonRejection>,
) -> Result<Response, SpeechError> {
    let Json(request) = payload.map_err(|e| SpeechError::InvalidInput(e.body_text()))?;

    let audio = state.speech.synthesize(&request.text).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, audio.content_type)],
        Body::from_stream(audio.body),
    )
        .into_response())
}
