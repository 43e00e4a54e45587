//! Quote Gateway - quote widget backend with a text-to-speech proxy
//!
//! This library provides:
//! - A validated, embedded quote catalog with repeat-free random selection
//! - Clipboard and social share formatting
//! - A stateless proxy to an external speech synthesis provider that keeps
//!   the provider credential on the server
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Widget / CLI                 │
//! └───────────┬──────────────────────┬──────────┘
//!             │ GET /api/quotes/next │ POST /api/tts
//! ┌───────────▼──────────┐ ┌─────────▼──────────┐
//! │  QuoteCatalog        │ │  SpeechProxy       │
//! │  select / format     │ │  validate / key    │
//! └──────────────────────┘ └─────────┬──────────┘
//!                                    │ HTTPS
//!                          ┌─────────▼──────────┐
//!                          │ Synthesis provider │
//!                          └────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod quotes;
pub mod speech;

pub use api::{ApiServer, ApiServerBuilder, ApiState};
pub use config::Config;
pub use error::{Error, Result};
pub use quotes::{QuoteCatalog, QuoteRecord, format_for_clipboard, format_for_social_share};
pub use speech::{
    AudioStream, ElevenLabsClient, SpeechError, SpeechProxy, SpeechUpstream, SynthesisRequest,
    VoiceSettings,
};
