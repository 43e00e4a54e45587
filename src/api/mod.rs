//! HTTP API server for the quote gateway

mod error;
pub mod health;
pub mod quotes;
pub mod rate_limit;
pub mod speech;

pub use error::ApiError;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ShareConfig};
use crate::quotes::QuoteCatalog;
use crate::speech::SpeechProxy;
use crate::{Error, Result};

/// Shared state for API handlers
///
/// Everything here is read-only after startup; the rate limiter is
/// internally synchronized.
pub struct ApiState {
    pub catalog: Arc<QuoteCatalog>,
    pub speech: Arc<SpeechProxy>,
    pub share: ShareConfig,
    pub rate_limiter: Option<rate_limit::SharedLimiter>,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    catalog: Arc<QuoteCatalog>,
    speech: Arc<SpeechProxy>,
    port: u16,
    share: ShareConfig,
    static_dir: Option<PathBuf>,
    rate_limit_per_minute: Option<u32>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(catalog: Arc<QuoteCatalog>, speech: Arc<SpeechProxy>, port: u16) -> Self {
        Self {
            catalog,
            speech,
            port,
            share: ShareConfig::default(),
            static_dir: None,
            rate_limit_per_minute: None,
        }
    }

    /// Set hashtags and length limit for share text
    #[must_use]
    pub fn share_config(mut self, share: ShareConfig) -> Self {
        self.share = share;
        self
    }

    /// Set the static files directory for serving the widget
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Enable global rate limiting
    #[must_use]
    pub fn rate_limit(mut self, requests_per_minute: Option<u32>) -> Self {
        self.rate_limit_per_minute = requests_per_minute;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let rate_limiter = self.rate_limit_per_minute.map(rate_limit::create_limiter);

        let state = Arc::new(ApiState {
            catalog: self.catalog,
            speech: self.speech,
            share: self.share,
            rate_limiter,
        });

        ApiServer {
            state,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build a server from loaded configuration and the embedded catalog
    ///
    /// # Errors
    ///
    /// Returns error if the catalog is invalid or the speech client cannot
    /// be created
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = Arc::new(QuoteCatalog::embedded()?);
        let speech = Arc::new(SpeechProxy::from_config(&config.speech)?);

        Ok(ApiServerBuilder::new(catalog, speech, config.server.port)
            .share_config(config.share.clone())
            .static_dir(config.server.static_dir.clone())
            .rate_limit(config.server.rate_limit_per_minute)
            .build())
    }

    /// Shared handler state
    #[must_use]
    pub const fn state(&self) -> &Arc<ApiState> {
        &self.state
    }

    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(health::router(self.state.clone()))
            .merge(quotes::router(self.state.clone()))
            .merge(speech::router(self.state.clone()));

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir =
                ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        let router = router.layer(axum::middleware::from_fn_with_state(
            self.state.clone(),
            rate_limit::rate_limit_middleware,
        ));

        // CORS layer for cross-origin requests from the widget
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(
            port = self.port,
            quotes = self.state.catalog.len(),
            speech_enabled = self.state.speech.speech_enabled(),
            "API server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("API server stopped");
        Ok(())
    }
}

/// Resolve on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
