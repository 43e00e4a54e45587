//! Quote endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::quotes::{QuoteRecord, format_for_clipboard, format_for_social_share};

/// Build quotes router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/quotes", get(list_quotes))
        .route("/api/quotes/next", get(next_quote))
        .with_state(state)
}

/// Query for the next quote
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    /// Text of the quote currently on screen
    pub current: Option<String>,
}

/// A quote with its ready-to-use share strings
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: QuoteRecord,
    pub clipboard: String,
    pub share: String,
}

/// Pick a quote different from the one currently displayed
async fn next_quote(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<NextQuery>,
) -> Json<QuoteResponse> {
    let quote = state.catalog.select_next(query.current.as_deref());

    Json(QuoteResponse {
        clipboard: format_for_clipboard(quote),
        share: format_for_social_share(quote, &state.share.hashtags, state.share.max_length),
        quote: quote.clone(),
    })
}

/// Query for listing quotes
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Only return quotes with this tag
    pub tag: Option<String>,
}

/// Quote listing
#[derive(Debug, Serialize)]
pub struct QuoteListResponse {
    pub quotes: Vec<QuoteRecord>,
    pub count: usize,
}

/// List the catalog, optionally filtered by tag
async fn list_quotes(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ListQuery>,
) -> Json<QuoteListResponse> {
    let quotes: Vec<QuoteRecord> = match query.tag.as_deref() {
        Some(tag) => state.catalog.with_tag(tag).cloned().collect(),
        None => state.catalog.records().to_vec(),
    };

    Json(QuoteListResponse {
        count: quotes.len(),
        quotes,
    })
}
