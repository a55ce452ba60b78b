//! REST surface of the service.
//!
//! Every resource lives under `/api`. When an API token is configured, all
//! routes except `/api/health` require `Authorization: Bearer <token>`.
//! Handlers are thin: they extract the request, call into [`crate::core`], and
//! let [`crate::errors::Error`] render itself as the response on failure.

/// Error to HTTP response mapping
pub mod error;

mod bookkeeping;
mod catalog;
mod extract;
mod parties;
mod reports;
mod sales;

use crate::errors::{Error, Result};
use axum::{
    Json, Router,
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Connection pool shared by all requests
    pub db: Arc<DatabaseConnection>,
    /// Expected bearer token; `None` leaves the API open
    pub api_token: Option<String>,
}

impl AppState {
    /// Bundles the connection and the optional API token.
    #[must_use]
    pub fn new(db: DatabaseConnection, api_token: Option<String>) -> Self {
        Self { db: Arc::new(db), api_token }
    }
}

/// `?search=` on party lists.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    /// Fragment of the name or code
    pub search: Option<String>,
}

/// `?from=&to=` on reports and statistics.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DateRange {
    /// On or after
    pub from: Option<NaiveDate>,
    /// On or before
    pub to: Option<NaiveDate>,
}

/// Body of the `/:id/status` endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct StatusUpdate<S> {
    /// Requested status
    pub status: S,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(parties::routes())
        .merge(catalog::routes())
        .merge(sales::routes())
        .merge(bookkeeping::routes())
        .merge(reports::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .route("/api/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>> {
    state.db.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if let Some(expected) = state.api_token.as_deref() {
        let provided = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        if provided != Some(expected) {
            warn!(path = %request.uri().path(), "rejected request without valid token");
            return Err(Error::Unauthorized);
        }
    }
    Ok(next.run(request).await)
}
