//! Ledger and period reports, profit distributions, and company settings.

use super::{AppState, DateRange, extract::{Json, Path, Query}};
use crate::{
    core::{
        ledger::{self, Ledger, PeriodSummary},
        pagination::{Page, PageParams},
        settings::{self, SettingsInput},
        shareen::{self, DistributionPeriod, DistributionPreview},
    },
    entities::{company_settings, shareen as shareen_entity},
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get},
};
use serde::Deserialize;

/// Query string of `GET /shareen`.
#[derive(Debug, Default, Deserialize)]
struct DistributionQuery {
    partner_id: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/ledger", get(ledger_report))
        .route("/reports/summary", get(summary_report))
        .route("/shareen", get(list_distributions).post(record_distribution))
        .route("/shareen/preview", get(preview_distribution))
        .route("/shareen/:id", delete(delete_distribution))
        .route("/settings", get(get_settings).put(save_settings))
}

async fn ledger_report(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<Ledger>> {
    ledger::compute_ledger(&*state.db, range.from, range.to)
        .await
        .map(Json)
}

async fn summary_report(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<PeriodSummary>> {
    ledger::period_summary(&*state.db, range.from, range.to)
        .await
        .map(Json)
}

async fn list_distributions(
    State(state): State<AppState>,
    Query(query): Query<DistributionQuery>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<shareen_entity::Model>>> {
    shareen::list_distributions(&*state.db, query.partner_id, &params)
        .await
        .map(Json)
}

async fn preview_distribution(
    State(state): State<AppState>,
    Query(period): Query<DistributionPeriod>,
) -> Result<Json<DistributionPreview>> {
    shareen::preview_distribution(&*state.db, period)
        .await
        .map(Json)
}

async fn record_distribution(
    State(state): State<AppState>,
    Json(period): Json<DistributionPeriod>,
) -> Result<(StatusCode, Json<Vec<shareen_entity::Model>>)> {
    let rows = shareen::record_distribution(&*state.db, period).await?;
    Ok((StatusCode::CREATED, Json(rows)))
}

async fn delete_distribution(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    shareen::delete_distribution(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_settings(State(state): State<AppState>) -> Result<Json<company_settings::Model>> {
    settings::get_settings(&*state.db).await.map(Json)
}

async fn save_settings(
    State(state): State<AppState>,
    Json(input): Json<SettingsInput>,
) -> Result<Json<company_settings::Model>> {
    settings::upsert_settings(&*state.db, input).await.map(Json)
}
