//! Quotations, work orders, and customer reviews.

use super::{AppState, StatusUpdate, extract::{Json, Path, Query}};
use crate::{
    core::{
        pagination::{Page, PageParams},
        quotation::{self, QuotationDetails, QuotationFilter, QuotationInput},
        review::{self, ReviewInput},
        work_order::{self, FromQuotationInput, WorkOrderFilter, WorkOrderInput},
    },
    entities::{
        customer_review,
        quotation as quotation_entity,
        sea_orm_active_enums::{QuotationStatus, WorkOrderStatus},
        work_order as work_order_entity,
    },
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

/// Query string of `GET /reviews`.
#[derive(Debug, Default, Deserialize)]
struct ReviewQuery {
    customer_id: Option<i64>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotations", get(list_quotations).post(create_quotation))
        .route(
            "/quotations/:id",
            get(get_quotation)
                .put(update_quotation)
                .delete(delete_quotation),
        )
        .route("/quotations/:id/status", put(set_quotation_status))
        .route("/quotations/:id/work-order", post(create_from_quotation))
        .route("/work-orders", get(list_work_orders).post(create_work_order))
        .route(
            "/work-orders/:id",
            get(get_work_order)
                .put(update_work_order)
                .delete(delete_work_order),
        )
        .route("/work-orders/:id/status", put(set_work_order_status))
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/:id", delete(delete_review))
}

// Quotations

async fn list_quotations(
    State(state): State<AppState>,
    Query(filter): Query<QuotationFilter>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<quotation_entity::Model>>> {
    quotation::list_quotations(&*state.db, &filter, &params)
        .await
        .map(Json)
}

async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<QuotationDetails>> {
    quotation::get_quotation(&*state.db, id).await.map(Json)
}

async fn create_quotation(
    State(state): State<AppState>,
    Json(input): Json<QuotationInput>,
) -> Result<(StatusCode, Json<QuotationDetails>)> {
    let model = quotation::create_quotation(&*state.db, input).await?;
    let details = quotation::get_quotation(&*state.db, model.id).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

async fn update_quotation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<QuotationInput>,
) -> Result<Json<QuotationDetails>> {
    quotation::update_quotation(&*state.db, id, input).await?;
    quotation::get_quotation(&*state.db, id).await.map(Json)
}

async fn set_quotation_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate<QuotationStatus>>,
) -> Result<Json<quotation_entity::Model>> {
    quotation::set_quotation_status(&*state.db, id, update.status)
        .await
        .map(Json)
}

async fn delete_quotation(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    quotation::delete_quotation(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_from_quotation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    input: Option<Json<FromQuotationInput>>,
) -> Result<(StatusCode, Json<work_order_entity::Model>)> {
    let input = input.map(|Json(input)| input).unwrap_or_default();
    let model = work_order::create_from_quotation(&*state.db, id, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

// Work orders

async fn list_work_orders(
    State(state): State<AppState>,
    Query(filter): Query<WorkOrderFilter>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<work_order_entity::Model>>> {
    work_order::list_work_orders(&*state.db, &filter, &params)
        .await
        .map(Json)
}

async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<work_order_entity::Model>> {
    work_order::require_work_order(&*state.db, id).await.map(Json)
}

async fn create_work_order(
    State(state): State<AppState>,
    Json(input): Json<WorkOrderInput>,
) -> Result<(StatusCode, Json<work_order_entity::Model>)> {
    let model = work_order::create_work_order(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<WorkOrderInput>,
) -> Result<Json<work_order_entity::Model>> {
    work_order::update_work_order(&*state.db, id, input)
        .await
        .map(Json)
}

async fn set_work_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate<WorkOrderStatus>>,
) -> Result<Json<work_order_entity::Model>> {
    work_order::set_work_order_status(&*state.db, id, update.status)
        .await
        .map(Json)
}

async fn delete_work_order(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    work_order::delete_work_order(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Reviews

async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<customer_review::Model>>> {
    review::list_reviews(&*state.db, query.customer_id, &params)
        .await
        .map(Json)
}

async fn create_review(
    State(state): State<AppState>,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<customer_review::Model>)> {
    let model = review::create_review(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn delete_review(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    review::delete_review(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
