//! Revenue types, expense types, and project types.

use super::{AppState, extract::{Json, Path}};
use crate::{
    core::catalog::{self, CatalogInput},
    entities::{expense_type, project_type, revenue_type},
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/revenue-types",
            get(list_revenue_types).post(create_revenue_type),
        )
        .route(
            "/revenue-types/:id",
            get(get_revenue_type)
                .put(update_revenue_type)
                .delete(delete_revenue_type),
        )
        .route(
            "/expense-types",
            get(list_expense_types).post(create_expense_type),
        )
        .route(
            "/expense-types/:id",
            get(get_expense_type)
                .put(update_expense_type)
                .delete(delete_expense_type),
        )
        .route(
            "/project-types",
            get(list_project_types).post(create_project_type),
        )
        .route(
            "/project-types/:id",
            get(get_project_type)
                .put(update_project_type)
                .delete(delete_project_type),
        )
}

async fn list_revenue_types(State(state): State<AppState>) -> Result<Json<Vec<revenue_type::Model>>> {
    catalog::list_revenue_types(&*state.db).await.map(Json)
}

async fn get_revenue_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<revenue_type::Model>> {
    catalog::require_revenue_type(&*state.db, id).await.map(Json)
}

async fn create_revenue_type(
    State(state): State<AppState>,
    Json(input): Json<CatalogInput>,
) -> Result<(StatusCode, Json<revenue_type::Model>)> {
    let model = catalog::create_revenue_type(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_revenue_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CatalogInput>,
) -> Result<Json<revenue_type::Model>> {
    catalog::update_revenue_type(&*state.db, id, input).await.map(Json)
}

async fn delete_revenue_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    catalog::delete_revenue_type(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_expense_types(State(state): State<AppState>) -> Result<Json<Vec<expense_type::Model>>> {
    catalog::list_expense_types(&*state.db).await.map(Json)
}

async fn get_expense_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<expense_type::Model>> {
    catalog::require_expense_type(&*state.db, id).await.map(Json)
}

async fn create_expense_type(
    State(state): State<AppState>,
    Json(input): Json<CatalogInput>,
) -> Result<(StatusCode, Json<expense_type::Model>)> {
    let model = catalog::create_expense_type(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_expense_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CatalogInput>,
) -> Result<Json<expense_type::Model>> {
    catalog::update_expense_type(&*state.db, id, input).await.map(Json)
}

async fn delete_expense_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    catalog::delete_expense_type(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_project_types(State(state): State<AppState>) -> Result<Json<Vec<project_type::Model>>> {
    catalog::list_project_types(&*state.db).await.map(Json)
}

async fn get_project_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<project_type::Model>> {
    catalog::require_project_type(&*state.db, id).await.map(Json)
}

async fn create_project_type(
    State(state): State<AppState>,
    Json(input): Json<CatalogInput>,
) -> Result<(StatusCode, Json<project_type::Model>)> {
    let model = catalog::create_project_type(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_project_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CatalogInput>,
) -> Result<Json<project_type::Model>> {
    catalog::update_project_type(&*state.db, id, input).await.map(Json)
}

async fn delete_project_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    catalog::delete_project_type(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
