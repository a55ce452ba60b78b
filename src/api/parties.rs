//! Customers, suppliers, employees, and partners (with their capital).

use super::{AppState, SearchQuery, extract::{Json, Path, Query}};
use crate::{
    core::{
        capital::{self, CapitalReconciliation, CapitalStatement},
        customer::{self, CustomerDetails, CustomerInput},
        employee::{self, EmployeeFilter, EmployeeInput},
        pagination::{Page, PageParams},
        partner::{self, PartnerInput},
        supplier::{self, SupplierInput},
    },
    entities,
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/partners", get(list_partners).post(create_partner))
        .route(
            "/partners/:id",
            get(get_partner).put(update_partner).delete(delete_partner),
        )
        .route("/partners/:id/capital", get(capital_statement))
        .route("/partners/:id/capital/reconcile", post(reconcile_partner))
        .route("/partners/capital/reconcile", post(reconcile_all))
}

// Customers

async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<entities::customer::Model>>> {
    customer::list_customers(&*state.db, query.search.as_deref(), &params)
        .await
        .map(Json)
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerDetails>> {
    customer::get_customer_details(&*state.db, id).await.map(Json)
}

async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> Result<(StatusCode, Json<entities::customer::Model>)> {
    let model = customer::create_customer(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CustomerInput>,
) -> Result<Json<entities::customer::Model>> {
    customer::update_customer(&*state.db, id, input).await.map(Json)
}

async fn delete_customer(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    customer::delete_customer(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Suppliers

async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<entities::supplier::Model>>> {
    supplier::list_suppliers(&*state.db, query.search.as_deref(), &params)
        .await
        .map(Json)
}

async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<entities::supplier::Model>> {
    supplier::require_supplier(&*state.db, id).await.map(Json)
}

async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<SupplierInput>,
) -> Result<(StatusCode, Json<entities::supplier::Model>)> {
    let model = supplier::create_supplier(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<SupplierInput>,
) -> Result<Json<entities::supplier::Model>> {
    supplier::update_supplier(&*state.db, id, input).await.map(Json)
}

async fn delete_supplier(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    supplier::delete_supplier(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Employees

async fn list_employees(
    State(state): State<AppState>,
    Query(filter): Query<EmployeeFilter>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<entities::employee::Model>>> {
    employee::list_employees(&*state.db, &filter, &params)
        .await
        .map(Json)
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<entities::employee::Model>> {
    employee::require_employee(&*state.db, id).await.map(Json)
}

async fn create_employee(
    State(state): State<AppState>,
    Json(input): Json<EmployeeInput>,
) -> Result<(StatusCode, Json<entities::employee::Model>)> {
    let model = employee::create_employee(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<EmployeeInput>,
) -> Result<Json<entities::employee::Model>> {
    employee::update_employee(&*state.db, id, input).await.map(Json)
}

async fn delete_employee(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    employee::delete_employee(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Partners

async fn list_partners(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<entities::partner::Model>>> {
    partner::list_partners(&*state.db, query.search.as_deref(), &params)
        .await
        .map(Json)
}

async fn get_partner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<entities::partner::Model>> {
    partner::require_partner(&*state.db, id).await.map(Json)
}

async fn create_partner(
    State(state): State<AppState>,
    Json(input): Json<PartnerInput>,
) -> Result<(StatusCode, Json<entities::partner::Model>)> {
    let model = partner::create_partner(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_partner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PartnerInput>,
) -> Result<Json<entities::partner::Model>> {
    partner::update_partner(&*state.db, id, input).await.map(Json)
}

async fn delete_partner(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    partner::delete_partner(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn capital_statement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CapitalStatement>> {
    capital::capital_statement(&*state.db, id).await.map(Json)
}

async fn reconcile_partner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CapitalReconciliation>> {
    capital::reconcile_partner(&*state.db, id).await.map(Json)
}

async fn reconcile_all(State(state): State<AppState>) -> Result<Json<Vec<CapitalReconciliation>>> {
    capital::reconcile_all(&*state.db).await.map(Json)
}
