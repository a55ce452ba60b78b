//! Revenues, expenses, vouchers, and checks.

use super::{
    AppState, DateRange, StatusUpdate,
    extract::{Json, Path, Query},
};
use crate::{
    core::{
        check::{self, CheckFilter, CheckStats},
        expense::{self, ExpenseFilter, ExpenseInput},
        pagination::{Page, PageParams},
        revenue::{self, RevenueFilter, RevenueInput},
        voucher::{
            self, PaymentFilter, PaymentVoucherDetails, PaymentVoucherInput, ReceiptFilter,
            ReceiptVoucherDetails, ReceiptVoucherInput, VoucherStats,
        },
    },
    entities::{
        check_detail, expense as expense_entity, payment_voucher, receipt_voucher,
        revenue as revenue_entity, sea_orm_active_enums::CheckStatus,
    },
    errors::Result,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/revenues", get(list_revenues).post(create_revenue))
        .route(
            "/revenues/:id",
            get(get_revenue).put(update_revenue).delete(delete_revenue),
        )
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/:id",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route(
            "/receipt-vouchers",
            get(list_receipt_vouchers).post(create_receipt_voucher),
        )
        .route(
            "/receipt-vouchers/:id",
            get(get_receipt_voucher)
                .put(update_receipt_voucher)
                .delete(delete_receipt_voucher),
        )
        .route("/receipt-vouchers/stats/summary", get(receipt_stats))
        .route(
            "/payment-vouchers",
            get(list_payment_vouchers).post(create_payment_voucher),
        )
        .route(
            "/payment-vouchers/:id",
            get(get_payment_voucher)
                .put(update_payment_voucher)
                .delete(delete_payment_voucher),
        )
        .route("/payment-vouchers/stats/summary", get(payment_stats))
        .route("/checks", get(list_checks))
        .route("/checks/:id", get(get_check))
        .route("/checks/:id/status", put(set_check_status))
        .route("/checks/stats/summary", get(check_stats))
}

// Revenues

async fn list_revenues(
    State(state): State<AppState>,
    Query(filter): Query<RevenueFilter>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<revenue_entity::Model>>> {
    revenue::list_revenues(&*state.db, &filter, &params)
        .await
        .map(Json)
}

async fn get_revenue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<revenue_entity::Model>> {
    revenue::require_revenue(&*state.db, id).await.map(Json)
}

async fn create_revenue(
    State(state): State<AppState>,
    Json(input): Json<RevenueInput>,
) -> Result<(StatusCode, Json<revenue_entity::Model>)> {
    let model = revenue::create_revenue(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_revenue(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<RevenueInput>,
) -> Result<Json<revenue_entity::Model>> {
    revenue::update_revenue(&*state.db, id, input).await.map(Json)
}

async fn delete_revenue(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    revenue::delete_revenue(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Expenses

async fn list_expenses(
    State(state): State<AppState>,
    Query(filter): Query<ExpenseFilter>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<expense_entity::Model>>> {
    expense::list_expenses(&*state.db, &filter, &params)
        .await
        .map(Json)
}

async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<expense_entity::Model>> {
    expense::require_expense(&*state.db, id).await.map(Json)
}

async fn create_expense(
    State(state): State<AppState>,
    Json(input): Json<ExpenseInput>,
) -> Result<(StatusCode, Json<expense_entity::Model>)> {
    let model = expense::create_expense(&*state.db, input).await?;
    Ok((StatusCode::CREATED, Json(model)))
}

async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ExpenseInput>,
) -> Result<Json<expense_entity::Model>> {
    expense::update_expense(&*state.db, id, input).await.map(Json)
}

async fn delete_expense(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode> {
    expense::delete_expense(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Receipt vouchers

async fn list_receipt_vouchers(
    State(state): State<AppState>,
    Query(filter): Query<ReceiptFilter>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<receipt_voucher::Model>>> {
    voucher::list_receipt_vouchers(&*state.db, &filter, &params)
        .await
        .map(Json)
}

async fn get_receipt_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ReceiptVoucherDetails>> {
    voucher::get_receipt_voucher(&*state.db, id).await.map(Json)
}

async fn create_receipt_voucher(
    State(state): State<AppState>,
    Json(input): Json<ReceiptVoucherInput>,
) -> Result<(StatusCode, Json<ReceiptVoucherDetails>)> {
    let model = voucher::create_receipt_voucher(&*state.db, input).await?;
    let details = voucher::get_receipt_voucher(&*state.db, model.id).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

async fn update_receipt_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ReceiptVoucherInput>,
) -> Result<Json<ReceiptVoucherDetails>> {
    voucher::update_receipt_voucher(&*state.db, id, input).await?;
    voucher::get_receipt_voucher(&*state.db, id).await.map(Json)
}

async fn delete_receipt_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    voucher::delete_receipt_voucher(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn receipt_stats(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<VoucherStats>> {
    voucher::receipt_stats(&*state.db, range.from, range.to)
        .await
        .map(Json)
}

// Payment vouchers

async fn list_payment_vouchers(
    State(state): State<AppState>,
    Query(filter): Query<PaymentFilter>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<payment_voucher::Model>>> {
    voucher::list_payment_vouchers(&*state.db, &filter, &params)
        .await
        .map(Json)
}

async fn get_payment_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PaymentVoucherDetails>> {
    voucher::get_payment_voucher(&*state.db, id).await.map(Json)
}

async fn create_payment_voucher(
    State(state): State<AppState>,
    Json(input): Json<PaymentVoucherInput>,
) -> Result<(StatusCode, Json<PaymentVoucherDetails>)> {
    let model = voucher::create_payment_voucher(&*state.db, input).await?;
    let details = voucher::get_payment_voucher(&*state.db, model.id).await?;
    Ok((StatusCode::CREATED, Json(details)))
}

async fn update_payment_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PaymentVoucherInput>,
) -> Result<Json<PaymentVoucherDetails>> {
    voucher::update_payment_voucher(&*state.db, id, input).await?;
    voucher::get_payment_voucher(&*state.db, id).await.map(Json)
}

async fn delete_payment_voucher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    voucher::delete_payment_voucher(&*state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn payment_stats(
    State(state): State<AppState>,
    Query(range): Query<DateRange>,
) -> Result<Json<VoucherStats>> {
    voucher::payment_stats(&*state.db, range.from, range.to)
        .await
        .map(Json)
}

// Checks

async fn list_checks(
    State(state): State<AppState>,
    Query(filter): Query<CheckFilter>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<check_detail::Model>>> {
    check::list_checks(&*state.db, &filter, &params).await.map(Json)
}

async fn get_check(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<check_detail::Model>> {
    check::require_check(&*state.db, id).await.map(Json)
}

async fn set_check_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate<CheckStatus>>,
) -> Result<Json<check_detail::Model>> {
    check::set_check_status(&*state.db, id, update.status)
        .await
        .map(Json)
}

async fn check_stats(State(state): State<AppState>) -> Result<Json<CheckStats>> {
    let today = chrono::Utc::now().date_naive();
    check::check_stats(&*state.db, today).await.map(Json)
}
