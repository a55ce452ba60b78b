//! Receipt and payment vouchers.
//!
//! Every write runs in one database transaction that also:
//! * inserts, updates, or removes the voucher's check row when it is paid by check;
//! * moves the partner's `current_capital` for capital receipts (`+amount`) and
//!   partner withdrawals (`-amount`).
//!
//! Either all of it is committed or none of it is.

use crate::{
    core::{
        capital,
        check::{self, CheckInput},
        codes,
        customer::require_customer,
        employee::require_employee,
        pagination::{self, Page, PageParams},
        partner::require_partner,
        supplier::require_supplier,
        validate,
    },
    entities::{
        CheckDetail, PaymentVoucher, ReceiptVoucher, check_detail, payment_voucher,
        receipt_voucher,
        sea_orm_active_enums::{CheckDirection, PaymentBeneficiary, PaymentMethod, ReceiptSource},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Iterable, QueryOrder, Select, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, info, instrument};

const RECEIPT: &str = "receipt voucher";
const PAYMENT: &str = "payment voucher";

/// Capital deltas smaller than this are not written.
const MIN_CAPITAL_DELTA: f64 = 0.005;

/// Fields accepted when creating or updating a receipt voucher.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptVoucherInput {
    /// Explicit code; generated when absent on create, kept when absent on update
    pub code: Option<String>,
    /// Date the money was received
    pub date: NaiveDate,
    /// Amount received
    pub amount: f64,
    /// Origin of the money
    pub source: ReceiptSource,
    /// Required when `source` is `customer`
    pub customer_id: Option<i64>,
    /// Required when `source` is `partner_capital`
    pub partner_id: Option<i64>,
    /// Settlement method
    pub payment_method: PaymentMethod,
    /// Required when `payment_method` is `check`
    pub check: Option<CheckInput>,
    /// Free-form description
    pub description: Option<String>,
}

/// Fields accepted when creating or updating a payment voucher.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentVoucherInput {
    /// Explicit code; generated when absent on create, kept when absent on update
    pub code: Option<String>,
    /// Date the money was paid
    pub date: NaiveDate,
    /// Amount paid
    pub amount: f64,
    /// Kind of recipient
    pub beneficiary: PaymentBeneficiary,
    /// Required when `beneficiary` is `supplier`
    pub supplier_id: Option<i64>,
    /// Required when `beneficiary` is `employee`
    pub employee_id: Option<i64>,
    /// Required when `beneficiary` is `partner_withdrawal`
    pub partner_id: Option<i64>,
    /// Settlement method
    pub payment_method: PaymentMethod,
    /// Required when `payment_method` is `check`
    pub check: Option<CheckInput>,
    /// Free-form description
    pub description: Option<String>,
}

/// A receipt voucher together with its check, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiptVoucherDetails {
    /// The voucher
    #[serde(flatten)]
    pub voucher: receipt_voucher::Model,
    /// Attached check
    pub check: Option<check_detail::Model>,
}

/// A payment voucher together with its check, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentVoucherDetails {
    /// The voucher
    #[serde(flatten)]
    pub voucher: payment_voucher::Model,
    /// Attached check
    pub check: Option<check_detail::Model>,
}

/// Filters for [`list_receipt_vouchers`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiptFilter {
    /// Dated on or after
    pub date_from: Option<NaiveDate>,
    /// Dated on or before
    pub date_to: Option<NaiveDate>,
    /// Only this source
    pub source: Option<ReceiptSource>,
    /// Only this settlement method
    pub payment_method: Option<PaymentMethod>,
    /// Only this customer
    pub customer_id: Option<i64>,
    /// Only this partner
    pub partner_id: Option<i64>,
}

/// Filters for [`list_payment_vouchers`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentFilter {
    /// Dated on or after
    pub date_from: Option<NaiveDate>,
    /// Dated on or before
    pub date_to: Option<NaiveDate>,
    /// Only this beneficiary kind
    pub beneficiary: Option<PaymentBeneficiary>,
    /// Only this settlement method
    pub payment_method: Option<PaymentMethod>,
    /// Only this supplier
    pub supplier_id: Option<i64>,
    /// Only this employee
    pub employee_id: Option<i64>,
    /// Only this partner
    pub partner_id: Option<i64>,
}

/// Count and total of the vouchers settled one way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodTotal {
    /// Settlement method
    pub method: PaymentMethod,
    /// Number of vouchers
    pub count: u64,
    /// Sum of their amounts
    pub total: f64,
}

/// Totals of a set of vouchers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoucherStats {
    /// Number of vouchers
    pub count: u64,
    /// Sum of their amounts
    pub total: f64,
    /// Breakdown per settlement method
    pub by_method: Vec<MethodTotal>,
}

// ---------------------------------------------------------------------------
// Shared rules
// ---------------------------------------------------------------------------

/// Enforces "`field` is set exactly when `required`".
fn reference_rule(id: Option<i64>, required: bool, field: &str, kind: impl Display) -> Result<()> {
    match (required, id) {
        (true, None) => Err(Error::validation(format!("{field} is required for {kind}"))),
        (false, Some(_)) => Err(Error::validation(format!(
            "{field} must not be set for {kind}"
        ))),
        _ => Ok(()),
    }
}

/// Check details must accompany exactly the vouchers paid by check.
fn check_rule(method: PaymentMethod, check: Option<&CheckInput>) -> Result<()> {
    match (method, check) {
        (PaymentMethod::Check, None) => Err(Error::validation(
            "Check details are required when paying by check",
        )),
        (PaymentMethod::Check, Some(_)) | (_, None) => Ok(()),
        (other, Some(_)) => Err(Error::validation(format!(
            "Check details are only allowed when paying by check, not {other}"
        ))),
    }
}

fn validate_receipt(input: &ReceiptVoucherInput) -> Result<()> {
    validate::positive_amount(input.amount)?;
    let kind = format!("source '{}'", input.source);
    reference_rule(
        input.customer_id,
        input.source == ReceiptSource::Customer,
        "customer_id",
        &kind,
    )?;
    reference_rule(
        input.partner_id,
        input.source == ReceiptSource::PartnerCapital,
        "partner_id",
        &kind,
    )?;
    check_rule(input.payment_method, input.check.as_ref())
}

fn validate_payment(input: &PaymentVoucherInput) -> Result<()> {
    validate::positive_amount(input.amount)?;
    let kind = format!("beneficiary '{}'", input.beneficiary);
    reference_rule(
        input.supplier_id,
        input.beneficiary == PaymentBeneficiary::Supplier,
        "supplier_id",
        &kind,
    )?;
    reference_rule(
        input.employee_id,
        input.beneficiary == PaymentBeneficiary::Employee,
        "employee_id",
        &kind,
    )?;
    reference_rule(
        input.partner_id,
        input.beneficiary == PaymentBeneficiary::PartnerWithdrawal,
        "partner_id",
        &kind,
    )?;
    check_rule(input.payment_method, input.check.as_ref())
}

/// Capital delta a receipt applies, as `(partner_id, delta)`.
fn receipt_capital_effect(
    source: ReceiptSource,
    partner_id: Option<i64>,
    amount: f64,
) -> Option<(i64, f64)> {
    match (source, partner_id) {
        (ReceiptSource::PartnerCapital, Some(partner_id)) => Some((partner_id, amount)),
        _ => None,
    }
}

/// Capital delta a payment applies, as `(partner_id, delta)`.
fn payment_capital_effect(
    beneficiary: PaymentBeneficiary,
    partner_id: Option<i64>,
    amount: f64,
) -> Option<(i64, f64)> {
    match (beneficiary, partner_id) {
        (PaymentBeneficiary::PartnerWithdrawal, Some(partner_id)) => Some((partner_id, -amount)),
        _ => None,
    }
}

/// Undoes `reverse` and applies `apply`, netting the two when they hit the same partner.
async fn apply_capital_change<C>(
    db: &C,
    reverse: Option<(i64, f64)>,
    apply: Option<(i64, f64)>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut deltas: Vec<(i64, f64)> = Vec::with_capacity(2);
    if let Some((partner_id, delta)) = reverse {
        deltas.push((partner_id, -delta));
    }
    if let Some((partner_id, delta)) = apply {
        match deltas.iter_mut().find(|(id, _)| *id == partner_id) {
            Some((_, existing)) => *existing += delta,
            None => deltas.push((partner_id, delta)),
        }
    }

    for (partner_id, delta) in deltas {
        let delta = validate::round2(delta);
        if delta.abs() >= MIN_CAPITAL_DELTA {
            let partner = capital::adjust_capital(db, partner_id, delta).await?;
            debug!(partner_id, delta, current_capital = partner.current_capital, "capital adjusted");
        }
    }
    Ok(())
}

/// Brings a voucher's check row in line with its new settlement.
///
/// Returns the check id the voucher should point at and, separately, a check row
/// that must be deleted once the voucher no longer references it.
async fn sync_check<C>(
    db: &C,
    current: Option<i64>,
    check: Option<CheckInput>,
    amount: f64,
    direction: CheckDirection,
) -> Result<(Option<i64>, Option<i64>)>
where
    C: ConnectionTrait,
{
    match (current, check) {
        (Some(check_id), Some(input)) => {
            let existing = check::require_check(db, check_id).await?;
            let mut model: check_detail::ActiveModel = existing.into();
            model.check_number = Set(validate::required_text(&input.check_number, "Check number")?);
            model.bank_name = Set(validate::required_text(&input.bank_name, "Bank name")?);
            model.due_date = Set(input.due_date);
            model.amount = Set(amount);
            model.update(db).await?;
            Ok((Some(check_id), None))
        }
        (None, Some(input)) => {
            let created = check::insert_check(db, input, amount, direction).await?;
            Ok((Some(created.id), None))
        }
        (Some(check_id), None) => Ok((None, Some(check_id))),
        (None, None) => Ok((None, None)),
    }
}

async fn delete_check_row<C>(db: &C, check_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(check_id) = check_id {
        CheckDetail::delete_by_id(check_id).exec(db).await?;
    }
    Ok(())
}

fn summarize<I>(rows: I) -> VoucherStats
where
    I: IntoIterator<Item = (PaymentMethod, f64)>,
{
    let rows: Vec<(PaymentMethod, f64)> = rows.into_iter().collect();
    let by_method = PaymentMethod::iter()
        .map(|method| {
            let amounts: Vec<f64> = rows
                .iter()
                .filter(|(m, _)| *m == method)
                .map(|(_, amount)| *amount)
                .collect();
            MethodTotal {
                method,
                count: amounts.len() as u64,
                total: validate::round2(amounts.iter().sum()),
            }
        })
        .collect();

    VoucherStats {
        count: rows.len() as u64,
        total: validate::round2(rows.iter().map(|(_, amount)| amount).sum()),
        by_method,
    }
}

// ---------------------------------------------------------------------------
// Receipt vouchers
// ---------------------------------------------------------------------------

/// Finds a receipt voucher by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_receipt_voucher<C>(db: &C, id: i64) -> Result<receipt_voucher::Model>
where
    C: ConnectionTrait,
{
    ReceiptVoucher::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(RECEIPT, id))
}

/// Returns a receipt voucher with its check.
pub async fn get_receipt_voucher(db: &DatabaseConnection, id: i64) -> Result<ReceiptVoucherDetails> {
    let voucher = require_receipt_voucher(db, id).await?;
    let check = match voucher.check_id {
        Some(check_id) => CheckDetail::find_by_id(check_id).one(db).await?,
        None => None,
    };
    Ok(ReceiptVoucherDetails { voucher, check })
}

fn receipt_query(filter: &ReceiptFilter) -> Select<ReceiptVoucher> {
    let mut query = ReceiptVoucher::find();
    if let Some(from) = filter.date_from {
        query = query.filter(receipt_voucher::Column::Date.gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(receipt_voucher::Column::Date.lte(to));
    }
    if let Some(source) = filter.source {
        query = query.filter(receipt_voucher::Column::Source.eq(source));
    }
    if let Some(method) = filter.payment_method {
        query = query.filter(receipt_voucher::Column::PaymentMethod.eq(method));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(receipt_voucher::Column::CustomerId.eq(customer_id));
    }
    if let Some(partner_id) = filter.partner_id {
        query = query.filter(receipt_voucher::Column::PartnerId.eq(partner_id));
    }
    query
}

/// Lists receipt vouchers, newest first.
pub async fn list_receipt_vouchers(
    db: &DatabaseConnection,
    filter: &ReceiptFilter,
    params: &PageParams,
) -> Result<Page<receipt_voucher::Model>> {
    validate::date_order(filter.date_from, filter.date_to, "Receipt date range")?;
    let query = receipt_query(filter)
        .order_by_desc(receipt_voucher::Column::Date)
        .order_by_desc(receipt_voucher::Column::Id);
    pagination::fetch_page(db, query, params).await
}

async fn ensure_receipt_references<C>(db: &C, input: &ReceiptVoucherInput) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(customer_id) = input.customer_id {
        require_customer(db, customer_id).await?;
    }
    if let Some(partner_id) = input.partner_id {
        require_partner(db, partner_id).await?;
    }
    Ok(())
}

/// Records money received.
///
/// Capital receipts raise the partner's capital in the same transaction.
#[instrument(skip(db, input), fields(amount = input.amount, source = %input.source))]
pub async fn create_receipt_voucher(
    db: &DatabaseConnection,
    input: ReceiptVoucherInput,
) -> Result<receipt_voucher::Model> {
    validate_receipt(&input)?;
    let amount = validate::round2(input.amount);

    let txn = db.begin().await?;

    ensure_receipt_references(&txn, &input).await?;
    let code = codes::resolve_new_code::<ReceiptVoucher, _>(
        &txn,
        receipt_voucher::Column::Code,
        codes::RECEIPT_VOUCHER,
        input.code.as_deref(),
        RECEIPT,
    )
    .await?;

    let check_id = match input.check {
        Some(check) => Some(
            check::insert_check(&txn, check, amount, CheckDirection::Incoming)
                .await?
                .id,
        ),
        None => None,
    };

    let voucher = receipt_voucher::ActiveModel {
        code: Set(code),
        date: Set(input.date),
        amount: Set(amount),
        source: Set(input.source),
        customer_id: Set(input.customer_id),
        partner_id: Set(input.partner_id),
        payment_method: Set(input.payment_method),
        check_id: Set(check_id),
        description: Set(validate::optional_text(input.description)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    apply_capital_change(
        &txn,
        None,
        receipt_capital_effect(voucher.source, voucher.partner_id, voucher.amount),
    )
    .await?;

    txn.commit().await?;

    info!(voucher_id = voucher.id, code = %voucher.code, "receipt voucher created");
    Ok(voucher)
}

/// Replaces a receipt voucher, moving capital by the difference between the old
/// and the new effect.
#[instrument(skip(db, input))]
pub async fn update_receipt_voucher(
    db: &DatabaseConnection,
    id: i64,
    input: ReceiptVoucherInput,
) -> Result<receipt_voucher::Model> {
    validate_receipt(&input)?;
    let amount = validate::round2(input.amount);

    let txn = db.begin().await?;

    let existing = require_receipt_voucher(&txn, id).await?;
    ensure_receipt_references(&txn, &input).await?;

    let code = match validate::optional_text(input.code) {
        Some(code) if code != existing.code => {
            if codes::code_taken::<ReceiptVoucher, _>(
                &txn,
                receipt_voucher::Column::Code,
                &code,
                Some((receipt_voucher::Column::Id, id)),
            )
            .await?
            {
                return Err(Error::DuplicateCode {
                    entity: RECEIPT,
                    code,
                });
            }
            code
        }
        _ => existing.code.clone(),
    };

    let old_effect = receipt_capital_effect(existing.source, existing.partner_id, existing.amount);
    let (check_id, stale_check) = sync_check(
        &txn,
        existing.check_id,
        input.check,
        amount,
        CheckDirection::Incoming,
    )
    .await?;

    let mut model: receipt_voucher::ActiveModel = existing.into();
    model.code = Set(code);
    model.date = Set(input.date);
    model.amount = Set(amount);
    model.source = Set(input.source);
    model.customer_id = Set(input.customer_id);
    model.partner_id = Set(input.partner_id);
    model.payment_method = Set(input.payment_method);
    model.check_id = Set(check_id);
    model.description = Set(validate::optional_text(input.description));
    let updated = model.update(&txn).await?;

    delete_check_row(&txn, stale_check).await?;
    apply_capital_change(
        &txn,
        old_effect,
        receipt_capital_effect(updated.source, updated.partner_id, updated.amount),
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a receipt voucher and its check, reversing any capital it added.
///
/// Fails with [`Error::InsufficientCapital`] when the partner has since withdrawn
/// the money and the reversal would leave negative capital.
#[instrument(skip(db))]
pub async fn delete_receipt_voucher(db: &DatabaseConnection, id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let voucher = require_receipt_voucher(&txn, id).await?;
    let effect = receipt_capital_effect(voucher.source, voucher.partner_id, voucher.amount);
    let check_id = voucher.check_id;

    apply_capital_change(&txn, effect, None).await?;
    voucher.delete(&txn).await?;
    delete_check_row(&txn, check_id).await?;

    txn.commit().await?;
    info!(voucher_id = id, "receipt voucher deleted");
    Ok(())
}

/// Totals receipt vouchers dated within the optional range.
pub async fn receipt_stats(
    db: &DatabaseConnection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<VoucherStats> {
    validate::date_order(from, to, "Receipt date range")?;
    let vouchers = receipt_query(&ReceiptFilter {
        date_from: from,
        date_to: to,
        ..Default::default()
    })
    .all(db)
    .await?;
    Ok(summarize(
        vouchers.into_iter().map(|v| (v.payment_method, v.amount)),
    ))
}

// ---------------------------------------------------------------------------
// Payment vouchers
// ---------------------------------------------------------------------------

/// Finds a payment voucher by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_payment_voucher<C>(db: &C, id: i64) -> Result<payment_voucher::Model>
where
    C: ConnectionTrait,
{
    PaymentVoucher::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(PAYMENT, id))
}

/// Returns a payment voucher with its check.
pub async fn get_payment_voucher(db: &DatabaseConnection, id: i64) -> Result<PaymentVoucherDetails> {
    let voucher = require_payment_voucher(db, id).await?;
    let check = match voucher.check_id {
        Some(check_id) => CheckDetail::find_by_id(check_id).one(db).await?,
        None => None,
    };
    Ok(PaymentVoucherDetails { voucher, check })
}

fn payment_query(filter: &PaymentFilter) -> Select<PaymentVoucher> {
    let mut query = PaymentVoucher::find();
    if let Some(from) = filter.date_from {
        query = query.filter(payment_voucher::Column::Date.gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(payment_voucher::Column::Date.lte(to));
    }
    if let Some(beneficiary) = filter.beneficiary {
        query = query.filter(payment_voucher::Column::Beneficiary.eq(beneficiary));
    }
    if let Some(method) = filter.payment_method {
        query = query.filter(payment_voucher::Column::PaymentMethod.eq(method));
    }
    if let Some(supplier_id) = filter.supplier_id {
        query = query.filter(payment_voucher::Column::SupplierId.eq(supplier_id));
    }
    if let Some(employee_id) = filter.employee_id {
        query = query.filter(payment_voucher::Column::EmployeeId.eq(employee_id));
    }
    if let Some(partner_id) = filter.partner_id {
        query = query.filter(payment_voucher::Column::PartnerId.eq(partner_id));
    }
    query
}

/// Lists payment vouchers, newest first.
pub async fn list_payment_vouchers(
    db: &DatabaseConnection,
    filter: &PaymentFilter,
    params: &PageParams,
) -> Result<Page<payment_voucher::Model>> {
    validate::date_order(filter.date_from, filter.date_to, "Payment date range")?;
    let query = payment_query(filter)
        .order_by_desc(payment_voucher::Column::Date)
        .order_by_desc(payment_voucher::Column::Id);
    pagination::fetch_page(db, query, params).await
}

async fn ensure_payment_references<C>(db: &C, input: &PaymentVoucherInput) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(supplier_id) = input.supplier_id {
        require_supplier(db, supplier_id).await?;
    }
    if let Some(employee_id) = input.employee_id {
        require_employee(db, employee_id).await?;
    }
    if let Some(partner_id) = input.partner_id {
        require_partner(db, partner_id).await?;
    }
    Ok(())
}

/// Records money paid out.
///
/// Partner withdrawals lower the partner's capital in the same transaction and
/// fail with [`Error::InsufficientCapital`] when they exceed it.
#[instrument(skip(db, input), fields(amount = input.amount, beneficiary = %input.beneficiary))]
pub async fn create_payment_voucher(
    db: &DatabaseConnection,
    input: PaymentVoucherInput,
) -> Result<payment_voucher::Model> {
    validate_payment(&input)?;
    let amount = validate::round2(input.amount);

    let txn = db.begin().await?;

    ensure_payment_references(&txn, &input).await?;
    let code = codes::resolve_new_code::<PaymentVoucher, _>(
        &txn,
        payment_voucher::Column::Code,
        codes::PAYMENT_VOUCHER,
        input.code.as_deref(),
        PAYMENT,
    )
    .await?;

    let check_id = match input.check {
        Some(check) => Some(
            check::insert_check(&txn, check, amount, CheckDirection::Outgoing)
                .await?
                .id,
        ),
        None => None,
    };

    let voucher = payment_voucher::ActiveModel {
        code: Set(code),
        date: Set(input.date),
        amount: Set(amount),
        beneficiary: Set(input.beneficiary),
        supplier_id: Set(input.supplier_id),
        employee_id: Set(input.employee_id),
        partner_id: Set(input.partner_id),
        payment_method: Set(input.payment_method),
        check_id: Set(check_id),
        description: Set(validate::optional_text(input.description)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    apply_capital_change(
        &txn,
        None,
        payment_capital_effect(voucher.beneficiary, voucher.partner_id, voucher.amount),
    )
    .await?;

    txn.commit().await?;

    info!(voucher_id = voucher.id, code = %voucher.code, "payment voucher created");
    Ok(voucher)
}

/// Replaces a payment voucher, moving capital by the difference between the old
/// and the new effect.
#[instrument(skip(db, input))]
pub async fn update_payment_voucher(
    db: &DatabaseConnection,
    id: i64,
    input: PaymentVoucherInput,
) -> Result<payment_voucher::Model> {
    validate_payment(&input)?;
    let amount = validate::round2(input.amount);

    let txn = db.begin().await?;

    let existing = require_payment_voucher(&txn, id).await?;
    ensure_payment_references(&txn, &input).await?;

    let code = match validate::optional_text(input.code) {
        Some(code) if code != existing.code => {
            if codes::code_taken::<PaymentVoucher, _>(
                &txn,
                payment_voucher::Column::Code,
                &code,
                Some((payment_voucher::Column::Id, id)),
            )
            .await?
            {
                return Err(Error::DuplicateCode {
                    entity: PAYMENT,
                    code,
                });
            }
            code
        }
        _ => existing.code.clone(),
    };

    let old_effect =
        payment_capital_effect(existing.beneficiary, existing.partner_id, existing.amount);
    let (check_id, stale_check) = sync_check(
        &txn,
        existing.check_id,
        input.check,
        amount,
        CheckDirection::Outgoing,
    )
    .await?;

    let mut model: payment_voucher::ActiveModel = existing.into();
    model.code = Set(code);
    model.date = Set(input.date);
    model.amount = Set(amount);
    model.beneficiary = Set(input.beneficiary);
    model.supplier_id = Set(input.supplier_id);
    model.employee_id = Set(input.employee_id);
    model.partner_id = Set(input.partner_id);
    model.payment_method = Set(input.payment_method);
    model.check_id = Set(check_id);
    model.description = Set(validate::optional_text(input.description));
    let updated = model.update(&txn).await?;

    delete_check_row(&txn, stale_check).await?;
    apply_capital_change(
        &txn,
        old_effect,
        payment_capital_effect(updated.beneficiary, updated.partner_id, updated.amount),
    )
    .await?;

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a payment voucher and its check, giving any withdrawn capital back.
#[instrument(skip(db))]
pub async fn delete_payment_voucher(db: &DatabaseConnection, id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let voucher = require_payment_voucher(&txn, id).await?;
    let effect = payment_capital_effect(voucher.beneficiary, voucher.partner_id, voucher.amount);
    let check_id = voucher.check_id;

    apply_capital_change(&txn, effect, None).await?;
    voucher.delete(&txn).await?;
    delete_check_row(&txn, check_id).await?;

    txn.commit().await?;
    info!(voucher_id = id, "payment voucher deleted");
    Ok(())
}

/// Totals payment vouchers dated within the optional range.
pub async fn payment_stats(
    db: &DatabaseConnection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<VoucherStats> {
    validate::date_order(from, to, "Payment date range")?;
    let vouchers = payment_query(&PaymentFilter {
        date_from: from,
        date_to: to,
        ..Default::default()
    })
    .all(db)
    .await?;
    Ok(summarize(
        vouchers.into_iter().map(|v| (v.payment_method, v.amount)),
    ))
}
