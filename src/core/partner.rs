//! Partner business logic - partner records and their profit shares.
//!
//! Capital movements live in [`crate::core::capital`]; this module only keeps
//! `current_capital` in step when `initial_capital` itself is edited.

use crate::{
    core::{
        capital, codes,
        guard::DeleteGuard,
        pagination::{self, Page, PageParams},
        validate,
    },
    entities::{
        Partner, PaymentVoucher, ReceiptVoucher, Shareen, partner, payment_voucher,
        receipt_voucher, shareen,
    },
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

const ENTITY: &str = "partner";

/// Tolerance used when comparing share totals against 100 %.
const SHARE_EPSILON: f64 = 1e-9;

/// Fields accepted when creating or updating a partner.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerInput {
    /// Explicit code; generated when absent on create, kept when absent on update
    pub code: Option<String>,
    /// Full name
    pub name: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Share of profits in percent
    #[serde(default)]
    pub share_percentage: f64,
    /// Capital contributed when joining
    #[serde(default)]
    pub initial_capital: f64,
}

/// Lists partners ordered by code, optionally filtered by a name/code substring.
pub async fn list_partners(
    db: &DatabaseConnection,
    search: Option<&str>,
    params: &PageParams,
) -> Result<Page<partner::Model>> {
    let mut query = Partner::find().order_by_asc(partner::Column::Code);
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(partner::Column::Name.contains(term))
                .add(partner::Column::Code.contains(term)),
        );
    }
    pagination::fetch_page(db, query, params).await
}

/// Returns every partner ordered by code.
pub async fn get_all_partners<C>(db: &C) -> Result<Vec<partner::Model>>
where
    C: ConnectionTrait,
{
    Partner::find()
        .order_by_asc(partner::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a partner by primary key, failing with [`Error::NotFound`] when absent.
pub async fn require_partner<C>(db: &C, partner_id: i64) -> Result<partner::Model>
where
    C: ConnectionTrait,
{
    Partner::find_by_id(partner_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(ENTITY, partner_id))
}

/// Ensures the shares of all partners, with `partner_id` set to `share`, do not exceed 100 %.
async fn check_share_total<C>(db: &C, partner_id: Option<i64>, share: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    let others: f64 = get_all_partners(db)
        .await?
        .iter()
        .filter(|p| Some(p.id) != partner_id)
        .map(|p| p.share_percentage)
        .sum();

    if others + share > 100.0 + SHARE_EPSILON {
        return Err(Error::validation(format!(
            "Partner shares would total {:.2}%, more than 100%",
            others + share
        )));
    }
    Ok(())
}

/// Creates a partner. `current_capital` starts equal to `initial_capital`.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_partner(
    db: &DatabaseConnection,
    input: PartnerInput,
) -> Result<partner::Model> {
    let name = validate::required_text(&input.name, "Partner name")?;
    let email = validate::optional_email(input.email)?;
    let share = validate::percentage(input.share_percentage, "Share percentage")?;
    let initial_capital = validate::non_negative_amount(input.initial_capital)?;

    let txn = db.begin().await?;

    check_share_total(&txn, None, share).await?;
    let code = codes::resolve_new_code::<Partner, _>(
        &txn,
        partner::Column::Code,
        codes::PARTNER,
        input.code.as_deref(),
        ENTITY,
    )
    .await?;

    let model = partner::ActiveModel {
        code: Set(code),
        name: Set(name),
        phone: Set(validate::optional_text(input.phone)),
        email: Set(email),
        share_percentage: Set(share),
        initial_capital: Set(initial_capital),
        current_capital: Set(initial_capital),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(partner_id = model.id, code = %model.code, initial_capital, "partner created");
    Ok(model)
}

/// Replaces a partner's fields.
///
/// A change of `initial_capital` moves `current_capital` by the same delta so the
/// capital invariant keeps holding.
#[instrument(skip(db, input))]
pub async fn update_partner(
    db: &DatabaseConnection,
    partner_id: i64,
    input: PartnerInput,
) -> Result<partner::Model> {
    let name = validate::required_text(&input.name, "Partner name")?;
    let email = validate::optional_email(input.email)?;
    let share = validate::percentage(input.share_percentage, "Share percentage")?;
    let initial_capital = validate::non_negative_amount(input.initial_capital)?;

    let txn = db.begin().await?;

    let existing = require_partner(&txn, partner_id).await?;
    check_share_total(&txn, Some(partner_id), share).await?;

    let code = match validate::optional_text(input.code) {
        Some(code) if code != existing.code => {
            if codes::code_taken::<Partner, _>(
                &txn,
                partner::Column::Code,
                &code,
                Some((partner::Column::Id, partner_id)),
            )
            .await?
            {
                return Err(Error::DuplicateCode { entity: ENTITY, code });
            }
            code
        }
        _ => existing.code.clone(),
    };

    let capital_delta = validate::round2(initial_capital - existing.initial_capital);
    if existing.current_capital + capital_delta < 0.0 {
        return Err(Error::InsufficientCapital {
            partner_id,
            available: existing.current_capital,
            required: -capital_delta,
        });
    }

    let mut model: partner::ActiveModel = existing.into();
    model.code = Set(code);
    model.name = Set(name);
    model.phone = Set(validate::optional_text(input.phone));
    model.email = Set(email);
    model.share_percentage = Set(share);
    model.initial_capital = Set(initial_capital);
    model.update(&txn).await?;

    let updated = if capital_delta.abs() < f64::EPSILON {
        require_partner(&txn, partner_id).await?
    } else {
        capital::adjust_capital(&txn, partner_id, capital_delta).await?
    };

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a partner that has no capital vouchers or profit distributions.
#[instrument(skip(db))]
pub async fn delete_partner(db: &DatabaseConnection, partner_id: i64) -> Result<()> {
    let partner = require_partner(db, partner_id).await?;

    DeleteGuard::new(ENTITY, partner_id)
        .check::<ReceiptVoucher, _>(
            db,
            receipt_voucher::Column::PartnerId.eq(partner_id),
            "receipt voucher(s)",
        )
        .await?
        .check::<PaymentVoucher, _>(
            db,
            payment_voucher::Column::PartnerId.eq(partner_id),
            "payment voucher(s)",
        )
        .await?
        .check::<Shareen, _>(
            db,
            shareen::Column::PartnerId.eq(partner_id),
            "profit distribution(s)",
        )
        .await?
        .finish()?;

    partner.delete(db).await?;
    info!(partner_id, "partner deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_partner_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_partner(
            &db,
            PartnerInput {
                name: "Khalid".to_string(),
                share_percentage: 120.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        let result = create_partner(
            &db,
            PartnerInput {
                name: "Khalid".to_string(),
                share_percentage: 50.0,
                initial_capital: -10.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: _ })));
    }

    #[tokio::test]
    async fn test_create_partner_sets_current_capital() -> Result<()> {
        let db = setup_test_db().await?;
        let partner = create_test_partner(&db, "Khalid", 50.0, 10_000.0).await?;

        assert_eq!(partner.code, "PRT-0001");
        assert_eq!(partner.initial_capital, 10_000.0);
        assert_eq!(partner.current_capital, 10_000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_share_total_cannot_exceed_hundred() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_partner(&db, "A", 60.0, 0.0).await?;
        let b = create_test_partner(&db, "B", 40.0, 0.0).await?;

        let result = create_test_partner(&db, "C", 0.5, 0.0).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));

        // Updating B to the same share is fine; raising it is not
        update_partner(
            &db,
            b.id,
            PartnerInput {
                name: "B".to_string(),
                share_percentage: 40.0,
                ..Default::default()
            },
        )
        .await?;
        let result = update_partner(
            &db,
            b.id,
            PartnerInput {
                name: "B".to_string(),
                share_percentage: 41.0,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_initial_capital_shifts_current_capital() -> Result<()> {
        let db = setup_test_db().await?;
        let partner = create_test_partner(&db, "Khalid", 50.0, 10_000.0).await?;
        create_test_capital_receipt(&db, partner.id, 2_500.0).await?;

        let updated = update_partner(
            &db,
            partner.id,
            PartnerInput {
                name: "Khalid".to_string(),
                share_percentage: 50.0,
                initial_capital: 12_000.0,
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.initial_capital, 12_000.0);
        assert_eq!(updated.current_capital, 14_500.0);
        assert_eq!(capital::compute_capital(&db, partner.id).await?, 14_500.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_partner_with_vouchers_is_refused() -> Result<()> {
        let db = setup_test_db().await?;
        let partner = create_test_partner(&db, "Khalid", 50.0, 1_000.0).await?;
        create_test_capital_receipt(&db, partner.id, 100.0).await?;

        let result = delete_partner(&db, partner.id).await;
        assert!(matches!(result, Err(Error::HasDependents { .. })));

        let lonely = create_test_partner(&db, "Nasser", 10.0, 0.0).await?;
        delete_partner(&db, lonely.id).await?;
        Ok(())
    }
}
