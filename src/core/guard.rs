//! Reference checks run before deleting a row that other rows may point at.

use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, sea_query::IntoCondition};

/// Collects the referencing rows found for one entity instance.
///
/// ```ignore
/// DeleteGuard::new("supplier", id)
///     .check::<Expense, _>(db, expense::Column::SupplierId.eq(id), "expense(s)")
///     .await?
///     .finish()?;
/// ```
#[derive(Debug)]
pub struct DeleteGuard {
    entity: &'static str,
    id: i64,
    found: Vec<String>,
}

impl DeleteGuard {
    /// Starts a guard for `entity` row `id`.
    #[must_use]
    pub const fn new(entity: &'static str, id: i64) -> Self {
        Self {
            entity,
            id,
            found: Vec::new(),
        }
    }

    /// Counts rows of `E` matching `condition`; a non-zero count is recorded as `label`.
    pub async fn check<E, C>(
        mut self,
        db: &C,
        condition: impl IntoCondition,
        label: &str,
    ) -> Result<Self>
    where
        E: EntityTrait,
        E::Model: Sync,
        C: ConnectionTrait,
    {
        let count = E::find().filter(condition).count(db).await?;
        if count > 0 {
            self.found.push(format!("{count} {label}"));
        }
        Ok(self)
    }

    /// Fails with [`Error::HasDependents`] if any check found rows.
    pub fn finish(self) -> Result<()> {
        if self.found.is_empty() {
            return Ok(());
        }
        Err(Error::HasDependents {
            entity: self.entity,
            id: self.id,
            dependents: self.found.join(", "),
        })
    }
}
