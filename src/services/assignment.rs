//! Assignment service
//!
//! Writes to the monthly budget table: setting what a subcategory is assigned
//! for a month, moving assigned money between subcategories, and editing the
//! month's target and notes. Every persisted change is audited.

use crate::audit::{AuditEntry, EntityType};
use crate::error::{PlanError, PlanResult};
use crate::models::{
    BudgetKey, Money, MonthYear, MonthlyBudget, MonthlyBudgetPatch, Subcategory, SubcategoryId,
    UserId,
};
use crate::storage::{BudgetWrite, Storage};

/// Service for assigning money to subcategories
pub struct AssignmentService<'a> {
    storage: &'a Storage,
}

/// Notes and target stored for one subcategory in one month
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthNotes {
    pub notes: Option<String>,
    pub target_amount: Option<Money>,
}

/// Result of a move between two subcategories
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub from: MonthlyBudget,
    pub to: MonthlyBudget,
}

impl<'a> AssignmentService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Set the amount assigned to a subcategory for a month
    ///
    /// Target and notes already on the row are kept.
    pub fn set_assigned(
        &self,
        user: UserId,
        subcategory_id: SubcategoryId,
        month: MonthYear,
        amount: Money,
    ) -> PlanResult<MonthlyBudget> {
        self.write_patch(
            user,
            subcategory_id,
            month,
            MonthlyBudgetPatch::assigned(amount),
        )
    }

    /// Move assigned money from one subcategory to another within a month
    ///
    /// The sum assigned across the two rows is unchanged, so Ready to Assign
    /// is too. Both rows are written together or not at all.
    pub fn move_money(
        &self,
        user: UserId,
        from_id: SubcategoryId,
        to_id: SubcategoryId,
        amount: Money,
        month: MonthYear,
    ) -> PlanResult<MoveOutcome> {
        if from_id == to_id {
            return Err(PlanError::Validation(
                "Cannot move money to the same subcategory".into(),
            ));
        }
        if !amount.is_positive() {
            return Err(PlanError::Validation(
                "Amount to move must be positive".into(),
            ));
        }
        if !amount.is_within_limit() {
            return Err(PlanError::Validation(format!(
                "Amount to move must be within {}",
                Money::MAX
            )));
        }

        let from = self.require_subcategory(user, from_id)?;
        let to = self.require_subcategory(user, to_id)?;

        let writes = self.storage.budgets.transfer_assigned(
            BudgetKey::new(user, from_id, month),
            BudgetKey::new(user, to_id, month),
            amount,
        )?;

        tracing::debug!(
            from = %from.name,
            to = %to.name,
            %amount,
            month = %month.token(),
            "moved assigned money"
        );

        let names = [from.name, to.name];
        self.audit(&writes, &names, month)?;

        let mut rows = writes.into_iter().map(|w| w.after);
        match (rows.next(), rows.next()) {
            (Some(from), Some(to)) => Ok(MoveOutcome { from, to }),
            _ => Err(PlanError::Storage(
                "Move did not produce both budget rows".into(),
            )),
        }
    }

    /// Partially upsert a month's row: only the supplied fields are written
    pub fn set_target(
        &self,
        user: UserId,
        subcategory_id: SubcategoryId,
        month: MonthYear,
        patch: MonthlyBudgetPatch,
    ) -> PlanResult<MonthlyBudget> {
        self.write_patch(user, subcategory_id, month, patch)
    }

    /// Notes and target for a subcategory's month, empty when no row exists
    pub fn get_month_notes(
        &self,
        user: UserId,
        subcategory_id: SubcategoryId,
        month: MonthYear,
    ) -> PlanResult<MonthNotes> {
        self.require_subcategory(user, subcategory_id)?;

        Ok(self
            .storage
            .budgets
            .get(BudgetKey::new(user, subcategory_id, month))?
            .map(|row| MonthNotes {
                notes: row.notes,
                target_amount: row.target_amount,
            })
            .unwrap_or_default())
    }

    fn write_patch(
        &self,
        user: UserId,
        subcategory_id: SubcategoryId,
        month: MonthYear,
        patch: MonthlyBudgetPatch,
    ) -> PlanResult<MonthlyBudget> {
        patch
            .validate()
            .map_err(|e| PlanError::Validation(e.to_string()))?;

        let sub = self.require_subcategory(user, subcategory_id)?;
        let key = BudgetKey::new(user, subcategory_id, month);

        let writes = self.storage.budgets.apply_patches(&[(key, patch)])?;
        self.audit(&writes, std::slice::from_ref(&sub.name), month)?;

        writes
            .into_iter()
            .next()
            .map(|w| w.after)
            .ok_or_else(|| PlanError::Storage(format!("No budget row written for {}", key)))
    }

    fn require_subcategory(&self, user: UserId, id: SubcategoryId) -> PlanResult<Subcategory> {
        self.storage
            .categories
            .get_subcategory(user, id)?
            .ok_or_else(|| PlanError::subcategory_not_found(id.to_string()))
    }

    /// Audit the rows that actually changed; `names` pairs with `writes`
    fn audit(&self, writes: &[BudgetWrite], names: &[String], month: MonthYear) -> PlanResult<()> {
        let entries: Vec<AuditEntry> = writes
            .iter()
            .zip(names)
            .filter(|(w, _)| w.changed)
            .map(|(w, name)| {
                let id = w.after.key().to_string();
                let label = Some(format!("{} ({})", name, month.token()));
                match &w.before {
                    Some(before) => {
                        AuditEntry::update(EntityType::MonthlyBudget, id, label, before, &w.after)
                    }
                    None => AuditEntry::create(EntityType::MonthlyBudget, id, label, &w.after),
                }
            })
            .collect();

        if entries.is_empty() {
            return Ok(());
        }
        self.storage.log_entries(&entries)
    }
}
