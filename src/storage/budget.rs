//! Monthly budget repository for JSON storage
//!
//! Rows are keyed by (user, subcategory, month). Writes are partial upserts
//! that are persisted before they return.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::PlanError;
use crate::models::{
    BudgetKey, LedgerRow, Money, MonthYear, MonthlyBudget, MonthlyBudgetPatch, UserId,
};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct BudgetData {
    #[serde(default)]
    monthly_budgets: Vec<MonthlyBudget>,
}

/// Outcome of one upsert
#[derive(Debug, Clone)]
pub struct BudgetWrite {
    /// The live row before the write, if there was one
    pub before: Option<MonthlyBudget>,
    pub after: MonthlyBudget,
    pub changed: bool,
}

/// Repository for monthly budget persistence
pub struct BudgetRepository {
    path: PathBuf,
    rows: RwLock<HashMap<BudgetKey, MonthlyBudget>>,
}

impl BudgetRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Load monthly budgets from disk
    pub fn load(&self) -> Result<(), PlanError> {
        let file_data: BudgetData = read_json(&self.path)?;

        let mut rows = self
            .rows
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        rows.clear();
        for row in file_data.monthly_budgets {
            rows.insert(row.key(), row);
        }

        Ok(())
    }

    /// Save monthly budgets to disk
    pub fn save(&self) -> Result<(), PlanError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        self.persist(&rows)
    }

    fn persist(&self, rows: &HashMap<BudgetKey, MonthlyBudget>) -> Result<(), PlanError> {
        let mut list: Vec<_> = rows.values().cloned().collect();
        list.sort_by_key(|r| (r.month_year, r.subcategory_id));

        write_json_atomic(
            &self.path,
            &BudgetData {
                monthly_budgets: list,
            },
        )
    }

    /// The live row for a key
    pub fn get(&self, key: BudgetKey) -> Result<Option<MonthlyBudget>, PlanError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(rows.get(&key).filter(|r| !r.is_deleted()).cloned())
    }

    /// Every live row of `user`, across all months, oldest month first
    pub fn get_all(&self, user: UserId) -> Result<Vec<MonthlyBudget>, PlanError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = rows
            .values()
            .filter(|r| r.visible_to(user))
            .cloned()
            .collect();
        list.sort_by_key(|r| (r.month_year, r.subcategory_id));
        Ok(list)
    }

    #[cfg(test)]
    pub fn get_for_month(
        &self,
        user: UserId,
        month: MonthYear,
    ) -> Result<Vec<MonthlyBudget>, PlanError> {
        Ok(self
            .get_all(user)?
            .into_iter()
            .filter(|r| r.month_year == month)
            .collect())
    }

    /// Apply a set of partial upserts as one unit
    ///
    /// All patches are applied under a single write lock and persisted with one
    /// atomic file write. If persisting fails the table is put back exactly as
    /// it was and the error is returned. A soft-deleted row at a key is
    /// replaced by a fresh one. When nothing changes no file is written.
    pub fn apply_patches(
        &self,
        patches: &[(BudgetKey, MonthlyBudgetPatch)],
    ) -> Result<Vec<BudgetWrite>, PlanError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        self.apply_locked(&mut rows, patches)
    }

    /// Move `amount` of assigned money from one row to another
    ///
    /// Both balances are read and written under the same lock, so concurrent
    /// moves cannot interleave. Missing rows count as zero. A move that would
    /// push either balance past `Money::MAX` is rejected before anything is
    /// written.
    pub fn transfer_assigned(
        &self,
        from: BudgetKey,
        to: BudgetKey,
        amount: Money,
    ) -> Result<Vec<BudgetWrite>, PlanError> {
        let mut rows = self
            .rows
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let assigned = |key: &BudgetKey| {
            rows.get(key)
                .filter(|r| !r.is_deleted())
                .map(|r| r.assigned_amount)
                .unwrap_or_default()
        };
        let out_of_range = || {
            PlanError::Validation(format!(
                "Moving {} would put an assigned balance beyond {}",
                amount,
                Money::MAX
            ))
        };
        let from_balance = assigned(&from).checked_sub(amount).ok_or_else(out_of_range)?;
        let to_balance = assigned(&to).checked_add(amount).ok_or_else(out_of_range)?;

        let patches = [
            (from, MonthlyBudgetPatch::assigned(from_balance)),
            (to, MonthlyBudgetPatch::assigned(to_balance)),
        ];

        self.apply_locked(&mut rows, &patches)
    }

    fn apply_locked(
        &self,
        rows: &mut HashMap<BudgetKey, MonthlyBudget>,
        patches: &[(BudgetKey, MonthlyBudgetPatch)],
    ) -> Result<Vec<BudgetWrite>, PlanError> {
        let mut originals: Vec<(BudgetKey, Option<MonthlyBudget>)> = Vec::new();
        let mut writes = Vec::with_capacity(patches.len());

        for (key, patch) in patches {
            if !originals.iter().any(|(k, _)| k == key) {
                originals.push((*key, rows.get(key).cloned()));
            }

            let before = rows.get(key).filter(|r| !r.is_deleted()).cloned();
            let mut row = before.clone().unwrap_or_else(|| MonthlyBudget::new(*key));
            let changed = row.apply(patch) || before.is_none();

            if changed {
                rows.insert(*key, row.clone());
            }
            writes.push(BudgetWrite {
                before,
                after: row,
                changed,
            });
        }

        if writes.iter().any(|w| w.changed) {
            if let Err(e) = self.persist(rows) {
                tracing::error!(error = %e, "monthly budget write failed, restoring previous rows");
                for (key, original) in originals {
                    match original {
                        Some(row) => rows.insert(key, row),
                        None => rows.remove(&key),
                    };
                }
                return Err(e);
            }
        }

        Ok(writes)
    }

    pub fn count(&self) -> Result<usize, PlanError> {
        let rows = self
            .rows
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(rows.len())
    }
}
