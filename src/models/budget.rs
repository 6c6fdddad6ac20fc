//! Monthly budget model
//!
//! One row per (user, subcategory, month) holding the money assigned that
//! month plus an optional spending target and notes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{SubcategoryId, UserId};
use super::money::Money;
use super::month::MonthYear;
use super::LedgerRow;

/// Unique key of a monthly budget row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BudgetKey {
    pub user_id: UserId,
    pub subcategory_id: SubcategoryId,
    pub month_year: MonthYear,
}

impl BudgetKey {
    pub fn new(user_id: UserId, subcategory_id: SubcategoryId, month_year: MonthYear) -> Self {
        Self {
            user_id,
            subcategory_id,
            month_year,
        }
    }
}

impl fmt::Display for BudgetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subcategory_id, self.month_year)
    }
}

/// Money assigned to a subcategory for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBudget {
    pub user_id: UserId,
    pub subcategory_id: SubcategoryId,

    /// Always the first day of the month
    pub month_year: MonthYear,

    #[serde(default)]
    pub assigned_amount: Money,

    /// Explicit monthly spending target
    #[serde(default)]
    pub target_amount: Option<Money>,

    #[serde(default)]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MonthlyBudget {
    /// An empty row for the key (nothing assigned, no target)
    pub fn new(key: BudgetKey) -> Self {
        let now = Utc::now();
        Self {
            user_id: key.user_id,
            subcategory_id: key.subcategory_id,
            month_year: key.month_year,
            assigned_amount: Money::zero(),
            target_amount: None,
            notes: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_assigned(key: BudgetKey, assigned: Money) -> Self {
        let mut row = Self::new(key);
        row.assigned_amount = assigned;
        row
    }

    pub fn key(&self) -> BudgetKey {
        BudgetKey::new(self.user_id, self.subcategory_id, self.month_year)
    }

    /// Target amount only when it is set and positive
    pub fn positive_target(&self) -> Option<Money> {
        self.target_amount.filter(|t| t.is_positive())
    }

    /// Write the supplied fields, leaving the rest untouched
    ///
    /// Returns whether anything changed; `updated_at` only moves on change.
    pub fn apply(&mut self, patch: &MonthlyBudgetPatch) -> bool {
        let mut changed = false;

        if let Some(assigned) = patch.assigned_amount {
            if self.assigned_amount != assigned {
                self.assigned_amount = assigned;
                changed = true;
            }
        }
        if let Some(target) = patch.target_amount {
            if self.target_amount != Some(target) {
                self.target_amount = Some(target);
                changed = true;
            }
        }
        if let Some(notes) = &patch.notes {
            if self.notes.as_ref() != Some(notes) {
                self.notes = Some(notes.clone());
                changed = true;
            }
        }

        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}

impl LedgerRow for MonthlyBudget {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl fmt::Display for MonthlyBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} assigned: {}", self.month_year, self.assigned_amount)?;
        if let Some(target) = self.target_amount {
            write!(f, " (target: {})", target)?;
        }
        Ok(())
    }
}

/// Partial update of a monthly budget row; `None` fields are not written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyBudgetPatch {
    pub assigned_amount: Option<Money>,
    pub target_amount: Option<Money>,
    pub notes: Option<String>,
}

impl MonthlyBudgetPatch {
    pub fn assigned(amount: Money) -> Self {
        Self {
            assigned_amount: Some(amount),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: Money) -> Self {
        self.target_amount = Some(target);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_amount.is_none() && self.target_amount.is_none() && self.notes.is_none()
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.is_empty() {
            return Err(BudgetValidationError::EmptyPatch);
        }
        if self.target_amount.is_some_and(|t| t.is_negative()) {
            return Err(BudgetValidationError::NegativeTarget);
        }
        let amounts = [self.assigned_amount, self.target_amount];
        if amounts.iter().flatten().any(|m| !m.is_within_limit()) {
            return Err(BudgetValidationError::OutOfRange);
        }
        Ok(())
    }
}

/// Validation errors for monthly budget writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyPatch,
    NegativeTarget,
    OutOfRange,
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPatch => write!(f, "Nothing to update: supply an assigned amount, target or notes"),
            Self::NegativeTarget => write!(f, "Target amount cannot be negative"),
            Self::OutOfRange => write!(f, "Amount must be within {}", Money::MAX),
        }
    }
}

impl std::error::Error for BudgetValidationError {}
