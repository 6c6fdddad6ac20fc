//! Savings goal model
//!
//! A goal is a longer-horizon target for one subcategory. With a target date
//! the budget engine spreads the remaining amount over the months left.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{GoalId, SubcategoryId, UserId};
use super::money::Money;
use super::LedgerRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub user_id: UserId,
    pub subcategory_id: SubcategoryId,
    pub name: String,
    pub target_amount: Money,

    #[serde(default)]
    pub target_date: Option<NaiveDate>,

    #[serde(default)]
    pub is_completed: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Goal {
    pub fn new(
        user_id: UserId,
        subcategory_id: SubcategoryId,
        name: impl Into<String>,
        target_amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: GoalId::new(),
            user_id,
            subcategory_id,
            name: name.into(),
            target_amount,
            target_date: None,
            is_completed: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    /// Not completed and not deleted
    pub fn is_active(&self) -> bool {
        !self.is_completed && self.deleted_at.is_none()
    }

    pub fn complete(&mut self) {
        self.is_completed = true;
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.name.trim().is_empty() {
            return Err(GoalValidationError::EmptyName);
        }
        if !self.target_amount.is_positive() {
            return Err(GoalValidationError::NonPositiveTarget);
        }
        Ok(())
    }
}

impl LedgerRow for Goal {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.target_amount)?;
        if let Some(date) = self.target_date {
            write!(f, " by {}", date.format("%Y-%m-%d"))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    EmptyName,
    NonPositiveTarget,
}

impl fmt::Display for GoalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Goal name cannot be empty"),
            Self::NonPositiveTarget => write!(f, "Goal target amount must be positive"),
        }
    }
}

impl std::error::Error for GoalValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target: i64) -> Goal {
        Goal::new(UserId::new(), SubcategoryId::new(), "Vacation", Money::from_units(target))
    }

    #[test]
    fn test_new_goal_is_active() {
        let mut g = goal(1200);
        assert!(g.is_active());
        g.complete();
        assert!(!g.is_active());
    }

    #[test]
    fn test_validation() {
        assert_eq!(goal(0).validate(), Err(GoalValidationError::NonPositiveTarget));
        let mut g = goal(10);
        g.name = " ".into();
        assert_eq!(g.validate(), Err(GoalValidationError::EmptyName));
    }
}
