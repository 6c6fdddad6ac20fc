//! Goal service
//!
//! Savings goals attached to subcategories. The budget snapshot reads active
//! goals to plan monthly amounts; this service writes them.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{PlanError, PlanResult};
use crate::models::{Goal, GoalId, Money, SubcategoryId, UserId};
use crate::storage::Storage;

/// Input for creating or replacing a goal
#[derive(Debug, Clone)]
pub struct GoalInput {
    /// Existing goal to replace; `None` creates a new one
    pub goal_id: Option<GoalId>,
    pub subcategory_id: SubcategoryId,
    pub name: String,
    pub target_amount: Money,
    pub target_date: Option<NaiveDate>,
}

/// Service for goal management
pub struct GoalService<'a> {
    storage: &'a Storage,
}

impl<'a> GoalService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a goal, or replace the one named by `goal_id`
    ///
    /// Saving a goal makes it active again. A missing target date leaves an
    /// existing one in place.
    pub fn upsert(&self, user: UserId, input: GoalInput) -> PlanResult<Goal> {
        self.storage
            .categories
            .get_subcategory(user, input.subcategory_id)?
            .ok_or_else(|| PlanError::subcategory_not_found(input.subcategory_id.to_string()))?;

        let name = input.name.trim().to_string();

        let existing = match input.goal_id {
            Some(id) => Some(
                self.storage
                    .goals
                    .get(user, id)?
                    .ok_or_else(|| PlanError::goal_not_found(id.to_string()))?,
            ),
            None => None,
        };

        let goal = match &existing {
            Some(before) => {
                let mut goal = before.clone();
                goal.subcategory_id = input.subcategory_id;
                goal.name = name;
                goal.target_amount = input.target_amount;
                if input.target_date.is_some() {
                    goal.target_date = input.target_date;
                }
                goal.is_completed = false;
                goal.updated_at = Utc::now();
                goal
            }
            None => {
                let mut goal = Goal::new(user, input.subcategory_id, name, input.target_amount);
                goal.target_date = input.target_date;
                goal
            }
        };

        goal.validate()
            .map_err(|e| PlanError::Validation(e.to_string()))?;

        self.storage.goals.upsert(goal.clone())?;

        match existing {
            Some(before) => self.storage.log_update(
                EntityType::Goal,
                goal.id.to_string(),
                Some(goal.name.clone()),
                &before,
                &goal,
            )?,
            None => self.storage.log_create(
                EntityType::Goal,
                goal.id.to_string(),
                Some(goal.name.clone()),
                &goal,
            )?,
        }

        Ok(goal)
    }

    /// Mark a goal completed; it no longer feeds the snapshot
    pub fn complete(&self, user: UserId, goal_id: GoalId) -> PlanResult<Goal> {
        let before = self
            .storage
            .goals
            .get(user, goal_id)?
            .ok_or_else(|| PlanError::goal_not_found(goal_id.to_string()))?;

        if before.is_completed {
            return Ok(before);
        }

        let mut goal = before.clone();
        goal.complete();

        self.storage.goals.upsert(goal.clone())?;
        self.storage.log_update(
            EntityType::Goal,
            goal.id.to_string(),
            Some(goal.name.clone()),
            &before,
            &goal,
        )?;

        Ok(goal)
    }

    pub fn list_active(&self, user: UserId) -> PlanResult<Vec<Goal>> {
        self.storage.goals.get_active(user)
    }

    /// Find an active goal by id or exact name
    pub fn find(&self, user: UserId, identifier: &str) -> PlanResult<Option<Goal>> {
        if let Ok(id) = identifier.parse::<GoalId>() {
            if let Some(goal) = self.storage.goals.get(user, id)? {
                return Ok(Some(goal));
            }
        }

        Ok(self
            .list_active(user)?
            .into_iter()
            .find(|g| g.name == identifier.trim()))
    }
}
