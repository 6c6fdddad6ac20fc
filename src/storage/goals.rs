//! Goal repository for JSON storage

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::PlanError;
use crate::models::{Goal, GoalId, LedgerRow, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GoalData {
    #[serde(default)]
    goals: Vec<Goal>,
}

/// Repository for goal persistence
pub struct GoalRepository {
    path: PathBuf,
    data: RwLock<HashMap<GoalId, Goal>>,
}

impl GoalRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), PlanError> {
        let file_data: GoalData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for goal in file_data.goals {
            data.insert(goal.id, goal);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        self.persist(&data)
    }

    fn persist(&self, data: &HashMap<GoalId, Goal>) -> Result<(), PlanError> {
        let mut goals: Vec<_> = data.values().cloned().collect();
        goals.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        write_json_atomic(&self.path, &GoalData { goals })
    }

    pub fn get(&self, user: UserId, id: GoalId) -> Result<Option<Goal>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).filter(|g| g.visible_to(user)).cloned())
    }

    /// Live, not completed goals of `user`, ordered by name
    pub fn get_active(&self, user: UserId) -> Result<Vec<Goal>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut goals: Vec<_> = data
            .values()
            .filter(|g| g.visible_to(user) && g.is_active())
            .cloned()
            .collect();
        goals.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(goals)
    }

    /// Insert or update a goal and write the file, undoing the change if
    /// the write fails
    pub fn upsert(&self, goal: Goal) -> Result<(), PlanError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let id = goal.id;
        let previous = data.insert(id, goal);
        if let Err(e) = self.persist(&data) {
            tracing::error!(goal = %id, error = %e, "goal write failed, restoring previous row");
            match previous {
                Some(row) => data.insert(id, row),
                None => data.remove(&id),
            };
            return Err(e);
        }
        Ok(())
    }
}
