//! Payee repository for JSON storage
//!
//! Manages loading and saving payees to payees.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::Utc;

use crate::error::PlanError;
use crate::models::{LedgerRow, Payee, PayeeId, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PayeeData {
    #[serde(default)]
    payees: Vec<Payee>,
}

/// Repository for payee persistence
pub struct PayeeRepository {
    path: PathBuf,
    data: RwLock<HashMap<PayeeId, Payee>>,
}

impl PayeeRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), PlanError> {
        let file_data: PayeeData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for payee in file_data.payees {
            data.insert(payee.id, payee);
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

    fn persist(&self, data: &HashMap<PayeeId, Payee>) -> Result<(), PlanError> {
        let mut payees: Vec<_> = data.values().cloned().collect();
        payees.sort_by(|a, b| a.name.cmp(&b.name));

        write_json_atomic(&self.path, &PayeeData { payees })
    }

    /// Live payees of `user`, ordered by name
    pub fn get_all(&self, user: UserId) -> Result<Vec<Payee>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut payees: Vec<_> = data
            .values()
            .filter(|p| p.visible_to(user))
            .cloned()
            .collect();
        payees.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(payees)
    }

    /// Find a payee by exact name
    pub fn get_by_name(&self, user: UserId, name: &str) -> Result<Option<Payee>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .find(|p| p.visible_to(user) && p.has_name(name))
            .cloned())
    }

    pub fn get(&self, user: UserId, id: PayeeId) -> Result<Option<Payee>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).filter(|p| p.visible_to(user)).cloned())
    }

    /// Return the live payee named `name`, inserting one if none exists
    ///
    /// The lookup, the insert and the file write share one write lock, so two
    /// callers with the same name always end up with the same row. The flag is
    /// true when the row was created by this call.
    pub fn get_or_insert(&self, user: UserId, name: &str) -> Result<(Payee, bool), PlanError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(existing) = data.values().find(|p| p.visible_to(user) && p.has_name(name)) {
            return Ok((existing.clone(), false));
        }

        let payee = Payee::new(user, name);
        data.insert(payee.id, payee.clone());
        if let Err(e) = self.persist(&data) {
            tracing::error!(payee = %payee.id, error = %e, "payee insert failed, dropping row");
            data.remove(&payee.id);
            return Err(e);
        }
        Ok((payee, true))
    }

    /// Rename a live payee unless another live payee has the name
    ///
    /// Returns the row before and after.
    pub fn rename(&self, user: UserId, id: PayeeId, name: &str) -> Result<(Payee, Payee), PlanError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = data
            .get(&id)
            .filter(|p| p.visible_to(user))
            .cloned()
            .ok_or_else(|| payee_not_found(id))?;

        if data
            .values()
            .any(|p| p.id != id && p.visible_to(user) && p.has_name(name))
        {
            return Err(PlanError::Duplicate {
                entity_type: "Payee",
                identifier: name.trim().to_string(),
            });
        }

        let mut after = before.clone();
        after.name = name.trim().to_string();
        after.updated_at = Utc::now();
        self.replace_locked(&mut data, before, after)
    }

    /// Soft-delete a live payee; its name becomes free for a new row
    pub fn delete(&self, user: UserId, id: PayeeId) -> Result<Payee, PlanError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = data
            .get(&id)
            .filter(|p| p.visible_to(user))
            .cloned()
            .ok_or_else(|| payee_not_found(id))?;

        let now = Utc::now();
        let mut after = before.clone();
        after.deleted_at = Some(now);
        after.updated_at = now;
        self.replace_locked(&mut data, before, after).map(|(before, _)| before)
    }

    fn replace_locked(
        &self,
        data: &mut HashMap<PayeeId, Payee>,
        before: Payee,
        after: Payee,
    ) -> Result<(Payee, Payee), PlanError> {
        data.insert(after.id, after.clone());
        if let Err(e) = self.persist(data) {
            tracing::error!(payee = %before.id, error = %e, "payee write failed, restoring previous row");
            data.insert(before.id, before);
            return Err(e);
        }
        Ok((before, after))
    }

    pub fn count(&self) -> Result<usize, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

fn payee_not_found(id: PayeeId) -> PlanError {
    PlanError::NotFound {
        entity_type: "Payee",
        identifier: id.to_string(),
    }
}
