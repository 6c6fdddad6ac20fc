//! Payee service
//!
//! Payees are found or created by name. Transactions resolve their payee here
//! before they are written, so the same name always maps to one row.

use crate::audit::EntityType;
use crate::error::{PlanError, PlanResult};
use crate::models::{Payee, PayeeId, UserId};
use crate::storage::Storage;

/// Service for payee management
pub struct PayeeService<'a> {
    storage: &'a Storage,
}

impl<'a> PayeeService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Return the payee named `name`, creating it on first use
    ///
    /// Same name, same row: the lookup and the insert happen under one lock.
    pub fn find_or_create(&self, user: UserId, name: &str) -> PlanResult<Payee> {
        let name = Self::clean_name(name)?;

        let (payee, created) = self.storage.payees.get_or_insert(user, name)?;
        if created {
            self.log_created(&payee)?;
        }

        Ok(payee)
    }

    /// Create a payee explicitly; an existing live payee with the name is an error
    pub fn create(&self, user: UserId, name: &str) -> PlanResult<Payee> {
        let name = Self::clean_name(name)?;

        let (payee, created) = self.storage.payees.get_or_insert(user, name)?;
        if !created {
            return Err(PlanError::Duplicate {
                entity_type: "Payee",
                identifier: payee.name,
            });
        }

        self.log_created(&payee)?;
        Ok(payee)
    }

    /// Live payees ordered by name
    pub fn list(&self, user: UserId) -> PlanResult<Vec<Payee>> {
        self.storage.payees.get_all(user)
    }

    /// Find a live payee by id or exact name
    pub fn find(&self, user: UserId, identifier: &str) -> PlanResult<Option<Payee>> {
        if let Ok(id) = identifier.parse::<PayeeId>() {
            if let Some(payee) = self.storage.payees.get(user, id)? {
                return Ok(Some(payee));
            }
        }

        self.storage.payees.get_by_name(user, identifier)
    }

    /// Rename a payee
    ///
    /// Transactions keep the payee text they were entered with.
    pub fn rename(&self, user: UserId, id: PayeeId, name: &str) -> PlanResult<Payee> {
        let name = Self::clean_name(name)?;

        let (before, after) = self.storage.payees.rename(user, id, name)?;
        self.storage.log_update(
            EntityType::Payee,
            after.id.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
        )?;

        Ok(after)
    }

    /// Soft-delete a payee
    pub fn delete(&self, user: UserId, id: PayeeId) -> PlanResult<Payee> {
        let payee = self.storage.payees.delete(user, id)?;
        self.storage.log_delete(
            EntityType::Payee,
            payee.id.to_string(),
            Some(payee.name.clone()),
            &payee,
        )?;

        Ok(payee)
    }

    fn clean_name(name: &str) -> PlanResult<&str> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlanError::Validation("Payee name cannot be empty".into()));
        }
        Ok(name)
    }

    fn log_created(&self, payee: &Payee) -> PlanResult<()> {
        self.storage.log_create(
            EntityType::Payee,
            payee.id.to_string(),
            Some(payee.name.clone()),
            payee,
        )
    }
}
