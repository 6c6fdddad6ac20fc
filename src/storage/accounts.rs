//! Account repository for JSON storage
//!
//! Manages loading and saving accounts to accounts.json

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::PlanError;
use crate::models::{Account, AccountId, LedgerRow, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct AccountData {
    #[serde(default)]
    accounts: Vec<Account>,
}

/// Repository for account persistence
pub struct AccountRepository {
    path: PathBuf,
    data: RwLock<HashMap<AccountId, Account>>,
}

impl AccountRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load accounts from disk
    pub fn load(&self) -> Result<(), PlanError> {
        let file_data: AccountData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for account in file_data.accounts {
            data.insert(account.id, account);
        }

        Ok(())
    }

    /// Save accounts to disk
    pub fn save(&self) -> Result<(), PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        self.persist(&data)
    }

    fn persist(&self, data: &HashMap<AccountId, Account>) -> Result<(), PlanError> {
        let mut accounts: Vec<_> = data.values().cloned().collect();
        accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));

        write_json_atomic(&self.path, &AccountData { accounts })
    }

    /// Get a live account owned by `user`
    pub fn get(&self, user: UserId, id: AccountId) -> Result<Option<Account>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).filter(|a| a.visible_to(user)).cloned())
    }

    /// All live accounts of `user`, ordered by name
    pub fn get_all(&self, user: UserId) -> Result<Vec<Account>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut accounts: Vec<_> = data
            .values()
            .filter(|a| a.visible_to(user))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    /// Ids of the user's chequing and savings accounts
    pub fn cash_account_ids(&self, user: UserId) -> Result<HashSet<AccountId>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .filter(|a| a.visible_to(user) && a.account_type.is_cash())
            .map(|a| a.id)
            .collect())
    }

    /// Get an account by name (case-insensitive)
    pub fn get_by_name(&self, user: UserId, name: &str) -> Result<Option<Account>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let name_lower = name.trim().to_lowercase();
        Ok(data
            .values()
            .find(|a| a.visible_to(user) && a.name.to_lowercase() == name_lower)
            .cloned())
    }

    /// Insert or update an account and write the file
    ///
    /// If the write fails the previous row is put back.
    pub fn upsert(&self, account: Account) -> Result<(), PlanError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let id = account.id;
        let previous = data.insert(id, account);
        if let Err(e) = self.persist(&data) {
            tracing::error!(account = %id, error = %e, "account write failed, restoring previous row");
            match previous {
                Some(row) => data.insert(id, row),
                None => data.remove(&id),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Number of stored rows, deleted ones included
    pub fn count(&self) -> Result<usize, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}
