//! Account service
//!
//! Account creation, edits and balances. Only chequing and savings accounts
//! feed Ready to Assign; the balance here covers every account type.

use chrono::Utc;

use crate::audit::EntityType;
use crate::error::{PlanError, PlanResult};
use crate::models::{Account, AccountId, AccountType, Money, UserId};
use crate::storage::Storage;

/// Changes to an account; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct AccountEdit {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub starting_balance: Option<Money>,
}

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

/// An account with its computed balance
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub account: Account,
    /// Starting balance plus every live transaction, signed by type
    pub current_balance: Money,
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account
    pub fn create(
        &self,
        user: UserId,
        name: &str,
        account_type: AccountType,
        starting_balance: Money,
    ) -> PlanResult<Account> {
        let name = name.trim();

        if self.storage.accounts.get_by_name(user, name)?.is_some() {
            return Err(PlanError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let account = Account::with_starting_balance(user, name, account_type, starting_balance);
        account.validate().map_err(PlanError::Validation)?;

        self.storage.accounts.upsert(account.clone())?;

        self.storage.log_create(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &account,
        )?;

        Ok(account)
    }

    /// Change an account's name, type or starting balance
    ///
    /// Changing the type moves the account in or out of the cash accounts
    /// that feed Ready to Assign.
    pub fn update(&self, user: UserId, id: AccountId, edit: AccountEdit) -> PlanResult<Account> {
        let before = self
            .storage
            .accounts
            .get(user, id)?
            .ok_or_else(|| PlanError::account_not_found(id.to_string()))?;

        let mut account = before.clone();
        if let Some(name) = edit.name {
            let name = name.trim();
            if let Some(other) = self.storage.accounts.get_by_name(user, name)? {
                if other.id != id {
                    return Err(PlanError::Duplicate {
                        entity_type: "Account",
                        identifier: name.to_string(),
                    });
                }
            }
            account.name = name.to_string();
        }
        if let Some(account_type) = edit.account_type {
            account.account_type = account_type;
        }
        if let Some(balance) = edit.starting_balance {
            account.starting_balance = balance;
        }
        account.validate().map_err(PlanError::Validation)?;
        account.updated_at = Utc::now();

        self.storage.accounts.upsert(account.clone())?;
        self.storage.log_update(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &before,
            &account,
        )?;

        Ok(account)
    }

    /// Soft-delete an account
    ///
    /// Its transactions stay in the ledger, but its income no longer counts
    /// as cash.
    pub fn delete(&self, user: UserId, id: AccountId) -> PlanResult<Account> {
        let before = self
            .storage
            .accounts
            .get(user, id)?
            .ok_or_else(|| PlanError::account_not_found(id.to_string()))?;

        let mut account = before.clone();
        let now = Utc::now();
        account.deleted_at = Some(now);
        account.updated_at = now;

        self.storage.accounts.upsert(account)?;
        self.storage.log_delete(
            EntityType::Account,
            before.id.to_string(),
            Some(before.name.clone()),
            &before,
        )?;

        Ok(before)
    }

    /// Find an account by id or name (case-insensitive)
    pub fn find(&self, user: UserId, identifier: &str) -> PlanResult<Option<Account>> {
        if let Ok(id) = identifier.parse::<AccountId>() {
            if let Some(account) = self.storage.accounts.get(user, id)? {
                return Ok(Some(account));
            }
        }

        self.storage.accounts.get_by_name(user, identifier.trim())
    }

    /// Current balance of one account
    pub fn balance(&self, user: UserId, account_id: AccountId) -> PlanResult<Money> {
        let account = self
            .storage
            .accounts
            .get(user, account_id)?
            .ok_or_else(|| PlanError::account_not_found(account_id.to_string()))?;

        let activity: Money = self
            .storage
            .transactions
            .get_by_account(user, account_id)?
            .iter()
            .map(|t| t.signed_amount())
            .sum();

        Ok(account.starting_balance + activity)
    }

    /// Every live account with its balance, ordered by name
    pub fn list(&self, user: UserId) -> PlanResult<Vec<AccountSummary>> {
        self.storage
            .accounts
            .get_all(user)?
            .into_iter()
            .map(|account| {
                let current_balance = self.balance(user, account.id)?;
                Ok(AccountSummary {
                    account,
                    current_balance,
                })
            })
            .collect()
    }
}
