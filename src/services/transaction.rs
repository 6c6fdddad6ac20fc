//! Transaction service
//!
//! Entering and editing transactions from an inflow/outflow pair, listing
//! them, and the soft-delete lifecycle (delete, restore, purge).

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{PlanError, PlanResult};
use crate::models::{
    AccountId, Money, MonthYear, SubcategoryId, Transaction, TransactionId, TransactionType,
    UserId, READY_TO_ASSIGN,
};
use crate::services::PayeeService;
use crate::storage::Storage;

/// Default number of rows for a subcategory's recent activity
pub const RECENT_LIMIT: usize = 5;

/// How many deleted transactions are offered for recovery
pub const DELETED_LIMIT: usize = 50;

/// Input for entering a transaction
///
/// Exactly one of `inflow` and `outflow` must be positive.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub date: NaiveDate,
    pub payee: String,
    pub subcategory_id: Option<SubcategoryId>,
    pub description: Option<String>,
    pub inflow: Money,
    pub outflow: Money,
}

impl From<&Transaction> for NewTransaction {
    /// The input that would record `txn` as it stands, the starting point
    /// for an edit
    fn from(txn: &Transaction) -> Self {
        let (inflow, outflow) = match txn.transaction_type {
            TransactionType::Expense => (Money::zero(), txn.magnitude()),
            _ => (txn.magnitude(), Money::zero()),
        };
        Self {
            account_id: txn.account_id,
            date: txn.date,
            payee: txn.payee.clone(),
            subcategory_id: txn.subcategory_id,
            description: txn.description.clone(),
            inflow,
            outflow,
        }
    }
}

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a transaction
    ///
    /// An inflow becomes income and, without a subcategory, lands in Ready to
    /// Assign. An outflow becomes an expense. The payee is found or created
    /// before the transaction is written.
    pub fn create(&self, user: UserId, input: NewTransaction) -> PlanResult<Transaction> {
        let (transaction_type, amount) = Self::classify(input.inflow, input.outflow)?;
        let mut txn = Transaction::new(user, input.account_id, input.date, transaction_type, amount);
        self.fill(user, input, &mut txn)?;

        self.storage.transactions.upsert(txn.clone())?;

        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(format!("{} {}", txn.date, txn.payee)),
            &txn,
        )?;

        Ok(txn)
    }

    /// Replace every editable field of a live transaction
    ///
    /// The input is checked exactly as in [`create`](Self::create), so an
    /// edited inflow without a subcategory moves back to Ready to Assign.
    /// Transfers are not editable.
    pub fn update(
        &self,
        user: UserId,
        id: TransactionId,
        input: NewTransaction,
    ) -> PlanResult<Transaction> {
        let before = self.get(user, id)?;

        if before.transaction_type == TransactionType::Transfer {
            return Err(PlanError::Validation(format!(
                "Transaction {} is a transfer and cannot be edited",
                id
            )));
        }

        let mut txn = before.clone();
        self.fill(user, input, &mut txn)?;
        txn.updated_at = Utc::now();

        self.write_update(&before, txn)
    }

    /// Check `input` and copy it onto `txn`
    fn fill(&self, user: UserId, input: NewTransaction, txn: &mut Transaction) -> PlanResult<()> {
        let (transaction_type, amount) = Self::classify(input.inflow, input.outflow)?;

        self.storage
            .accounts
            .get(user, input.account_id)?
            .ok_or_else(|| PlanError::account_not_found(input.account_id.to_string()))?;

        let subcategory_id = match (input.subcategory_id, transaction_type) {
            (Some(id), _) => {
                self.storage
                    .categories
                    .get_subcategory(user, id)?
                    .ok_or_else(|| PlanError::subcategory_not_found(id.to_string()))?;
                Some(id)
            }
            (None, TransactionType::Income) => Some(self.ready_to_assign_id(user)?),
            (None, _) => None,
        };

        let payee = PayeeService::new(self.storage).find_or_create(user, &input.payee)?;

        txn.account_id = input.account_id;
        txn.date = input.date;
        txn.transaction_type = transaction_type;
        txn.amount = amount;
        txn.amount = txn.signed_amount();
        txn.subcategory_id = subcategory_id;
        txn.payee = payee.name;
        txn.description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(())
    }

    /// Latest transactions of a subcategory within a month, newest first
    pub fn recent_for_subcategory(
        &self,
        user: UserId,
        subcategory_id: SubcategoryId,
        month: MonthYear,
        limit: usize,
    ) -> PlanResult<Vec<Transaction>> {
        let mut list = self.storage.transactions.get_by_subcategory_between(
            user,
            subcategory_id,
            month.start_date(),
            month.end_exclusive(),
        )?;
        list.truncate(limit);
        Ok(list)
    }

    pub fn get(&self, user: UserId, id: TransactionId) -> PlanResult<Transaction> {
        self.storage
            .transactions
            .get(user, id)?
            .ok_or_else(|| transaction_not_found(id))
    }

    /// Recent transactions, optionally for one account
    pub fn list(
        &self,
        user: UserId,
        account_id: Option<AccountId>,
        limit: usize,
    ) -> PlanResult<Vec<Transaction>> {
        let mut list = match account_id {
            Some(id) => self.storage.transactions.get_by_account(user, id)?,
            None => self.storage.transactions.get_all(user)?,
        };
        list.truncate(limit);
        Ok(list)
    }

    /// Soft-delete a transaction; it can be restored later
    pub fn delete(&self, user: UserId, id: TransactionId) -> PlanResult<Transaction> {
        let before = self.get(user, id)?;

        let mut txn = before.clone();
        let now = Utc::now();
        txn.deleted_at = Some(now);
        txn.updated_at = now;

        self.write_update(&before, txn)
    }

    /// Deleted transactions available for recovery
    pub fn list_deleted(&self, user: UserId) -> PlanResult<Vec<Transaction>> {
        self.storage.transactions.get_deleted(user, DELETED_LIMIT)
    }

    /// Bring a soft-deleted transaction back
    pub fn restore(&self, user: UserId, id: TransactionId) -> PlanResult<Transaction> {
        let before = self.get_deleted(user, id)?;

        let mut txn = before.clone();
        txn.deleted_at = None;
        txn.updated_at = Utc::now();

        self.write_update(&before, txn)
    }

    /// Remove a soft-deleted transaction for good
    pub fn purge(&self, user: UserId, id: TransactionId) -> PlanResult<()> {
        let txn = self.get_deleted(user, id)?;

        self.storage.transactions.remove(id)?;

        self.storage.log_delete(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(format!("{} {}", txn.date, txn.payee)),
            &txn,
        )
    }

    fn get_deleted(&self, user: UserId, id: TransactionId) -> PlanResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get_any(user, id)?
            .ok_or_else(|| transaction_not_found(id))?;

        if txn.deleted_at.is_none() {
            return Err(PlanError::Validation(format!(
                "Transaction {} is not deleted",
                id
            )));
        }
        Ok(txn)
    }

    fn write_update(&self, before: &Transaction, txn: Transaction) -> PlanResult<Transaction> {
        self.storage.transactions.upsert(txn.clone())?;

        self.storage.log_update(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(format!("{} {}", txn.date, txn.payee)),
            before,
            &txn,
        )?;

        Ok(txn)
    }

    fn ready_to_assign_id(&self, user: UserId) -> PlanResult<SubcategoryId> {
        self.storage
            .categories
            .get_subcategories(user)?
            .into_iter()
            .find(|s| s.name == READY_TO_ASSIGN)
            .map(|s| s.id)
            .ok_or_else(|| PlanError::subcategory_not_found(READY_TO_ASSIGN))
    }

    fn classify(inflow: Money, outflow: Money) -> PlanResult<(TransactionType, Money)> {
        if inflow.is_negative() || outflow.is_negative() {
            return Err(PlanError::Validation(
                "Inflow and outflow cannot be negative".into(),
            ));
        }

        match (inflow.is_positive(), outflow.is_positive()) {
            (true, false) => Ok((TransactionType::Income, inflow)),
            (false, true) => Ok((TransactionType::Expense, outflow)),
            (true, true) => Err(PlanError::Validation(
                "Enter either an inflow or an outflow, not both".into(),
            )),
            (false, false) => Err(PlanError::Validation(
                "Please enter either an inflow or outflow amount".into(),
            )),
        }
    }
}

fn transaction_not_found(id: TransactionId) -> PlanError {
    PlanError::NotFound {
        entity_type: "Transaction",
        identifier: id.to_string(),
    }
}
