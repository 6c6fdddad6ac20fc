//! Transaction model
//!
//! Amounts are recorded signed (income positive, expense negative), but only
//! the magnitude is trusted: the sign is always rebuilt from the type.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, SubcategoryId, TransactionId, UserId};
use super::money::Money;
use super::LedgerRow;

/// Payee used when money moves between the user's own accounts
pub const ACCOUNT_TRANSFER_PAYEE: &str = "Account Transfer";

/// Kind of transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        };
        f.pad(label)
    }
}

/// A ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub account_id: AccountId,

    /// Calendar date, no time component
    pub date: NaiveDate,

    pub amount: Money,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    #[serde(default)]
    pub subcategory_id: Option<SubcategoryId>,

    /// Free-text payee name
    #[serde(default)]
    pub payee: String,

    #[serde(default)]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Create a transaction; the stored sign follows the type
    pub fn new(
        user_id: UserId,
        account_id: AccountId,
        date: NaiveDate,
        transaction_type: TransactionType,
        amount: Money,
    ) -> Self {
        let now = Utc::now();
        let mut txn = Self {
            id: TransactionId::new(),
            user_id,
            account_id,
            date,
            amount,
            transaction_type,
            subcategory_id: None,
            payee: String::new(),
            description: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        txn.amount = txn.signed_amount();
        txn
    }

    pub fn income(user_id: UserId, account_id: AccountId, date: NaiveDate, amount: Money) -> Self {
        Self::new(user_id, account_id, date, TransactionType::Income, amount)
    }

    pub fn expense(user_id: UserId, account_id: AccountId, date: NaiveDate, amount: Money) -> Self {
        Self::new(user_id, account_id, date, TransactionType::Expense, amount)
    }

    pub fn with_subcategory(mut self, subcategory_id: SubcategoryId) -> Self {
        self.subcategory_id = Some(subcategory_id);
        self
    }

    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        self.payee = payee.into();
        self
    }

    /// Unsigned amount
    pub fn magnitude(&self) -> Money {
        self.amount.abs()
    }

    /// Amount with the sign implied by the type
    pub fn signed_amount(&self) -> Money {
        match self.transaction_type {
            TransactionType::Income => self.magnitude(),
            TransactionType::Expense => -self.magnitude(),
            TransactionType::Transfer => self.amount,
        }
    }

    /// Contribution to a subcategory's spending
    ///
    /// Expenses add to spending; income (refunds, rebates) reduces it.
    /// Transfers don't touch spending.
    pub fn spend_effect(&self) -> Money {
        match self.transaction_type {
            TransactionType::Expense => self.magnitude(),
            TransactionType::Income => -self.magnitude(),
            TransactionType::Transfer => Money::zero(),
        }
    }

    pub fn is_account_transfer(&self) -> bool {
        self.payee == ACCOUNT_TRANSFER_PAYEE
    }
}

impl LedgerRow for Transaction {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.date.format("%Y-%m-%d"),
            self.transaction_type,
            self.payee,
            self.signed_amount()
        )
    }
}
