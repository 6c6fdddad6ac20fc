//! Account model
//!
//! Accounts hold transactions. Only cash accounts (chequing and savings)
//! contribute new money to Ready to Assign.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, UserId};
use super::money::Money;
use super::LedgerRow;

/// Type of financial account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Chequing,
    Savings,
    CreditCard,
    LineOfCredit,
}

impl AccountType {
    /// Cash accounts are the only source of budget inflow
    pub fn is_cash(&self) -> bool {
        matches!(self, Self::Chequing | Self::Savings)
    }

    /// Parse account type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "chequing" | "checking" => Some(Self::Chequing),
            "savings" => Some(Self::Savings),
            "credit_card" | "credit" => Some(Self::CreditCard),
            "line_of_credit" | "loc" => Some(Self::LineOfCredit),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Chequing => "Chequing",
            Self::Savings => "Savings",
            Self::CreditCard => "Credit Card",
            Self::LineOfCredit => "Line of Credit",
        };
        f.pad(label)
    }
}

/// A financial account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub user_id: UserId,
    pub name: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    /// Opening balance when the account was created
    pub starting_balance: Money,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(user_id: UserId, name: impl Into<String>, account_type: AccountType) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            user_id,
            name: name.into(),
            account_type,
            starting_balance: Money::zero(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_starting_balance(
        user_id: UserId,
        name: impl Into<String>,
        account_type: AccountType,
        starting_balance: Money,
    ) -> Self {
        let mut account = Self::new(user_id, name, account_type);
        account.starting_balance = starting_balance;
        account
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Account name is required".into());
        }
        Ok(())
    }
}

impl LedgerRow for Account {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.account_type)
    }
}
