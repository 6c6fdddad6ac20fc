//! Payee model
//!
//! Payees are created on first use by a transaction; names are unique per
//! user among live rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{PayeeId, UserId};
use super::LedgerRow;

/// A payee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payee {
    pub id: PayeeId,
    pub user_id: UserId,

    /// Payee name, stored trimmed
    pub name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Payee {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PayeeId::new(),
            user_id,
            name: name.into().trim().to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Exact, case-sensitive name match
    pub fn has_name(&self, name: &str) -> bool {
        self.name == name.trim()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Payee name cannot be empty".into());
        }
        Ok(())
    }
}

impl LedgerRow for Payee {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl fmt::Display for Payee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
