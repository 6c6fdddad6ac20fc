//! Category and Subcategory models
//!
//! Money is assigned to subcategories; categories only group them. A few names
//! carry meaning for the budget engine: see the constants below.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, SubcategoryId, UserId};
use super::LedgerRow;

/// Category hidden from the budget display
pub const IGNORE_CATEGORY: &str = "Ignore";

/// Category created by `init` to hold the inflow markers
pub const INFLOW_CATEGORY: &str = "Inflow";

/// Subcategory receiving income by default
pub const READY_TO_ASSIGN: &str = "Ready to Assign";

pub const STARTING_BALANCE: &str = "Starting Balance";

/// Subcategories whose income is new money entering the budget
pub const INFLOW_MARKERS: [&str; 2] = [READY_TO_ASSIGN, STARTING_BALANCE];

const MAX_NAME_LEN: usize = 50;

/// A top-level spending category (e.g., "Bills", "Everyday")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            user_id,
            name: name.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// The "Ignore" category never appears in a budget snapshot
    pub fn is_ignored(&self) -> bool {
        self.name == IGNORE_CATEGORY
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)
    }
}

/// A subcategory: the unit money is assigned to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Subcategory {
    pub fn new(user_id: UserId, category_id: CategoryId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SubcategoryId::new(),
            user_id,
            category_id,
            name: name.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Income tagged here is budget inflow rather than a refund
    pub fn is_inflow_marker(&self) -> bool {
        INFLOW_MARKERS.contains(&self.name.as_str())
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)
    }
}

fn validate_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.trim().is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CategoryValidationError::NameTooLong(name.len()));
    }
    Ok(())
}

impl LedgerRow for Category {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl LedgerRow for Subcategory {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Subcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A category together with its live subcategories, ordered by name
#[derive(Debug, Clone)]
pub struct CategoryWithSubcategories {
    pub category: Category,
    pub subcategories: Vec<Subcategory>,
}

/// Validation errors for categories and subcategories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Name too long ({} chars, max {})", len, MAX_NAME_LEN)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}
