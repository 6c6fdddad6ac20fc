//! Core data models for envelope-plan
//!
//! Every ledger row is owned by one user and may be soft-deleted. Storage only
//! ever hands out live rows belonging to the requesting user.

pub mod account;
pub mod budget;
pub mod category;
pub mod goal;
pub mod ids;
pub mod money;
pub mod month;
pub mod payee;
pub mod transaction;

pub use account::{Account, AccountType};
pub use budget::{BudgetKey, BudgetValidationError, MonthlyBudget, MonthlyBudgetPatch};
pub use category::{
    Category, CategoryValidationError, CategoryWithSubcategories, Subcategory, IGNORE_CATEGORY,
    INFLOW_CATEGORY, INFLOW_MARKERS, READY_TO_ASSIGN, STARTING_BALANCE,
};
pub use goal::{Goal, GoalValidationError};
pub use ids::{AccountId, CategoryId, GoalId, PayeeId, SubcategoryId, TransactionId, UserId};
pub use money::{Money, MoneyParseError};
pub use month::{MonthParseError, MonthYear};
pub use payee::Payee;
pub use transaction::{Transaction, TransactionType, ACCOUNT_TRANSFER_PAYEE};

/// A row scoped to one owning user
pub trait LedgerRow {
    fn user_id(&self) -> UserId;

    fn is_deleted(&self) -> bool;

    /// Live and owned by `user`
    fn visible_to(&self, user: UserId) -> bool {
        self.user_id() == user && !self.is_deleted()
    }
}
