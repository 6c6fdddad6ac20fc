//! Service layer for envelope-plan
//!
//! Services borrow the `Storage` handle and add validation, auditing and the
//! budget math on top of the repositories.
//!
//! - `SnapshotService`: builds the monthly budget snapshot.
//! - `AssignmentService`: assigns and moves money, edits targets and notes.
//! - The rest manage goals, payees, transactions, categories and accounts.

pub mod account;
pub mod assignment;
pub mod category;
pub mod goal;
pub mod payee;
pub mod snapshot;
pub mod transaction;

pub use account::{AccountEdit, AccountService, AccountSummary};
pub use assignment::{AssignmentService, MonthNotes, MoveOutcome};
pub use category::CategoryService;
pub use goal::{GoalInput, GoalService};
pub use payee::PayeeService;
pub use snapshot::{
    build_snapshot, is_budget_inflow, CategorySnapshot, GoalProgress, LedgerFacts, Snapshot,
    SnapshotService, SubcategorySnapshot,
};
pub use transaction::{NewTransaction, TransactionService, DELETED_LIMIT, RECENT_LIMIT};
