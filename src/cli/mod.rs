//! CLI command handlers
//!
//! Bridges clap argument parsing with the service layer. Every handler
//! works on behalf of the user recorded in settings.

pub mod account;
pub mod budget;
pub mod category;
pub mod goal;
pub mod payee;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use goal::{handle_goal_command, GoalCommands};
pub use payee::{handle_payee_command, PayeeCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};
