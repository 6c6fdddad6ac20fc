//! Display formatting for terminal output
//!
//! Snapshot tables, account balances, category trees and transaction
//! registers. Every formatter takes the currency symbol from settings.

pub mod account;
pub mod budget;
pub mod category;
pub mod transaction;

pub use account::format_account_list;
pub use budget::{format_goal_list, format_month_notes, format_snapshot};
pub use category::format_category_tree;
pub use transaction::{format_transaction_register, format_transaction_row};
