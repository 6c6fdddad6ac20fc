//! Transaction CLI commands

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_transaction_register, format_transaction_row};
use crate::error::{PlanError, PlanResult};
use crate::models::{Money, MonthYear, TransactionId};
use crate::services::{
    AccountService, CategoryService, NewTransaction, TransactionService, RECENT_LIMIT,
};
use crate::storage::Storage;

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction
    Add {
        /// Account name or ID
        account: String,
        /// Payee name
        payee: String,
        /// Money coming in
        #[arg(short, long)]
        inflow: Option<String>,
        /// Money going out
        #[arg(short, long)]
        outflow: Option<String>,
        /// Subcategory ("Category/Sub", name or ID); inflows default to Ready to Assign
        #[arg(short, long)]
        subcategory: Option<String>,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
    },
    /// Change a transaction; options left out keep their current value
    Edit {
        /// Transaction ID
        id: String,
        /// Account name or ID
        #[arg(long)]
        account: Option<String>,
        /// Payee name
        #[arg(short, long)]
        payee: Option<String>,
        /// Money coming in (replaces the current amount)
        #[arg(short, long, conflicts_with = "outflow")]
        inflow: Option<String>,
        /// Money going out (replaces the current amount)
        #[arg(short, long)]
        outflow: Option<String>,
        /// Subcategory ("Category/Sub", name or ID)
        #[arg(short, long, conflicts_with = "uncategorized")]
        subcategory: Option<String>,
        /// Clear the subcategory; inflows go back to Ready to Assign
        #[arg(long)]
        uncategorized: bool,
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
    },
    /// List recent transactions
    List {
        /// Only this account
        #[arg(short, long)]
        account: Option<String>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Latest transactions of a subcategory in a month
    Recent {
        /// Subcategory ("Category/Sub", name or ID)
        subcategory: String,
        #[arg(short, long)]
        month: Option<String>,
        #[arg(short, long, default_value_t = RECENT_LIMIT)]
        limit: usize,
    },
    /// Delete a transaction (it can be restored)
    Delete {
        /// Transaction ID
        id: String,
    },
    /// List deleted transactions
    Deleted,
    /// Restore a deleted transaction
    Restore {
        /// Transaction ID
        id: String,
    },
    /// Permanently remove a deleted transaction
    Purge {
        /// Transaction ID
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> PlanResult<()> {
    let service = TransactionService::new(storage);
    let user = settings.user_id;
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        TransactionCommands::Add {
            account,
            payee,
            inflow,
            outflow,
            subcategory,
            date,
            description,
        } => {
            let account = AccountService::new(storage)
                .find(user, &account)?
                .ok_or_else(|| PlanError::account_not_found(&account))?;
            let subcategory_id = match subcategory {
                Some(s) => Some(CategoryService::new(storage).find_subcategory(user, &s)?.id),
                None => None,
            };
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => Local::now().date_naive(),
            };

            let txn = service.create(
                user,
                NewTransaction {
                    account_id: account.id,
                    date,
                    payee,
                    subcategory_id,
                    description,
                    inflow: parse_optional(inflow.as_deref())?,
                    outflow: parse_optional(outflow.as_deref())?,
                },
            )?;

            println!("Recorded transaction in '{}':", account.name);
            println!("  {}", format_transaction_row(&txn, symbol));
        }

        TransactionCommands::Edit {
            id,
            account,
            payee,
            inflow,
            outflow,
            subcategory,
            uncategorized,
            date,
            description,
        } => {
            let id = parse_id(&id)?;
            let mut input = NewTransaction::from(&service.get(user, id)?);

            if let Some(a) = account {
                input.account_id = AccountService::new(storage)
                    .find(user, &a)?
                    .ok_or_else(|| PlanError::account_not_found(&a))?
                    .id;
            }
            if let Some(p) = payee {
                input.payee = p;
            }
            if inflow.is_some() || outflow.is_some() {
                input.inflow = parse_optional(inflow.as_deref())?;
                input.outflow = parse_optional(outflow.as_deref())?;
            }
            if let Some(s) = subcategory {
                let sub = CategoryService::new(storage).find_subcategory(user, &s)?;
                input.subcategory_id = Some(sub.id);
            } else if uncategorized {
                input.subcategory_id = None;
            }
            if let Some(d) = date {
                input.date = parse_date(&d)?;
            }
            if description.is_some() {
                input.description = description;
            }

            let txn = service.update(user, id, input)?;
            println!("Updated transaction {}:", txn.id.full());
            println!("  {}", format_transaction_row(&txn, symbol));
        }

        TransactionCommands::List { account, limit } => {
            let account_id = match account {
                Some(a) => Some(
                    AccountService::new(storage)
                        .find(user, &a)?
                        .ok_or_else(|| PlanError::account_not_found(&a))?
                        .id,
                ),
                None => None,
            };
            let transactions = service.list(user, account_id, limit)?;
            print!("{}", format_transaction_register(&transactions, symbol));
        }

        TransactionCommands::Recent {
            subcategory,
            month,
            limit,
        } => {
            let month = MonthYear::parse_or_current(month.as_deref())?;
            let sub = CategoryService::new(storage).find_subcategory(user, &subcategory)?;
            let transactions = service.recent_for_subcategory(user, sub.id, month, limit)?;

            println!("{} - {}", sub.name, month.friendly());
            print!("{}", format_transaction_register(&transactions, symbol));
        }

        TransactionCommands::Delete { id } => {
            let txn = service.delete(user, parse_id(&id)?)?;
            println!("Deleted transaction {} ({} {})", txn.id.full(), txn.date, txn.payee);
        }

        TransactionCommands::Deleted => {
            let transactions = service.list_deleted(user)?;
            print!("{}", format_transaction_register(&transactions, symbol));
        }

        TransactionCommands::Restore { id } => {
            let txn = service.restore(user, parse_id(&id)?)?;
            println!("Restored transaction {} ({} {})", txn.id.full(), txn.date, txn.payee);
        }

        TransactionCommands::Purge { id } => {
            let id = parse_id(&id)?;
            service.purge(user, id)?;
            println!("Permanently removed transaction {}", id.full());
        }
    }

    Ok(())
}

fn parse_optional(amount: Option<&str>) -> PlanResult<Money> {
    Ok(amount.map(Money::parse).transpose()?.unwrap_or_default())
}

fn parse_date(date: &str) -> PlanResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        PlanError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", date))
    })
}

fn parse_id(id: &str) -> PlanResult<TransactionId> {
    id.parse()
        .map_err(|_| PlanError::Validation(format!("Invalid transaction ID '{}'", id)))
}
