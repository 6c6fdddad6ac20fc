//! Account CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_account_list;
use crate::error::{PlanError, PlanResult};
use crate::models::{AccountType, Money};
use crate::services::{AccountEdit, AccountService};
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Add {
        /// Account name
        name: String,
        /// Account type (chequing, savings, credit_card, line_of_credit)
        #[arg(short = 't', long = "type", default_value = "chequing")]
        account_type: String,
        /// Starting balance (e.g., "1000.00" or "1000")
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        balance: String,
    },
    /// Change an account's name, type or starting balance
    Edit {
        /// Account name or ID
        account: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New account type
        #[arg(short = 't', long = "type")]
        account_type: Option<String>,
        /// New starting balance
        #[arg(short, long, allow_hyphen_values = true)]
        balance: Option<String>,
    },
    /// Delete an account (its transactions are kept)
    Delete {
        /// Account name or ID
        account: String,
    },
    /// List accounts with balances
    List,
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AccountCommands,
) -> PlanResult<()> {
    let service = AccountService::new(storage);
    let user = settings.user_id;

    match cmd {
        AccountCommands::Add {
            name,
            account_type,
            balance,
        } => {
            let account_type = parse_account_type(&account_type)?;
            let balance = Money::parse(&balance)?;

            let account = service.create(user, &name, account_type, balance)?;

            println!("Created account: {}", account.name);
            println!("  Type:     {}", account.account_type);
            println!(
                "  Balance:  {}",
                account.starting_balance.format_with_symbol(&settings.currency_symbol)
            );
            println!("  ID:       {}", account.id.full());
        }

        AccountCommands::Edit {
            account,
            name,
            account_type,
            balance,
        } => {
            let current = service
                .find(user, &account)?
                .ok_or_else(|| PlanError::account_not_found(&account))?;
            let edit = AccountEdit {
                name,
                account_type: account_type.as_deref().map(parse_account_type).transpose()?,
                starting_balance: balance.as_deref().map(Money::parse).transpose()?,
            };

            let updated = service.update(user, current.id, edit)?;
            println!("Updated account: {}", updated.name);
            println!("  Type:     {}", updated.account_type);
            println!(
                "  Balance:  {}",
                updated.starting_balance.format_with_symbol(&settings.currency_symbol)
            );
        }

        AccountCommands::Delete { account } => {
            let current = service
                .find(user, &account)?
                .ok_or_else(|| PlanError::account_not_found(&account))?;
            let deleted = service.delete(user, current.id)?;
            println!("Deleted account: {}", deleted.name);
        }

        AccountCommands::List => {
            let summaries = service.list(user)?;
            println!("{}", format_account_list(&summaries, &settings.currency_symbol));
        }
    }

    Ok(())
}

fn parse_account_type(raw: &str) -> PlanResult<AccountType> {
    AccountType::parse(raw).ok_or_else(|| {
        PlanError::Validation(format!(
            "Invalid account type '{}'. Valid types: chequing, savings, credit_card, line_of_credit",
            raw
        ))
    })
}
