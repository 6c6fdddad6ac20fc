//! Payee CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::error::{PlanError, PlanResult};
use crate::models::Payee;
use crate::services::PayeeService;
use crate::storage::Storage;

/// Payee subcommands
#[derive(Subcommand)]
pub enum PayeeCommands {
    /// Create a payee
    Add {
        /// Payee name
        name: String,
    },
    /// Rename a payee
    Rename {
        /// Payee name or ID
        payee: String,
        /// New name
        name: String,
    },
    /// Delete a payee
    Delete {
        /// Payee name or ID
        payee: String,
    },
    /// List payees
    List,
}

/// Handle a payee command
pub fn handle_payee_command(
    storage: &Storage,
    settings: &Settings,
    cmd: PayeeCommands,
) -> PlanResult<()> {
    let service = PayeeService::new(storage);

    match cmd {
        PayeeCommands::Add { name } => {
            let payee = service.create(settings.user_id, &name)?;
            println!("Created payee: {}", payee.name);
        }

        PayeeCommands::Rename { payee, name } => {
            let current = find_payee(&service, settings, &payee)?;
            let renamed = service.rename(settings.user_id, current.id, &name)?;
            println!("Renamed payee '{}' to '{}'", current.name, renamed.name);
        }

        PayeeCommands::Delete { payee } => {
            let current = find_payee(&service, settings, &payee)?;
            let deleted = service.delete(settings.user_id, current.id)?;
            println!("Deleted payee: {}", deleted.name);
        }

        PayeeCommands::List => {
            let payees = service.list(settings.user_id)?;
            if payees.is_empty() {
                println!("No payees found.");
            } else {
                for payee in payees {
                    println!("  {}", payee.name);
                }
            }
        }
    }

    Ok(())
}

fn find_payee(service: &PayeeService, settings: &Settings, payee: &str) -> PlanResult<Payee> {
    service
        .find(settings.user_id, payee)?
        .ok_or_else(|| PlanError::NotFound {
            entity_type: "Payee",
            identifier: payee.to_string(),
        })
}
