//! Budget CLI commands
//!
//! The monthly plan: showing the snapshot, assigning and moving money, and
//! editing a subcategory's target and notes.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_month_notes, format_snapshot};
use crate::error::PlanResult;
use crate::models::{Money, MonthYear, MonthlyBudgetPatch};
use crate::services::{AssignmentService, CategoryService, SnapshotService};
use crate::storage::Storage;

/// Budget commands, flattened into the top level of `plan`
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Show the budget for a month
    Show {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set the amount assigned to a subcategory
    Assign {
        /// Subcategory ("Category/Sub", name or ID)
        subcategory: String,
        /// Amount (e.g., "100" or "100.50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Move assigned money between subcategories
    Move {
        /// Source subcategory
        from: String,
        /// Destination subcategory
        to: String,
        /// Amount to move
        #[arg(allow_hyphen_values = true)]
        amount: String,
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Set any of a month's assigned amount, target and notes
    Target {
        /// Subcategory ("Category/Sub", name or ID)
        subcategory: String,
        #[arg(short, long)]
        month: Option<String>,
        /// Assigned amount
        #[arg(long, allow_hyphen_values = true)]
        assigned: Option<String>,
        /// Monthly spending target
        #[arg(long, allow_hyphen_values = true)]
        target: Option<String>,
        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show a subcategory's notes and target for a month
    Notes {
        /// Subcategory ("Category/Sub", name or ID)
        subcategory: String,
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BudgetCommands,
) -> PlanResult<()> {
    let user = settings.user_id;
    let symbol = settings.currency_symbol.as_str();
    let categories = CategoryService::new(storage);
    let assignments = AssignmentService::new(storage);

    match cmd {
        BudgetCommands::Show { month, json } => {
            let month = MonthYear::parse_or_current(month.as_deref())?;
            let snapshot = SnapshotService::new(storage).build(user, Some(month))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print!("{}", format_snapshot(&snapshot, symbol));
            }
        }

        BudgetCommands::Assign {
            subcategory,
            amount,
            month,
        } => {
            let month = MonthYear::parse_or_current(month.as_deref())?;
            let sub = categories.find_subcategory(user, &subcategory)?;
            let amount = Money::parse(&amount)?;

            assignments.set_assigned(user, sub.id, month, amount)?;

            println!(
                "Assigned {} to '{}' for {}",
                amount.format_with_symbol(symbol),
                sub.name,
                month.friendly()
            );
            print_ready_to_assign(storage, settings, month)?;
        }

        BudgetCommands::Move {
            from,
            to,
            amount,
            month,
        } => {
            let month = MonthYear::parse_or_current(month.as_deref())?;
            let from = categories.find_subcategory(user, &from)?;
            let to = categories.find_subcategory(user, &to)?;
            let amount = Money::parse(&amount)?;

            let outcome = assignments.move_money(user, from.id, to.id, amount, month)?;

            println!(
                "Moved {} from '{}' to '{}' for {}",
                amount.format_with_symbol(symbol),
                from.name,
                to.name,
                month.friendly()
            );
            println!(
                "  {}: {}  {}: {}",
                from.name,
                outcome.from.assigned_amount.format_with_symbol(symbol),
                to.name,
                outcome.to.assigned_amount.format_with_symbol(symbol)
            );
        }

        BudgetCommands::Target {
            subcategory,
            month,
            assigned,
            target,
            notes,
        } => {
            let month = MonthYear::parse_or_current(month.as_deref())?;
            let sub = categories.find_subcategory(user, &subcategory)?;

            let patch = MonthlyBudgetPatch {
                assigned_amount: assigned.as_deref().map(Money::parse).transpose()?,
                target_amount: target.as_deref().map(Money::parse).transpose()?,
                notes,
            };

            let row = assignments.set_target(user, sub.id, month, patch)?;

            println!("Updated '{}' for {}", sub.name, month.friendly());
            println!(
                "  Assigned: {}",
                row.assigned_amount.format_with_symbol(symbol)
            );
            if let Some(target) = row.target_amount {
                println!("  Target:   {}", target.format_with_symbol(symbol));
            }
            if let Some(notes) = &row.notes {
                println!("  Notes:    {}", notes);
            }
        }

        BudgetCommands::Notes { subcategory, month } => {
            let month = MonthYear::parse_or_current(month.as_deref())?;
            let sub = categories.find_subcategory(user, &subcategory)?;
            let notes = assignments.get_month_notes(user, sub.id, month)?;

            print!(
                "{}",
                format_month_notes(&sub.name, &month.token(), &notes, symbol)
            );
        }
    }

    Ok(())
}

fn print_ready_to_assign(storage: &Storage, settings: &Settings, month: MonthYear) -> PlanResult<()> {
    let snapshot = SnapshotService::new(storage).build(settings.user_id, Some(month))?;
    println!(
        "Ready to Assign: {}",
        snapshot
            .ready_to_assign
            .format_with_symbol(&settings.currency_symbol)
    );
    Ok(())
}
