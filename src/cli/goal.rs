//! Goal CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_goal_list;
use crate::error::{PlanError, PlanResult};
use crate::models::Money;
use crate::services::{CategoryService, GoalInput, GoalService};
use crate::storage::Storage;

/// Goal subcommands
#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a goal, or replace one with --id
    Set {
        /// Subcategory the goal saves into
        subcategory: String,
        /// Goal name
        name: String,
        /// Target amount
        target: String,
        /// Target date (YYYY-MM-DD)
        #[arg(short, long)]
        by: Option<String>,
        /// Existing goal to replace (name or ID)
        #[arg(long)]
        id: Option<String>,
    },
    /// Mark a goal completed
    Complete {
        /// Goal name or ID
        goal: String,
    },
    /// List active goals
    List,
}

/// Handle a goal command
pub fn handle_goal_command(
    storage: &Storage,
    settings: &Settings,
    cmd: GoalCommands,
) -> PlanResult<()> {
    let service = GoalService::new(storage);
    let user = settings.user_id;
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        GoalCommands::Set {
            subcategory,
            name,
            target,
            by,
            id,
        } => {
            let sub = CategoryService::new(storage).find_subcategory(user, &subcategory)?;
            let target_amount = Money::parse(&target)?;
            let target_date = by.as_deref().map(parse_date).transpose()?;
            let goal_id = match id {
                Some(identifier) => Some(
                    service
                        .find(user, &identifier)?
                        .ok_or_else(|| PlanError::goal_not_found(identifier))?
                        .id,
                ),
                None => None,
            };

            let goal = service.upsert(
                user,
                GoalInput {
                    goal_id,
                    subcategory_id: sub.id,
                    name,
                    target_amount,
                    target_date,
                },
            )?;

            println!("Saved goal: {}", goal.name);
            println!("  Subcategory: {}", sub.name);
            println!("  Target:      {}", goal.target_amount.format_with_symbol(symbol));
            if let Some(date) = goal.target_date {
                println!("  By:          {}", date.format(&settings.date_format));
            }
            println!("  ID:          {}", goal.id.full());
        }

        GoalCommands::Complete { goal } => {
            let found = service
                .find(user, &goal)?
                .ok_or_else(|| PlanError::goal_not_found(&goal))?;
            let completed = service.complete(user, found.id)?;
            println!("Completed goal: {}", completed.name);
        }

        GoalCommands::List => {
            let goals = service.list_active(user)?;
            let subcategories = storage.categories.get_subcategories(user)?;
            let output = format_goal_list(&goals, symbol, |goal| {
                subcategories
                    .iter()
                    .find(|s| s.id == goal.subcategory_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default()
            });
            println!("{}", output);
        }
    }

    Ok(())
}

fn parse_date(s: &str) -> PlanResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| PlanError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s)))
}
