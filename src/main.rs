use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use envelope_plan::cli::{
    handle_account_command, handle_budget_command, handle_category_command, handle_goal_command,
    handle_payee_command, handle_transaction_command, AccountCommands, BudgetCommands,
    CategoryCommands, GoalCommands, PayeeCommands, TransactionCommands,
};
use envelope_plan::config::{paths::PlanPaths, settings::Settings};
use envelope_plan::logging;
use envelope_plan::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "plan",
    author = "Kaylee Beyene",
    version,
    about = "Monthly zero-based budget engine",
    long_about = "envelope-plan keeps a monthly envelope budget: it works out Ready to \
                  Assign, carries balances between months and projects goal targets, \
                  all from the command line."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new budget
    Init,

    /// Show current configuration and paths
    Config,

    #[command(flatten)]
    Budget(BudgetCommands),

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Savings goal commands
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Payee management commands
    #[command(subcommand)]
    Payee(PayeeCommands),

    /// Transaction management commands
    #[command(subcommand, alias = "txn")]
    Transaction(TransactionCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();

    let paths = PlanPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let storage = Storage::new(paths.clone())?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("envelope-plan - monthly zero-based budgeting");
            println!();
            println!("Run 'plan --help' for usage information.");
            println!("Run 'plan init' to set up a new budget.");
            return Ok(());
        }
    };

    if !matches!(command, Commands::Init | Commands::Config) && !storage.is_initialized() {
        bail!("No budget found at {}. Run 'plan init' first.", paths.base_dir().display());
    }
    storage.load_all()?;

    match command {
        Commands::Init => {
            println!("Initializing envelope-plan at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            let created = initialize_storage(&storage, settings.user_id)?;
            if created > 0 {
                println!("Created the Inflow category with Ready to Assign.");
            } else {
                println!("Budget already initialized.");
            }
            println!();
            println!("Next: 'plan account add <name>' and 'plan category add <name>'.");
        }
        Commands::Config => {
            println!("envelope-plan Configuration");
            println!("===========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Initialized:     {}", storage.is_initialized());
            println!("  User ID:         {}", settings.user_id.full());
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
        }
        Commands::Budget(cmd) => handle_budget_command(&storage, &settings, cmd)?,
        Commands::Account(cmd) => handle_account_command(&storage, &settings, cmd)?,
        Commands::Category(cmd) => handle_category_command(&storage, &settings, cmd)?,
        Commands::Goal(cmd) => handle_goal_command(&storage, &settings, cmd)?,
        Commands::Payee(cmd) => handle_payee_command(&storage, &settings, cmd)?,
        Commands::Transaction(cmd) => handle_transaction_command(&storage, &settings, cmd)?,
        Commands::Audit { limit } => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("No audit entries yet.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
    }

    Ok(())
}
