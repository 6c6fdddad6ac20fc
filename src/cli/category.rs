//! Category CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_category_tree;
use crate::error::{PlanError, PlanResult};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a new category
    Add {
        /// Category name
        name: String,
    },
    /// Create a subcategory inside a category
    AddSub {
        /// Parent category name or ID
        category: String,
        /// Subcategory name
        name: String,
    },
    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },
    /// Rename a subcategory
    RenameSub {
        /// Subcategory ("Category/Sub", name or ID)
        subcategory: String,
        /// New name
        name: String,
    },
    /// Delete a category and all of its subcategories
    Delete {
        /// Category name or ID
        category: String,
    },
    /// Delete a subcategory
    DeleteSub {
        /// Subcategory ("Category/Sub", name or ID)
        subcategory: String,
    },
    /// List categories and their subcategories
    List {
        /// Include the Ignore category
        #[arg(short, long)]
        all: bool,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CategoryCommands,
) -> PlanResult<()> {
    let service = CategoryService::new(storage);
    let user = settings.user_id;

    match cmd {
        CategoryCommands::Add { name } => {
            let category = service.create_category(user, &name)?;
            println!("Created category: {}", category.name);
            println!("  ID: {}", category.id.full());
        }

        CategoryCommands::AddSub { category, name } => {
            let parent = service
                .find_category(user, &category)?
                .ok_or_else(|| PlanError::category_not_found(&category))?;
            let sub = service.create_subcategory(user, parent.id, &name)?;
            println!("Created subcategory: {}/{}", parent.name, sub.name);
            println!("  ID: {}", sub.id.full());
        }

        CategoryCommands::Rename { category, name } => {
            let current = service
                .find_category(user, &category)?
                .ok_or_else(|| PlanError::category_not_found(&category))?;
            let renamed = service.rename_category(user, current.id, &name)?;
            println!("Renamed category '{}' to '{}'", current.name, renamed.name);
        }

        CategoryCommands::RenameSub { subcategory, name } => {
            let current = service.find_subcategory(user, &subcategory)?;
            let renamed = service.rename_subcategory(user, current.id, &name)?;
            println!("Renamed subcategory '{}' to '{}'", current.name, renamed.name);
        }

        CategoryCommands::Delete { category } => {
            let current = service
                .find_category(user, &category)?
                .ok_or_else(|| PlanError::category_not_found(&category))?;
            let deleted = service.delete_category(user, current.id)?;
            println!("Deleted category: {}", deleted.name);
        }

        CategoryCommands::DeleteSub { subcategory } => {
            let current = service.find_subcategory(user, &subcategory)?;
            let deleted = service.delete_subcategory(user, current.id)?;
            println!("Deleted subcategory: {}", deleted.name);
        }

        CategoryCommands::List { all } => {
            let categories = service.list_with_subcategories(user, all)?;
            println!("{}", format_category_tree(&categories));
        }
    }

    Ok(())
}
