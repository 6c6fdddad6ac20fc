//! Storage initialization
//!
//! First-run setup: directories plus the inflow-marker subcategories every
//! budget needs.

use crate::error::PlanError;
use crate::models::{Category, Subcategory, UserId, INFLOW_CATEGORY, INFLOW_MARKERS};

use super::Storage;

/// Seed the `Inflow` category and its marker subcategories for `user`
///
/// Safe to run more than once: existing rows are left alone. Returns the
/// number of rows created.
pub fn initialize_storage(storage: &Storage, user: UserId) -> Result<usize, PlanError> {
    storage.paths().ensure_directories()?;

    let mut created = 0;

    let category = match storage.categories.get_category_by_name(user, INFLOW_CATEGORY)? {
        Some(existing) => existing,
        None => {
            let category = Category::new(user, INFLOW_CATEGORY);
            storage.categories.insert_category(category.clone())?;
            storage.log_create(
                crate::audit::EntityType::Category,
                category.id.to_string(),
                Some(category.name.clone()),
                &category,
            )?;
            created += 1;
            category
        }
    };

    let existing = storage.categories.get_subcategories_in(user, category.id)?;
    for marker in INFLOW_MARKERS {
        if existing.iter().any(|s| s.name == marker) {
            continue;
        }
        let sub = Subcategory::new(user, category.id, marker);
        storage.categories.insert_subcategory(sub.clone())?;
        storage.log_create(
            crate::audit::EntityType::Subcategory,
            sub.id.to_string(),
            Some(sub.name.clone()),
            &sub,
        )?;
        created += 1;
    }

    Ok(created)
}
