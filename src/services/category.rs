//! Category service
//!
//! Categories and their subcategories. Names are unique per user among live
//! rows (categories) or within their parent (subcategories), matched exactly.
//! The Inflow category and its marker subcategories are found by name, so
//! they can be neither renamed nor deleted.

use crate::audit::EntityType;
use crate::error::{PlanError, PlanResult};
use crate::models::{
    Category, CategoryId, CategoryWithSubcategories, Subcategory, SubcategoryId, UserId,
    INFLOW_CATEGORY,
};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new category
    pub fn create_category(&self, user: UserId, name: &str) -> PlanResult<Category> {
        let category = Category::new(user, name.trim());
        category
            .validate()
            .map_err(|e| PlanError::Validation(e.to_string()))?;

        self.storage.categories.insert_category(category.clone())?;

        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    /// Create a subcategory inside `category_id`
    pub fn create_subcategory(
        &self,
        user: UserId,
        category_id: CategoryId,
        name: &str,
    ) -> PlanResult<Subcategory> {
        self.storage
            .categories
            .get_category(user, category_id)?
            .ok_or_else(|| PlanError::category_not_found(category_id.to_string()))?;

        let sub = Subcategory::new(user, category_id, name.trim());
        sub.validate()
            .map_err(|e| PlanError::Validation(e.to_string()))?;

        self.storage.categories.insert_subcategory(sub.clone())?;

        self.storage.log_create(
            EntityType::Subcategory,
            sub.id.to_string(),
            Some(sub.name.clone()),
            &sub,
        )?;

        Ok(sub)
    }

    pub fn rename_category(
        &self,
        user: UserId,
        id: CategoryId,
        name: &str,
    ) -> PlanResult<Category> {
        self.editable_category(user, id)?;
        let name = name.trim();
        Category::new(user, name)
            .validate()
            .map_err(|e| PlanError::Validation(e.to_string()))?;

        let (before, after) = self.storage.categories.rename_category(user, id, name)?;
        self.storage.log_update(
            EntityType::Category,
            after.id.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
        )?;

        Ok(after)
    }

    pub fn rename_subcategory(
        &self,
        user: UserId,
        id: SubcategoryId,
        name: &str,
    ) -> PlanResult<Subcategory> {
        let current = self.editable_subcategory(user, id)?;
        let name = name.trim();
        Subcategory::new(user, current.category_id, name)
            .validate()
            .map_err(|e| PlanError::Validation(e.to_string()))?;

        let (before, after) = self.storage.categories.rename_subcategory(user, id, name)?;
        self.storage.log_update(
            EntityType::Subcategory,
            after.id.to_string(),
            Some(after.name.clone()),
            &before,
            &after,
        )?;

        Ok(after)
    }

    /// Soft-delete a category and every subcategory in it
    ///
    /// Their budget rows and transactions stay stored; the subcategories
    /// just stop appearing in listings and snapshots.
    pub fn delete_category(&self, user: UserId, id: CategoryId) -> PlanResult<Category> {
        self.editable_category(user, id)?;

        let (category, children) = self.storage.categories.delete_category(user, id)?;
        for sub in &children {
            self.storage.log_delete(
                EntityType::Subcategory,
                sub.id.to_string(),
                Some(sub.name.clone()),
                sub,
            )?;
        }
        self.storage.log_delete(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    pub fn delete_subcategory(&self, user: UserId, id: SubcategoryId) -> PlanResult<Subcategory> {
        self.editable_subcategory(user, id)?;

        let sub = self.storage.categories.delete_subcategory(user, id)?;
        self.storage.log_delete(
            EntityType::Subcategory,
            sub.id.to_string(),
            Some(sub.name.clone()),
            &sub,
        )?;

        Ok(sub)
    }

    fn editable_category(&self, user: UserId, id: CategoryId) -> PlanResult<Category> {
        let category = self
            .storage
            .categories
            .get_category(user, id)?
            .ok_or_else(|| PlanError::category_not_found(id.to_string()))?;

        if category.name == INFLOW_CATEGORY {
            return Err(PlanError::Validation(format!(
                "The {} category cannot be changed",
                INFLOW_CATEGORY
            )));
        }
        Ok(category)
    }

    fn editable_subcategory(&self, user: UserId, id: SubcategoryId) -> PlanResult<Subcategory> {
        let sub = self
            .storage
            .categories
            .get_subcategory(user, id)?
            .ok_or_else(|| PlanError::subcategory_not_found(id.to_string()))?;

        if sub.is_inflow_marker() {
            return Err(PlanError::Validation(format!(
                "'{}' cannot be changed",
                sub.name
            )));
        }
        Ok(sub)
    }

    /// Categories ordered by name, each with its subcategories ordered by name
    pub fn list_with_subcategories(
        &self,
        user: UserId,
        include_ignored: bool,
    ) -> PlanResult<Vec<CategoryWithSubcategories>> {
        let subcategories = self.storage.categories.get_subcategories(user)?;

        Ok(self
            .storage
            .categories
            .get_categories(user)?
            .into_iter()
            .filter(|c| include_ignored || !c.is_ignored())
            .map(|category| CategoryWithSubcategories {
                subcategories: subcategories
                    .iter()
                    .filter(|s| s.category_id == category.id)
                    .cloned()
                    .collect(),
                category,
            })
            .collect())
    }

    /// Find a category by id or exact name
    pub fn find_category(&self, user: UserId, identifier: &str) -> PlanResult<Option<Category>> {
        if let Ok(id) = identifier.parse::<CategoryId>() {
            if let Some(category) = self.storage.categories.get_category(user, id)? {
                return Ok(Some(category));
            }
        }

        self.storage
            .categories
            .get_category_by_name(user, identifier.trim())
    }

    /// Resolve a subcategory from `Category/Sub`, a bare name or an id
    ///
    /// A bare name shared by subcategories of several categories is ambiguous
    /// and must be qualified.
    pub fn find_subcategory(&self, user: UserId, identifier: &str) -> PlanResult<Subcategory> {
        let identifier = identifier.trim();

        if let Ok(id) = identifier.parse::<SubcategoryId>() {
            if let Some(sub) = self.storage.categories.get_subcategory(user, id)? {
                return Ok(sub);
            }
        }

        if let Some((category_name, sub_name)) = identifier.split_once('/') {
            let category = self
                .storage
                .categories
                .get_category_by_name(user, category_name.trim())?
                .ok_or_else(|| PlanError::category_not_found(category_name.trim()))?;

            return self
                .storage
                .categories
                .get_subcategories_in(user, category.id)?
                .into_iter()
                .find(|s| s.name == sub_name.trim())
                .ok_or_else(|| PlanError::subcategory_not_found(identifier));
        }

        let mut matches: Vec<_> = self
            .storage
            .categories
            .get_subcategories(user)?
            .into_iter()
            .filter(|s| s.name == identifier)
            .collect();

        match matches.len() {
            0 => Err(PlanError::subcategory_not_found(identifier)),
            1 => Ok(matches.remove(0)),
            n => Err(PlanError::Validation(format!(
                "'{}' matches {} subcategories; use Category/{}",
                identifier, n, identifier
            ))),
        }
    }
}
