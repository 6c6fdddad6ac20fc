//! Category and Subcategory repository for JSON storage
//!
//! Both tables share categories.json. Every write goes to disk before it
//! returns and is undone in memory if the file cannot be written.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::Utc;

use crate::error::PlanError;
use crate::models::{Category, CategoryId, LedgerRow, Subcategory, SubcategoryId, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable category data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// Repository for category and subcategory persistence
pub struct CategoryRepository {
    path: PathBuf,
    categories: RwLock<HashMap<CategoryId, Category>>,
    subcategories: RwLock<HashMap<SubcategoryId, Subcategory>>,
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            categories: RwLock::new(HashMap::new()),
            subcategories: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> Result<(), PlanError> {
        let file_data: CategoryData = read_json(&self.path)?;

        let mut categories = self
            .categories
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut subcategories = self
            .subcategories
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        categories.clear();
        subcategories.clear();

        for category in file_data.categories {
            categories.insert(category.id, category);
        }
        for sub in file_data.subcategories {
            subcategories.insert(sub.id, sub);
        }

        Ok(())
    }

    /// Save categories to disk
    pub fn save(&self) -> Result<(), PlanError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let subcategories = self
            .subcategories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        self.persist(&categories, &subcategories)
    }

    fn persist(
        &self,
        categories: &HashMap<CategoryId, Category>,
        subcategories: &HashMap<SubcategoryId, Subcategory>,
    ) -> Result<(), PlanError> {
        let mut category_list: Vec<_> = categories.values().cloned().collect();
        category_list.sort_by(|a, b| a.name.cmp(&b.name));

        let mut sub_list: Vec<_> = subcategories.values().cloned().collect();
        sub_list.sort_by(|a, b| (a.category_id, &a.name).cmp(&(b.category_id, &b.name)));

        let file_data = CategoryData {
            categories: category_list,
            subcategories: sub_list,
        };

        write_json_atomic(&self.path, &file_data)
    }

    // Category operations

    pub fn get_category(&self, user: UserId, id: CategoryId) -> Result<Option<Category>, PlanError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(categories.get(&id).filter(|c| c.visible_to(user)).cloned())
    }

    /// Live categories of `user`, ordered by name
    pub fn get_categories(&self, user: UserId) -> Result<Vec<Category>, PlanError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = categories
            .values()
            .filter(|c| c.visible_to(user))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    /// Find a category by exact name
    pub fn get_category_by_name(
        &self,
        user: UserId,
        name: &str,
    ) -> Result<Option<Category>, PlanError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(categories
            .values()
            .find(|c| c.visible_to(user) && c.name == name)
            .cloned())
    }

    /// Insert a category unless a live one with the same name exists
    ///
    /// The check, the insert and the file write happen under one write lock.
    pub fn insert_category(&self, category: Category) -> Result<(), PlanError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let subcategories = self
            .subcategories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let taken = categories
            .values()
            .any(|c| c.visible_to(category.user_id) && c.name == category.name);
        if taken {
            return Err(PlanError::Duplicate {
                entity_type: "Category",
                identifier: category.name,
            });
        }

        let id = category.id;
        categories.insert(id, category);
        if let Err(e) = self.persist(&categories, &subcategories) {
            tracing::error!(category = %id, error = %e, "category insert failed, dropping row");
            categories.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    // Subcategory operations

    pub fn get_subcategory(
        &self,
        user: UserId,
        id: SubcategoryId,
    ) -> Result<Option<Subcategory>, PlanError> {
        let subcategories = self
            .subcategories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(subcategories.get(&id).filter(|s| s.visible_to(user)).cloned())
    }

    /// Live subcategories of `user`, ordered by name
    pub fn get_subcategories(&self, user: UserId) -> Result<Vec<Subcategory>, PlanError> {
        let subcategories = self
            .subcategories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = subcategories
            .values()
            .filter(|s| s.visible_to(user))
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    pub fn get_subcategories_in(
        &self,
        user: UserId,
        category_id: CategoryId,
    ) -> Result<Vec<Subcategory>, PlanError> {
        Ok(self
            .get_subcategories(user)?
            .into_iter()
            .filter(|s| s.category_id == category_id)
            .collect())
    }

    /// Ids of the user's "Ready to Assign" and "Starting Balance" subcategories
    pub fn inflow_marker_ids(&self, user: UserId) -> Result<Vec<SubcategoryId>, PlanError> {
        Ok(self
            .get_subcategories(user)?
            .into_iter()
            .filter(|s| s.is_inflow_marker())
            .map(|s| s.id)
            .collect())
    }

    /// Insert a subcategory unless its category already has a live one with the same name
    pub fn insert_subcategory(&self, sub: Subcategory) -> Result<(), PlanError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let mut subcategories = self
            .subcategories
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let taken = subcategories.values().any(|s| {
            s.visible_to(sub.user_id) && s.category_id == sub.category_id && s.name == sub.name
        });
        if taken {
            return Err(PlanError::Duplicate {
                entity_type: "Subcategory",
                identifier: sub.name,
            });
        }

        let id = sub.id;
        subcategories.insert(id, sub);
        if let Err(e) = self.persist(&categories, &subcategories) {
            tracing::error!(subcategory = %id, error = %e, "subcategory insert failed, dropping row");
            subcategories.remove(&id);
            return Err(e);
        }
        Ok(())
    }

    // Edits

    /// Rename a live category; returns the row before and after
    pub fn rename_category(
        &self,
        user: UserId,
        id: CategoryId,
        name: &str,
    ) -> Result<(Category, Category), PlanError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let subcategories = self
            .subcategories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let before = categories
            .get(&id)
            .filter(|c| c.visible_to(user))
            .cloned()
            .ok_or_else(|| PlanError::category_not_found(id.to_string()))?;

        let taken = categories
            .values()
            .any(|c| c.id != id && c.visible_to(user) && c.name == name);
        if taken {
            return Err(PlanError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let mut after = before.clone();
        after.name = name.to_string();
        after.updated_at = Utc::now();
        categories.insert(id, after.clone());

        if let Err(e) = self.persist(&categories, &subcategories) {
            tracing::error!(category = %id, error = %e, "category rename failed, restoring previous name");
            categories.insert(id, before);
            return Err(e);
        }
        Ok((before, after))
    }

    /// Rename a live subcategory; returns the row before and after
    pub fn rename_subcategory(
        &self,
        user: UserId,
        id: SubcategoryId,
        name: &str,
    ) -> Result<(Subcategory, Subcategory), PlanError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let mut subcategories = self
            .subcategories
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = subcategories
            .get(&id)
            .filter(|s| s.visible_to(user))
            .cloned()
            .ok_or_else(|| PlanError::subcategory_not_found(id.to_string()))?;

        let taken = subcategories.values().any(|s| {
            s.id != id && s.visible_to(user) && s.category_id == before.category_id && s.name == name
        });
        if taken {
            return Err(PlanError::Duplicate {
                entity_type: "Subcategory",
                identifier: name.to_string(),
            });
        }

        let mut after = before.clone();
        after.name = name.to_string();
        after.updated_at = Utc::now();
        subcategories.insert(id, after.clone());

        if let Err(e) = self.persist(&categories, &subcategories) {
            tracing::error!(subcategory = %id, error = %e, "subcategory rename failed, restoring previous name");
            subcategories.insert(id, before);
            return Err(e);
        }
        Ok((before, after))
    }

    /// Soft-delete a live category together with its live subcategories
    ///
    /// Returns the deleted rows as they were before the delete.
    pub fn delete_category(
        &self,
        user: UserId,
        id: CategoryId,
    ) -> Result<(Category, Vec<Subcategory>), PlanError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut subcategories = self
            .subcategories
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let category = categories
            .get(&id)
            .filter(|c| c.visible_to(user))
            .cloned()
            .ok_or_else(|| PlanError::category_not_found(id.to_string()))?;
        let children: Vec<Subcategory> = subcategories
            .values()
            .filter(|s| s.visible_to(user) && s.category_id == id)
            .cloned()
            .collect();

        let now = Utc::now();
        let mut deleted = category.clone();
        deleted.deleted_at = Some(now);
        deleted.updated_at = now;
        categories.insert(id, deleted);
        for sub in &children {
            let mut deleted = sub.clone();
            deleted.deleted_at = Some(now);
            deleted.updated_at = now;
            subcategories.insert(sub.id, deleted);
        }

        if let Err(e) = self.persist(&categories, &subcategories) {
            tracing::error!(category = %id, error = %e, "category delete failed, restoring rows");
            categories.insert(id, category);
            for sub in children {
                subcategories.insert(sub.id, sub);
            }
            return Err(e);
        }
        Ok((category, children))
    }

    /// Soft-delete a live subcategory; returns it as it was before
    pub fn delete_subcategory(
        &self,
        user: UserId,
        id: SubcategoryId,
    ) -> Result<Subcategory, PlanError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let mut subcategories = self
            .subcategories
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let before = subcategories
            .get(&id)
            .filter(|s| s.visible_to(user))
            .cloned()
            .ok_or_else(|| PlanError::subcategory_not_found(id.to_string()))?;

        let now = Utc::now();
        let mut deleted = before.clone();
        deleted.deleted_at = Some(now);
        deleted.updated_at = now;
        subcategories.insert(id, deleted);

        if let Err(e) = self.persist(&categories, &subcategories) {
            tracing::error!(subcategory = %id, error = %e, "subcategory delete failed, restoring row");
            subcategories.insert(id, before);
            return Err(e);
        }
        Ok(before)
    }

    /// Number of stored (categories, subcategories), deleted rows included
    pub fn count(&self) -> Result<(usize, usize), PlanError> {
        let categories = self
            .categories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let subcategories = self
            .subcategories
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok((categories.len(), subcategories.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, CategoryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = CategoryRepository::new(temp_dir.path().join("categories.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_duplicate_category_name_rejected() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();

        repo.insert_category(Category::new(user, "Bills")).unwrap();
        let err = repo.insert_category(Category::new(user, "Bills")).unwrap_err();
        assert!(matches!(err, PlanError::Duplicate { .. }));

        // Case-sensitive, and other users are independent
        repo.insert_category(Category::new(user, "bills")).unwrap();
        repo.insert_category(Category::new(UserId::new(), "Bills")).unwrap();
    }

    #[test]
    fn test_deleted_category_frees_its_name() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let mut old = Category::new(user, "Bills");
        old.deleted_at = Some(Utc::now());
        repo.insert_category(old).unwrap();

        repo.insert_category(Category::new(user, "Bills")).unwrap();
        assert_eq!(repo.get_categories(user).unwrap().len(), 1);
    }

    #[test]
    fn test_subcategory_names_unique_within_category() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let bills = Category::new(user, "Bills");
        let fun = Category::new(user, "Fun");

        repo.insert_subcategory(Subcategory::new(user, bills.id, "Misc")).unwrap();
        repo.insert_subcategory(Subcategory::new(user, fun.id, "Misc")).unwrap();
        assert!(repo
            .insert_subcategory(Subcategory::new(user, bills.id, "Misc"))
            .is_err());
    }

    #[test]
    fn test_save_reload_and_ordering() {
        let (temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let everyday = Category::new(user, "Everyday");
        let bills = Category::new(user, "Bills");
        let everyday_id = everyday.id;
        repo.insert_category(everyday).unwrap();
        repo.insert_category(bills).unwrap();
        repo.insert_subcategory(Subcategory::new(user, everyday_id, "Groceries")).unwrap();
        repo.insert_subcategory(Subcategory::new(user, everyday_id, "Dining")).unwrap();
        repo.save().unwrap();

        let reloaded = CategoryRepository::new(temp_dir.path().join("categories.json"));
        reloaded.load().unwrap();

        let names: Vec<_> = reloaded
            .get_categories(user)
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Bills", "Everyday"]);

        let subs: Vec<_> = reloaded
            .get_subcategories_in(user, everyday_id)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(subs, vec!["Dining", "Groceries"]);
    }

    #[test]
    fn test_rename_keeps_names_unique() {
        let (temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let bills = Category::new(user, "Bills");
        let fun = Category::new(user, "Fun");
        let hydro = Subcategory::new(user, bills.id, "Hydro");
        let rent = Subcategory::new(user, bills.id, "Rent");
        for c in [bills.clone(), fun.clone()] {
            repo.insert_category(c).unwrap();
        }
        for s in [hydro.clone(), rent.clone()] {
            repo.insert_subcategory(s).unwrap();
        }

        let err = repo.rename_category(user, fun.id, "Bills").unwrap_err();
        assert!(matches!(err, PlanError::Duplicate { .. }));
        let err = repo.rename_subcategory(user, hydro.id, "Rent").unwrap_err();
        assert!(matches!(err, PlanError::Duplicate { .. }));

        let (before, after) = repo.rename_subcategory(user, hydro.id, "Power").unwrap();
        assert_eq!(before.name, "Hydro");
        assert_eq!(after.name, "Power");
        repo.rename_category(user, bills.id, "Fixed").unwrap();
        assert!(repo.rename_category(UserId::new(), bills.id, "Mine").unwrap_err().is_not_found());

        // Renames are on disk without an explicit save
        let reloaded = CategoryRepository::new(temp_dir.path().join("categories.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_category(user, bills.id).unwrap().unwrap().name, "Fixed");
        assert_eq!(reloaded.get_subcategory(user, hydro.id).unwrap().unwrap().name, "Power");
    }

    #[test]
    fn test_delete_category_takes_its_subcategories() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let bills = Category::new(user, "Bills");
        let fun = Category::new(user, "Fun");
        repo.insert_category(bills.clone()).unwrap();
        repo.insert_category(fun.clone()).unwrap();
        repo.insert_subcategory(Subcategory::new(user, bills.id, "Rent")).unwrap();
        repo.insert_subcategory(Subcategory::new(user, bills.id, "Hydro")).unwrap();
        let games = Subcategory::new(user, fun.id, "Games");
        repo.insert_subcategory(games.clone()).unwrap();

        let (category, children) = repo.delete_category(user, bills.id).unwrap();
        assert_eq!(category.id, bills.id);
        assert_eq!(children.len(), 2);
        assert!(repo.get_category(user, bills.id).unwrap().is_none());
        assert!(repo.get_subcategories_in(user, bills.id).unwrap().is_empty());
        assert_eq!(repo.get_subcategories(user).unwrap().len(), 1);

        repo.delete_subcategory(user, games.id).unwrap();
        assert!(repo.get_subcategories(user).unwrap().is_empty());
        assert!(repo.delete_subcategory(user, games.id).unwrap_err().is_not_found());

        // Rows stay stored, and the name is free again
        assert_eq!(repo.count().unwrap(), (2, 3));
        repo.insert_category(Category::new(user, "Bills")).unwrap();
    }

    #[test]
    fn test_failed_edit_is_undone() {
        let (temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let bills = Category::new(user, "Bills");
        repo.insert_category(bills.clone()).unwrap();
        let rent = Subcategory::new(user, bills.id, "Rent");
        repo.insert_subcategory(rent.clone()).unwrap();
        repo.save().unwrap();

        let path = temp_dir.path().join("categories.json");
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(repo.rename_category(user, bills.id, "Fixed").is_err());
        assert!(repo.rename_subcategory(user, rent.id, "Mortgage").is_err());
        assert!(repo.delete_category(user, bills.id).is_err());
        assert!(repo.delete_subcategory(user, rent.id).is_err());

        assert_eq!(repo.get_category(user, bills.id).unwrap().unwrap().name, "Bills");
        assert_eq!(repo.get_subcategory(user, rent.id).unwrap().unwrap().name, "Rent");
    }

    #[test]
    fn test_inflow_marker_ids() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let inflow = Category::new(user, "Inflow");
        let rta = Subcategory::new(user, inflow.id, "Ready to Assign");
        let rta_id = rta.id;
        repo.insert_subcategory(rta).unwrap();
        repo.insert_subcategory(Subcategory::new(user, inflow.id, "Groceries")).unwrap();

        assert_eq!(repo.inflow_marker_ids(user).unwrap(), vec![rta_id]);
        assert!(repo.inflow_marker_ids(UserId::new()).unwrap().is_empty());
    }
}
