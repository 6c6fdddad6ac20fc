//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::PlanError;
use crate::models::{AccountId, LedgerRow, SubcategoryId, Transaction, TransactionId, UserId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    #[serde(default)]
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk
    pub fn load(&self) -> Result<(), PlanError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for txn in file_data.transactions {
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Save transactions to disk, newest first
    pub fn save(&self) -> Result<(), PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        self.persist(&data)
    }

    fn persist(&self, data: &HashMap<TransactionId, Transaction>) -> Result<(), PlanError> {
        let mut transactions: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut transactions);

        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    pub fn get(&self, user: UserId, id: TransactionId) -> Result<Option<Transaction>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).filter(|t| t.visible_to(user)).cloned())
    }

    /// Live transactions of `user` matching `predicate`, newest first
    fn select<F>(&self, user: UserId, predicate: F) -> Result<Vec<Transaction>, PlanError>
    where
        F: Fn(&Transaction) -> bool,
    {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = data
            .values()
            .filter(|t| t.visible_to(user) && predicate(t))
            .cloned()
            .collect();
        sort_newest_first(&mut list);
        Ok(list)
    }

    pub fn get_all(&self, user: UserId) -> Result<Vec<Transaction>, PlanError> {
        self.select(user, |_| true)
    }

    /// Transactions tagged with any subcategory
    pub fn get_categorized(&self, user: UserId) -> Result<Vec<Transaction>, PlanError> {
        self.select(user, |t| t.subcategory_id.is_some())
    }

    pub fn get_by_account(
        &self,
        user: UserId,
        account_id: AccountId,
    ) -> Result<Vec<Transaction>, PlanError> {
        self.select(user, |t| t.account_id == account_id)
    }

    /// Transactions of one subcategory dated within `[start, end)`
    pub fn get_by_subcategory_between(
        &self,
        user: UserId,
        subcategory_id: SubcategoryId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>, PlanError> {
        self.select(user, |t| {
            t.subcategory_id == Some(subcategory_id) && t.date >= start && t.date < end
        })
    }

    /// Insert or update a transaction and write the file
    ///
    /// When the write fails the previous row is put back, so memory never
    /// holds a row the file does not.
    pub fn upsert(&self, txn: Transaction) -> Result<(), PlanError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let id = txn.id;
        let previous = data.insert(id, txn);
        if let Err(e) = self.persist(&data) {
            tracing::error!(transaction = %id, error = %e, "transaction write failed, restoring previous row");
            match previous {
                Some(row) => data.insert(id, row),
                None => data.remove(&id),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Remove a row for good and write the file, keeping it on failure
    pub fn remove(&self, id: TransactionId) -> Result<Option<Transaction>, PlanError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let removed = data.remove(&id);
        if let Err(e) = self.persist(&data) {
            tracing::error!(transaction = %id, error = %e, "transaction purge failed, restoring row");
            if let Some(row) = removed {
                data.insert(id, row);
            }
            return Err(e);
        }
        Ok(removed)
    }

    /// Soft-deleted transactions of `user`, most recently deleted first
    pub fn get_deleted(&self, user: UserId, limit: usize) -> Result<Vec<Transaction>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut list: Vec<_> = data
            .values()
            .filter(|t| t.user_id == user && t.is_deleted())
            .cloned()
            .collect();
        list.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        list.truncate(limit);
        Ok(list)
    }

    /// A transaction of `user` whether or not it is deleted
    pub fn get_any(&self, user: UserId, id: TransactionId) -> Result<Option<Transaction>, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).filter(|t| t.user_id == user).cloned())
    }

    pub fn count(&self) -> Result<usize, PlanError> {
        let data = self
            .data
            .read()
            .map_err(|e| PlanError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.len())
    }
}

fn sort_newest_first(list: &mut [Transaction]) {
    list.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TransactionRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn test_get_all_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let account = AccountId::new();
        repo.upsert(Transaction::expense(user, account, date(1, 5), Money::from_units(1))).unwrap();
        repo.upsert(Transaction::expense(user, account, date(3, 5), Money::from_units(3))).unwrap();
        repo.upsert(Transaction::expense(user, account, date(2, 5), Money::from_units(2))).unwrap();

        let dates: Vec<_> = repo.get_all(user).unwrap().iter().map(|t| t.date).collect();
        assert_eq!(dates, vec![date(3, 5), date(2, 5), date(1, 5)]);
    }

    #[test]
    fn test_categorized_excludes_untagged_and_deleted() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let account = AccountId::new();
        let sub = SubcategoryId::new();

        let tagged = Transaction::expense(user, account, date(1, 1), Money::from_units(5))
            .with_subcategory(sub);
        let untagged = Transaction::expense(user, account, date(1, 2), Money::from_units(5));
        let mut deleted = Transaction::expense(user, account, date(1, 3), Money::from_units(5))
            .with_subcategory(sub);
        deleted.deleted_at = Some(Utc::now());
        let tagged_id = tagged.id;

        for t in [tagged, untagged, deleted] {
            repo.upsert(t).unwrap();
        }

        let list = repo.get_categorized(user).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, tagged_id);
        assert!(repo.get_categorized(UserId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_subcategory_window_is_half_open() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let account = AccountId::new();
        let sub = SubcategoryId::new();
        for d in [date(1, 1), date(1, 31), date(2, 1)] {
            repo.upsert(
                Transaction::expense(user, account, d, Money::from_units(1)).with_subcategory(sub),
            )
            .unwrap();
        }

        let jan = repo
            .get_by_subcategory_between(user, sub, date(1, 1), date(2, 1))
            .unwrap();
        assert_eq!(jan.len(), 2);
    }

    #[test]
    fn test_deleted_rows_are_reachable_separately() {
        let (_temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let mut txn = Transaction::expense(user, AccountId::new(), date(1, 9), Money::from_units(4));
        txn.deleted_at = Some(Utc::now());
        let id = txn.id;
        repo.upsert(txn).unwrap();

        assert!(repo.get(user, id).unwrap().is_none());
        assert!(repo.get_any(user, id).unwrap().is_some());
        assert!(repo.get_any(UserId::new(), id).unwrap().is_none());
        assert_eq!(repo.get_deleted(user, 50).unwrap().len(), 1);

        assert!(repo.remove(id).unwrap().is_some());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_failed_write_keeps_memory_and_file_in_step() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let repo = TransactionRepository::new(path.clone());
        let user = UserId::new();
        let txn = Transaction::expense(user, AccountId::new(), date(1, 9), Money::from_units(4));
        let id = txn.id;
        repo.upsert(txn.clone()).unwrap();

        // A directory in place of the file makes every rename fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let new_row = Transaction::expense(user, AccountId::new(), date(1, 10), Money::from_units(8));
        assert!(repo.upsert(new_row.clone()).is_err());
        assert!(repo.get(user, new_row.id).unwrap().is_none());

        let mut edited = txn.clone();
        edited.amount = Money::from_units(-99);
        assert!(repo.upsert(edited).is_err());
        assert_eq!(repo.get(user, id).unwrap().unwrap().amount, txn.amount);

        assert!(repo.remove(id).is_err());
        assert!(repo.get(user, id).unwrap().is_some());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let user = UserId::new();
        let txn = Transaction::income(user, AccountId::new(), date(4, 1), Money::from_units(900))
            .with_payee("Employer");
        let id = txn.id;
        repo.upsert(txn).unwrap();
        repo.save().unwrap();

        let reloaded = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        reloaded.load().unwrap();
        let loaded = reloaded.get(user, id).unwrap().unwrap();
        assert_eq!(loaded.payee, "Employer");
        assert_eq!(loaded.amount, Money::from_units(900));
    }
}
