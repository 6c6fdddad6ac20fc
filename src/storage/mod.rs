//! Storage layer for envelope-plan
//!
//! One JSON document per table, held in memory behind `RwLock`s and written
//! atomically. `Storage` is the context handle every service borrows; there
//! is no global client.

pub mod accounts;
pub mod budget;
pub mod categories;
pub mod file_io;
pub mod goals;
pub mod init;
pub mod payees;
pub mod transactions;

pub use accounts::AccountRepository;
pub use budget::{BudgetRepository, BudgetWrite};
pub use categories::CategoryRepository;
pub use file_io::{read_json, write_json_atomic};
pub use goals::GoalRepository;
pub use init::initialize_storage;
pub use payees::PayeeRepository;
pub use transactions::TransactionRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::PlanPaths;
use crate::error::PlanError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: PlanPaths,
    audit: AuditLogger,
    pub accounts: AccountRepository,
    pub categories: CategoryRepository,
    pub transactions: TransactionRepository,
    pub budgets: BudgetRepository,
    pub goals: GoalRepository,
    pub payees: PayeeRepository,
}

impl Storage {
    /// Create a Storage instance; call `load_all` to read existing data
    pub fn new(paths: PlanPaths) -> Result<Self, PlanError> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            accounts: AccountRepository::new(paths.accounts_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            budgets: BudgetRepository::new(paths.monthly_budgets_file()),
            goals: GoalRepository::new(paths.goals_file()),
            payees: PayeeRepository::new(paths.payees_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &PlanPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load every table from disk
    pub fn load_all(&self) -> Result<(), PlanError> {
        self.accounts.load()?;
        self.categories.load()?;
        self.transactions.load()?;
        self.budgets.load()?;
        self.goals.load()?;
        self.payees.load()?;
        tracing::debug!(base_dir = %self.paths.base_dir().display(), "storage loaded");
        Ok(())
    }

    /// Save every table to disk
    pub fn save_all(&self) -> Result<(), PlanError> {
        self.accounts.save()?;
        self.categories.save()?;
        self.transactions.save()?;
        self.budgets.save()?;
        self.goals.save()?;
        self.payees.save()?;
        Ok(())
    }

    /// Check if settings have been written (`plan init` has run)
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    /// Audit a persisted create
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), PlanError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Audit a persisted update
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), PlanError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    /// Audit a permanent removal
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), PlanError> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }

    /// Audit several writes that were persisted together
    pub fn log_entries(&self, entries: &[AuditEntry]) -> Result<(), PlanError> {
        self.audit.log_batch(entries)
    }
}
