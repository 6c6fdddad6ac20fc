//! envelope-plan - monthly zero-based budget engine
//!
//! Computes a month's budget snapshot from the ledger: Ready to Assign,
//! per-subcategory carryover and available balances, and the amount each
//! goal needs this month. Assignment writes (assign, move, targets) go
//! through a single mutator so totals stay consistent.
//!
//! # Architecture
//!
//! - `config`: Settings and path management
//! - `error`: Custom error types
//! - `models`: Core data models (money, months, accounts, budgets, goals)
//! - `storage`: JSON file storage layer
//! - `services`: Snapshot engine, assignment mutator and ledger services
//! - `audit`: Audit logging system
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use envelope_plan::config::{paths::PlanPaths, settings::Settings};
//! use envelope_plan::services::SnapshotService;
//! use envelope_plan::storage::Storage;
//!
//! let paths = PlanPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! let snapshot = SnapshotService::new(&storage).build(settings.user_id, None)?;
//! println!("Ready to Assign: {}", snapshot.ready_to_assign);
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{PlanError, PlanResult};
