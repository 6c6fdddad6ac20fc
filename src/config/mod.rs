//! Configuration module for envelope-plan
//!
//! - XDG-compliant path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::PlanPaths;
pub use settings::Settings;
