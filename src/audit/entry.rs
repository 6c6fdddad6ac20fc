//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::summarize_changes;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Ledger tables that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Account,
    Category,
    Subcategory,
    Transaction,
    MonthlyBudget,
    Goal,
    Payee,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityType::Account => "Account",
            EntityType::Category => "Category",
            EntityType::Subcategory => "Subcategory",
            EntityType::Transaction => "Transaction",
            EntityType::MonthlyBudget => "MonthlyBudget",
            EntityType::Goal => "Goal",
            EntityType::Payee => "Payee",
        };
        f.pad(label)
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,
    pub entity_id: String,

    /// Human-readable label (account name, "Groceries 2025-01", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    /// Entry for a newly created row
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Create,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: None,
            after: serde_json::to_value(entity).ok(),
            diff_summary: None,
        }
    }

    /// Entry for an updated row; the change summary is derived from both states
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let before = serde_json::to_value(before).ok();
        let after = serde_json::to_value(after).ok();
        let diff_summary = match (&before, &after) {
            (Some(b), Some(a)) => summarize_changes(b, a),
            _ => None,
        };

        Self {
            timestamp: Utc::now(),
            operation: Operation::Update,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before,
            after,
            diff_summary,
        }
    }

    /// Entry for a row removed for good
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Delete,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: serde_json::to_value(entity).ok(),
            after: None,
            diff_summary: None,
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_entry() {
        let entry = AuditEntry::create(
            EntityType::Payee,
            "pay-12345678",
            Some("Landlord".to_string()),
            &json!({"name": "Landlord"}),
        );

        assert_eq!(entry.operation, Operation::Create);
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
        assert!(entry.diff_summary.is_none());
    }

    #[test]
    fn test_update_entry_summarizes_changes() {
        let entry = AuditEntry::update(
            EntityType::MonthlyBudget,
            "sub-12345678:2025-01",
            None,
            &json!({"assigned_amount": 10000}),
            &json!({"assigned_amount": 12500}),
        );

        assert_eq!(entry.operation, Operation::Update);
        assert_eq!(
            entry.diff_summary.as_deref(),
            Some("assigned_amount: 10000 -> 12500")
        );
    }

    #[test]
    fn test_delete_entry_keeps_before() {
        let entry = AuditEntry::delete(EntityType::Transaction, "txn-1", None, &json!({"amount": -500}));
        assert_eq!(entry.operation, Operation::Delete);
        assert!(entry.after.is_none());
        assert_eq!(entry.before.unwrap()["amount"], -500);
    }

    #[test]
    fn test_entity_type_serializes_snake_case() {
        let entry = AuditEntry::create(EntityType::MonthlyBudget, "x", None, &json!({}));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["entity_type"], "monthly_budget");
        assert_eq!(value["operation"], "create");
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::update(
            EntityType::MonthlyBudget,
            "sub-12345678:2025-01",
            Some("Groceries 2025-01".to_string()),
            &json!({"notes": null}),
            &json!({"notes": "bulk shop"}),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("UPDATE MonthlyBudget sub-12345678:2025-01"));
        assert!(formatted.contains("(Groceries 2025-01)"));
        assert!(formatted.contains("Changes: notes: none -> \"bulk shop\""));
    }
}
