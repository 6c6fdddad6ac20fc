//! Budget display formatting
//!
//! Renders the monthly snapshot as one table per category under a
//! Ready to Assign header.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::{Goal, Money};
use crate::services::{MonthNotes, Snapshot, SubcategorySnapshot};

#[derive(Tabled)]
struct SubcategoryRow {
    #[tabled(rename = "Subcategory")]
    name: String,
    #[tabled(rename = "Planned")]
    planned: String,
    #[tabled(rename = "Carryover")]
    carryover: String,
    #[tabled(rename = "Assigned")]
    assigned: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Available")]
    available: String,
    #[tabled(rename = "Goal")]
    goal: String,
}

impl SubcategoryRow {
    fn new(sub: &SubcategorySnapshot, symbol: &str) -> Self {
        let goal = match &sub.goal {
            Some(goal) => format!("{} {}%", goal.name, goal.percent()),
            None => String::new(),
        };

        let mut name = sub.name.clone();
        if sub.available.is_negative() {
            name.push_str(" (overspent)");
        }

        Self {
            name,
            planned: money(sub.planned, symbol),
            carryover: money(sub.carryover, symbol),
            assigned: money(sub.assigned, symbol),
            spent: money(sub.spent, symbol),
            available: money(sub.available, symbol),
            goal,
        }
    }
}

fn money(amount: Money, symbol: &str) -> String {
    amount.format_with_symbol(symbol)
}

/// Format the month's snapshot for the terminal
pub fn format_snapshot(snapshot: &Snapshot, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Budget: {}\n", snapshot.month_year.friendly()));
    output.push_str(&format!("{}\n", "=".repeat(40)));
    output.push_str(&format!(
        "Ready to Assign: {:>14}\n",
        money(snapshot.ready_to_assign, symbol)
    ));
    output.push_str(&format!(
        "  Carryover:     {:>14}\n",
        money(snapshot.carryover, symbol)
    ));
    output.push_str(&format!(
        "  Cash inflow:   {:>14}\n",
        money(snapshot.total_cash, symbol)
    ));
    output.push_str(&format!(
        "  Assigned:      {:>14}\n",
        money(snapshot.total_assigned, symbol)
    ));

    if snapshot.categories.is_empty() {
        output.push_str("\nNo categories yet. Run 'plan category add <name>' to create one.\n");
        return output;
    }

    for category in &snapshot.categories {
        output.push_str(&format!("\n{}\n", category.name));

        if category.subcategories.is_empty() {
            output.push_str("  (no subcategories)\n");
            continue;
        }

        let rows: Vec<_> = category
            .subcategories
            .iter()
            .map(|s| SubcategoryRow::new(s, symbol))
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::psql())
            .modify(Columns::new(1..6), Alignment::right());
        output.push_str(&table.to_string());
        output.push('\n');
    }

    output
}

/// Format the notes and target of one subcategory month
pub fn format_month_notes(subcategory: &str, month: &str, notes: &MonthNotes, symbol: &str) -> String {
    let mut output = format!("{} ({})\n", subcategory, month);

    match notes.target_amount {
        Some(target) => output.push_str(&format!("  Target: {}\n", money(target, symbol))),
        None => output.push_str("  Target: (none)\n"),
    }
    match &notes.notes {
        Some(text) => output.push_str(&format!("  Notes:  {}\n", text)),
        None => output.push_str("  Notes:  (none)\n"),
    }

    output
}

#[derive(Tabled)]
struct GoalRow {
    #[tabled(rename = "Goal")]
    name: String,
    #[tabled(rename = "Subcategory")]
    subcategory: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "By")]
    by: String,
    #[tabled(rename = "ID")]
    id: String,
}

/// Format active goals; `subcategory_name` resolves the display name
pub fn format_goal_list<F>(goals: &[Goal], symbol: &str, subcategory_name: F) -> String
where
    F: Fn(&Goal) -> String,
{
    if goals.is_empty() {
        return "No active goals.".to_string();
    }

    let rows: Vec<_> = goals
        .iter()
        .map(|g| GoalRow {
            name: g.name.clone(),
            subcategory: subcategory_name(g),
            target: money(g.target_amount, symbol),
            by: g
                .target_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            id: g.id.full(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::single(2), Alignment::right());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, GoalId, MonthYear, SubcategoryId};
    use crate::services::{CategorySnapshot, GoalProgress};

    fn sub(name: &str, available: i64) -> SubcategorySnapshot {
        SubcategorySnapshot {
            id: SubcategoryId::new(),
            name: name.into(),
            planned: Money::zero(),
            assigned: Money::from_units(100),
            spent: Money::from_units(100 - available),
            available: Money::from_units(available),
            carryover: Money::zero(),
            inflow: Money::zero(),
            outflow: Money::zero(),
            goal: None,
        }
    }

    fn snapshot(categories: Vec<CategorySnapshot>) -> Snapshot {
        Snapshot {
            ready_to_assign: Money::from_cents(12_345),
            carryover: Money::zero(),
            total_cash: Money::from_units(500),
            total_assigned: Money::from_cents(37_655),
            month_year: MonthYear::new(2025, 3).unwrap(),
            categories,
        }
    }

    #[test]
    fn test_header_totals() {
        let output = format_snapshot(&snapshot(vec![]), "$");
        assert!(output.contains("Budget: March 2025"));
        assert!(output.contains("$123.45"));
        assert!(output.contains("$376.55"));
        assert!(output.contains("No categories yet"));
    }

    #[test]
    fn test_rows_and_overspent_marker() {
        let mut rent = sub("Rent", 0);
        rent.goal = Some(GoalProgress {
            id: GoalId::new(),
            name: "Deposit".into(),
            target_amount: Money::from_units(400),
            target_date: None,
            current_saved: Money::from_units(100),
        });
        let output = format_snapshot(
            &snapshot(vec![CategorySnapshot {
                id: CategoryId::new(),
                name: "Home".into(),
                subcategories: vec![rent, sub("Dining", -20)],
            }]),
            "€",
        );

        assert!(output.contains("Home"));
        assert!(output.contains("Available"));
        assert!(output.contains("Dining (overspent)"));
        assert!(output.contains("-€20.00"));
        assert!(output.contains("Deposit 25%"));
    }

    #[test]
    fn test_month_notes() {
        let output = format_month_notes(
            "Rent",
            "2025-03",
            &MonthNotes {
                notes: Some("lease renews".into()),
                target_amount: None,
            },
            "$",
        );
        assert!(output.contains("Target: (none)"));
        assert!(output.contains("Notes:  lease renews"));
    }
}
