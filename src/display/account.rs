//! Account display formatting
//!
//! Formats accounts with their balances for terminal output.

use crate::models::Money;
use crate::services::AccountSummary;

/// Format a list of accounts with balances as a table
pub fn format_account_list(summaries: &[AccountSummary], symbol: &str) -> String {
    if summaries.is_empty() {
        return "No accounts found.".to_string();
    }

    let name_width = summaries
        .iter()
        .map(|s| s.account.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let type_width = summaries
        .iter()
        .map(|s| s.account.account_type.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<type_width$}  {:>12}  {:>12}  {}\n",
        "Name",
        "Type",
        "Starting",
        "Balance",
        "Cash",
        name_width = name_width,
        type_width = type_width,
    ));
    output.push_str(&separator(name_width, type_width));

    for summary in summaries {
        let account = &summary.account;
        output.push_str(&format!(
            "{:<name_width$}  {:<type_width$}  {:>12}  {:>12}  {}\n",
            account.name,
            account.account_type,
            account.starting_balance.format_with_symbol(symbol),
            summary.current_balance.format_with_symbol(symbol),
            if account.account_type.is_cash() { "yes" } else { "" },
            name_width = name_width,
            type_width = type_width,
        ));
    }

    let total: Money = summaries.iter().map(|s| s.current_balance).sum();
    output.push_str(&separator(name_width, type_width));
    output.push_str(&format!(
        "{:<name_width$}  {:<type_width$}  {:>12}  {:>12}\n",
        "TOTAL",
        "",
        "",
        total.format_with_symbol(symbol),
        name_width = name_width,
        type_width = type_width,
    ));

    output
}

fn separator(name_width: usize, type_width: usize) -> String {
    format!(
        "{:-<name_width$}  {:-<type_width$}  {:->12}  {:->12}  {:-<4}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
        type_width = type_width,
    )
}
