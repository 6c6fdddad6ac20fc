//! Transaction display formatting
//!
//! Register view of transactions.

use crate::models::Transaction;

/// Format a single transaction as a register row
pub fn format_transaction_row(txn: &Transaction, symbol: &str) -> String {
    let transfer_indicator = if txn.is_account_transfer() { "⇄ " } else { "" };

    let payee_display = if txn.payee.is_empty() {
        "(no payee)".to_string()
    } else {
        format!("{}{}", transfer_indicator, txn.payee)
    };

    format!(
        "{} {:<7} {:20} {:>12}  {}",
        txn.date.format("%Y-%m-%d"),
        txn.transaction_type,
        truncate(&payee_display, 20),
        txn.signed_amount().format_with_symbol(symbol),
        txn.id.full()
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(transactions: &[Transaction], symbol: &str) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:10} {:<7} {:20} {:>12}  {}\n",
        "Date", "Type", "Payee", "Amount", "ID"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(txn, symbol));
        output.push('\n');
    }

    output
}

/// Truncate to `max_len` characters with an ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, Money, UserId, ACCOUNT_TRANSFER_PAYEE};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_row_shows_signed_amount() {
        let txn = Transaction::expense(UserId::new(), AccountId::new(), date(), Money::from_cents(4599))
            .with_payee("Corner Store");
        let row = format_transaction_row(&txn, "$");
        assert!(row.starts_with("2025-03-14 expense"));
        assert!(row.contains("Corner Store"));
        assert!(row.contains("-$45.99"));
    }

    #[test]
    fn test_transfer_indicator_and_truncation() {
        let txn = Transaction::income(UserId::new(), AccountId::new(), date(), Money::from_units(1))
            .with_payee(ACCOUNT_TRANSFER_PAYEE);
        assert!(format_transaction_row(&txn, "$").contains("⇄ Account Transfer"));

        assert_eq!(truncate("A very long payee name indeed", 10), "A very ...");
        assert_eq!(truncate("Short", 10), "Short");
    }

    #[test]
    fn test_empty_register() {
        assert_eq!(format_transaction_register(&[], "$"), "No transactions found.\n");
    }
}
