//! Bank-specific statement parsers producing the shared [`BankStatement`] shape.
//!
//! [`BankStatement`]: ledgerlens_core::BankStatement

pub mod generic_csv;
pub mod hdfc_xls;

use chrono::{Duration, NaiveDate};
use ledgerlens_core::{BankStatement, Transaction};

/// Rows whose date cell carries one of these markers are statement chrome,
/// not transactions.
const SUMMARY_MARKERS: &[&str] =
    &["opening balance", "statement summary", "generated", "continue", "page no"];

pub(crate) fn is_summary_row(date_cell: &str) -> bool {
    let lower = date_cell.to_lowercase();
    if SUMMARY_MARKERS.iter().any(|m| lower.contains(m)) {
        return true;
    }
    // page-separator rows are all dashes
    !date_cell.is_empty() && date_cell.chars().all(|c| c == '-' || c == ' ')
}

/// Normalize a statement date cell to DD/MM/YYYY. Accepts two- or four-digit
/// years; anything else is dropped by the caller.
pub(crate) fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    for fmt in ["%d/%m/%y", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.format("%d/%m/%Y").to_string());
        }
    }
    None
}

/// Parse an amount cell: thousands separators stripped, blanks and
/// non-numbers become None.
pub(crate) fn clean_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    // f64::from_str accepts "nan"/"inf"; neither is an amount
    let value = cleaned.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Excel serial date (days since 1899-12-30) to DD/MM/YYYY
pub(crate) fn excel_serial_to_date(serial: f64) -> Option<String> {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = base.checked_add_signed(Duration::days(serial as i64))?;
    Some(date.format("%d/%m/%Y").to_string())
}

/// Back-fill opening/closing balances from the running-balance column:
/// opening is the first balance with its own movement undone, closing is the
/// last balance seen.
pub(crate) fn fill_balances(statement: &mut BankStatement) {
    let with_balance: Vec<&Transaction> = statement
        .transactions
        .iter()
        .filter(|t| t.balance.is_some())
        .collect();

    let Some(first) = with_balance.first() else {
        return;
    };
    let balance = first.balance.unwrap_or(0.0);

    statement.opening_balance = Some(if let Some(w) = first.withdrawal {
        balance + w
    } else if let Some(d) = first.deposit {
        balance - d
    } else {
        balance
    });
    statement.closing_balance = with_balance.last().and_then(|t| t.balance);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_summary_row() {
        assert!(is_summary_row("Opening Balance"));
        assert!(is_summary_row("  STATEMENT SUMMARY :-"));
        assert!(is_summary_row("--------"));
        assert!(!is_summary_row("01/04/23"));
        assert!(!is_summary_row(""));
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("01/04/23").as_deref(), Some("01/04/2023"));
        assert_eq!(normalize_date("15/12/2024").as_deref(), Some("15/12/2024"));
        assert_eq!(normalize_date("garbage"), None);
        assert_eq!(normalize_date("32/01/23"), None);
    }

    #[test]
    fn test_clean_amount() {
        assert_eq!(clean_amount("1,23,456.78"), Some(123456.78));
        assert_eq!(clean_amount(" 500 "), Some(500.0));
        assert_eq!(clean_amount(""), None);
        assert_eq!(clean_amount("nan"), None);
        assert_eq!(clean_amount("-"), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        // 2023-04-01 is serial 45017
        assert_eq!(excel_serial_to_date(45017.0).as_deref(), Some("01/04/2023"));
    }

    #[test]
    fn test_fill_balances() {
        let mut statement = BankStatement {
            transactions: vec![
                Transaction {
                    date: Some("01/01/2025".to_string()),
                    description: Some("ATM WDL".to_string()),
                    cheque_ref_no: None,
                    value_date: None,
                    withdrawal: Some(500.0),
                    deposit: None,
                    balance: Some(9500.0),
                },
                Transaction {
                    date: Some("02/01/2025".to_string()),
                    description: Some("SALARY".to_string()),
                    cheque_ref_no: None,
                    value_date: None,
                    withdrawal: None,
                    deposit: Some(40000.0),
                    balance: Some(49500.0),
                },
            ],
            ..BankStatement::default()
        };
        fill_balances(&mut statement);
        assert_eq!(statement.opening_balance, Some(10000.0));
        assert_eq!(statement.closing_balance, Some(49500.0));
    }
}
