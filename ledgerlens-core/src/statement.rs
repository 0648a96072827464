//! Statement and invoice record types shared by extraction, ingestion, and analytics.
//!
//! Every field is optional: extraction providers return whatever the document
//! actually contains, and parsers fill in what they can. Dates are kept as the
//! DD/MM/YYYY strings found on statements; [`parse_statement_date`] converts
//! them when analytics needs real dates.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single statement line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    /// Transaction date (DD/MM/YYYY)
    pub date: Option<String>,
    /// Description / narration
    pub description: Option<String>,
    /// Cheque or reference number
    pub cheque_ref_no: Option<String>,
    /// Value date, when it differs from the transaction date
    pub value_date: Option<String>,
    /// Debit amount
    pub withdrawal: Option<f64>,
    /// Credit amount
    pub deposit: Option<f64>,
    /// Running balance after this transaction
    pub balance: Option<f64>,
}

impl Transaction {
    /// Debit amount, with missing treated as zero
    pub fn withdrawal_or_zero(&self) -> f64 {
        self.withdrawal.unwrap_or(0.0)
    }

    /// Credit amount, with missing treated as zero
    pub fn deposit_or_zero(&self) -> f64 {
        self.deposit.unwrap_or(0.0)
    }
}

/// Extracted bank statement: account metadata plus all transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BankStatement {
    pub account_holder: Option<String>,
    pub account_number: Option<String>,
    pub bank_name: Option<String>,
    pub branch: Option<String>,
    /// Statement start date (DD/MM/YYYY)
    pub statement_period_from: Option<String>,
    /// Statement end date (DD/MM/YYYY)
    pub statement_period_to: Option<String>,
    pub opening_balance: Option<f64>,
    pub closing_balance: Option<f64>,
    /// Currency code (INR, USD, ...)
    pub currency: Option<String>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Extracted invoice data (legacy document kind; never persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Invoice {
    pub invoice_number: Option<String>,
    pub date: Option<String>,
    pub total_amount: Option<f64>,
    pub tax_amount: Option<f64>,
    pub vendor: Option<String>,
    pub recipient: Option<String>,
    pub account_no: Option<String>,
}

/// Parse a DD/MM/YYYY statement date. Returns None for anything unparseable.
pub fn parse_statement_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statement_date() {
        assert_eq!(
            parse_statement_date("05/01/2025"),
            NaiveDate::from_ymd_opt(2025, 1, 5)
        );
        assert_eq!(parse_statement_date(" 28/02/2024 "), NaiveDate::from_ymd_opt(2024, 2, 28));
        assert_eq!(parse_statement_date("2025-01-05"), None);
        assert_eq!(parse_statement_date("31/02/2025"), None);
    }

    #[test]
    fn test_statement_deserializes_without_transactions() {
        let s: BankStatement = serde_json::from_str(
            r#"{"account_holder":"A","account_number":null,"bank_name":"HDFC Bank",
                "branch":null,"statement_period_from":null,"statement_period_to":null,
                "opening_balance":100.0,"closing_balance":null,"currency":"INR"}"#,
        )
        .unwrap();
        assert!(s.transactions.is_empty());
        assert_eq!(s.bank_name.as_deref(), Some("HDFC Bank"));
    }

    #[test]
    fn test_amount_defaults() {
        let t = Transaction {
            date: None,
            description: None,
            cheque_ref_no: None,
            value_date: None,
            withdrawal: None,
            deposit: Some(250.0),
            balance: None,
        };
        assert_eq!(t.withdrawal_or_zero(), 0.0);
        assert_eq!(t.deposit_or_zero(), 250.0);
    }
}
