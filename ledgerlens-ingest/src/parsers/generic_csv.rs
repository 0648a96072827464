//! Parse CSV statement exports into a [`BankStatement`].
//!
//! Banks disagree on header spelling, so columns are located by name from a
//! small alias table. Rows before the header (bank boilerplate) are skipped
//! automatically.
//!
//! [`BankStatement`]: ledgerlens_core::BankStatement

use anyhow::{Context, Result, bail};
use csv::StringRecord;
use ledgerlens_core::{BankStatement, Transaction};
use std::path::Path;

use super::{clean_amount, fill_balances, is_summary_row, normalize_date};

struct Columns {
    date: usize,
    description: usize,
    cheque_ref_no: Option<usize>,
    value_date: Option<usize>,
    withdrawal: Option<usize>,
    deposit: Option<usize>,
    balance: Option<usize>,
}

impl Columns {
    fn from_header(record: &StringRecord) -> Option<Self> {
        let find = |names: &[&str]| {
            record
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        Some(Self {
            date: find(&["Date"])?,
            description: find(&["Narration", "Description"])?,
            cheque_ref_no: find(&["Chq./Ref.No.", "Ref No", "Reference"]),
            value_date: find(&["Value Dt", "Value Date"]),
            withdrawal: find(&["Withdrawal Amt.", "Withdrawal", "Debit"]),
            deposit: find(&["Deposit Amt.", "Deposit", "Credit"]),
            balance: find(&["Closing Balance", "Balance"]),
        })
    }
}

/// Parse a CSV statement export, skipping leading boilerplate and trailing
/// summary rows automatically.
pub fn parse_statement_csv(path: impl AsRef<Path>) -> Result<BankStatement> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut statement = BankStatement {
        currency: Some("INR".to_string()),
        ..BankStatement::default()
    };
    let mut columns: Option<Columns> = None;

    for result in rdr.records() {
        let record = result?;

        let Some(cols) = &columns else {
            if record.get(0).map(|s| s.trim()) == Some("Date") {
                columns = Columns::from_header(&record);
            }
            continue;
        };

        let cell = |col: Option<usize>| -> Option<String> {
            let text = record.get(col?)?.trim().to_string();
            (!text.is_empty()).then_some(text)
        };

        let Some(date_raw) = cell(Some(cols.date)) else {
            continue;
        };
        if is_summary_row(&date_raw) {
            continue;
        }
        let Some(date) = normalize_date(&date_raw) else {
            continue;
        };

        statement.transactions.push(Transaction {
            date: Some(date),
            description: cell(Some(cols.description)),
            cheque_ref_no: cell(cols.cheque_ref_no),
            value_date: cell(cols.value_date),
            withdrawal: cell(cols.withdrawal).as_deref().and_then(clean_amount),
            deposit: cell(cols.deposit).as_deref().and_then(clean_amount),
            balance: cell(cols.balance).as_deref().and_then(clean_amount),
        });
    }

    if columns.is_none() {
        bail!("no transaction header row (Date column) in {}", path.display());
    }
    if statement.transactions.is_empty() {
        bail!("no transactions found in {}", path.display());
    }

    fill_balances(&mut statement);
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
HDFC BANK Ltd.,,,
Statement for account,,,
Date,Narration,Withdrawal Amt.,Deposit Amt.,Closing Balance
01/04/23,UPI-ZOMATO-ORDER,\"1,250.00\",,\"48,750.00\"
02/04/23,NEFT SALARY CREDIT,,\"50,000.00\",\"98,750.00\"
--------,,,,
05/04/23,NETFLIX SUBSCRIPTION,649.00,,\"98,101.00\"
STATEMENT SUMMARY,,,,
";

    fn write_sample() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_csv_statement() {
        let file = write_sample();
        let statement = parse_statement_csv(file.path()).unwrap();

        assert_eq!(statement.transactions.len(), 3);
        let first = &statement.transactions[0];
        assert_eq!(first.date.as_deref(), Some("01/04/2023"));
        assert_eq!(first.description.as_deref(), Some("UPI-ZOMATO-ORDER"));
        assert_eq!(first.withdrawal, Some(1250.0));
        assert_eq!(first.balance, Some(48750.0));
    }

    #[test]
    fn test_parse_csv_balances() {
        let file = write_sample();
        let statement = parse_statement_csv(file.path()).unwrap();
        // 48,750 + the 1,250 withdrawal
        assert_eq!(statement.opening_balance, Some(50000.0));
        assert_eq!(statement.closing_balance, Some(98101.0));
    }

    #[test]
    fn test_parse_csv_without_header_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"a,b,c\n1,2,3\n").unwrap();
        assert!(parse_statement_csv(file.path()).is_err());
    }

    #[test]
    fn test_alias_headers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"Date,Description,Debit,Credit,Balance\n03/04/2023,FUEL HPCL,900.00,,5100.00\n04/04/2023,FUEL HPCL,900.00,,4200.00\n",
        )
        .unwrap();
        let statement = parse_statement_csv(file.path()).unwrap();
        assert_eq!(statement.transactions.len(), 2);
        assert_eq!(statement.transactions[0].withdrawal, Some(900.0));
        assert_eq!(statement.closing_balance, Some(4200.0));
    }
}
