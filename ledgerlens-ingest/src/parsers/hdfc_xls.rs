//! Parse HDFC-style XLS statement exports into a [`BankStatement`].
//!
//! The export carries ~20 rows of account boilerplate, then a header row
//! (`Date`, `Narration`, ...), then transactions interleaved with page
//! separators and a trailing summary block. Account metadata is scavenged
//! from the boilerplate; balances are back-filled from the running-balance
//! column.
//!
//! [`BankStatement`]: ledgerlens_core::BankStatement

use anyhow::{Context, Result, anyhow, bail};
use calamine::{Data, Reader, open_workbook_auto};
use ledgerlens_core::{BankStatement, Transaction};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use super::{clean_amount, excel_serial_to_date, fill_balances, is_summary_row, normalize_date};

/// How deep into the boilerplate we look for account metadata
const HEADER_SCAN_ROWS: usize = 30;

pub fn parse_statement_xls(path: impl AsRef<Path>) -> Result<BankStatement> {
    let path = path.as_ref();
    let mut workbook =
        open_workbook_auto(path).map_err(|e| anyhow!("opening {}: {e}", path.display()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("{} has no sheets", path.display()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| anyhow!("reading sheet {sheet}: {e}"))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    parse_rows(&rows)
}

/// Core of the parser, split out so it can be exercised without an XLS file
fn parse_rows(rows: &[Vec<String>]) -> Result<BankStatement> {
    let header_idx = rows
        .iter()
        .position(|row| {
            row.iter().any(|c| c.trim() == "Date") && row.iter().any(|c| c.contains("Narration"))
        })
        .ok_or_else(|| anyhow!("could not find transaction header (Date/Narration row)"))?;

    let header = &rows[header_idx];
    let find_col = |name: &str| header.iter().position(|c| c.trim() == name);

    let date_col = find_col("Date").ok_or_else(|| anyhow!("missing Date column"))?;
    let desc_col = header
        .iter()
        .position(|c| c.contains("Narration"))
        .ok_or_else(|| anyhow!("missing Narration column"))?;
    let ref_col = find_col("Chq./Ref.No.");
    let value_col = find_col("Value Dt");
    let withdrawal_col = find_col("Withdrawal Amt.");
    let deposit_col = find_col("Deposit Amt.");
    let balance_col = find_col("Closing Balance");

    let mut statement = scan_account_info(&rows[..header_idx.min(HEADER_SCAN_ROWS)]);

    let cell = |row: &[String], col: Option<usize>| -> Option<String> {
        let text = row.get(col?)?.trim().to_string();
        (!text.is_empty()).then_some(text)
    };

    for row in &rows[header_idx + 1..] {
        let Some(date_raw) = cell(row, Some(date_col)) else {
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
            description: cell(row, Some(desc_col)),
            cheque_ref_no: cell(row, ref_col),
            value_date: cell(row, value_col),
            withdrawal: cell(row, withdrawal_col).as_deref().and_then(clean_amount),
            deposit: cell(row, deposit_col).as_deref().and_then(clean_amount),
            balance: cell(row, balance_col).as_deref().and_then(clean_amount),
        });
    }

    if statement.transactions.is_empty() {
        bail!("no transactions found after the header row");
    }

    fill_balances(&mut statement);
    Ok(statement)
}

/// Pull account metadata out of the boilerplate rows above the header
fn scan_account_info(rows: &[Vec<String>]) -> BankStatement {
    let mut statement = BankStatement {
        currency: Some("INR".to_string()),
        ..BankStatement::default()
    };

    for (idx, row) in rows.iter().enumerate() {
        let values: Vec<&str> = row.iter().map(|c| c.trim()).filter(|c| !c.is_empty()).collect();
        if values.is_empty() {
            continue;
        }
        let row_str = values.join(" ");

        if row_str.contains("HDFC") && statement.bank_name.is_none() {
            statement.bank_name = Some("HDFC Bank".to_string());
        }

        // Account holder sits in the first few rows, prefixed MR./MRS./MS.
        if idx < 10
            && statement.account_holder.is_none()
            && ["MR.", "MRS.", "MS."].iter().any(|p| row_str.contains(p))
        {
            let name_parts: Vec<&str> = values
                .iter()
                .filter(|v| !v.starts_with("HDFC") && v.len() > 2)
                .take(4)
                .copied()
                .collect();
            if !name_parts.is_empty() {
                statement.account_holder = Some(name_parts.join(" "));
            }
        }

        if row_str.contains("Account No") {
            if let Some(m) = account_no_re().find(&row_str) {
                statement.account_number = Some(m.as_str().to_string());
            }
        }

        if row_str.contains("Account Branch") {
            if let Some(caps) = branch_re().captures(&row_str) {
                statement.branch = Some(caps[1].trim().to_string());
            }
        }

        if row_str.contains("Statement From") {
            if let Some(caps) = period_re().captures(&row_str) {
                statement.statement_period_from = Some(caps[1].to_string());
                statement.statement_period_to = Some(caps[2].to_string());
            }
        }
    }

    statement
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).unwrap_or_default(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty | Data::Error(_) => String::new(),
    }
}

fn account_no_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{14}").expect("static pattern"))
}

fn branch_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Account Branch\s*:?\s*([A-Z ]+?)(?:Address|$)").expect("static pattern"))
}

fn period_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{2}/\d{2}/\d{4})\s+To[:\s]+(\d{2}/\d{2}/\d{4})").expect("static pattern")
    })
}
