//! File-backed persistence: three flat files in a data directory, overwritten
//! on each write. Single-writer by assumption; there is no locking.

use anyhow::{Context, Result};
use ledgerlens_core::{BankStatement, Report};
use std::fs;
use std::path::{Path, PathBuf};

const TRANSACTIONS_FILE: &str = "transactions.json";
const REPORT_FILE: &str = "financial_report.json";
const INSIGHTS_FILE: &str = "financial_insights.md";

pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.dir.join(TRANSACTIONS_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }

    pub fn insights_path(&self) -> PathBuf {
        self.dir.join(INSIGHTS_FILE)
    }

    pub fn save_statement(&self, statement: &BankStatement) -> Result<()> {
        self.write(&self.transactions_path(), &serde_json::to_string_pretty(statement)?)
    }

    pub fn load_statement(&self) -> Result<Option<BankStatement>> {
        self.read_json(&self.transactions_path())
    }

    pub fn save_report(&self, report: &Report) -> Result<()> {
        self.write(&self.report_path(), &serde_json::to_string_pretty(report)?)
    }

    pub fn load_report(&self) -> Result<Option<Report>> {
        self.read_json(&self.report_path())
    }

    pub fn save_insights(&self, insights: &str) -> Result<()> {
        self.write(&self.insights_path(), insights)
    }

    pub fn load_insights(&self) -> Result<Option<String>> {
        let p = self.insights_path();
        if !p.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))?;
        fs::write(path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Ok(Some(
            serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlens_core::Analyzer;

    fn sample_statement() -> BankStatement {
        BankStatement {
            bank_name: Some("HDFC Bank".to_string()),
            opening_balance: Some(1000.0),
            ..BankStatement::default()
        }
    }

    #[test]
    fn test_statement_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        assert!(store.load_statement().unwrap().is_none());

        let statement = sample_statement();
        store.save_statement(&statement).unwrap();
        assert_eq!(store.load_statement().unwrap(), Some(statement));
    }

    #[test]
    fn test_report_and_insights_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        let report = Analyzer::new(sample_statement()).full_report();
        store.save_report(&report).unwrap();
        assert_eq!(store.load_report().unwrap(), Some(report));

        store.save_insights("## Executive Summary\nAll good.").unwrap();
        assert_eq!(
            store.load_insights().unwrap().as_deref(),
            Some("## Executive Summary\nAll good.")
        );
    }

    #[test]
    fn test_writes_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        store.save_insights("first").unwrap();
        store.save_insights("second").unwrap();
        assert_eq!(store.load_insights().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_corrupt_statement_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        std::fs::write(store.transactions_path(), "not json").unwrap();
        assert!(store.load_statement().is_err());
    }
}
