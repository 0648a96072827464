//! ledgerlens-core: statement types, categorization, and the analytics engine

pub mod analyzer;
pub mod categorize;
pub mod report;
pub mod statement;

pub use analyzer::Analyzer;
pub use categorize::{Category, categorize};
pub use report::{AnalysisPeriod, ExpenseRow, RecurringPayment, Report, Summary};
pub use statement::{BankStatement, Invoice, Transaction, parse_statement_date};
