//! Report types produced by the analyzer and persisted as financial_report.json.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statement-level totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_change: f64,
    pub opening_balance: f64,
    pub closing_balance: f64,
    pub avg_daily_spending: f64,
    /// Percentage of income kept, 0 when there is no income
    pub savings_rate: f64,
}

/// A single expense line, used for top-expense and unusual-transaction lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRow {
    /// ISO date (YYYY-MM-DD) when parseable, otherwise the raw statement date
    pub date: Option<String>,
    pub description: Option<String>,
    pub withdrawal: f64,
}

/// A merchant seen at least twice in the statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringPayment {
    pub merchant: String,
    pub frequency: usize,
    pub total_spent: f64,
    pub avg_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Full analytics report for one statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    /// Category label -> total withdrawals (categories with zero spend omitted)
    pub spending_by_category: BTreeMap<String, f64>,
    pub top_expenses: Vec<ExpenseRow>,
    pub recurring_payments: Vec<RecurringPayment>,
    pub unusual_transactions: Vec<ExpenseRow>,
    /// ISO date -> total withdrawals that day
    pub spending_trend: BTreeMap<String, f64>,
    pub transaction_count: usize,
    pub analysis_period: AnalysisPeriod,
}
