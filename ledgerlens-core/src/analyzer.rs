//! Statement analytics: category totals, recurring-payment clustering,
//! outlier detection, and the assembled report.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};

use crate::categorize::{Category, categorize};
use crate::report::{AnalysisPeriod, ExpenseRow, RecurringPayment, Report, Summary};
use crate::statement::{BankStatement, parse_statement_date};

/// Number of entries kept in the top-expense and recurring lists
pub const TOP_N: usize = 10;

/// Withdrawals beyond mean + K * stddev are flagged as unusual
pub const OUTLIER_STDDEVS: f64 = 3.0;

/// How much of a description identifies the merchant: everything before a
/// UPI-style `@` handle, capped at 30 characters.
const MERCHANT_KEY_LEN: usize = 30;

struct Row {
    date: Option<NaiveDate>,
    date_raw: Option<String>,
    description: Option<String>,
    withdrawal: f64,
    deposit: f64,
    category: Category,
}

/// Analyzes one extracted statement. Categories are assigned up front;
/// every aggregate below reads from the same normalized rows.
pub struct Analyzer {
    statement: BankStatement,
    rows: Vec<Row>,
}

impl Analyzer {
    pub fn new(statement: BankStatement) -> Self {
        let rows = statement
            .transactions
            .iter()
            .map(|t| Row {
                date: t.date.as_deref().and_then(parse_statement_date),
                date_raw: t.date.clone(),
                description: t.description.clone(),
                withdrawal: t.withdrawal_or_zero(),
                deposit: t.deposit_or_zero(),
                category: categorize(t.description.as_deref()),
            })
            .collect();
        Self { statement, rows }
    }

    /// Total withdrawals per category, zero-spend categories omitted
    pub fn spending_by_category(&self) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for row in &self.rows {
            if row.withdrawal > 0.0 {
                *totals.entry(row.category.label().to_string()).or_insert(0.0) += row.withdrawal;
            }
        }
        totals.into_iter().map(|(k, v)| (k, round2(v))).collect()
    }

    /// The n largest withdrawals, descending
    pub fn top_expenses(&self, n: usize) -> Vec<ExpenseRow> {
        let mut expenses: Vec<&Row> = self.rows.iter().filter(|r| r.withdrawal > 0.0).collect();
        expenses.sort_by(|a, b| b.withdrawal.partial_cmp(&a.withdrawal).unwrap());
        expenses.into_iter().take(n).map(|r| expense_row(r)).collect()
    }

    /// Statement-level totals
    pub fn monthly_summary(&self) -> Summary {
        let total_income: f64 = self.rows.iter().map(|r| r.deposit).sum();
        let total_expenses: f64 = self.rows.iter().map(|r| r.withdrawal).sum();

        // Unparseable dates collapse into one bucket, matching how the
        // aggregation treats them elsewhere.
        let distinct_days = self
            .rows
            .iter()
            .map(|r| r.date)
            .collect::<HashSet<Option<NaiveDate>>>()
            .len()
            .max(1);

        let savings_rate = if total_income > 0.0 {
            round2((total_income - total_expenses) / total_income * 100.0)
        } else {
            0.0
        };

        Summary {
            total_income: round2(total_income),
            total_expenses: round2(total_expenses),
            net_change: round2(total_income - total_expenses),
            opening_balance: self.statement.opening_balance.unwrap_or(0.0),
            closing_balance: self.statement.closing_balance.unwrap_or(0.0),
            avg_daily_spending: round2(total_expenses / distinct_days as f64),
            savings_rate,
        }
    }

    /// Cluster repeated merchants: same key (description before `@`, first 30
    /// chars), at least two occurrences, positive withdrawal total. Sorted by
    /// total spent, top 10.
    pub fn recurring_payments(&self) -> Vec<RecurringPayment> {
        let mut seen_descriptions: HashSet<&str> = HashSet::new();
        let mut seen_merchants: HashSet<String> = HashSet::new();
        let mut recurring = Vec::new();

        for row in &self.rows {
            let Some(desc) = row.description.as_deref() else {
                continue;
            };
            if !seen_descriptions.insert(desc) {
                continue;
            }

            let merchant = merchant_key(desc);
            if merchant.is_empty() || !seen_merchants.insert(merchant.clone()) {
                continue;
            }

            let needle = merchant.to_lowercase();
            let matching: Vec<&Row> = self
                .rows
                .iter()
                .filter(|r| {
                    r.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                })
                .collect();

            if matching.len() < 2 {
                continue;
            }

            let total: f64 = matching.iter().map(|r| r.withdrawal).sum();
            if total <= 0.0 {
                continue;
            }

            recurring.push(RecurringPayment {
                merchant,
                frequency: matching.len(),
                total_spent: round2(total),
                avg_amount: round2(total / matching.len() as f64),
            });
        }

        recurring.sort_by(|a, b| b.total_spent.partial_cmp(&a.total_spent).unwrap());
        recurring.truncate(TOP_N);
        recurring
    }

    /// Withdrawals above mean + `stddevs` * sample standard deviation
    pub fn unusual_transactions(&self, stddevs: f64) -> Vec<ExpenseRow> {
        let n = self.rows.len();
        if n < 2 {
            return Vec::new();
        }

        let mean = self.rows.iter().map(|r| r.withdrawal).sum::<f64>() / n as f64;
        let variance = self
            .rows
            .iter()
            .map(|r| (r.withdrawal - mean).powi(2))
            .sum::<f64>()
            / (n - 1) as f64;
        let threshold = mean + stddevs * variance.sqrt();

        self.rows
            .iter()
            .filter(|r| r.withdrawal > threshold)
            .map(|r| expense_row(r))
            .collect()
    }

    /// Total withdrawals per day, keyed by ISO date. Rows without a parseable
    /// date are excluded.
    pub fn spending_trend(&self) -> BTreeMap<String, f64> {
        let mut daily: BTreeMap<String, f64> = BTreeMap::new();
        for row in &self.rows {
            if let Some(date) = row.date {
                *daily.entry(date.format("%Y-%m-%d").to_string()).or_insert(0.0) +=
                    row.withdrawal;
            }
        }
        daily.into_iter().map(|(k, v)| (k, round2(v))).collect()
    }

    /// Assemble the complete report
    pub fn full_report(&self) -> Report {
        Report {
            summary: self.monthly_summary(),
            spending_by_category: self.spending_by_category(),
            top_expenses: self.top_expenses(TOP_N),
            recurring_payments: self.recurring_payments(),
            unusual_transactions: self.unusual_transactions(OUTLIER_STDDEVS),
            spending_trend: self.spending_trend(),
            transaction_count: self.rows.len(),
            analysis_period: AnalysisPeriod {
                from: self.statement.statement_period_from.clone(),
                to: self.statement.statement_period_to.clone(),
            },
        }
    }

    /// Per-transaction categories, in statement order
    pub fn categories(&self) -> Vec<Category> {
        self.rows.iter().map(|r| r.category).collect()
    }
}

fn expense_row(row: &Row) -> ExpenseRow {
    ExpenseRow {
        date: row
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .or_else(|| row.date_raw.clone()),
        description: row.description.clone(),
        withdrawal: row.withdrawal,
    }
}

fn merchant_key(description: &str) -> String {
    let head = description.split('@').next().unwrap_or(description);
    head.chars().take(MERCHANT_KEY_LEN).collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Transaction;

    fn txn(date: &str, desc: &str, withdrawal: Option<f64>, deposit: Option<f64>) -> Transaction {
        Transaction {
            date: Some(date.to_string()),
            description: Some(desc.to_string()),
            cheque_ref_no: None,
            value_date: None,
            withdrawal,
            deposit,
            balance: None,
        }
    }

    fn sample_statement() -> BankStatement {
        BankStatement {
            account_holder: Some("MR. SHARMA".to_string()),
            opening_balance: Some(10000.0),
            closing_balance: Some(52100.0),
            statement_period_from: Some("01/01/2025".to_string()),
            statement_period_to: Some("31/01/2025".to_string()),
            currency: Some("INR".to_string()),
            transactions: vec![
                txn("02/01/2025", "NEXTBILLION SALARY JAN", None, Some(50000.0)),
                txn("03/01/2025", "UPI-SWIGGY-ORDER-1", Some(450.0), None),
                txn("10/01/2025", "UPI-SWIGGY-ORDER-2", Some(550.0), None),
                txn("12/01/2025", "NETFLIX SUBSCRIPTION", Some(599.0), None),
                txn("15/01/2025", "AMAZON PAY INDIA", Some(3200.0), None),
                txn("20/01/2025", "UBER TRIP BLR", Some(301.0), None),
                txn("22/01/2025", "NETFLIX SUBSCRIPTION", Some(599.0), None),
                txn("25/01/2025", "MISC ADJUSTMENT", Some(2201.0), None),
            ],
            ..BankStatement::default()
        }
    }

    #[test]
    fn test_spending_by_category() {
        let analyzer = Analyzer::new(sample_statement());
        let spending = analyzer.spending_by_category();

        assert_eq!(spending.get("Food & Dining"), Some(&1000.0));
        assert_eq!(spending.get("Entertainment"), Some(&1198.0));
        assert_eq!(spending.get("Shopping"), Some(&3200.0));
        assert_eq!(spending.get("Transportation"), Some(&301.0));
        assert_eq!(spending.get("Other"), Some(&2201.0));
        // Salary is a deposit: no withdrawal, so no spending entry
        assert_eq!(spending.get("Salary"), None);
    }

    #[test]
    fn test_top_expenses_sorted_descending() {
        let analyzer = Analyzer::new(sample_statement());
        let top = analyzer.top_expenses(3);

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].withdrawal, 3200.0);
        assert_eq!(top[0].description.as_deref(), Some("AMAZON PAY INDIA"));
        assert_eq!(top[0].date.as_deref(), Some("2025-01-15"));
        assert!(top[1].withdrawal >= top[2].withdrawal);
    }

    #[test]
    fn test_monthly_summary_math() {
        let analyzer = Analyzer::new(sample_statement());
        let summary = analyzer.monthly_summary();

        assert_eq!(summary.total_income, 50000.0);
        assert_eq!(summary.total_expenses, 7900.0);
        assert_eq!(summary.net_change, 42100.0);
        assert_eq!(summary.opening_balance, 10000.0);
        assert_eq!(summary.closing_balance, 52100.0);
        // 8 transactions across 8 distinct dates
        assert_eq!(summary.avg_daily_spending, 987.5);
        assert_eq!(summary.savings_rate, 84.2);
    }

    #[test]
    fn test_savings_rate_zero_without_income() {
        let mut statement = sample_statement();
        statement.transactions.retain(|t| t.deposit.is_none());
        let summary = Analyzer::new(statement).monthly_summary();
        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.savings_rate, 0.0);
    }

    #[test]
    fn test_recurring_payments() {
        let analyzer = Analyzer::new(sample_statement());
        let recurring = analyzer.recurring_payments();

        let netflix = recurring
            .iter()
            .find(|r| r.merchant.contains("NETFLIX"))
            .expect("netflix should recur");
        assert_eq!(netflix.frequency, 2);
        assert_eq!(netflix.total_spent, 1198.0);
        assert_eq!(netflix.avg_amount, 599.0);

        // Single-occurrence merchants never appear
        assert!(!recurring.iter().any(|r| r.merchant.contains("AMAZON")));
    }

    #[test]
    fn test_recurring_merchant_key_truncates_at_handle() {
        let statement = BankStatement {
            transactions: vec![
                txn("01/01/2025", "RELIANCEJIO@ybl PREPAID", Some(299.0), None),
                txn("01/02/2025", "RELIANCEJIO@okaxis PREPAID", Some(299.0), None),
            ],
            ..BankStatement::default()
        };
        let recurring = Analyzer::new(statement).recurring_payments();

        // Both rows share the pre-@ merchant key, so they form one cluster
        assert_eq!(recurring.len(), 1);
        assert_eq!(recurring[0].merchant, "RELIANCEJIO");
        assert_eq!(recurring[0].frequency, 2);
        assert_eq!(recurring[0].total_spent, 598.0);
    }

    #[test]
    fn test_unusual_transactions() {
        // 20 everyday rows plus one huge transfer; only the transfer
        // clears mean + 3 sigma
        let mut transactions: Vec<Transaction> = (1..=20)
            .map(|day| txn(&format!("{day:02}/01/2025"), "UPI-SWIGGY-DAILY", Some(100.0), None))
            .collect();
        transactions.push(txn("28/01/2025", "FLAT DEPOSIT LANDLORD", Some(95000.0), None));

        let statement = BankStatement {
            transactions,
            ..BankStatement::default()
        };
        let unusual = Analyzer::new(statement).unusual_transactions(OUTLIER_STDDEVS);

        assert_eq!(unusual.len(), 1);
        assert_eq!(unusual[0].withdrawal, 95000.0);
        assert_eq!(unusual[0].description.as_deref(), Some("FLAT DEPOSIT LANDLORD"));
    }

    #[test]
    fn test_unusual_requires_two_rows() {
        let statement = BankStatement {
            transactions: vec![txn("01/01/2025", "ONLY ONE", Some(100.0), None)],
            ..BankStatement::default()
        };
        assert!(Analyzer::new(statement).unusual_transactions(3.0).is_empty());
    }

    #[test]
    fn test_spending_trend_is_date_ordered() {
        let analyzer = Analyzer::new(sample_statement());
        let trend = analyzer.spending_trend();

        let keys: Vec<&String> = trend.keys().collect();
        assert_eq!(keys.first().map(|s| s.as_str()), Some("2025-01-02"));
        assert_eq!(keys.last().map(|s| s.as_str()), Some("2025-01-25"));
        assert_eq!(trend.get("2025-01-03"), Some(&450.0));
        // Deposit-only day still shows with zero spend
        assert_eq!(trend.get("2025-01-02"), Some(&0.0));
    }

    #[test]
    fn test_unparseable_dates_still_count_in_totals() {
        let statement = BankStatement {
            transactions: vec![
                txn("not-a-date", "CASH WITHDRAWAL", Some(1000.0), None),
                txn("05/01/2025", "UPI-SWIGGY", Some(500.0), None),
            ],
            ..BankStatement::default()
        };
        let analyzer = Analyzer::new(statement);

        assert_eq!(analyzer.monthly_summary().total_expenses, 1500.0);
        // ...but only dated rows appear in the trend
        assert_eq!(analyzer.spending_trend().len(), 1);
    }

    #[test]
    fn test_full_report() {
        let analyzer = Analyzer::new(sample_statement());
        let report = analyzer.full_report();

        assert_eq!(report.transaction_count, 8);
        assert_eq!(report.analysis_period.from.as_deref(), Some("01/01/2025"));
        assert_eq!(report.analysis_period.to.as_deref(), Some("31/01/2025"));
        assert_eq!(report.summary.net_change, 42100.0);
        assert!(!report.spending_by_category.is_empty());
        assert!(report.top_expenses.len() <= TOP_N);
    }
}
