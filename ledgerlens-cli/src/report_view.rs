//! Plain-text printers for statements, invoices, and reports.

use ledgerlens_core::{BankStatement, Invoice, Report};

const RULE: &str = "======================================================================";

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn opt_amount(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}

pub fn print_statement(data: &BankStatement) {
    println!("\n{RULE}");
    println!("EXTRACTED BANK STATEMENT");
    println!("{RULE}");
    println!("Account Holder    : {}", opt(&data.account_holder));
    println!("Account Number    : {}", opt(&data.account_number));
    println!("Bank              : {}", opt(&data.bank_name));
    println!("Branch            : {}", opt(&data.branch));
    println!(
        "Statement Period  : {} to {}",
        opt(&data.statement_period_from),
        opt(&data.statement_period_to)
    );
    println!("Currency          : {}", data.currency.as_deref().unwrap_or("INR"));
    println!("Opening Balance   : {}", opt_amount(data.opening_balance));
    println!("Closing Balance   : {}", opt_amount(data.closing_balance));
    println!("Total Transactions: {}", data.transactions.len());
    println!("{RULE}");

    if data.transactions.is_empty() {
        return;
    }

    println!("\nTransactions (showing first 10):");
    for (i, txn) in data.transactions.iter().take(10).enumerate() {
        println!("\n{}. Date: {}", i + 1, opt(&txn.date));
        println!("   Description: {}", opt(&txn.description));
        if let Some(w) = txn.withdrawal {
            println!("   Withdrawal: {w:.2}");
        }
        if let Some(d) = txn.deposit {
            println!("   Deposit: {d:.2}");
        }
        println!("   Balance: {}", opt_amount(txn.balance));
    }
    if data.transactions.len() > 10 {
        println!("\n... and {} more transactions", data.transactions.len() - 10);
    }
    println!("{RULE}\n");
}

pub fn print_invoice(data: &Invoice) {
    println!("\n{RULE}");
    println!("EXTRACTED INVOICE");
    println!("{RULE}");
    println!("Invoice Number : {}", opt(&data.invoice_number));
    println!("Date           : {}", opt(&data.date));
    println!("Vendor         : {}", opt(&data.vendor));
    println!("Recipient      : {}", opt(&data.recipient));
    println!("Total Amount   : {}", opt_amount(data.total_amount));
    println!("Tax Amount     : {}", opt_amount(data.tax_amount));
    println!("Account Number : {}", opt(&data.account_no));
    println!("{RULE}\n");
}

pub fn print_report(report: &Report) {
    let summary = &report.summary;

    println!("\n{RULE}");
    println!("FINANCIAL ANALYSIS REPORT");
    println!("{RULE}");
    println!("\nSummary:");
    println!("   Income: {:.2}", summary.total_income);
    println!("   Expenses: {:.2}", summary.total_expenses);
    println!("   Net: {:.2}", summary.net_change);
    println!("   Savings Rate: {:.1}%", summary.savings_rate);
    println!("   Avg Daily Spending: {:.2}", summary.avg_daily_spending);

    println!("\nSpending by Category:");
    let mut categories: Vec<(&String, &f64)> = report.spending_by_category.iter().collect();
    categories.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap());
    for (category, amount) in categories {
        println!("   {category}: {amount:.2}");
    }

    println!("\nRecurring Payments:");
    for payment in report.recurring_payments.iter().take(5) {
        println!(
            "   {}: {:.2} ({}x, avg {:.2})",
            payment.merchant, payment.total_spent, payment.frequency, payment.avg_amount
        );
    }

    if !report.unusual_transactions.is_empty() {
        println!("\nUnusual Transactions:");
        for txn in &report.unusual_transactions {
            println!(
                "   {} | {} | {:.2}",
                txn.date.as_deref().unwrap_or("?"),
                txn.description.as_deref().unwrap_or("?"),
                txn.withdrawal
            );
        }
    }
    println!("{RULE}");
}
