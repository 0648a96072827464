//! Extraction prompts, one per document kind.

pub const BANK_STATEMENT_PROMPT: &str = "\
Extract ALL information from this bank statement document.

Account Information:
- account_holder: Full name of account holder
- account_number: Bank account number
- bank_name: Name of the bank (e.g., HDFC Bank, ICICI Bank)
- branch: Branch name or code
- statement_period_from: Statement start date (format: DD/MM/YYYY)
- statement_period_to: Statement end date (format: DD/MM/YYYY)
- opening_balance: Opening balance amount
- closing_balance: Closing balance amount
- currency: Currency code (INR, USD, EUR, etc.)

Transactions:
Extract EVERY transaction from the statement into the transactions array.
For each transaction, extract:
- date: Transaction date (DD/MM/YYYY)
- description: Full transaction description/narration
- cheque_ref_no: Cheque number or reference number if present
- value_date: Value date if different from transaction date
- withdrawal: Withdrawal/debit amount (use null if not applicable)
- deposit: Deposit/credit amount (use null if not applicable)
- balance: Balance after this transaction

CRITICAL INSTRUCTIONS:
1. Extract ALL transactions - do not skip any, even if there are 50+ transactions
2. For amounts, use only numeric values (no currency symbols)
3. Maintain the exact chronological order of transactions
4. If a field is not present in the statement, use null
5. Return ONLY valid JSON matching the schema
6. Ensure all opening/closing balances and transaction amounts are accurate

This is a multi-page document. Process ALL pages carefully.";

pub const INVOICE_PROMPT: &str = "\
Extract all invoice information from this document.

Required fields:
- invoice_number: The invoice/document number
- date: Invoice date (keep original format)
- total_amount: Total amount due (numeric value only)
- tax_amount: Tax/VAT amount if present (numeric value only)
- vendor: Company/person issuing the invoice
- recipient: Company/person receiving the invoice
- account_no: Bank account number if present

IMPORTANT:
- Return ONLY valid JSON matching the schema
- If a field is missing or not found, return null
- For amounts, extract only the numeric value without currency symbols";
