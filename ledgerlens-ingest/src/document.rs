//! Uploaded-file classification: format from the filename, document kind from
//! the PDF's own text.

use anyhow::{Result, anyhow};

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Xls,
    Xlsx,
    Csv,
}

impl FileFormat {
    /// Classify by extension; None for anything we do not ingest
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = name.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileFormat::Pdf),
            "xls" => Some(FileFormat::Xls),
            "xlsx" => Some(FileFormat::Xlsx),
            "csv" => Some(FileFormat::Csv),
            _ => None,
        }
    }
}

/// What a PDF turned out to contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    BankStatement,
    Invoice,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::BankStatement => "bank_statement",
            DocumentKind::Invoice => "invoice",
        }
    }
}

const STATEMENT_INDICATORS: &[&str] = &[
    "statement of account",
    "bank statement",
    "account statement",
    "opening balance",
    "closing balance",
    "transaction details",
];

const INVOICE_INDICATORS: &[&str] = &["invoice", "bill", "tax invoice", "invoice number"];

/// Extract the text layer of a PDF
pub fn pdf_text(bytes: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| anyhow!("extract pdf text: {e}"))
}

/// Decide what kind of financial document this text came from.
///
/// Statement indicators win over invoice indicators; with neither present we
/// assume a bank statement, since that is what this pipeline exists for.
pub fn detect_document_kind(text: &str) -> DocumentKind {
    let text = text.to_lowercase();

    if STATEMENT_INDICATORS.iter().any(|ind| text.contains(ind)) {
        return DocumentKind::BankStatement;
    }
    if INVOICE_INDICATORS.iter().any(|ind| text.contains(ind)) {
        return DocumentKind::Invoice;
    }

    DocumentKind::BankStatement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename() {
        assert_eq!(FileFormat::from_filename("jan_statement.PDF"), Some(FileFormat::Pdf));
        assert_eq!(FileFormat::from_filename("export.xls"), Some(FileFormat::Xls));
        assert_eq!(FileFormat::from_filename("export.xlsx"), Some(FileFormat::Xlsx));
        assert_eq!(FileFormat::from_filename("export.csv"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_filename("notes.docx"), None);
        assert_eq!(FileFormat::from_filename("no_extension"), None);
    }

    #[test]
    fn test_detect_statement() {
        let text = "HDFC BANK\nStatement of Account\nOpening Balance: 12,000.00";
        assert_eq!(detect_document_kind(text), DocumentKind::BankStatement);
    }

    #[test]
    fn test_detect_invoice() {
        let text = "TAX INVOICE\nInvoice Number: INV-042\nTotal Due: 5,000.00";
        assert_eq!(detect_document_kind(text), DocumentKind::Invoice);
    }

    #[test]
    fn test_statement_indicators_win() {
        // A statement that mentions a bill payment is still a statement
        let text = "Account Statement\nBILL PAYMENT - ELECTRICITY\nClosing Balance";
        assert_eq!(detect_document_kind(text), DocumentKind::BankStatement);
    }

    #[test]
    fn test_default_is_statement() {
        assert_eq!(detect_document_kind("quarterly newsletter"), DocumentKind::BankStatement);
    }
}
