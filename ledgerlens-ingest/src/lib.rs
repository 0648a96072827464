//! ledgerlens-ingest: document-kind detection and deterministic statement parsers (XLS/CSV).

pub mod document;
pub mod parsers;

pub use document::{DocumentKind, FileFormat, detect_document_kind, pdf_text};
pub use parsers::{hdfc_xls::parse_statement_xls, generic_csv::parse_statement_csv};
