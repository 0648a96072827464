//! Upload handler: one multipart file in, extracted document out.

use anyhow::{Context, Result};
use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use ledgerlens_core::{BankStatement, Invoice};
use ledgerlens_ingest::{
    DocumentKind, FileFormat, detect_document_kind, parse_statement_csv, parse_statement_xls,
    pdf_text,
};
use ledgerlens_providers::prompts::{BANK_STATEMENT_PROMPT, INVOICE_PROMPT};
use ledgerlens_providers::{extract_document, provider_for};
use serde_json::{Value, json};
use std::io::Write;

use crate::state::AppState;

use super::internal_error;

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            file = Some((filename, data.to_vec()));
        }
    }

    let Some((filename, data)) = file else {
        return Err((StatusCode::BAD_REQUEST, "missing multipart field 'file'".to_string()));
    };

    let Some(format) = FileFormat::from_filename(&filename) else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Unsupported file format. Use PDF, XLS, or CSV.".to_string(),
        ));
    };

    tracing::info!("upload: {filename} ({} bytes)", data.len());

    let (doc_type, value) = match format {
        FileFormat::Xls | FileFormat::Xlsx => {
            // calamine sniffs the workbook format from the extension
            let ext = if format == FileFormat::Xlsx { "xlsx" } else { "xls" };
            let statement =
                parse_spooled(&data, ext, |p| parse_statement_xls(p)).map_err(internal_error)?;
            state.store.save_statement(&statement).map_err(internal_error)?;
            ("bank_statement_xls", to_value(&statement)?)
        }
        FileFormat::Csv => {
            let statement =
                parse_spooled(&data, "csv", |p| parse_statement_csv(p)).map_err(internal_error)?;
            state.store.save_statement(&statement).map_err(internal_error)?;
            ("bank_statement_csv", to_value(&statement)?)
        }
        FileFormat::Pdf => extract_pdf(&state, &data).await.map_err(internal_error)?,
    };

    Ok(Json(json!({
        "status": "success",
        "doc_type": doc_type,
        "data": value,
    })))
}

/// Route a PDF by its detected kind through the configured provider
async fn extract_pdf(state: &AppState, data: &[u8]) -> Result<(&'static str, Value)> {
    // Image-only PDFs have no text layer; they are still worth sending to a
    // vision provider as a statement.
    let kind = pdf_text(data)
        .map(|text| detect_document_kind(&text))
        .unwrap_or(DocumentKind::BankStatement);

    let provider = provider_for(state.provider, state.model.as_deref())?;
    tracing::info!("extracting {} with {}", kind.as_str(), provider.name());

    match kind {
        DocumentKind::BankStatement => {
            let statement: BankStatement =
                extract_document(provider.as_ref(), data, BANK_STATEMENT_PROMPT).await?;
            state.store.save_statement(&statement)?;
            Ok((kind.as_str(), serde_json::to_value(&statement)?))
        }
        DocumentKind::Invoice => {
            let invoice: Invoice =
                extract_document(provider.as_ref(), data, INVOICE_PROMPT).await?;
            Ok((kind.as_str(), serde_json::to_value(&invoice)?))
        }
    }
}

/// The spreadsheet parsers want a path, so spool the upload to a temp file
fn parse_spooled<T>(
    data: &[u8],
    ext: &str,
    parse: impl Fn(&std::path::Path) -> Result<T>,
) -> Result<T> {
    let mut tmp = tempfile::Builder::new()
        .suffix(&format!(".{ext}"))
        .tempfile()
        .context("create temp file")?;
    tmp.write_all(data).context("spool upload")?;
    parse(tmp.path())
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, (StatusCode, String)> {
    serde_json::to_value(value).map_err(|e| internal_error(e.into()))
}
