//! Turns an uploaded PDF or XLSX into the text sent for analysis.
//!
//! PDFs are read page by page and concatenated; workbooks are read from
//! their first worksheet and dumped as an aligned text table.

use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx};
use log::{debug, info, warn};
use std::io::Cursor;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::ExtractionError;
use crate::schema::{DocumentKind, ExtractedContent, UploadedDocument};
use crate::utils::TextTable;

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, document: &UploadedDocument) -> Result<ExtractedContent, ExtractionError> {
        check_signature(document)?;

        info!(
            "Extracting '{}' ({} bytes) as {}",
            document.file_name,
            document.bytes.len(),
            document.kind
        );

        let content = match document.kind {
            DocumentKind::Pdf => extract_pdf(&document.bytes)?,
            DocumentKind::Spreadsheet => extract_spreadsheet(&document.bytes)?,
        };

        debug!(
            "Extracted {} chars from {} unit(s) of '{}'",
            content.text.len(),
            content.unit_count,
            document.file_name
        );

        Ok(content)
    }
}

fn check_signature(document: &UploadedDocument) -> Result<(), ExtractionError> {
    match DocumentKind::sniff(&document.bytes) {
        Some(kind) if kind == document.kind => Ok(()),
        _ => {
            let detected = DocumentKind::describe_signature(&document.bytes);
            warn!(
                "'{}' was declared as {} but looks like {}",
                document.file_name, document.kind, detected
            );
            Err(ExtractionError::SignatureMismatch {
                declared: document.kind,
                detected,
            })
        }
    }
}

/// Extracts every page in order and joins them with no separator.
///
/// Pages without a text layer contribute an empty string. The PDF crate can
/// panic on malformed fonts, so the call runs under `catch_unwind`.
pub fn extract_pdf(bytes: &[u8]) -> Result<ExtractedContent, ExtractionError> {
    let pages = match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => return Err(ExtractionError::Pdf(e.to_string())),
        Err(_) => return Err(ExtractionError::PdfPanicked),
    };

    let empty_pages = pages.iter().filter(|p| p.trim().is_empty()).count();
    if empty_pages > 0 {
        warn!(
            "{} of {} PDF page(s) have no extractable text (scanned images are not OCR'd)",
            empty_pages,
            pages.len()
        );
    }

    Ok(ExtractedContent {
        kind: DocumentKind::Pdf,
        unit_count: pages.len(),
        text: pages.concat(),
    })
}

/// Reads the first worksheet and renders it as a text table whose first row
/// is the header.
pub fn extract_spreadsheet(bytes: &[u8]) -> Result<ExtractedContent, ExtractionError> {
    let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Workbook(e.to_string()))?;

    let sheet_name = workbook.sheet_names().first().cloned();
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ExtractionError::NoWorksheet)?
        .map_err(|e| ExtractionError::Workbook(e.to_string()))?;

    let raw_rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let table = TextTable::from_rows(raw_rows);
    debug!(
        "Worksheet {:?}: {} column(s), {} data row(s)",
        sheet_name.unwrap_or_default(),
        table.headers.len(),
        table.rows.len()
    );

    Ok(ExtractedContent {
        kind: DocumentKind::Spreadsheet,
        unit_count: table.rows.len(),
        text: table.render(),
    })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_corrupt_pdf_fails_signature_check() {
        let doc = UploadedDocument::new("dre.pdf", DocumentKind::Pdf, b"not a pdf".to_vec());
        let err = DocumentExtractor::new().extract(&doc).unwrap_err();
        assert!(matches!(err, ExtractionError::SignatureMismatch { .. }));
    }

    #[test]
    fn test_pdf_declared_as_spreadsheet_is_rejected() {
        let doc = UploadedDocument::new(
            "dre.xlsx",
            DocumentKind::Spreadsheet,
            b"%PDF-1.7 ...".to_vec(),
        );
        let err = DocumentExtractor::new().extract(&doc).unwrap_err();
        assert_eq!(
            err.to_string(),
            "declared as an XLSX workbook but the content looks like a PDF document"
        );
    }

    #[test]
    fn test_spreadsheet_renders_header_and_rows() {
        let bytes = workbook_bytes(&[&["Conta", "Saldo"], &["Caixa", "1500"], &["Estoque", "300"]]);
        let content = extract_spreadsheet(&bytes).unwrap();

        assert_eq!(content.kind, DocumentKind::Spreadsheet);
        assert_eq!(content.unit_count, 2);
        let lines: Vec<&str> = content.text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Conta") && lines[0].contains("Saldo"));
        assert!(lines[1].starts_with('0') && lines[1].contains("Caixa"));
        assert!(lines[2].starts_with('1') && lines[2].contains("Estoque"));
    }

    #[test]
    fn test_zip_that_is_not_a_workbook_fails() {
        let err = extract_spreadsheet(b"PK\x03\x04broken zip").unwrap_err();
        assert!(matches!(err, ExtractionError::Workbook(_)));
    }
}
