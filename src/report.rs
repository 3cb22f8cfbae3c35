//! Serializes an analysis into the downloadable XLSX or DOCX report.

use docx_rs::{Docx, Paragraph, Run, Style, StyleType};
use log::{debug, warn};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, FormatBorder, Workbook};
use std::io::Cursor;

use crate::error::ReportBuildError;
use crate::schema::{ReportArtifact, ReportFormat};
use crate::utils::truncate_chars;

pub const SHEET_NAME: &str = "Relatório";
pub const COLUMN_HEADER: &str = "Análise";
pub const DOCUMENT_TITLE: &str = "Relatório de Análise Contábil e Financeira";

/// Longest text Excel accepts in a single cell.
pub const MAX_CELL_CHARS: usize = 32_767;

const HEADING_STYLE: &str = "Heading1";

/// Splits on `'\n'` only; blank lines and trailing empties are kept.
pub fn report_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportBuilder;

impl ReportBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, text: &str, format: ReportFormat) -> Result<ReportArtifact, ReportBuildError> {
        let lines = report_lines(text);
        let bytes = match format {
            ReportFormat::Spreadsheet => build_spreadsheet(&lines)?,
            ReportFormat::Document => build_document(&lines)?,
        };

        debug!(
            "Built {} report: {} line(s), {} bytes",
            format,
            lines.len(),
            bytes.len()
        );

        Ok(ReportArtifact { format, bytes })
    }
}

/// One worksheet, a header cell, then one row per line starting at row 2.
fn build_spreadsheet(lines: &[&str]) -> Result<Vec<u8>, ReportBuildError> {
    let mut workbook = Workbook::new();

    // Pinned so the same text always produces the same bytes.
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    let properties = DocProperties::new()
        .set_title(DOCUMENT_TITLE)
        .set_creation_datetime(&created);
    workbook.set_properties(&properties);

    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.write_string_with_format(0, 0, COLUMN_HEADER, &header_format)?;
    worksheet.set_column_width(0, 120)?;

    // Empty lines are written as empty strings, not skipped, so a trailing
    // blank line still occupies its row.
    for (idx, line) in lines.iter().enumerate() {
        let row = u32::try_from(idx + 1).map_err(|_| ReportBuildError::TooManyLines(lines.len()))?;
        let value = truncate_chars(line, MAX_CELL_CHARS);
        if value.len() < line.len() {
            warn!(
                "Report line {} exceeds the spreadsheet cell limit and was truncated to {} chars",
                idx + 1,
                MAX_CELL_CHARS
            );
        }
        worksheet.write_string(row, 0, value)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// A title heading followed by one paragraph per line.
fn build_document(lines: &[&str]) -> Result<Vec<u8>, ReportBuildError> {
    let heading_style = Style::new(HEADING_STYLE, StyleType::Paragraph)
        .name("Heading 1")
        .size(32)
        .bold();

    let mut docx = Docx::new().add_style(heading_style).add_paragraph(
        Paragraph::new()
            .style(HEADING_STYLE)
            .add_run(Run::new().add_text(DOCUMENT_TITLE)),
    );

    for line in lines {
        let paragraph = if line.is_empty() {
            Paragraph::new()
        } else {
            Paragraph::new().add_run(Run::new().add_text(*line))
        };
        docx = docx.add_paragraph(paragraph);
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ReportBuildError::Document(e.to_string()))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

    fn spreadsheet_column(bytes: &[u8]) -> (String, Vec<String>) {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        let mut cells: Vec<String> = range
            .rows()
            .map(|row| match row.first() {
                Some(Data::Empty) | None => String::new(),
                Some(cell) => cell.to_string(),
            })
            .collect();
        let header = cells.remove(0);
        (header, cells)
    }

    #[test]
    fn test_report_lines_keep_blank_and_trailing_lines() {
        assert_eq!(report_lines("a\n\nb\n"), vec!["a", "", "b", ""]);
        assert_eq!(report_lines(""), vec![""]);
        assert_eq!(report_lines("x\r\ny"), vec!["x\r", "y"]);
    }

    #[test]
    fn test_spreadsheet_has_one_row_per_line() {
        let artifact = ReportBuilder::new()
            .build("Liquidez\nRentabilidade\nEndividamento", ReportFormat::Spreadsheet)
            .unwrap();
        assert_eq!(artifact.file_name(), "relatorio_analise.xlsx");

        let (header, rows) = spreadsheet_column(&artifact.bytes);
        assert_eq!(header, COLUMN_HEADER);
        assert_eq!(rows, vec!["Liquidez", "Rentabilidade", "Endividamento"]);
    }

    #[test]
    fn test_spreadsheet_keeps_position_of_blank_lines() {
        let artifact = ReportBuilder::new()
            .build("Ativo\n\nPassivo", ReportFormat::Spreadsheet)
            .unwrap();
        let (_, rows) = spreadsheet_column(&artifact.bytes);
        assert_eq!(rows, vec!["Ativo", "", "Passivo"]);
    }

    #[test]
    fn test_spreadsheet_keeps_trailing_blank_lines() {
        let text = "Linha A\n\n";
        let artifact = ReportBuilder::new()
            .build(text, ReportFormat::Spreadsheet)
            .unwrap();
        let (_, rows) = spreadsheet_column(&artifact.bytes);
        assert_eq!(rows.len(), report_lines(text).len());
        assert_eq!(rows, vec!["Linha A", "", ""]);
    }

    #[test]
    fn test_overlong_line_is_truncated_not_rejected() {
        let long_line = "é".repeat(MAX_CELL_CHARS + 10);
        let artifact = ReportBuilder::new()
            .build(&long_line, ReportFormat::Spreadsheet)
            .unwrap();
        let (_, rows) = spreadsheet_column(&artifact.bytes);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].chars().count(), MAX_CELL_CHARS);
    }

    #[test]
    fn test_spreadsheet_bytes_are_reproducible() {
        let builder = ReportBuilder::new();
        let text = "Receita líquida: 1.000\nCMV: 600\n\nLucro bruto: 400";
        let first = builder.build(text, ReportFormat::Spreadsheet).unwrap();
        let second = builder.build(text, ReportFormat::Spreadsheet).unwrap();
        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn test_document_is_a_zip_package() {
        let artifact = ReportBuilder::new()
            .build("Linha 1\nLinha 2", ReportFormat::Document)
            .unwrap();
        assert!(artifact.bytes.starts_with(b"PK\x03\x04"));
        assert_eq!(
            artifact.content_type(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
    }
}
