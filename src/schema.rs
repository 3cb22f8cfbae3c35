use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use crate::error::FinancialAnalysisError;

const PDF_SIGNATURE: &[u8] = b"%PDF-";
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";
const OLE_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The two kinds of document accepted for upload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Spreadsheet,
}

impl DocumentKind {
    /// Accept filter: maps an uploaded file name to a kind by its extension.
    ///
    /// Anything other than `.pdf` or `.xlsx` is rejected with `None`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let mime = mime_guess::from_path(file_name).first()?;
        match mime.essence_str() {
            "application/pdf" => Some(DocumentKind::Pdf),
            XLSX_MIME => Some(DocumentKind::Spreadsheet),
            _ => None,
        }
    }

    /// Detects the kind from the leading bytes, independently of the file name.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PDF_SIGNATURE) {
            Some(DocumentKind::Pdf)
        } else if bytes.starts_with(ZIP_SIGNATURE) {
            Some(DocumentKind::Spreadsheet)
        } else {
            None
        }
    }

    /// Human label for a byte signature, used in mismatch messages.
    pub fn describe_signature(bytes: &[u8]) -> String {
        match Self::sniff(bytes) {
            Some(kind) => kind.to_string(),
            None if bytes.starts_with(OLE_SIGNATURE) => "a legacy Office (.xls/.doc) file".to_string(),
            None if bytes.is_empty() => "an empty file".to_string(),
            None => "unrecognized data".to_string(),
        }
    }

    /// Label used in user-facing messages ("Erro ao processar o arquivo PDF").
    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Spreadsheet => "Excel",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "a PDF document"),
            DocumentKind::Spreadsheet => write!(f, "an XLSX workbook"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
    pub received_at: DateTime<Utc>,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, kind: DocumentKind, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            bytes,
            received_at: Utc::now(),
        }
    }

    /// Runs the accept filter on the file name and wraps the bytes.
    pub fn from_upload(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, FinancialAnalysisError> {
        let file_name = file_name.into();
        let kind = DocumentKind::from_file_name(&file_name)
            .ok_or_else(|| FinancialAnalysisError::UnsupportedUpload(file_name.clone()))?;
        Ok(Self::new(file_name, kind, bytes))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedContent {
    pub kind: DocumentKind,
    pub text: String,
    /// Pages for PDFs, data rows for spreadsheets.
    pub unit_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub text: String,
}

impl AnalysisReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Spreadsheet,
    Document,
}

impl ReportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportFormat::Spreadsheet => "relatorio_analise.xlsx",
            ReportFormat::Document => "relatorio_analise.docx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Spreadsheet => XLSX_MIME,
            ReportFormat::Document => DOCX_MIME,
        }
    }
}

impl FromStr for ReportFormat {
    type Err = FinancialAnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "spreadsheet" | "excel" => Ok(ReportFormat::Spreadsheet),
            "docx" | "document" | "word" => Ok(ReportFormat::Document),
            other => Err(FinancialAnalysisError::UnknownReportFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Spreadsheet => write!(f, "xlsx"),
            ReportFormat::Document => write!(f, "docx"),
        }
    }
}

/// A serialized report ready to be downloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifact {
    pub format: ReportFormat,
    pub bytes: Vec<u8>,
}

impl ReportArtifact {
    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// A fresh reader positioned at the first byte.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.bytes.as_slice())
    }
}
