use crate::schema::DocumentKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinancialAnalysisError {
    #[error("Missing credential: {0} must be set")]
    MissingCredential(String),

    #[error("Unknown report format '{0}': expected xlsx or docx")]
    UnknownReportFormat(String),

    #[error("Invalid prompt template: {0}")]
    InvalidPrompt(String),

    #[error("Unsupported upload '{0}': only PDF and XLSX files are accepted")]
    UnsupportedUpload(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    ReportBuild(#[from] ReportBuildError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FinancialAnalysisError>;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("declared as {declared} but the content looks like {detected}")]
    SignatureMismatch {
        declared: DocumentKind,
        detected: String,
    },

    #[error("invalid PDF: {0}")]
    Pdf(String),

    #[error("the PDF parser crashed on this file (likely a malformed font or stream)")]
    PdfPanicked,

    #[error("invalid workbook: {0}")]
    Workbook(String),

    #[error("the workbook has no worksheets")]
    NoWorksheet,
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    /// The message shown in place of an analysis when the call fails.
    pub fn user_message(&self) -> String {
        format!("Erro na análise: {}", self)
    }
}

#[derive(Error, Debug)]
pub enum ReportBuildError {
    #[error("spreadsheet serialization failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("document serialization failed: {0}")]
    Document(String),

    #[error("{0} lines do not fit in a worksheet")]
    TooManyLines(usize),
}

/// Failure of one session stage, carrying the text shown to the user.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Nenhum arquivo foi enviado.")]
    NoDocument,

    #[error("Erro ao processar o arquivo {}: {source}", .kind.display_name())]
    Extraction {
        kind: DocumentKind,
        #[source]
        source: ExtractionError,
    },

    #[error("Erro na análise: {0}")]
    Analysis(#[source] AnalysisError),

    #[error("Erro ao gerar o relatório: {0}")]
    ReportBuild(#[source] ReportBuildError),
}

impl SessionError {
    /// Short machine-readable name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            SessionError::NoDocument => "upload",
            SessionError::Extraction { .. } => "extraction",
            SessionError::Analysis(_) => "analysis",
            SessionError::ReportBuild(_) => "report",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_is_folded_with_prefix() {
        let err = AnalysisError::Api {
            status: 429,
            body: "quota exceeded".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Erro na análise: API error (status 429): quota exceeded"
        );
    }

    #[test]
    fn test_session_error_messages_name_the_file_kind() {
        let pdf = SessionError::Extraction {
            kind: DocumentKind::Pdf,
            source: ExtractionError::Pdf("bad xref".to_string()),
        };
        assert_eq!(
            pdf.to_string(),
            "Erro ao processar o arquivo PDF: invalid PDF: bad xref"
        );

        let xlsx = SessionError::Extraction {
            kind: DocumentKind::Spreadsheet,
            source: ExtractionError::NoWorksheet,
        };
        assert!(xlsx
            .to_string()
            .starts_with("Erro ao processar o arquivo Excel: "));
        assert_eq!(xlsx.stage(), "extraction");
    }
}
