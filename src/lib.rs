//! # Financial Report Analyzer
//!
//! Turns an uploaded financial document (PDF or XLSX) into an accounting/financial
//! analysis produced by a remote language model, and packages the answer as a
//! downloadable report.
//!
//! ## Pipeline
//!
//! - **Extraction**: PDF pages are concatenated as text; the first worksheet of a
//!   workbook is rendered as a text table
//! - **Analysis**: the text is sent once to an OpenAI-compatible chat completion
//!   endpoint with a fixed analyst instruction
//! - **Report**: the answer becomes a workbook (one row per line) or a Word document
//!   (a heading plus one paragraph per line)
//! - **Session**: drives one document through the stages and keeps the artifact for
//!   download
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_report_analyzer::*;
//!
//! let config = AnalyzerConfig::from_env()?;
//! let analyzer = FinancialAnalyzer::from_config(&config);
//! let mut session = AnalysisSession::new(analyzer, ReportFormat::Spreadsheet);
//!
//! let bytes = std::fs::read("balancete.pdf")?;
//! let document = UploadedDocument::from_upload("balancete.pdf", bytes)?;
//! let artifact = session.run(document).await?;
//! std::fs::write(artifact.file_name(), &artifact.bytes)?;
//! ```

pub mod config;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod report;
pub mod schema;
pub mod session;
pub mod utils;

#[cfg(feature = "server")]
pub mod server;

pub use config::AnalyzerConfig;
pub use error::{
    AnalysisError, ExtractionError, FinancialAnalysisError, ReportBuildError, Result,
    SessionError,
};
pub use extraction::DocumentExtractor;
pub use llm::{CompletionProvider, FinancialAnalyzer, OpenAiClient, PromptTemplate};
pub use report::ReportBuilder;
pub use schema::*;
pub use session::{AnalysisSession, SessionEvent, SessionState};

/// Extracts, analyzes and builds the report for one document without a session.
pub async fn analyze_document(
    analyzer: &FinancialAnalyzer,
    document: &UploadedDocument,
    format: ReportFormat,
) -> Result<ReportArtifact> {
    let content = DocumentExtractor::new().extract(document)?;
    log::debug!(
        "Extracted {} characters from '{}'",
        content.text.len(),
        document.file_name
    );
    let report = analyzer.analyze(&content.text).await?;
    Ok(ReportBuilder::new().build(&report.text, format)?)
}
