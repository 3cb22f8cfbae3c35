//! Drives one uploaded document through extraction, analysis and report
//! building, keeping only the current document's intermediate results.

use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::error::SessionError;
use crate::extraction::DocumentExtractor;
use crate::llm::FinancialAnalyzer;
use crate::report::ReportBuilder;
use crate::schema::{AnalysisReport, ExtractedContent, ReportArtifact, ReportFormat, UploadedDocument};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    FileReceived,
    Extracting,
    Extracted,
    Analyzing,
    Analyzed,
    BuildingReport,
    ReportReady,
    Error,
}

impl SessionState {
    /// Progress text shown while a stage is running.
    pub fn progress_message(&self) -> Option<&'static str> {
        match self {
            SessionState::Extracting => Some("Processando arquivo..."),
            SessionState::Analyzing => Some("Analisando os dados..."),
            SessionState::BuildingReport => Some("Preparando para download..."),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SessionEvent {
    StateChanged { from: SessionState, to: SessionState },
    Failed { stage: String, message: String },
}

pub struct AnalysisSession {
    extractor: DocumentExtractor,
    analyzer: FinancialAnalyzer,
    builder: ReportBuilder,
    format: ReportFormat,
    state: SessionState,
    document: Option<UploadedDocument>,
    content: Option<ExtractedContent>,
    report: Option<AnalysisReport>,
    artifact: Option<ReportArtifact>,
    last_error: Option<String>,
    progress: Option<Sender<SessionEvent>>,
}

impl AnalysisSession {
    pub fn new(analyzer: FinancialAnalyzer, format: ReportFormat) -> Self {
        Self {
            extractor: DocumentExtractor::new(),
            analyzer,
            builder: ReportBuilder::new(),
            format,
            state: SessionState::Idle,
            document: None,
            content: None,
            report: None,
            artifact: None,
            last_error: None,
            progress: None,
        }
    }

    /// Publishes every state change on `progress`.
    pub fn with_progress(mut self, progress: Sender<SessionEvent>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn format(&self) -> ReportFormat {
        self.format
    }

    pub fn document(&self) -> Option<&UploadedDocument> {
        self.document.as_ref()
    }

    pub fn extracted(&self) -> Option<&ExtractedContent> {
        self.content.as_ref()
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    /// The artifact, available only once the session is `ReportReady`.
    pub fn download(&self) -> Option<&ReportArtifact> {
        match self.state {
            SessionState::ReportReady => self.artifact.as_ref(),
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Accepts a new document, discarding everything from the previous one.
    pub async fn upload(&mut self, document: UploadedDocument) {
        info!(
            "Received '{}' ({} bytes)",
            document.file_name,
            document.bytes.len()
        );
        self.clear();
        self.document = Some(document);
        self.transition(SessionState::FileReceived).await;
    }

    /// Leaves the `Error` state after the message has been shown.
    pub async fn acknowledge_error(&mut self) {
        if self.state == SessionState::Error {
            self.clear();
            self.transition(SessionState::Idle).await;
        }
    }

    /// Uploads and processes in one call, using the session's report format.
    pub async fn run(&mut self, document: UploadedDocument) -> Result<&ReportArtifact, SessionError> {
        self.run_with(document, self.format).await
    }

    /// Uploads and processes in one call, building the report as `format`.
    /// The session's own format is left unchanged.
    pub async fn run_with(
        &mut self,
        document: UploadedDocument,
        format: ReportFormat,
    ) -> Result<&ReportArtifact, SessionError> {
        self.upload(document).await;
        self.process_with(format).await
    }

    /// Runs extract → analyze → build for the uploaded document.
    ///
    /// A stage failure moves the session to `Error` and returns the error;
    /// the session itself stays usable.
    pub async fn process(&mut self) -> Result<&ReportArtifact, SessionError> {
        self.process_with(self.format).await
    }

    /// Like [`process`](Self::process), with the report format for this run only.
    pub async fn process_with(&mut self, format: ReportFormat) -> Result<&ReportArtifact, SessionError> {
        let Some(kind) = self.document.as_ref().map(|doc| doc.kind) else {
            return Err(SessionError::NoDocument);
        };

        self.transition(SessionState::Extracting).await;
        let extracted = match &self.document {
            Some(document) => self.extractor.extract(document),
            None => return Err(SessionError::NoDocument),
        };
        let content = match extracted {
            Ok(content) => content,
            Err(source) => {
                return Err(self.fail(SessionError::Extraction { kind, source }).await);
            }
        };
        self.content = Some(content);
        self.transition(SessionState::Extracted).await;

        self.transition(SessionState::Analyzing).await;
        let text = self.content.as_ref().map(|c| c.text.as_str()).unwrap_or_default();
        let report = match self.analyzer.analyze(text).await {
            Ok(report) => report,
            Err(e) => return Err(self.fail(SessionError::Analysis(e)).await),
        };
        self.report = Some(report);
        self.transition(SessionState::Analyzed).await;

        self.transition(SessionState::BuildingReport).await;
        let report_text = self.report.as_ref().map(|r| r.text.as_str()).unwrap_or_default();
        let artifact = match self.builder.build(report_text, format) {
            Ok(artifact) => artifact,
            Err(e) => return Err(self.fail(SessionError::ReportBuild(e)).await),
        };
        info!(
            "Report ready: {} ({} bytes)",
            artifact.file_name(),
            artifact.bytes.len()
        );
        self.transition(SessionState::ReportReady).await;

        Ok(self.artifact.insert(artifact))
    }

    fn clear(&mut self) {
        self.document = None;
        self.content = None;
        self.report = None;
        self.artifact = None;
        self.last_error = None;
    }

    async fn fail(&mut self, err: SessionError) -> SessionError {
        error!("Session failed during {}: {}", err.stage(), err);
        self.artifact = None;
        self.last_error = Some(err.to_string());
        self.transition(SessionState::Error).await;
        self.send_event(SessionEvent::Failed {
            stage: err.stage().to_string(),
            message: err.to_string(),
        })
        .await;
        err
    }

    async fn transition(&mut self, to: SessionState) {
        let from = self.state;
        self.state = to;
        if let Some(message) = to.progress_message() {
            info!("{}", message);
        }
        self.send_event(SessionEvent::StateChanged { from, to }).await;
    }

    async fn send_event(&self, event: SessionEvent) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::llm::{ChatMessage, CompletionProvider, PromptTemplate};
    use crate::schema::DocumentKind;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl CompletionProvider for Unreachable {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, AnalysisError> {
            Err(AnalysisError::MalformedResponse("connection refused".to_string()))
        }
    }

    fn session() -> AnalysisSession {
        let analyzer = FinancialAnalyzer::new(Arc::new(Unreachable), PromptTemplate::default());
        AnalysisSession::new(analyzer, ReportFormat::Spreadsheet)
    }

    #[tokio::test]
    async fn test_process_without_upload_keeps_idle() {
        let mut session = session();
        let err = session.process().await.unwrap_err();
        assert!(matches!(err, SessionError::NoDocument));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_extraction_failure_reports_and_recovers() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(32);
        let mut session = session().with_progress(tx);

        let doc = UploadedDocument::new("dre.pdf", DocumentKind::Pdf, b"\x00\x01corrupt".to_vec());
        let err = session.run(doc).await.unwrap_err();

        assert_eq!(err.stage(), "extraction");
        assert_eq!(session.state(), SessionState::Error);
        assert!(session.download().is_none());
        assert!(session
            .last_error()
            .unwrap()
            .starts_with("Erro ao processar o arquivo PDF: "));

        session.acknowledge_error().await;
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.document().is_none());

        drop(session);
        let mut states = Vec::new();
        while let Some(event) = rx.recv().await {
            if let SessionEvent::StateChanged { to, .. } = event {
                states.push(to);
            }
        }
        assert_eq!(
            states,
            vec![
                SessionState::FileReceived,
                SessionState::Extracting,
                SessionState::Error,
                SessionState::Idle
            ]
        );
    }

    #[tokio::test]
    async fn test_run_with_keeps_session_format() {
        let mut session = session();
        let doc = UploadedDocument::new("dre.pdf", DocumentKind::Pdf, b"%PDF-broken".to_vec());
        assert!(session.run_with(doc, ReportFormat::Document).await.is_err());
        assert_eq!(session.format(), ReportFormat::Spreadsheet);
    }

    #[test]
    fn test_progress_messages_only_for_running_stages() {
        assert!(SessionState::Analyzing.progress_message().is_some());
        assert!(SessionState::Analyzed.progress_message().is_none());
        assert!(SessionState::Error.progress_message().is_none());
    }
}
