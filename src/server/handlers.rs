use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

use super::page::INDEX_HTML;
use super::AppState;
use crate::error::FinancialAnalysisError;
use crate::schema::{DocumentKind, ReportFormat, UploadedDocument};
use crate::session::SessionState;

#[derive(Debug, Serialize)]
pub struct DownloadInfo {
    pub url: &'static str,
    pub file_name: &'static str,
    pub content_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub state: SessionState,
    pub file_name: String,
    pub kind: DocumentKind,
    pub extracted_text: String,
    pub report: String,
    pub download: DownloadInfo,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SessionState>,
    pub stage: String,
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, stage: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            state: None,
            stage: stage.to_string(),
            message: message.into(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "upload", message)
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> &'static str {
    "ok"
}

/// POST /analyze: multipart with a `file` field and an optional `format`
/// field (`xlsx` or `docx`).
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut format: Option<ReportFormat> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("unnamed").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read file: {e}")))?;
                upload = Some((file_name, bytes.to_vec()));
            }
            "format" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Failed to read format: {e}")))?;
                if !value.trim().is_empty() {
                    let parsed = value
                        .parse::<ReportFormat>()
                        .map_err(|e: FinancialAnalysisError| bad_request(e.to_string()))?;
                    format = Some(parsed);
                }
            }
            other => warn!("Ignoring unexpected multipart field '{}'", other),
        }
    }

    let (file_name, bytes) = upload.ok_or_else(|| bad_request("No file provided"))?;
    let document = UploadedDocument::from_upload(file_name, bytes)
        .map_err(|e| api_error(StatusCode::UNSUPPORTED_MEDIA_TYPE, "upload", e.to_string()))?;

    let mut session = state.session.lock().await;
    let format = format.unwrap_or_else(|| session.format());

    let outcome = session
        .run_with(document, format)
        .await
        .map(|artifact| artifact.format);
    let format = match outcome {
        Ok(format) => format,
        Err(e) => {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    state: Some(session.state()),
                    stage: e.stage().to_string(),
                    message: e.to_string(),
                }),
            ));
        }
    };

    let (file_name, kind) = session
        .document()
        .map(|doc| (doc.file_name.clone(), doc.kind))
        .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "upload", "Document lost"))?;

    info!("Analysis of '{}' ready as {}", file_name, format);

    Ok(Json(AnalyzeResponse {
        state: session.state(),
        file_name,
        kind,
        extracted_text: session
            .extracted()
            .map(|c| c.text.clone())
            .unwrap_or_default(),
        report: session.report().map(|r| r.text.clone()).unwrap_or_default(),
        download: DownloadInfo {
            url: "/report",
            file_name: format.file_name(),
            content_type: format.content_type(),
        },
    }))
}

/// GET /report: the artifact of the last successful analysis.
pub async fn download(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.lock().await;
    match session.download() {
        Some(artifact) => (
            [
                (header::CONTENT_TYPE, artifact.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", artifact.file_name()),
                ),
            ],
            artifact.bytes.clone(),
        )
            .into_response(),
        None => api_error(
            StatusCode::NOT_FOUND,
            "download",
            "Nenhum relatório disponível. Envie um arquivo PDF ou Excel para começar.",
        )
        .into_response(),
    }
}
