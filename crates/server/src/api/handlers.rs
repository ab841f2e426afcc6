//! HTTP request handlers and shared application state.

use crate::api::errors::ApiError;
use crate::api::models::*;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use docqa_knowledge::{
    ingest_documents, ingest_pdf_batch, rag, DocumentStore, DocumentSummary, PdfUpload,
    QueryResponse,
};
use docqa_llm::Answerer;
use std::sync::Arc;

/// Multipart field carrying uploaded PDFs.
const FILES_FIELD: &str = "files";

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub answerer: Arc<dyn Answerer>,

    /// Upper bound on request bodies, PDF uploads included
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<DocumentStore>, answerer: Arc<dyn Answerer>) -> Self {
        Self {
            store,
            answerer,
            max_body_bytes: 20 * 1024 * 1024,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to the Document QA API"))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.store.stats().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        documents: stats.documents,
        chunks: stats.chunks,
        dimension: stats.dimension,
    })
}

pub async fn upload_documents(
    State(state): State<AppState>,
    payload: Result<Json<DocumentsRequest>, JsonRejection>,
) -> Result<Json<IndexResponse>, ApiError> {
    let Json(request) = payload?;
    let documents = request.into_documents();
    if documents.is_empty() {
        return Err(ApiError::BadRequest("No documents provided".into()));
    }

    tracing::info!(count = documents.len(), "Indexing documents");
    let reports = ingest_documents(&state.store, documents).await?;

    Ok(Json(IndexResponse {
        message: "Documents indexed successfully".to_string(),
        documents: reports,
    }))
}

pub async fn list_documents(State(state): State<AppState>) -> Json<Vec<DocumentSummary>> {
    Json(state.store.list_documents().await)
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.store.delete_document(&doc_id).await? {
        Ok(Json(MessageResponse::new(format!(
            "Document {} deleted successfully",
            doc_id
        ))))
    } else {
        Err(ApiError::NotFound("Document not found".into()))
    }
}

pub async fn upload_pdf_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PdfBatchResponse>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            tracing::debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        files.push(PdfUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    tracing::info!(count = files.len(), "Received PDF batch");
    let report = ingest_pdf_batch(&state.store, files).await?;

    Ok(Json(PdfBatchResponse {
        message: format!("Indexed {} PDF document(s)", report.documents.len()),
        documents: report.documents,
        skipped: report.skipped,
    }))
}

pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    let response = rag::ask(
        &state.store,
        state.answerer.as_ref(),
        &request.question,
        request.top_k,
    )
    .await?;
    Ok(Json(response))
}
