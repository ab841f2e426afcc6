//! Request and response bodies.

use docqa_knowledge::rag::DEFAULT_TOP_K;
use docqa_knowledge::{IngestReport, NewDocument};
use serde::{Deserialize, Serialize};

/// Body of `POST /documents`: one document or a `documents` array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DocumentsRequest {
    Batch { documents: Vec<NewDocument> },
    Single(NewDocument),
}

impl DocumentsRequest {
    pub fn into_documents(self) -> Vec<NewDocument> {
        match self {
            DocumentsRequest::Batch { documents } => documents,
            DocumentsRequest::Single(doc) => vec![doc],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexResponse {
    pub message: String,
    pub documents: Vec<IngestReport>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PdfBatchResponse {
    pub message: String,
    pub documents: Vec<IngestReport>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub documents: usize,
    pub chunks: usize,
    pub dimension: usize,
}
