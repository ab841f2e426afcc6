//! Turning client input into indexed documents.

use crate::pdf::{self, PdfUpload};
use crate::store::DocumentStore;
use crate::types::IngestReport;
pub use crate::types::PreparedDocument;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Title given to documents submitted without one.
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// Longest accepted title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// A document as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
}

impl NewDocument {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            content: content.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Validate a submission and fill in defaults.
///
/// A missing or blank id becomes a fresh UUID v4; a missing or blank title
/// becomes [`DEFAULT_TITLE`].
pub fn prepare(doc: NewDocument) -> AppResult<PreparedDocument> {
    let content = doc.content.trim();
    if content.is_empty() {
        return Err(AppError::Validation(
            "Document content cannot be empty".to_string(),
        ));
    }

    let title = doc
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE);
    let title_chars = title.chars().count();
    if title_chars > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "Title is {} characters long, the limit is {}",
            title_chars, MAX_TITLE_CHARS
        )));
    }

    let id = doc
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    Ok(PreparedDocument {
        id,
        title: title.to_string(),
        content: content.to_string(),
    })
}

/// Index documents one after another.
///
/// The first failure is returned; documents before it stay indexed.
pub async fn ingest_documents(
    store: &DocumentStore,
    docs: Vec<NewDocument>,
) -> AppResult<Vec<IngestReport>> {
    let mut reports = Vec::with_capacity(docs.len());
    for doc in docs {
        let doc = prepare(doc)?;
        let report = store.add_document(&doc.id, &doc.title, &doc.content).await?;
        reports.push(report);
    }
    Ok(reports)
}

/// Outcome of a PDF batch upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfBatchReport {
    pub documents: Vec<IngestReport>,

    /// File names whose text was empty
    pub skipped: Vec<String>,
}

/// Index a batch of uploaded PDFs, one document per file.
///
/// Every file is checked and extracted first, then the extracted documents
/// are committed together through [`DocumentStore::add_documents`], so any
/// failure rejects the whole batch and leaves the store untouched. Files
/// without text are skipped; a batch with no usable file is rejected.
pub async fn ingest_pdf_batch(
    store: &DocumentStore,
    files: Vec<PdfUpload>,
) -> AppResult<PdfBatchReport> {
    if files.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }

    if let Some(file) = files
        .iter()
        .find(|f| !pdf::is_pdf(&f.file_name, f.content_type.as_deref()))
    {
        return Err(AppError::Validation(format!(
            "File '{}' is not a PDF",
            file.file_name
        )));
    }

    let mut extracted = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();
    for file in files {
        let text = pdf::extract_text(file.bytes).await.map_err(|e| {
            AppError::Extraction(format!(
                "Failed to extract text from PDF '{}': {}",
                file.file_name, e
            ))
        })?;

        if text.is_empty() {
            tracing::warn!(file = %file.file_name, "PDF contains no extractable text");
            skipped.push(file.file_name);
        } else {
            extracted.push(prepare(NewDocument::new(file.file_name, text))?);
        }
    }

    if extracted.is_empty() {
        return Err(AppError::Validation(
            "No extractable text found in the uploaded PDFs".to_string(),
        ));
    }

    let documents = store.add_documents(&extracted).await?;

    tracing::info!(
        indexed = documents.len(),
        skipped = skipped.len(),
        "Indexed PDF batch"
    );

    Ok(PdfBatchReport { documents, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::ChunkStrategy;
    use crate::embeddings::providers::MockProvider;
    use crate::store::StoreConfig;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> DocumentStore {
        DocumentStore::open(
            StoreConfig::in_dir(dir.path()),
            Arc::new(MockProvider::new(32)),
        )
        .unwrap()
    }

    #[test]
    fn test_prepare_defaults() {
        let doc = prepare(NewDocument {
            content: "  body text  ".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(doc.title, DEFAULT_TITLE);
        assert_eq!(doc.content, "body text");
        assert!(uuid::Uuid::parse_str(&doc.id).is_ok());
    }

    #[test]
    fn test_prepare_keeps_given_values() {
        let doc = prepare(NewDocument::new("  My Title ", "text").with_id("doc-42")).unwrap();
        assert_eq!(doc.id, "doc-42");
        assert_eq!(doc.title, "My Title");
    }

    #[test]
    fn test_prepare_generates_distinct_ids() {
        let a = prepare(NewDocument::new("t", "text")).unwrap();
        let b = prepare(NewDocument::new("t", "text")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_prepare_rejects_bad_input() {
        assert!(matches!(
            prepare(NewDocument::new("t", " \n ")),
            Err(AppError::Validation(_))
        ));

        let long_title = "é".repeat(MAX_TITLE_CHARS + 1);
        assert!(matches!(
            prepare(NewDocument::new(long_title, "text")),
            Err(AppError::Validation(_))
        ));

        let max_title = "é".repeat(MAX_TITLE_CHARS);
        assert!(prepare(NewDocument::new(max_title, "text")).is_ok());
    }

    #[tokio::test]
    async fn test_ingest_documents_stops_at_first_failure() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let result = ingest_documents(
            &store,
            vec![
                NewDocument::new("One", "first document").with_id("1"),
                NewDocument::new("Dup", "duplicate id").with_id("1"),
                NewDocument::new("Three", "never reached").with_id("3"),
            ],
        )
        .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        let ids: Vec<String> = store
            .list_documents()
            .await
            .into_iter()
            .map(|d| d.document_id)
            .collect();
        assert_eq!(ids, vec!["1"]);
    }

    #[tokio::test]
    async fn test_ingest_documents_reports() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let reports = ingest_documents(
            &store,
            vec![
                NewDocument::new("One", "first").with_id("1"),
                NewDocument::new("Two", "second").with_id("2"),
            ],
        )
        .await
        .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].title, "Two");
        assert_eq!(reports[1].chunks, 1);
    }

    fn upload(name: &str, bytes: &[u8]) -> PdfUpload {
        PdfUpload {
            file_name: name.to_string(),
            content_type: None,
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_pdf_batch_rejects_non_pdf_before_extracting() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let result = ingest_pdf_batch(
            &store,
            vec![upload("broken.pdf", b"garbage"), upload("notes.txt", b"hi")],
        )
        .await;

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("notes.txt")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_pdf_batch_extraction_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let result = ingest_pdf_batch(&store, vec![upload("broken.pdf", b"garbage")]).await;

        assert!(matches!(result, Err(AppError::Extraction(_))));
        assert_eq!(store.stats().await.documents, 0);
    }

    const FERRIS_PDF: &[u8] = include_bytes!("../tests/fixtures/ferris.pdf");
    const SHORT_PDF: &[u8] = include_bytes!("../tests/fixtures/short.pdf");
    const BLANK_PDF: &[u8] = include_bytes!("../tests/fixtures/blank.pdf");

    #[tokio::test]
    async fn test_pdf_batch_indexes_text_and_skips_blank() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let report = ingest_pdf_batch(
            &store,
            vec![upload("ferris.pdf", FERRIS_PDF), upload("blank.pdf", BLANK_PDF)],
        )
        .await
        .unwrap();

        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].title, "ferris.pdf");
        assert_eq!(report.documents[0].chunks, 1);
        assert_eq!(report.skipped, vec!["blank.pdf"]);

        let listed = store.list_documents().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].document_id, report.documents[0].document_id);

        let hits = store.search("mascot of Rust", 1).await.unwrap();
        assert!(hits[0].chunk.contains("Ferris the crab"));
    }

    #[tokio::test]
    async fn test_pdf_batch_of_blank_files_rejected() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let result = ingest_pdf_batch(&store, vec![upload("blank.pdf", BLANK_PDF)]).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.list_documents().await.is_empty());
    }

    #[tokio::test]
    async fn test_pdf_batch_oversized_file_commits_nothing() {
        let temp = TempDir::new().unwrap();
        let config = StoreConfig::in_dir(temp.path())
            .with_chunking(ChunkStrategy::Words { max_words: 5 })
            .with_max_chunks(1);
        let store = DocumentStore::open(config, Arc::new(MockProvider::new(32))).unwrap();

        let result = ingest_pdf_batch(
            &store,
            vec![upload("short.pdf", SHORT_PDF), upload("ferris.pdf", FERRIS_PDF)],
        )
        .await;

        assert!(matches!(result, Err(AppError::TooLarge(_))));
        assert!(store.list_documents().await.is_empty());
        assert_eq!(store.stats().await.chunks, 0);
    }

    #[tokio::test]
    async fn test_pdf_batch_gives_each_file_its_own_id() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.add_document("taken", "Taken", "already indexed").await.unwrap();

        let report = ingest_pdf_batch(
            &store,
            vec![upload("short.pdf", SHORT_PDF), upload("ferris.pdf", FERRIS_PDF)],
        )
        .await
        .unwrap();

        assert_eq!(report.documents.len(), 2);
        assert_ne!(report.documents[0].document_id, report.documents[1].document_id);
        assert_eq!(store.list_documents().await.len(), 3);
    }

    #[test]
    fn test_prepare_has_no_character_bounds() {
        assert_eq!(prepare(NewDocument::new("t", "a")).unwrap().content, "a");

        let long = "word ".repeat(2_000);
        assert_eq!(
            prepare(NewDocument::new("t", long.as_str())).unwrap().content.len(),
            long.trim().len()
        );
    }

    #[tokio::test]
    async fn test_pdf_batch_empty() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        assert!(matches!(
            ingest_pdf_batch(&store, Vec::new()).await,
            Err(AppError::Validation(_))
        ));
    }
}
