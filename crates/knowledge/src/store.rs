//! Document store: document-level operations over the flat index and its
//! metadata.
//!
//! The index and metadata live together behind one async `RwLock` and are
//! persisted together at the end of every mutation. Record `i` of the
//! metadata always describes index position `i` while the lock is free.

use crate::chunker::{chunk_text, ChunkStrategy};
use crate::embeddings::EmbeddingProvider;
use crate::metadata::MetadataStore;
use crate::types::{
    ChunkRecord, DocumentSummary, IngestReport, PreparedDocument, SearchHit, StoreStats,
};
use crate::vector_index::{FlatL2Index, VectorIndex};
use docqa_core::{AppConfig, AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default cap on chunks per document.
pub const DEFAULT_MAX_CHUNKS: usize = 100;

/// Where the store persists and how it chunks.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub index_path: PathBuf,
    pub metadata_path: PathBuf,
    pub chunking: ChunkStrategy,
    pub max_chunks: usize,
}

impl StoreConfig {
    /// Default file names and chunking inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            index_path: dir.join("index.bin"),
            metadata_path: dir.join("metadata.json"),
            chunking: ChunkStrategy::default(),
            max_chunks: DEFAULT_MAX_CHUNKS,
        }
    }

    pub fn from_app_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            index_path: config.index_path(),
            metadata_path: config.metadata_path(),
            chunking: ChunkStrategy::from_config(&config.chunking)?,
            max_chunks: config.chunking.max_chunks,
        })
    }

    pub fn with_chunking(mut self, chunking: ChunkStrategy) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }
}

struct StoreState {
    index: FlatL2Index,
    metadata: MetadataStore,
}

impl StoreState {
    fn empty(dimension: usize) -> AppResult<Self> {
        Ok(Self {
            index: FlatL2Index::new(dimension)?,
            metadata: MetadataStore::new(),
        })
    }
}

/// A document that passed validation, with its chunks.
struct StagedDocument {
    id: String,
    title: String,
    chunks: Vec<String>,
}

/// Vector store service owning the index, the metadata and the embedder.
pub struct DocumentStore {
    config: StoreConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    state: RwLock<StoreState>,
}

impl DocumentStore {
    /// Open the store, loading persisted state if present.
    ///
    /// A store whose files are both absent starts empty. The persisted
    /// index must match the embedder's dimension.
    pub fn open(config: StoreConfig, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        config.chunking.validate()?;
        if config.max_chunks == 0 {
            return Err(AppError::Config(
                "max_chunks must be greater than zero".to_string(),
            ));
        }

        let dimension = embedder.dimensions();
        let state = match (config.index_path.exists(), config.metadata_path.exists()) {
            (false, false) => {
                tracing::info!(
                    "No persisted store at {:?}, starting empty",
                    config.index_path
                );
                StoreState::empty(dimension)?
            }
            (true, true) => load_state(&config, dimension)?,
            (index_exists, _) => {
                let (present, missing) = if index_exists {
                    (&config.index_path, &config.metadata_path)
                } else {
                    (&config.metadata_path, &config.index_path)
                };
                return Err(AppError::Store(format!(
                    "Found {:?} but not {:?}; refusing to open a partial store",
                    present, missing
                )));
            }
        };

        Ok(Self {
            config,
            embedder,
            state: RwLock::new(state),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimensions()
    }

    /// Chunk, embed and index a document.
    ///
    /// Validation, size and duplicate checks all run before the embedder is
    /// called; nothing is written unless every step succeeds.
    pub async fn add_document(
        &self,
        doc_id: &str,
        title: &str,
        content: &str,
    ) -> AppResult<IngestReport> {
        let mut reports = self
            .add_documents(&[PreparedDocument::new(doc_id, title, content)])
            .await?;
        reports
            .pop()
            .ok_or_else(|| AppError::Store("Indexing produced no report".to_string()))
    }

    /// Index several documents as one unit.
    ///
    /// Every document is chunked, size-checked and checked for duplicates
    /// (against the store and within the batch) before one embedding call
    /// covers all chunks. The batch is then committed under a single write
    /// lock and a single save: either every document is indexed or none is.
    pub async fn add_documents(&self, docs: &[PreparedDocument]) -> AppResult<Vec<IngestReport>> {
        let staged = self.stage(docs)?;
        if staged.is_empty() {
            return Ok(Vec::new());
        }

        {
            let state = self.state.read().await;
            if let Some(doc) = staged.iter().find(|d| state.metadata.contains_document(&d.id)) {
                return Err(conflict(&doc.id));
            }
        }

        let all_chunks: Vec<String> = staged
            .iter()
            .flat_map(|doc| doc.chunks.iter().cloned())
            .collect();
        let mut embeddings = self.embed_chunks(&all_chunks).await?.into_iter();

        let mut state = self.state.write().await;
        if let Some(doc) = staged.iter().find(|d| state.metadata.contains_document(&d.id)) {
            return Err(conflict(&doc.id));
        }

        let previous_len = state.index.len();
        let mut reports = Vec::with_capacity(staged.len());
        for doc in staged {
            let vectors: Vec<Vec<f32>> = embeddings.by_ref().take(doc.chunks.len()).collect();
            let positions = match state.index.add(&vectors) {
                Ok(positions) => positions,
                Err(e) => {
                    state.index.truncate(previous_len);
                    state.metadata.truncate(previous_len);
                    return Err(e);
                }
            };

            let chunk_count = doc.chunks.len();
            let records: Vec<ChunkRecord> = doc
                .chunks
                .into_iter()
                .zip(positions)
                .enumerate()
                .map(|(chunk_index, (text, vector_id))| ChunkRecord {
                    document_id: doc.id.clone(),
                    title: doc.title.clone(),
                    chunk_index,
                    text,
                    vector_id,
                })
                .collect();
            state.metadata.append(records);

            reports.push(IngestReport {
                document_id: doc.id,
                title: doc.title,
                chunks: chunk_count,
            });
        }

        if let Err(e) = self.persist(&state) {
            state.index.truncate(previous_len);
            state.metadata.truncate(previous_len);
            self.restore_persisted(&state);
            return Err(e);
        }

        for report in &reports {
            tracing::info!(
                document_id = %report.document_id,
                chunks = report.chunks,
                "Indexed document"
            );
        }
        tracing::debug!(total_chunks = state.index.len(), "Store committed");

        Ok(reports)
    }

    /// Validate and chunk a batch without touching the store.
    fn stage(&self, docs: &[PreparedDocument]) -> AppResult<Vec<StagedDocument>> {
        let mut staged: Vec<StagedDocument> = Vec::with_capacity(docs.len());
        for doc in docs {
            if doc.content.trim().is_empty() {
                return Err(AppError::Validation(
                    "Document content cannot be empty".to_string(),
                ));
            }

            let chunks = chunk_text(&doc.content, &self.config.chunking)?;
            if chunks.is_empty() {
                return Err(AppError::Validation(
                    "Document content produced no chunks".to_string(),
                ));
            }
            if chunks.len() > self.config.max_chunks {
                return Err(AppError::TooLarge(format!(
                    "Document '{}' produces {} chunks, the limit is {}",
                    doc.id,
                    chunks.len(),
                    self.config.max_chunks
                )));
            }
            if staged.iter().any(|s| s.id == doc.id) {
                return Err(AppError::Conflict(format!(
                    "Document id '{}' appears twice in the batch",
                    doc.id
                )));
            }

            staged.push(StagedDocument {
                id: doc.id.clone(),
                title: doc.title.clone(),
                chunks,
            });
        }
        Ok(staged)
    }

    /// One entry per indexed document, in ingestion order.
    pub async fn list_documents(&self) -> Vec<DocumentSummary> {
        self.state.read().await.metadata.list_unique_documents()
    }

    pub async fn contains_document(&self, doc_id: &str) -> bool {
        self.state.read().await.metadata.contains_document(doc_id)
    }

    /// Remove every chunk of `doc_id`, returning whether anything was removed.
    ///
    /// The index cannot delete by position, so the surviving vectors are
    /// copied into a fresh index and their records renumbered `0..n`. The
    /// replacement is persisted before it becomes visible.
    pub async fn delete_document(&self, doc_id: &str) -> AppResult<bool> {
        let mut state = self.state.write().await;

        let (mut kept, removed) = state.metadata.partition(doc_id);
        if removed.is_empty() {
            tracing::debug!(document_id = doc_id, "Delete requested for unknown document");
            return Ok(false);
        }

        let replacement = if kept.is_empty() {
            StoreState::empty(state.index.dimension())?
        } else {
            let mut removed_iter = removed.iter().peekable();
            let kept_vectors: Vec<Vec<f32>> = state
                .index
                .reconstruct_all()
                .into_iter()
                .enumerate()
                .filter_map(|(position, vector)| {
                    if removed_iter.peek() == Some(&&position) {
                        removed_iter.next();
                        None
                    } else {
                        Some(vector)
                    }
                })
                .collect();

            for (vector_id, record) in kept.iter_mut().enumerate() {
                record.vector_id = vector_id;
            }

            StoreState {
                index: FlatL2Index::from_vectors(state.index.dimension(), &kept_vectors)?,
                metadata: MetadataStore::from_records(kept),
            }
        };

        if let Err(e) = self.persist(&replacement) {
            self.restore_persisted(&state);
            return Err(e);
        }

        *state = replacement;

        tracing::info!(
            document_id = doc_id,
            removed_chunks = removed.len(),
            remaining_chunks = state.index.len(),
            "Deleted document"
        );

        Ok(true)
    }

    /// The `k` chunks nearest to `query`, closest first.
    pub async fn search(&self, query: &str, k: usize) -> AppResult<Vec<SearchHit>> {
        if k == 0 || self.state.read().await.index.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(query).await?;
        self.check_dimension(&query_vector)?;

        let state = self.state.read().await;
        let positions = state.index.search(&query_vector, k)?;

        let hits = positions
            .into_iter()
            .map(|(position, distance)| {
                let record = state.metadata.get(position).ok_or_else(|| {
                    AppError::Store(format!("Index position {} has no metadata", position))
                })?;
                Ok(SearchHit {
                    document_id: record.document_id.clone(),
                    title: record.title.clone(),
                    chunk_index: record.chunk_index,
                    vector_id: record.vector_id,
                    chunk: record.text.clone(),
                    distance,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        tracing::debug!(k, hits = hits.len(), "Searched store");
        Ok(hits)
    }

    pub async fn stats(&self) -> StoreStats {
        let state = self.state.read().await;
        StoreStats {
            documents: state.metadata.document_count(),
            chunks: state.index.len(),
            dimension: state.index.dimension(),
        }
    }

    async fn embed_chunks(&self, chunks: &[String]) -> AppResult<Vec<Vec<f32>>> {
        tracing::debug!(
            provider = self.embedder.provider_name(),
            model = self.embedder.model_name(),
            count = chunks.len(),
            "Embedding chunks"
        );

        let embeddings = self.embedder.embed_batch(chunks).await?;
        if embeddings.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "Embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }
        Ok(embeddings)
    }

    fn check_dimension(&self, vector: &[f32]) -> AppResult<()> {
        let expected = self.embedder.dimensions();
        if vector.len() != expected {
            return Err(AppError::Embedding(format!(
                "Embedder returned a vector of dimension {}, expected {}",
                vector.len(),
                expected
            )));
        }
        Ok(())
    }

    fn persist(&self, state: &StoreState) -> AppResult<()> {
        state.index.save(&self.config.index_path)?;
        state.metadata.save(&self.config.metadata_path)?;
        Ok(())
    }

    /// Best effort: put the files back in line with the in-memory state
    /// after a failed save left them half written.
    fn restore_persisted(&self, state: &StoreState) {
        if let Err(e) = self.persist(state) {
            tracing::error!("Failed to restore persisted store after error: {}", e);
        }
    }
}

fn conflict(doc_id: &str) -> AppError {
    AppError::Conflict(format!("Document with id '{}' already exists", doc_id))
}

fn load_state(config: &StoreConfig, dimension: usize) -> AppResult<StoreState> {
    let index = FlatL2Index::load(&config.index_path)?;
    let metadata = MetadataStore::load(&config.metadata_path)?;

    if index.dimension() != dimension {
        return Err(AppError::Config(format!(
            "Stored index has dimension {} but the embedding provider produces {}",
            index.dimension(),
            dimension
        )));
    }
    if index.len() != metadata.len() {
        return Err(AppError::Store(format!(
            "Stored index has {} vectors but metadata has {} records",
            index.len(),
            metadata.len()
        )));
    }

    tracing::info!(
        "Loaded store from {:?}: {} documents, {} chunks",
        config.index_path,
        metadata.document_count(),
        index.len()
    );

    Ok(StoreState { index, metadata })
}
