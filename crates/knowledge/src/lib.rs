//! Document storage and retrieval for DocQA.
//!
//! Documents are chunked, embedded and appended to an exact flat L2 index
//! whose positions line up with a metadata table of chunk provenance. The
//! [`DocumentStore`] layers document-level add, list, delete and search on
//! top of that pair, and [`rag::ask`] turns a search into a grounded answer.
//!
//! # Example
//! ```no_run
//! use docqa_knowledge::{embeddings::providers::MockProvider, DocumentStore, StoreConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> docqa_core::AppResult<()> {
//! let store = DocumentStore::open(
//!     StoreConfig::in_dir(Path::new("vectorstore")),
//!     Arc::new(MockProvider::new(384)),
//! )?;
//! store.add_document("doc-1", "Guide", "Ownership moves values.").await?;
//! let hits = store.search("What moves values?", 3).await?;
//! println!("{:?}", hits);
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod embeddings;
pub mod ingest;
pub mod metadata;
pub mod pdf;
mod persist;
pub mod rag;
pub mod store;
pub mod types;
pub mod vector_index;

pub use chunker::{chunk_text, ChunkStrategy};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use ingest::{ingest_documents, ingest_pdf_batch, NewDocument, PdfBatchReport};
pub use pdf::PdfUpload;
pub use store::{DocumentStore, StoreConfig};
pub use types::{
    ChunkRecord, DocumentSummary, IngestReport, PreparedDocument, QueryResponse, SearchHit,
    StoreStats,
};
pub use vector_index::{FlatL2Index, VectorIndex};
