//! Knowledge store type definitions.

use serde::{Deserialize, Serialize};

/// Provenance of one indexed chunk.
///
/// `vector_id` is the chunk's position in the vector index and the only
/// link between a search result and its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Owning document
    pub document_id: String,

    /// Document title, repeated on every chunk
    pub title: String,

    /// Position of the chunk within its document
    pub chunk_index: usize,

    /// Chunk text
    #[serde(rename = "chunk")]
    pub text: String,

    /// Position in the vector index
    pub vector_id: usize,
}

/// A document as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: String,
    pub title: String,
}

/// A retrieved chunk with its distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document_id: String,
    pub title: String,
    pub chunk_index: usize,
    pub vector_id: usize,
    pub chunk: String,

    /// Squared L2 distance; lower is closer
    pub distance: f32,
}

/// Store-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub documents: usize,
    pub chunks: usize,
    pub dimension: usize,
}

/// Result of indexing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub document_id: String,
    pub title: String,

    /// Number of chunks written
    pub chunks: usize,
}

/// Answer to a question, with the chunks it was grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SearchHit>,
}

/// A validated document with its id and title resolved, ready to index.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDocument {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl PreparedDocument {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_record_json_shape() {
        let record = ChunkRecord {
            document_id: "doc-1".to_string(),
            title: "Guide".to_string(),
            chunk_index: 2,
            text: "some text".to_string(),
            vector_id: 7,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["chunk"], "some text");
        assert_eq!(json["vector_id"], 7);

        let parsed: ChunkRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }
}
