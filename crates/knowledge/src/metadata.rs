//! Chunk metadata aligned with vector index positions.

use crate::persist::write_atomic;
use crate::types::{ChunkRecord, DocumentSummary};
use docqa_core::{AppError, AppResult};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Ordered chunk records; record `i` describes index position `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataStore {
    records: Vec<ChunkRecord>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ChunkRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&ChunkRecord> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, records: Vec<ChunkRecord>) {
        self.records.extend(records);
    }

    /// Drop records past `len`.
    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    pub fn contains_document(&self, document_id: &str) -> bool {
        self.records.iter().any(|r| r.document_id == document_id)
    }

    /// One entry per document, in order of first appearance, carrying the
    /// title of the document's first record.
    pub fn list_unique_documents(&self) -> Vec<DocumentSummary> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.document_id.as_str()))
            .map(|r| DocumentSummary {
                document_id: r.document_id.clone(),
                title: r.title.clone(),
            })
            .collect()
    }

    pub fn document_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.document_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Split records into those kept and the positions of those belonging
    /// to `document_id`. Kept records retain their relative order.
    pub fn partition(&self, document_id: &str) -> (Vec<ChunkRecord>, Vec<usize>) {
        let mut kept = Vec::with_capacity(self.records.len());
        let mut removed = Vec::new();
        for (position, record) in self.records.iter().enumerate() {
            if record.document_id == document_id {
                removed.push(position);
            } else {
                kept.push(record.clone());
            }
        }
        (kept, removed)
    }

    /// Persist as a pretty-printed JSON array (replaced atomically).
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let json = serde_json::to_vec_pretty(&self.records)
            .map_err(|e| AppError::Serialization(format!("Failed to encode metadata: {}", e)))?;
        write_atomic(path, &json)?;
        tracing::debug!("Saved {} metadata records to {:?}", self.len(), path);
        Ok(())
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Store(format!("Failed to read metadata {:?}: {}", path, e)))?;
        let records: Vec<ChunkRecord> = serde_json::from_str(&content).map_err(|e| {
            AppError::Serialization(format!("Failed to parse metadata {:?}: {}", path, e))
        })?;

        for (position, record) in records.iter().enumerate() {
            if record.vector_id != position {
                return Err(AppError::Store(format!(
                    "Corrupt metadata {:?}: record {} has vector_id {}",
                    path, position, record.vector_id
                )));
            }
        }

        Ok(Self { records })
    }
}
