//! Vector index abstraction and the exact flat L2 implementation.
//!
//! The index only knows positions: vectors are appended, searched and read
//! back, never removed individually. Callers that need deletion rebuild a
//! fresh index from the vectors they keep.

use crate::persist::write_atomic;
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::ops::Range;
use std::path::Path;

/// On-disk format version of [`FlatL2Index`] snapshots.
const SNAPSHOT_VERSION: u32 = 1;

/// Trait for vector index backends.
pub trait VectorIndex: Send + Sync {
    /// Length of every stored vector.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append vectors, returning the positions they were assigned.
    ///
    /// Positions are `len()..len() + vectors.len()` in input order. If any
    /// vector is invalid nothing is appended.
    fn add(&mut self, vectors: &[Vec<f32>]) -> AppResult<Range<usize>>;

    /// Return up to `k` `(position, squared L2 distance)` pairs, nearest
    /// first, ties broken by lower position.
    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>>;

    /// Every stored vector in position order.
    fn reconstruct_all(&self) -> Vec<Vec<f32>>;
}

/// Exact brute-force index over squared Euclidean distance.
///
/// Vectors are stored contiguously; position `i` occupies
/// `data[i * dimension..(i + 1) * dimension]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dimension: usize,
    data: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    version: u32,
    dimension: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    /// Create an empty index for vectors of `dimension` components.
    pub fn new(dimension: usize) -> AppResult<Self> {
        if dimension == 0 {
            return Err(AppError::Config(
                "Index dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            data: Vec::new(),
        })
    }

    /// Build an index holding `vectors` at positions `0..vectors.len()`.
    pub fn from_vectors(dimension: usize, vectors: &[Vec<f32>]) -> AppResult<Self> {
        let mut index = Self::new(dimension)?;
        index.add(vectors)?;
        Ok(index)
    }

    /// Drop every vector at position `len` or later.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.data.truncate(len * self.dimension);
    }

    fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension)
    }

    fn check_vector(&self, vector: &[f32], what: &str) -> AppResult<()> {
        if vector.len() != self.dimension {
            return Err(AppError::Store(format!(
                "{} has dimension {}, index expects {}",
                what,
                vector.len(),
                self.dimension
            )));
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(AppError::Store(format!(
                "{} contains non-finite values",
                what
            )));
        }
        Ok(())
    }

    /// Persist the index to `path` (bincode, replaced atomically).
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let snapshot = IndexSnapshot {
            version: SNAPSHOT_VERSION,
            dimension: self.dimension,
            data: self.data.clone(),
        };
        let bytes = bincode::serialize(&snapshot)
            .map_err(|e| AppError::Serialization(format!("Failed to encode index: {}", e)))?;
        write_atomic(path, &bytes)?;

        tracing::debug!(
            "Saved index to {:?} ({} vectors, {} bytes)",
            path,
            self.len(),
            bytes.len()
        );
        Ok(())
    }

    /// Load an index previously written by [`FlatL2Index::save`].
    pub fn load(path: &Path) -> AppResult<Self> {
        let bytes = fs::read(path)
            .map_err(|e| AppError::Store(format!("Failed to read index {:?}: {}", path, e)))?;
        let snapshot: IndexSnapshot = bincode::deserialize(&bytes).map_err(|e| {
            AppError::Serialization(format!("Failed to decode index {:?}: {}", path, e))
        })?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(AppError::Store(format!(
                "Unsupported index format version {} in {:?}",
                snapshot.version, path
            )));
        }
        if snapshot.dimension == 0 || snapshot.data.len() % snapshot.dimension != 0 {
            return Err(AppError::Store(format!(
                "Corrupt index {:?}: {} values do not divide into dimension {}",
                path,
                snapshot.data.len(),
                snapshot.dimension
            )));
        }

        let index = Self {
            dimension: snapshot.dimension,
            data: snapshot.data,
        };
        tracing::debug!("Loaded index from {:?} ({} vectors)", path, index.len());
        Ok(index)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

fn nearest_first(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

impl VectorIndex for FlatL2Index {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn add(&mut self, vectors: &[Vec<f32>]) -> AppResult<Range<usize>> {
        for (i, vector) in vectors.iter().enumerate() {
            self.check_vector(vector, &format!("Vector {}", i))?;
        }

        let start = self.len();
        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }

        Ok(start..start + vectors.len())
    }

    fn search(&self, query: &[f32], k: usize) -> AppResult<Vec<(usize, f32)>> {
        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }
        self.check_vector(query, "Query vector")?;

        let mut scored: Vec<(usize, f32)> = self
            .vectors()
            .enumerate()
            .map(|(position, vector)| (position, squared_l2(query, vector)))
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, nearest_first);
            scored.truncate(k);
        }
        scored.sort_by(nearest_first);

        Ok(scored)
    }

    fn reconstruct_all(&self) -> Vec<Vec<f32>> {
        self.vectors().map(<[f32]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn index_with(vectors: &[[f32; 2]]) -> FlatL2Index {
        let vectors: Vec<Vec<f32>> = vectors.iter().map(|v| v.to_vec()).collect();
        FlatL2Index::from_vectors(2, &vectors).unwrap()
    }

    #[test]
    fn test_add_assigns_sequential_positions() {
        let mut index = FlatL2Index::new(2).unwrap();
        assert!(index.is_empty());

        let first = index.add(&[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
        let second = index.add(&[vec![2.0, 2.0]]).unwrap();

        assert_eq!(first, 0..2);
        assert_eq!(second, 2..3);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_add_rejects_invalid_batch_atomically() {
        let mut index = index_with(&[[0.0, 0.0]]);

        let wrong_dim = index.add(&[vec![1.0, 1.0], vec![1.0]]);
        assert!(matches!(wrong_dim, Err(AppError::Store(_))));

        let nan = index.add(&[vec![f32::NAN, 0.0]]);
        assert!(nan.is_err());
        let inf = index.add(&[vec![0.0, f32::INFINITY]]);
        assert!(inf.is_err());

        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = index_with(&[[5.0, 5.0], [1.0, 0.0], [0.0, 3.0]]);

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        assert_eq!(hits, vec![(1, 1.0), (2, 9.0), (0, 50.0)]);
    }

    #[test]
    fn test_search_clamps_k() {
        let index = index_with(&[[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]);
        assert_eq!(index.search(&[0.0, 0.0], 5).unwrap().len(), 3);
        assert_eq!(index.search(&[0.0, 0.0], 2).unwrap().len(), 2);
    }

    #[test]
    fn test_search_ties_prefer_lower_position() {
        let index = index_with(&[[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]]);

        let hits = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(hits, vec![(0, 1.0), (1, 1.0)]);
    }

    #[test]
    fn test_search_empty_or_zero_k() {
        let empty = FlatL2Index::new(2).unwrap();
        // Dimension is not checked when there is nothing to scan.
        assert!(empty.search(&[0.0], 3).unwrap().is_empty());

        let index = index_with(&[[0.0, 0.0]]);
        assert!(index.search(&[0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_wrong_query_dimension() {
        let index = index_with(&[[0.0, 0.0]]);
        assert!(index.search(&[0.0, 0.0, 0.0], 1).is_err());
    }

    #[test]
    fn test_reconstruct_all_preserves_order() {
        let index = index_with(&[[3.0, 1.0], [2.0, 7.0]]);
        assert_eq!(
            index.reconstruct_all(),
            vec![vec![3.0, 1.0], vec![2.0, 7.0]]
        );
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(FlatL2Index::new(0), Err(AppError::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.bin");
        let index = index_with(&[[0.5, 1.5], [2.5, 3.5]]);

        index.save(&path).unwrap();
        let loaded = FlatL2Index::load(&path).unwrap();

        assert_eq!(loaded, index);
        assert_eq!(loaded.dimension(), 2);
    }

    #[test]
    fn test_load_garbage_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("index.bin");
        fs::write(&path, b"not an index").unwrap();

        assert!(FlatL2Index::load(&path).is_err());
    }
}
