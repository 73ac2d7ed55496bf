use crate::errors::RetrievalError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One search result: entry position and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub position: usize,
    pub distance: f32,
}

/// Exact nearest-neighbor index over fixed-dimensional embeddings.
///
/// Entries are stored row-major in a flat buffer; an entry's position is its
/// 0-based insertion rank and the sole join key into the metadata store.
/// The index is built offline and loaded read-only by the service, so no
/// mutation is exposed after construction.
///
/// Distances are squared Euclidean (L2 squared). The squared form ranks
/// identically to true Euclidean and skips the square root on the scan;
/// distance values never leave the process, only the ranking does.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    dim: usize,
    count: usize,
    built_at: DateTime<Utc>,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Build an index from vectors in position order (0, 1, 2, ...).
    ///
    /// All vectors must share the length of the first one; a disagreeing
    /// vector fails the whole build with `DimensionMismatch`.
    pub fn build(entries: Vec<Vec<f32>>) -> Result<Self, RetrievalError> {
        let dim = entries.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(dim * entries.len());
        for entry in &entries {
            if entry.len() != dim {
                return Err(RetrievalError::DimensionMismatch {
                    expected: dim,
                    actual: entry.len(),
                });
            }
            data.extend_from_slice(entry);
        }
        Ok(Self {
            dim,
            count: entries.len(),
            built_at: Utc::now(),
            data,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    fn row(&self, i: usize) -> &[f32] {
        let start = i * self.dim;
        &self.data[start..start + self.dim]
    }

    /// Return up to `top_k` entries nearest to `query`, ascending by
    /// distance, ties broken by lower position.
    ///
    /// A `top_k` beyond the entry count returns every entry. Searching an
    /// empty index yields an empty result for any query; otherwise a query
    /// of the wrong length fails with `DimensionMismatch` before any
    /// distance is computed.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, RetrievalError> {
        if self.count == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dim {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }

        let mut hits: Vec<SearchHit> = (0..self.count)
            .map(|position| SearchHit {
                position,
                distance: squared_euclidean(query, self.row(position)),
            })
            .collect();

        let k = top_k.min(self.count);
        if k == 0 {
            return Ok(Vec::new());
        }
        if k < hits.len() {
            // Partial selection: partition the k smallest to the front,
            // then order only that prefix.
            hits.select_nth_unstable_by(k, compare_hits);
            hits.truncate(k);
        }
        hits.sort_unstable_by(compare_hits);
        Ok(hits)
    }

    /// Serialize the index to a durable artifact.
    ///
    /// The snapshot is written to a temp file and renamed into place so a
    /// crash mid-write never leaves a truncated artifact behind.
    pub fn persist(&self, path: &Path) -> Result<(), RetrievalError> {
        let bytes = bincode::serialize(self)
            .map_err(|e| RetrievalError::IndexLoad(format!("serialize failed: {e}")))?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| RetrievalError::IndexLoad(format!("{}: {e}", parent.display())))?;
            }
        }
        let tmp_path = path.with_extension("bin.tmp");
        fs::write(&tmp_path, &bytes)
            .map_err(|e| RetrievalError::IndexLoad(format!("{}: {e}", tmp_path.display())))?;
        fs::rename(&tmp_path, path)
            .map_err(|e| RetrievalError::IndexLoad(format!("{}: {e}", path.display())))?;
        Ok(())
    }

    /// Load a previously persisted index. Round-trips exactly: same entries,
    /// same order, bit-identical distances on re-query.
    pub fn load(path: &Path) -> Result<Self, RetrievalError> {
        let bytes = fs::read(path)
            .map_err(|e| RetrievalError::IndexLoad(format!("{}: {e}", path.display())))?;
        bincode::deserialize(&bytes)
            .map_err(|e| RetrievalError::IndexLoad(format!("{}: {e}", path.display())))
    }
}

fn compare_hits(a: &SearchHit, b: &SearchHit) -> std::cmp::Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.position.cmp(&b.position))
}

fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
