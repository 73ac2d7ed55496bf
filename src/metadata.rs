use crate::errors::RetrievalError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One corpus record, positionally aligned with the vector index.
///
/// `url` is required; `text` is an optional human-readable label. Any other
/// fields in the metadata file are carried along untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Ordered, read-only sequence of metadata records.
///
/// File order is authoritative: record `i` describes index entry `i`. The
/// alignment itself is guaranteed by the index builder, not re-derived here.
#[derive(Debug)]
pub struct MetadataStore {
    records: Vec<MetadataRecord>,
}

impl MetadataStore {
    /// Parse a persisted JSON array of records, preserving file order.
    pub fn load(path: &Path) -> Result<Self, RetrievalError> {
        let bytes = fs::read(path)
            .map_err(|e| RetrievalError::MetadataLoad(format!("{}: {e}", path.display())))?;
        let records: Vec<MetadataRecord> = serde_json::from_slice(&bytes)
            .map_err(|e| RetrievalError::MetadataLoad(format!("{}: {e}", path.display())))?;
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<MetadataRecord>) -> Self {
        Self { records }
    }

    /// Record at `position`, or `None` when the position is out of range.
    /// Out-of-range lookups are a tolerated data condition, not an error:
    /// callers drop them from the result set.
    pub fn get(&self, position: usize) -> Option<&MetadataRecord> {
        self.records.get(position)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
