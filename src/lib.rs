//! Corpus QA
//!
//! A retrieval service that answers natural-language questions with links
//! into a fixed, offline-embedded corpus.

pub mod api;
pub mod config;
pub mod embedding;
pub mod index;
pub mod indexer;
pub mod metadata;
pub mod model;
pub mod query;

pub use index::{SearchHit, VectorIndex};
pub use metadata::{MetadataRecord, MetadataStore};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
    pub const DEFAULT_INDEX_PATH: &str = "index/index.bin";
    pub const DEFAULT_METADATA_PATH: &str = "index/metadata.json";
    pub const DEFAULT_EMBED_URL: &str = "http://127.0.0.1:11434";
    pub const DEFAULT_EMBED_MODEL: &str = "all-minilm";
    pub const DEFAULT_EMBED_TIMEOUT_S: u64 = 30;
    pub const DEFAULT_TOP_K: usize = 2;
}

/// Error types for the retrieval core
pub mod errors {
    use anyhow::Error;

    pub type Result<T> = std::result::Result<T, Error>;

    #[derive(Debug, thiserror::Error)]
    pub enum RetrievalError {
        #[error("dimension mismatch: expected {expected}, got {actual}")]
        DimensionMismatch { expected: usize, actual: usize },

        #[error("failed to load vector index: {0}")]
        IndexLoad(String),

        #[error("failed to load metadata store: {0}")]
        MetadataLoad(String),

        #[error("corpus misalignment: index has {index_len} entries, metadata has {metadata_len}")]
        CorpusMisalignment {
            index_len: usize,
            metadata_len: usize,
        },

        #[error("embedding request failed: {0}")]
        Embedding(String),
    }
}
