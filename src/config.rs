use crate::defaults;
use std::path::PathBuf;

/// Service configuration, read once at startup from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub index_path: PathBuf,
    pub metadata_path: PathBuf,
    pub embed_url: String,
    pub embed_model: String,
    pub embed_timeout_secs: u64,
    pub top_k: usize,
    /// Fail startup when index and metadata entry counts disagree.
    pub strict_alignment: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("QA_BIND_ADDR")
                .unwrap_or_else(|_| defaults::DEFAULT_BIND_ADDR.to_string()),
            index_path: std::env::var("QA_INDEX_PATH")
                .unwrap_or_else(|_| defaults::DEFAULT_INDEX_PATH.to_string())
                .into(),
            metadata_path: std::env::var("QA_METADATA_PATH")
                .unwrap_or_else(|_| defaults::DEFAULT_METADATA_PATH.to_string())
                .into(),
            embed_url: std::env::var("QA_EMBED_URL")
                .unwrap_or_else(|_| defaults::DEFAULT_EMBED_URL.to_string()),
            embed_model: std::env::var("QA_EMBED_MODEL")
                .unwrap_or_else(|_| defaults::DEFAULT_EMBED_MODEL.to_string()),
            embed_timeout_secs: parse_or(
                std::env::var("QA_EMBED_TIMEOUT_S").ok(),
                defaults::DEFAULT_EMBED_TIMEOUT_S,
            ),
            top_k: parse_or(std::env::var("QA_TOP_K").ok(), defaults::DEFAULT_TOP_K),
            strict_alignment: parse_or(std::env::var("QA_STRICT_ALIGNMENT").ok(), true),
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.parse().ok()).unwrap_or(default)
}
