use crate::index::VectorIndex;
use crate::metadata::MetadataRecord;
use crate::model::CorpusEntry;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Build the service's startup artifacts from an embedded corpus.
///
/// The corpus is JSONL, one entry per line; line order defines position
/// assignment, and the metadata array is written in that same order. This
/// is the step that guarantees the positional alignment the query path
/// assumes.
pub fn build_artifacts(corpus: &Path, index_out: &Path, metadata_out: &Path) -> Result<()> {
    let raw = fs::read_to_string(corpus)
        .with_context(|| format!("failed to read corpus {}", corpus.display()))?;

    let mut vectors = Vec::new();
    let mut records = Vec::new();
    for (line_no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry: CorpusEntry = serde_json::from_str(line)
            .with_context(|| format!("invalid corpus entry on line {}", line_no + 1))?;
        vectors.push(entry.embedding);
        records.push(MetadataRecord {
            url: entry.url,
            text: entry.text,
            extra: serde_json::Map::new(),
        });
    }

    let index = VectorIndex::build(vectors).context("corpus vectors are inconsistent")?;
    index
        .persist(index_out)
        .with_context(|| format!("failed to write index artifact {}", index_out.display()))?;

    if let Some(parent) = metadata_out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let metadata_json = serde_json::to_vec(&records)?;
    fs::write(metadata_out, metadata_json)
        .with_context(|| format!("failed to write metadata {}", metadata_out.display()))?;

    tracing::info!(
        entries = index.len(),
        dim = index.dim(),
        "built corpus artifacts: {} and {}",
        index_out.display(),
        metadata_out.display()
    );
    Ok(())
}
