use crate::embedding::Embedder;
use crate::errors::RetrievalError;
use crate::index::VectorIndex;
use crate::metadata::MetadataStore;
use crate::model::{AnswerResponse, Link};
use tracing::debug;

/// Answer a question from the corpus: embed, search, map positions to
/// metadata, assemble the response.
///
/// The answer string is a fixed template carrying the question verbatim;
/// no answer synthesis happens here. Positions without a metadata record
/// are dropped from the links, never failing the request, and a search
/// with no surviving records still answers with empty links.
pub async fn answer(
    question: &str,
    embedder: &dyn Embedder,
    index: &VectorIndex,
    store: &MetadataStore,
    top_k: usize,
) -> Result<AnswerResponse, RetrievalError> {
    let started = std::time::Instant::now();

    let query_vector = embedder.embed(question).await?;
    let hits = index.search(&query_vector, top_k)?;

    let mut links = Vec::with_capacity(hits.len());
    for hit in &hits {
        let Some(record) = store.get(hit.position) else {
            debug!(position = hit.position, "dropping hit without metadata");
            continue;
        };
        let text = record
            .text
            .clone()
            .unwrap_or_else(|| format!("Related result {}", links.len() + 1));
        links.push(Link {
            url: record.url.clone(),
            text,
        });
    }

    debug!(
        took_ms = started.elapsed().as_millis() as u64,
        results = links.len(),
        "answered question"
    );

    Ok(AnswerResponse {
        answer: format!("I found some helpful resources for your question: \"{question}\""),
        links,
    })
}
