//! End-to-end checks over the built artifacts: corpus JSONL in, ranked
//! answer links out, with the index persisted and reloaded in between.

use async_trait::async_trait;
use corpus_qa::embedding::Embedder;
use corpus_qa::errors::RetrievalError;
use corpus_qa::indexer::build_artifacts;
use corpus_qa::query;
use corpus_qa::{MetadataStore, VectorIndex};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

struct StubEmbedder(Vec<f32>);

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
        Ok(self.0.clone())
    }
}

fn write_corpus(dir: &tempfile::TempDir) -> PathBuf {
    let corpus_path = dir.path().join("corpus.jsonl");
    let mut corpus = fs::File::create(&corpus_path).unwrap();
    writeln!(corpus, r#"{{"url":"a","embedding":[1.0,0.0]}}"#).unwrap();
    writeln!(corpus, r#"{{"url":"b","embedding":[0.0,1.0]}}"#).unwrap();
    writeln!(corpus, r#"{{"url":"c","embedding":[0.9,0.1]}}"#).unwrap();
    corpus_path
}

#[tokio::test]
async fn corpus_to_answer_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.bin");
    let metadata_path = dir.path().join("metadata.json");

    build_artifacts(&write_corpus(&dir), &index_path, &metadata_path).unwrap();

    let index = VectorIndex::load(&index_path).unwrap();
    let store = MetadataStore::load(&metadata_path).unwrap();
    assert_eq!(index.len(), store.len());

    let embedder = StubEmbedder(vec![1.0, 0.0]);
    let response = query::answer("which page covers a?", &embedder, &index, &store, 2)
        .await
        .unwrap();

    assert_eq!(
        response.answer,
        "I found some helpful resources for your question: \"which page covers a?\""
    );
    assert_eq!(response.links.len(), 2);
    assert_eq!(response.links[0].url, "a");
    assert_eq!(response.links[0].text, "Related result 1");
    assert_eq!(response.links[1].url, "c");
    assert_eq!(response.links[1].text, "Related result 2");
}

#[test]
fn reloaded_index_ranks_identically() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.bin");
    let metadata_path = dir.path().join("metadata.json");

    build_artifacts(&write_corpus(&dir), &index_path, &metadata_path).unwrap();
    let first = VectorIndex::load(&index_path).unwrap();

    // Persist the loaded copy again and reload: rankings stay bit-identical.
    let second_path = dir.path().join("index-copy.bin");
    first.persist(&second_path).unwrap();
    let second = VectorIndex::load(&second_path).unwrap();

    for query in [
        [1.0_f32, 0.0],
        [0.0, 1.0],
        [0.5, 0.5],
        [0.95, 0.05],
        [-1.0, 2.0],
    ] {
        let a = first.search(&query, 3).unwrap();
        let b = second.search(&query, 3).unwrap();
        assert_eq!(a, b);
    }
}

#[tokio::test]
async fn misaligned_metadata_never_fails_a_request() {
    let dir = tempfile::tempdir().unwrap();
    let index_path = dir.path().join("index.bin");
    let metadata_path = dir.path().join("metadata.json");

    build_artifacts(&write_corpus(&dir), &index_path, &metadata_path).unwrap();
    let index = VectorIndex::load(&index_path).unwrap();

    // Truncated metadata simulates a corpus whose artifacts drifted apart.
    let store = MetadataStore::load(&metadata_path).unwrap();
    assert_eq!(store.len(), 3);
    let truncated = MetadataStore::from_records(
        (0..1).filter_map(|i| store.get(i).cloned()).collect(),
    );

    let embedder = StubEmbedder(vec![1.0, 0.0]);
    let response = query::answer("anything", &embedder, &index, &truncated, 3)
        .await
        .unwrap();

    // Positions 1 and 2 have no record and are dropped, not errors.
    assert_eq!(response.links.len(), 1);
    assert_eq!(response.links[0].url, "a");
}
