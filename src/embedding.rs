use crate::config::Settings;
use crate::errors::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Narrow seam over the external embedding model.
///
/// The retrieval core only ever sees `embed(text) -> vector`, so tests can
/// substitute deterministic vectors and the service can swap model servers
/// without touching the pipeline.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// HTTP client for an Ollama-style embedding server.
///
/// Calls are blocking with a global timeout and run on the blocking pool.
/// Failures are not retried here: an embedding failure is a per-request
/// error and propagates as such.
#[derive(Debug, Clone)]
pub struct RemoteEmbedder {
    endpoint: String,
    model: String,
    agent: ureq::Agent,
}

impl RemoteEmbedder {
    pub fn new(settings: &Settings) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(settings.embed_timeout_secs)))
            .build()
            .into();

        Self {
            endpoint: embed_endpoint(&settings.embed_url),
            model: settings.embed_model.clone(),
            agent,
        }
    }

    fn embed_blocking(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let request = EmbedRequest {
            model: &self.model,
            prompt: text,
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        let response_text = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;

        let response: EmbedResponse = serde_json::from_str(&response_text)
            .map_err(|e| RetrievalError::Embedding(format!("invalid embedding response: {e}")))?;

        debug!(
            dimensions = response.embedding.len(),
            "received embedding from {}", self.endpoint
        );
        Ok(response.embedding)
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let client = self.clone();
        let prompt = text.to_string();
        tokio::task::spawn_blocking(move || client.embed_blocking(&prompt))
            .await
            .map_err(|e| RetrievalError::Embedding(format!("embedding task failed: {e}")))?
    }
}

fn embed_endpoint(base_url: &str) -> String {
    format!("{}/api/embed", base_url.trim_end_matches('/'))
}
