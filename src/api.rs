use crate::config::Settings;
use crate::embedding::{Embedder, RemoteEmbedder};
use crate::errors::RetrievalError;
use crate::index::VectorIndex;
use crate::metadata::MetadataStore;
use crate::model::QuestionRequest;
use crate::query;
use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    serve, Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

#[derive(Clone)]
struct AppState {
    index: Arc<VectorIndex>,
    store: Arc<MetadataStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

// POST /api/ (delegates to query::answer)
async fn answer_question(
    State(state): State<AppState>,
    Json(req): Json<QuestionRequest>,
) -> Response {
    let request_id = Uuid::new_v4();
    if req.image.is_some() {
        tracing::debug!(%request_id, "image payload present but unused");
    }

    match query::answer(
        &req.question,
        state.embedder.as_ref(),
        &state.index,
        &state.store,
        state.top_k,
    )
    .await
    {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => {
            tracing::error!(%request_id, error = %e, "failed to answer question");
            let status = match e {
                RetrievalError::Embedding(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, format!("Answer failed: {e}")).into_response()
        }
    }
}

// GET / - service banner
async fn root() -> impl IntoResponse {
    Json(serde_json::json!({"message": "corpus-qa retrieval service"}))
}

// GET /health - Health check
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "healthy"}))
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/", post(answer_question))
        .route("/", get(root))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Load the corpus artifacts and serve the question-answering API.
///
/// Startup is all-or-nothing: a missing or corrupt artifact aborts before
/// the listener binds, so a partially initialized service never accepts
/// traffic. After that the index and store are shared read-only state.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let index = VectorIndex::load(&settings.index_path)
        .context("startup aborted: vector index unavailable")?;
    let store = MetadataStore::load(&settings.metadata_path)
        .context("startup aborted: metadata store unavailable")?;

    if index.len() != store.len() {
        let mismatch = RetrievalError::CorpusMisalignment {
            index_len: index.len(),
            metadata_len: store.len(),
        };
        if settings.strict_alignment {
            anyhow::bail!("startup aborted: {mismatch}");
        }
        tracing::warn!("{mismatch}; out-of-range positions will be dropped from results");
    }

    tracing::info!(
        vectors = index.len(),
        dim = index.dim(),
        built_at = %index.built_at(),
        "vector index loaded"
    );

    let state = AppState {
        index: Arc::new(index),
        store: Arc::new(store),
        embedder: Arc::new(RemoteEmbedder::new(&settings)),
        top_k: settings.top_k,
    };
    let app = router(state);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("API listening on {}", settings.bind_addr);
    serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataRecord;
    use crate::model::AnswerResponse;
    use async_trait::async_trait;

    struct StubEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
            Ok(self.0.clone())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
            Err(RetrievalError::Embedding("connection refused".into()))
        }
    }

    fn test_state(embedder: Arc<dyn Embedder>) -> AppState {
        let index = VectorIndex::build(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.9, 0.1],
        ])
        .unwrap();
        let store = MetadataStore::from_records(
            ["a", "b", "c"]
                .iter()
                .map(|url| MetadataRecord {
                    url: url.to_string(),
                    text: None,
                    extra: serde_json::Map::new(),
                })
                .collect(),
        );
        AppState {
            index: Arc::new(index),
            store: Arc::new(store),
            embedder,
            top_k: 2,
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn handler_answers_with_ranked_links() {
        let state = test_state(Arc::new(StubEmbedder(vec![1.0, 0.0])));
        let request = QuestionRequest {
            question: "where do I look?".to_string(),
            image: None,
        };

        let response = answer_question(State(state), Json(request)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: AnswerResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert!(body.answer.contains("where do I look?"));
        let urls: Vec<&str> = body.links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn handler_accepts_unused_image_field() {
        let state = test_state(Arc::new(StubEmbedder(vec![0.0, 1.0])));
        let request = QuestionRequest {
            question: "anything".to_string(),
            image: Some("base64-payload".to_string()),
        };

        let response = answer_question(State(state), Json(request)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn embedding_failure_maps_to_bad_gateway() {
        let state = test_state(Arc::new(FailingEmbedder));
        let request = QuestionRequest {
            question: "anything".to_string(),
            image: None,
        };

        let response = answer_question(State(state), Json(request)).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }
}
