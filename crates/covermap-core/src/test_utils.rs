//! Test utilities for covermap-core
//!
//! Provides a mock language-model server speaking both the OpenAI chat
//! completions API and the Ollama generate API, for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Canned advice returned by the mock server
pub const MOCK_ADVICE_TEXT: &str = "You have dependants and a modest liability limit, \
so income replacement and liability are the main areas to review.\n\
- Ask about term life coverage sized to about ten times your income.\n\
- Compare your auto liability limit with the commonly recommended $2M.\n\
- Review tenant insurance for contents and personal liability.";

#[derive(Clone)]
struct MockState {
    failing: bool,
    last_request: Arc<Mutex<Option<Value>>>,
}

/// Mock language-model server for testing
pub struct MockLlmServer {
    addr: SocketAddr,
    last_request: Arc<Mutex<Option<Value>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockLlmServer {
    /// Start a server that answers every completion with [`MOCK_ADVICE_TEXT`]
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Start a server that answers every request with HTTP 500
    pub async fn start_failing() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(failing: bool) -> Self {
        let last_request = Arc::new(Mutex::new(None));
        let state = MockState {
            failing,
            last_request: last_request.clone(),
        };

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat_completions))
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            last_request,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Body of the most recent completion request
    pub fn last_request(&self) -> Option<Value> {
        self.last_request.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockLlmServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": {"message": "mock failure"}})),
    )
        .into_response()
}

async fn handle_models(State(state): State<MockState>) -> Response {
    if state.failing {
        return server_error();
    }
    Json(json!({"object": "list", "data": [{"id": "gpt-4o-mini", "object": "model"}]}))
        .into_response()
}

async fn handle_chat_completions(
    State(state): State<MockState>,
    Json(request): Json<Value>,
) -> Response {
    *state.last_request.lock().unwrap() = Some(request.clone());
    if state.failing {
        return server_error();
    }

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": request["model"],
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": MOCK_ADVICE_TEXT},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

async fn handle_tags(State(state): State<MockState>) -> Response {
    if state.failing {
        return server_error();
    }
    Json(json!({"models": [{"name": "llama3.2:latest"}]})).into_response()
}

async fn handle_generate(State(state): State<MockState>, Json(request): Json<Value>) -> Response {
    *state.last_request.lock().unwrap() = Some(request.clone());
    if state.failing {
        return server_error();
    }

    Json(json!({
        "model": request["model"],
        "response": MOCK_ADVICE_TEXT,
        "done": true
    }))
    .into_response()
}
