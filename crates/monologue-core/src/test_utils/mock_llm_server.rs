// src/test_utils/mock_llm_server.rs
use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone)]
struct MockServerState {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockServerState {
    fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

async fn chat_completions_handler(
    axum::extract::State(state): axum::extract::State<MockServerState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    log::debug!("Mock LLM server received request: {}", payload);
    state.requests.lock().unwrap().push(payload);

    let next = state.responses.lock().unwrap().pop_front();
    match next {
        Some(Ok(content)) => (
            StatusCode::OK,
            Json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }]
            })),
        ),
        Some(Err(message)) => {
            log::error!("Mock LLM server simulating an error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": {"message": message}})),
            )
        }
        None => {
            log::error!("Mock LLM server ran out of responses!");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": {"message": "no responses configured"}})),
            )
        }
    }
}

/// Chat-completions endpoint on a random local port, answering from a queue.
pub struct MockLLMServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    pub recorded_requests: Arc<Mutex<Vec<Value>>>,
}

impl MockLLMServer {
    pub async fn start(responses: Vec<Result<String, String>>) -> Self {
        let state = MockServerState::new(responses);
        let recorded_requests_clone = state.requests.clone();

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        log::info!("Mock LLM server listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| {
                    log::error!("Mock LLM server error: {}", e);
                });
        });

        MockLLMServer {
            addr,
            shutdown_tx,
            recorded_requests: recorded_requests_clone,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get_requests(&self) -> Vec<Value> {
        self.recorded_requests.lock().unwrap().clone()
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock LLM server shutdown signal already sent or receiver dropped.");
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }
}
