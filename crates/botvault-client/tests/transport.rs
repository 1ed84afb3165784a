//! Transport tests against a fake Ollama server.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use botvault_client::{ClientConfig, OllamaClient};
use botvault_core::{
    CancellationToken, ChatError, ChatRequest, ChatSession, ChatSettings, ChatTransportPort,
    FinalizedResponse, MarkdownRenderer, Message, MessageRole, Outcome, ResponseView, StreamEvent,
};

#[derive(Clone, Copy)]
enum Behavior {
    Stream,
    Hang,
    NotFound,
    ServerError,
    Slow,
    StallAfterFirst,
    ErrorRecord,
}

#[derive(Clone)]
struct FakeOllama {
    behavior: Behavior,
    last_body: Arc<Mutex<Option<Value>>>,
}

const RECORDS: [&str; 3] = [
    "{\"message\":{\"role\":\"assistant\",\"content\":\"Hello\"},\"done\":false}\n",
    "{\"message\":{\"role\":\"assistant\",\"content\":\", world\"},\"done\":false}\n",
    "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true,\"eval_count\":2,\"eval_duration\":1000000000}\n",
];

async fn chat(State(fake): State<FakeOllama>, body: String) -> Response {
    *fake.last_body.lock().unwrap() = serde_json::from_str(&body).ok();

    match fake.behavior {
        Behavior::Stream => {
            // Split records mid-line to exercise reassembly.
            let joined = RECORDS.concat();
            let (a, b) = joined.split_at(30);
            let parts: Vec<Result<Bytes, Infallible>> = vec![
                Ok(Bytes::copy_from_slice(a.as_bytes())),
                Ok(Bytes::copy_from_slice(b.as_bytes())),
            ];
            Body::from_stream(stream::iter(parts)).into_response()
        }
        Behavior::StallAfterFirst => {
            let first = stream::iter(vec![Ok::<_, Infallible>(Bytes::from_static(
                RECORDS[0].as_bytes(),
            ))]);
            Body::from_stream(first.chain(stream::pending())).into_response()
        }
        Behavior::ErrorRecord => {
            let body = [
                "{\"message\":{\"role\":\"assistant\",\"content\":\"a\"},\"done\":false}\n",
                "{\"error\":\"oops\"}\n",
                "{\"message\":{\"role\":\"assistant\",\"content\":\"b\"},\"done\":false}\n",
                RECORDS[2],
            ]
            .concat();
            body.into_response()
        }
        Behavior::NotFound => (
            StatusCode::NOT_FOUND,
            "{\"error\":\"model 'missing' not found\"}",
        )
            .into_response(),
        Behavior::ServerError => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        Behavior::Slow => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            RECORDS[2].into_response()
        }
        Behavior::Hang => std::future::pending().await,
    }
}

async fn tags() -> impl IntoResponse {
    axum::Json(json!({
        "models": [
            {"name": "gemma3:4b", "size": 3_300_000_000_u64, "modified_at": "2025-01-01T00:00:00Z"},
            {"name": "llama3.2:latest"}
        ]
    }))
}

async fn spawn_fake(behavior: Behavior) -> (String, FakeOllama) {
    let fake = FakeOllama {
        behavior,
        last_body: Arc::new(Mutex::new(None)),
    };
    let app = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/tags", get(tags))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), fake)
}

fn client(base_url: &str, timeout: Duration) -> OllamaClient {
    OllamaClient::new(ClientConfig {
        base_url: base_url.to_string(),
        request_timeout: timeout,
    })
    .unwrap()
}

fn request(model: &str) -> ChatRequest {
    let mut settings = ChatSettings::with_defaults();
    settings.model = model.to_string();
    ChatRequest::from_settings(&settings, vec![Message::new(MessageRole::User, "Hi")])
}

#[tokio::test]
async fn streams_deltas_and_done() {
    let (url, fake) = spawn_fake(Behavior::Stream).await;
    let client = client(&url, Duration::from_secs(5));

    let events: Vec<_> = client
        .send_chat(&request("gemma3:4b"), &CancellationToken::new())
        .await
        .unwrap()
        .collect()
        .await;

    let text: String = events
        .iter()
        .filter_map(|e| match e {
            Ok(StreamEvent::ContentDelta(t)) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Hello, world");

    let Some(Ok(StreamEvent::Done(metrics))) = events.last() else {
        panic!("expected a terminal done event, got {events:?}");
    };
    assert_eq!(metrics.eval_count, Some(2));
    assert_eq!(metrics.tokens_per_second(), Some(2.0));

    let body = fake.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "gemma3:4b");
    assert_eq!(body["stream"], true);
    assert_eq!(body["keep_alive"], "10m");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Hi");
    assert!(body["messages"][0].get("images").is_none());
}

#[tokio::test]
async fn not_found_is_model_not_found() {
    let (url, _) = spawn_fake(Behavior::NotFound).await;
    let err = client(&url, Duration::from_secs(5))
        .send_chat(&request("missing"), &CancellationToken::new())
        .await
        .err()
        .unwrap();
    assert_eq!(
        err,
        ChatError::ModelNotFound {
            model: "missing".to_string()
        }
    );
}

#[tokio::test]
async fn server_error_is_http_status() {
    let (url, _) = spawn_fake(Behavior::ServerError).await;
    let err = client(&url, Duration::from_secs(5))
        .send_chat(&request("gemma3:4b"), &CancellationToken::new())
        .await
        .err()
        .unwrap();
    assert_eq!(err, ChatError::Http { status: 500 });
}

#[tokio::test]
async fn slow_headers_time_out() {
    let (url, _) = spawn_fake(Behavior::Slow).await;
    let err = client(&url, Duration::from_millis(100))
        .send_chat(&request("gemma3:4b"), &CancellationToken::new())
        .await
        .err()
        .unwrap();
    assert_eq!(err, ChatError::Timeout);
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"), Duration::from_secs(5))
        .send_chat(&request("gemma3:4b"), &CancellationToken::new())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ChatError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn cancel_before_headers_returns_cancelled() {
    let (url, _) = spawn_fake(Behavior::Hang).await;
    let client = client(&url, Duration::from_secs(30));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client
        .send_chat(&request("gemma3:4b"), &cancel)
        .await
        .err()
        .unwrap();
    assert_eq!(err, ChatError::Cancelled);
}

#[tokio::test]
async fn cancel_mid_stream_ends_delivery() {
    let (url, _) = spawn_fake(Behavior::StallAfterFirst).await;
    let client = client(&url, Duration::from_secs(5));
    let cancel = CancellationToken::new();

    let mut events = client
        .send_chat(&request("gemma3:4b"), &cancel)
        .await
        .unwrap();
    assert_eq!(
        events.next().await,
        Some(Ok(StreamEvent::ContentDelta("Hello".to_string())))
    );

    cancel.cancel();
    assert_eq!(events.next().await, Some(Err(ChatError::Cancelled)));
    assert_eq!(events.next().await, None);
}

#[tokio::test]
async fn lists_models() {
    let (url, _) = spawn_fake(Behavior::Stream).await;
    let models = client(&url, Duration::from_secs(5))
        .list_models()
        .await
        .unwrap();

    let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["gemma3:4b", "llama3.2:latest"]);
    assert_eq!(models[0].size, Some(3_300_000_000));
    assert_eq!(models[1].modified_at, None);
}

struct Identity;

impl MarkdownRenderer for Identity {
    fn render(&self, markdown: &str) -> String {
        markdown.to_string()
    }
}

#[derive(Default)]
struct LastFinish(Option<FinalizedResponse>);

impl ResponseView for LastFinish {
    fn paint(&mut self, _rendered: &str) {}

    fn finish(&mut self, response: &FinalizedResponse) {
        self.0 = Some(response.clone());
    }
}

#[tokio::test]
async fn error_record_mid_stream_keeps_the_turn() {
    let (url, _) = spawn_fake(Behavior::ErrorRecord).await;
    let mut session = ChatSession::new(
        Arc::new(client(&url, Duration::from_secs(5))),
        Arc::new(Identity),
        ChatSettings::with_defaults(),
    );
    let mut view = LastFinish::default();

    let response = session
        .send(MessageRole::User, "Hi", &mut view)
        .await
        .unwrap();

    assert!(matches!(response.outcome, Outcome::Completed(Some(_))));
    assert_eq!(response.content, "ab");
    assert_eq!(view.0.unwrap().content, "ab");
    let history = session.state().snapshot_history();
    let last = history.last().unwrap();
    assert_eq!(last.role, MessageRole::Assistant);
    assert_eq!(last.content, "ab");
}
