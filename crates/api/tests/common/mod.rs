#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use syncup_api::config::{CalendarConfig, MattermostConfig, OpenProjectConfig, ServerConfig};
use syncup_api::router::build_app_router;
use syncup_api::state::{AppState, ChatFeeds};
use syncup_store::{MemoryStore, StoreConfig, Workspace};

/// Address nothing listens on; requests to it fail at connect time.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

/// Build a test `ServerConfig` pointing every upstream at the given URLs.
pub fn test_config(
    openproject_url: &str,
    mattermost_url: &str,
    calendar_url: &str,
) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        upstream_timeout_secs: 5,
        openproject: OpenProjectConfig {
            base_url: openproject_url.to_string(),
            token: "op-secret".to_string(),
        },
        mattermost: MattermostConfig {
            api_url: mattermost_url.to_string(),
            token: "mm-token".to_string(),
            watch_channels: Vec::new(),
            poll_interval_secs: 5,
        },
        calendar: CalendarConfig {
            google_client_id: Some("client-123.apps.googleusercontent.com".to_string()),
            api_url: calendar_url.to_string(),
        },
        store: StoreConfig::default(),
    }
}

/// Build the full application router over an in-memory workspace with no
/// reachable upstreams.
pub fn build_test_app() -> Router {
    build_test_app_with(test_config(UNREACHABLE, UNREACHABLE, UNREACHABLE), ChatFeeds::new())
}

/// Build the full application router over an in-memory workspace.
///
/// Goes through the same [`build_app_router`] as `main.rs`, so tests exercise
/// the production middleware stack.
pub fn build_test_app_with(config: ServerConfig, feeds: ChatFeeds) -> Router {
    let workspace = Workspace::open(Arc::new(MemoryStore::new()), &config.store);
    let state = AppState::new(config.clone(), workspace)
        .unwrap()
        .with_chat_feeds(feeds);
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send_empty(app: Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Mock upstream
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub authorization: Option<String>,
    pub body: Value,
}

type Responder = Arc<dyn Fn(&Recorded) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
pub struct Mock {
    requests: Arc<Mutex<Vec<Recorded>>>,
    respond: Responder,
}

impl Mock {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(mock): State<Mock>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let recorded = Recorded {
        method,
        uri: uri.to_string(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    let (status, text) = (mock.respond)(&recorded);
    mock.requests.lock().unwrap().push(recorded);
    (status, [("content-type", "application/json")], text)
}

/// Start an upstream stand-in answering every request through `respond`.
pub async fn spawn_mock(
    respond: impl Fn(&Recorded) -> (StatusCode, String) + Send + Sync + 'static,
) -> (String, Mock) {
    let mock = Mock {
        requests: Arc::default(),
        respond: Arc::new(respond),
    };
    let app = Router::new().fallback(record).with_state(mock.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), mock)
}
