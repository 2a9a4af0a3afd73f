//! Test helpers for the HTTP integration tests.
//!
//! Provides an in-process router, a request helper, and callback
//! receivers served on ephemeral ports.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceExt;

use chat_broadcast_server::{router, AppState, Broadcaster, ChatRoomStore, HttpNotifier};

/// Default timeout for waiting on callbacks.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a router backed by a fresh store, plus its broadcaster for stats.
pub fn test_app(callback_timeout: Duration) -> (Router, Broadcaster) {
    let notifier = HttpNotifier::new(callback_timeout).expect("Failed to build notifier");
    let broadcaster = Broadcaster::new(Arc::new(notifier), callback_timeout);
    let store = ChatRoomStore::spawn(broadcaster.clone());
    (router(AppState::new(Arc::new(store))), broadcaster)
}

/// Send a request and return status and body text.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    (status, String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse a body as JSON.
pub fn body_json(body: &str) -> Value {
    serde_json::from_str(body).expect("Body is not JSON")
}

/// Serve a callback endpoint answering `status`; returns its URL and the
/// messages it receives.
pub async fn spawn_receiver_with_status(
    status: StatusCode,
) -> (String, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new().route(
        "/inbox",
        post(move |Json(body): Json<Value>| {
            let tx = tx.clone();
            async move {
                let message = body["message"].as_str().unwrap_or_default().to_string();
                let _ = tx.send(message);
                status
            }
        }),
    );

    (serve(app).await, rx)
}

/// Serve a callback endpoint that acknowledges every message.
pub async fn spawn_receiver() -> (String, mpsc::UnboundedReceiver<String>) {
    spawn_receiver_with_status(StatusCode::OK).await
}

/// Serve a callback endpoint that never answers.
pub async fn spawn_hanging_receiver() -> String {
    let app = Router::new().route(
        "/inbox",
        post(|| async { std::future::pending::<StatusCode>().await }),
    );
    serve(app).await
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind receiver");
    let addr = listener.local_addr().expect("Receiver has no address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}/inbox", addr)
}
