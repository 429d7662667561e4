//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use till_core::cache::LocalCache;
use till_core::clock::Clock;
use till_core::document::DocumentStore;
use till_store::memory_cache::InMemoryCache;
use till_test_support::{FixedClock, at};
use tower::ServiceExt;

use till_api::config::ReportingZone;
use till_api::routes;
use till_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(at(2024, 3, 15, 10, 0, 0)))
}

/// Build application state over `store` with live views started, a fixed
/// clock and a UTC reporting zone.
pub fn build_test_state(store: Arc<dyn DocumentStore>) -> AppState {
    let cache: Arc<dyn LocalCache> = Arc::new(InMemoryCache::new());
    let state = AppState::new(
        fixed_clock(),
        store,
        &cache,
        50,
        ReportingZone::Named(chrono_tz::UTC),
    );
    state.start_views();
    state
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    routes::app_router().with_state(state)
}

/// Send a request with an optional JSON body and return the response.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

/// Poll `uri` until `ready` accepts the body, giving up after one second.
pub async fn eventually(
    state: &AppState,
    uri: &str,
    ready: impl Fn(&serde_json::Value) -> bool,
) -> serde_json::Value {
    let mut last = serde_json::Value::Null;
    for _ in 0..100 {
        let (_, json) = get_json(build_test_app(state.clone()), uri).await;
        if ready(&json) {
            return json;
        }
        last = json;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{uri} never became ready, last body: {last}");
}
