//! In-process stand-in for the REST backends used by the tests.
//!
//! A stub is an ordinary axum router bound to an ephemeral port; every request
//! it receives is recorded so tests can assert on exactly what was sent.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<serde_json::Value>,
}

pub struct StubBackend {
    pub base_url: String,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubBackend {
    pub async fn spawn(router: Router) -> Self {
        let log: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();
        let recorder = log.clone();

        let app = router.layer(middleware::from_fn(move |request: Request<Body>, next: Next| {
            let recorder = recorder.clone();
            async move { record(recorder, request, next).await }
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            log,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn total(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

async fn record(
    log: Arc<Mutex<Vec<RecordedRequest>>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap_or_default();

    log.lock().unwrap().push(RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        authorization: parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&bytes).ok(),
    });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
