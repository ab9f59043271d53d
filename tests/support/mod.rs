//! Mock control endpoint for integration tests.
//!
//! Implements the runtime interface contract the client depends on:
//! `GET /{version}/runtime/invocation/next`, the two outcome posts, and the
//! init error post. Invocations are queued by the test and served in order;
//! every report is recorded for assertions.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

const HEADER_REQUEST_ID: &str = "lambda-runtime-aws-request-id";
const HEADER_DEADLINE_MS: &str = "lambda-runtime-deadline-ms";
const HEADER_ERROR_TYPE: &str = "lambda-runtime-function-error-type";

/// One invocation waiting to be served by `next`.
pub struct QueuedInvocation {
    pub request_id: String,
    pub payload: Vec<u8>,
    pub deadline_ms: Option<u64>,
}

/// A report the runtime posted back.
#[derive(Debug, Clone)]
pub enum Report {
    Success {
        request_id: String,
        payload: Vec<u8>,
    },
    Failure {
        request_id: String,
        kind: String,
    },
    InitError {
        kind: String,
        message: String,
    },
}

impl Report {
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Report::Success { request_id, .. } | Report::Failure { request_id, .. } => {
                Some(request_id)
            }
            Report::InitError { .. } => None,
        }
    }
}

#[derive(Default)]
struct MockState {
    queue: Mutex<VecDeque<QueuedInvocation>>,
    reports: Mutex<Vec<Report>>,
    unavailable_fetches: AtomicU32,
    malformed_next: AtomicBool,
    reject_reports: AtomicBool,
}

/// Test double for the control endpoint.
pub struct MockEndpoint {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockEndpoint {
    /// Starts the mock on an ephemeral port.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/2018-06-01/runtime/invocation/next", get(next))
            .route(
                "/2018-06-01/runtime/invocation/:id/response",
                post(report_success),
            )
            .route(
                "/2018-06-01/runtime/invocation/:id/error",
                post(report_failure),
            )
            .route("/2018-06-01/runtime/init/error", post(report_init_error))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    /// Returns the `host:port` address for `RuntimeConfig::endpoint`.
    pub fn endpoint(&self) -> String {
        self.addr.to_string()
    }

    /// Queues an invocation to be served by the next fetch.
    pub fn enqueue(&self, request_id: &str, payload: &[u8], deadline_ms: Option<u64>) {
        self.state.queue.lock().unwrap().push_back(QueuedInvocation {
            request_id: request_id.to_string(),
            payload: payload.to_vec(),
            deadline_ms,
        });
    }

    /// Makes the next `n` fetches fail with 503 before serving the queue.
    pub fn fail_next_fetches(&self, n: u32) {
        self.state.unavailable_fetches.store(n, Ordering::SeqCst);
    }

    /// Makes every fetch return 200 without the required protocol headers.
    pub fn serve_malformed_next(&self) {
        self.state.malformed_next.store(true, Ordering::SeqCst);
    }

    /// Makes every outcome post be rejected with 410.
    pub fn reject_reports(&self) {
        self.state.reject_reports.store(true, Ordering::SeqCst);
    }

    /// Snapshot of everything reported so far.
    pub fn reports(&self) -> Vec<Report> {
        self.state.reports.lock().unwrap().clone()
    }

    /// Waits until `n` reports have arrived, panicking after `timeout`.
    pub async fn wait_for_reports(&self, n: usize, timeout: Duration) -> Vec<Report> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let reports = self.reports();
            if reports.len() >= n {
                return reports;
            }
            if tokio::time::Instant::now() >= deadline {
                panic!("expected {n} reports, got {} within {timeout:?}", reports.len());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

async fn next(State(state): State<Arc<MockState>>) -> Response {
    let failed = state
        .unavailable_fetches
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_sub(1));
    if failed.is_ok() {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    if state.malformed_next.load(Ordering::SeqCst) {
        return (StatusCode::OK, Vec::<u8>::new()).into_response();
    }

    // Long-poll: wait until the test enqueues something.
    loop {
        let queued = state.queue.lock().unwrap().pop_front();
        if let Some(q) = queued {
            let mut headers = HeaderMap::new();
            headers.insert(
                HEADER_REQUEST_ID,
                HeaderValue::from_str(&q.request_id).unwrap(),
            );
            if let Some(ms) = q.deadline_ms {
                headers.insert(
                    HEADER_DEADLINE_MS,
                    HeaderValue::from_str(&ms.to_string()).unwrap(),
                );
            }
            return (StatusCode::OK, headers, q.payload).into_response();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn report_success(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    if state.reject_reports.load(Ordering::SeqCst) {
        return StatusCode::GONE.into_response();
    }
    state.reports.lock().unwrap().push(Report::Success {
        request_id: id,
        payload: body.to_vec(),
    });
    StatusCode::ACCEPTED.into_response()
}

async fn report_failure(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    _body: Bytes,
) -> Response {
    if state.reject_reports.load(Ordering::SeqCst) {
        return StatusCode::GONE.into_response();
    }
    let kind = headers
        .get(HEADER_ERROR_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    state
        .reports
        .lock()
        .unwrap()
        .push(Report::Failure { request_id: id, kind });
    StatusCode::ACCEPTED.into_response()
}

async fn report_init_error(State(state): State<Arc<MockState>>, body: Bytes) -> Response {
    let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
    state.reports.lock().unwrap().push(Report::InitError {
        kind: parsed["errorType"].as_str().unwrap_or("unknown").to_string(),
        message: parsed["errorMessage"].as_str().unwrap_or("").to_string(),
    });
    StatusCode::ACCEPTED.into_response()
}
