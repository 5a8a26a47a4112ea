//! Test utilities for ebb-core
//!
//! A mock Google Sheets server implementing the token exchange and the two
//! values endpoints the sink uses (`:clear` and update). Requests are
//! recorded so tests can assert on what was written.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Form, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Access token issued by the mock token endpoint
pub const MOCK_ACCESS_TOKEN: &str = "mock-access-token";

/// Spreadsheet ID the mock server knows about
pub const MOCK_SPREADSHEET_ID: &str = "mock-spreadsheet";

/// A values request received by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub spreadsheet_id: String,
    /// Decoded range path segment, `:clear` suffix included
    pub range: String,
    pub value_input_option: Option<String>,
    pub body: Value,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    assertions: Mutex<Vec<String>>,
    written: Mutex<HashMap<String, Value>>,
    failing_updates: AtomicU32,
}

/// Mock Sheets server for testing
pub struct MockSheetsServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockSheetsServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/token", post(handle_token))
            .route(
                "/v4/spreadsheets/:id/values/:range",
                put(handle_update).post(handle_clear),
            )
            .with_state(state.clone());

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
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL of the server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Value for the sink's API base
    pub fn api_base(&self) -> String {
        format!("{}/v4", self.url())
    }

    /// Value for a service-account key's `token_uri`
    pub fn token_uri(&self) -> String {
        format!("{}/token", self.url())
    }

    pub fn spreadsheet_id(&self) -> &'static str {
        MOCK_SPREADSHEET_ID
    }

    /// Values requests received so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// JWT assertions presented to the token endpoint
    pub fn assertions(&self) -> Vec<String> {
        self.state.assertions.lock().unwrap().clone()
    }

    /// Values last written to `range`
    pub fn written(&self, range: &str) -> Option<Value> {
        self.state.written.lock().unwrap().get(range).cloned()
    }

    /// Answer the next `n` update requests with 503
    pub fn fail_next_updates(&self, n: u32) {
        self.state.failing_updates.store(n, Ordering::SeqCst);
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockSheetsServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn api_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": message,
                "status": status.canonical_reason().unwrap_or("ERROR"),
            }
        })),
    )
        .into_response()
}

/// Reject requests without the mock bearer token or for unknown sheets
fn check_request(headers: &HeaderMap, spreadsheet_id: &str) -> Option<Response> {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", MOCK_ACCESS_TOKEN))
        .unwrap_or(false);
    if !authorized {
        return Some(api_error(
            StatusCode::UNAUTHORIZED,
            "Request had invalid authentication credentials.",
        ));
    }
    if spreadsheet_id != MOCK_SPREADSHEET_ID {
        return Some(api_error(
            StatusCode::NOT_FOUND,
            "Requested entity was not found.",
        ));
    }
    None
}

/// OAuth token endpoint (JWT bearer grant)
async fn handle_token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let grant_ok = form.get("grant_type").map(String::as_str)
        == Some("urn:ietf:params:oauth:grant-type:jwt-bearer");
    let Some(assertion) = form.get("assertion").filter(|a| !a.is_empty() && grant_ok) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response();
    };
    state.assertions.lock().unwrap().push(assertion.clone());

    Json(json!({
        "access_token": MOCK_ACCESS_TOKEN,
        "expires_in": 3600,
        "token_type": "Bearer",
    }))
    .into_response()
}

/// `POST .../values/{range}:clear`
async fn handle_clear(
    State(state): State<Arc<MockState>>,
    Path((id, range)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = check_request(&headers, &id) {
        return rejection;
    }
    let Some(cleared) = range.strip_suffix(":clear") else {
        return api_error(StatusCode::NOT_FOUND, "Unknown method");
    };

    state
        .written
        .lock()
        .unwrap()
        .retain(|written, _| !written.starts_with(cleared));
    state.requests.lock().unwrap().push(RecordedRequest {
        method: "POST".into(),
        spreadsheet_id: id.clone(),
        range: range.clone(),
        value_input_option: None,
        body,
    });

    Json(json!({ "spreadsheetId": id, "clearedRange": cleared })).into_response()
}

/// `PUT .../values/{range}?valueInputOption=...`
async fn handle_update(
    State(state): State<Arc<MockState>>,
    Path((id, range)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = check_request(&headers, &id) {
        return rejection;
    }
    let failing = state.failing_updates.load(Ordering::SeqCst);
    if failing > 0 {
        state.failing_updates.store(failing - 1, Ordering::SeqCst);
        return api_error(StatusCode::SERVICE_UNAVAILABLE, "The service is currently unavailable.");
    }

    let rows = body["values"].as_array().map(|v| v.len()).unwrap_or(0);
    state
        .written
        .lock()
        .unwrap()
        .insert(range.clone(), body["values"].clone());
    state.requests.lock().unwrap().push(RecordedRequest {
        method: "PUT".into(),
        spreadsheet_id: id.clone(),
        range: range.clone(),
        value_input_option: query.get("valueInputOption").cloned(),
        body,
    });

    Json(json!({
        "spreadsheetId": id,
        "updatedRange": range,
        "updatedRows": rows,
    }))
    .into_response()
}
