use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl CannedResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn status(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("status code"),
            body,
        }
    }
}

#[derive(Default)]
struct Recorded {
    start_requests: Vec<Value>,
    exchange_requests: Vec<Value>,
}

struct MockState {
    start: CannedResponse,
    exchange: CannedResponse,
    recorded: Mutex<Recorded>,
}

/// In-process stand-in for the `authStart` / `authExchange` cloud functions.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn spawn(start: CannedResponse, exchange: CannedResponse) -> Self {
        let state = Arc::new(MockState {
            start,
            exchange,
            recorded: Mutex::new(Recorded::default()),
        });

        let router = Router::new()
            .route("/authStart", post(auth_start))
            .route("/authExchange", post(auth_exchange))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve mock backend");
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn start_requests(&self) -> Vec<Value> {
        self.state
            .recorded
            .lock()
            .expect("recorded")
            .start_requests
            .clone()
    }

    pub fn exchange_requests(&self) -> Vec<Value> {
        self.state
            .recorded
            .lock()
            .expect("recorded")
            .exchange_requests
            .clone()
    }
}

async fn auth_start(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state
        .recorded
        .lock()
        .expect("recorded")
        .start_requests
        .push(body);
    (state.start.status, Json(state.start.body.clone()))
}

async fn auth_exchange(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state
        .recorded
        .lock()
        .expect("recorded")
        .exchange_requests
        .push(body);
    (state.exchange.status, Json(state.exchange.body.clone()))
}

pub fn start_ok(sid: &str) -> CannedResponse {
    CannedResponse::ok(json!({
        "authorizeUrl": "https://provider/authorize",
        "sid": sid,
    }))
}

/// Poll until `check` holds; panics after a generous deadline.
pub async fn wait_for(mut check: impl FnMut() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}
