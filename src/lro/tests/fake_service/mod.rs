// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Scripted responses for the fake management service.
///
/// `operation` backs `GET /operation` (an operation status resource),
/// `resource` backs `GET /resource` (the resource itself). Handlers count
/// hits so tests can assert which URLs were polled, and how often. Requests
/// carrying a `testCustomField` header get it reflected into the response
/// headers, as management endpoints do for unknown `x-ms-*` style headers.
#[derive(Default)]
pub struct ServerState {
    pub operation: VecDeque<(StatusCode, String)>,
    pub resource: VecDeque<(StatusCode, String)>,
    pub operation_hits: usize,
    pub resource_hits: usize,
}

pub type SharedServerState = Arc<Mutex<ServerState>>;

pub async fn start(
    initial_state: ServerState,
) -> Result<(String, SharedServerState, JoinHandle<()>)> {
    let state = Arc::new(Mutex::new(initial_state));
    let app = axum::Router::new()
        .route("/operation", axum::routing::get(operation_handler))
        .route("/resource", axum::routing::get(resource_handler))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async {
        axum::serve(listener, app).await.unwrap();
    });

    Ok((
        format!("http://{}:{}", addr.ip(), addr.port()),
        state,
        server,
    ))
}

async fn operation_handler(
    State(state): State<SharedServerState>,
    request_headers: HeaderMap,
) -> (StatusCode, HeaderMap, String) {
    let mut state = state.lock().expect("shared state is poisoned");
    state.operation_hits += 1;
    let (status, body) = state.operation.pop_front().unwrap_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "exhausted operation responses".to_string(),
        )
    });
    (status, reflected_headers(&request_headers), body)
}

async fn resource_handler(
    State(state): State<SharedServerState>,
    request_headers: HeaderMap,
) -> (StatusCode, HeaderMap, String) {
    let mut state = state.lock().expect("shared state is poisoned");
    state.resource_hits += 1;
    let (status, body) = state.resource.pop_front().unwrap_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "exhausted resource responses".to_string(),
        )
    });
    (status, reflected_headers(&request_headers), body)
}

fn reflected_headers(request: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(value) = request.get("testcustomfield") {
        headers.insert("testcustomfield", value.clone());
    }
    headers
}
