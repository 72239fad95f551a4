#![allow(dead_code)]
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::{Json, Router};
use databricks_mcp::config::{Config, Credentials, Settings};
use rmcp::model::CallToolResult;
use serde_json::{json, Value};

pub const WAREHOUSE_ID: &str = "wh-test";
pub const TOKEN: &str = "dapi-test-token";

/// One request as seen by the fake workspace.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Clone, Default)]
struct FakeState {
    // responses are served in order; the last one repeats
    routes: Arc<Mutex<HashMap<(Method, String), Vec<(StatusCode, Value)>>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

/// In-process stand-in for a Databricks workspace.
#[derive(Default)]
pub struct FakeDatabricks {
    state: FakeState,
    pub base_url: String,
}

impl FakeDatabricks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, method: Method, path: &str, status: StatusCode, body: Value) -> Self {
        self.state
            .routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push((status, body));
        self
    }

    pub async fn start(mut self) -> Self {
        let app = Router::new()
            .fallback(handle)
            .with_state(self.state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        self.base_url = format!("http://{}", addr);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn config(&self, settings: Settings) -> Config {
        Config {
            settings,
            credentials: Ok(Credentials {
                host: self.base_url.clone(),
                http_path: format!("/sql/1.0/warehouses/{}", WAREHOUSE_ID),
                token: TOKEN.to_string(),
            }),
        }
    }
}

async fn handle(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let mut routes = state.routes.lock().unwrap();
    match routes.get_mut(&(method, uri.path().to_string())) {
        Some(queue) if queue.len() > 1 => {
            let (status, body) = queue.remove(0);
            (status, Json(body))
        }
        Some(queue) if !queue.is_empty() => {
            let (status, body) = queue[0].clone();
            (status, Json(body))
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error_code": "ENDPOINT_NOT_FOUND", "message": "no route"})),
        ),
    }
}

/// Settings with a short poll interval so polling tests stay fast.
pub fn fast_settings() -> Settings {
    Settings {
        poll_interval_ms: 10,
        ..Settings::default()
    }
}

pub fn unconfigured() -> Config {
    Config {
        settings: fast_settings(),
        credentials: Err(
            "missing required environment variable(s): DATABRICKS_HOST, DATABRICKS_HTTP_PATH, DATABRICKS_TOKEN"
                .to_string(),
        ),
    }
}

pub fn succeeded_statement(id: &str, columns: &[&str], rows: Value) -> Value {
    let columns: Vec<Value> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| json!({"name": name, "type_name": "STRING", "position": i}))
        .collect();
    json!({
        "statement_id": id,
        "status": {"state": "SUCCEEDED"},
        "manifest": {"schema": {"column_count": columns.len(), "columns": columns}},
        "result": {"chunk_index": 0, "row_offset": 0, "data_array": rows}
    })
}

pub fn text_of(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.raw.as_text().map(|t| t.text.clone()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error == Some(true)
}
