use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use voice_preview::conversation::protocol::ToolCall;
use voice_preview::llm::ChatCompletion;
use voice_preview::tools::{ComposioClient, ToolHub, ToolOutput, ToolProvider, ToolRegistry};

#[derive(Clone, Default)]
struct FakeComposio {
    api_keys: Arc<Mutex<Vec<String>>>,
}

impl FakeComposio {
    fn record_key(&self, headers: &HeaderMap) {
        let key = headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        self.api_keys.lock().push(key);
    }
}

async fn tool_info(
    State(state): State<FakeComposio>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    state.record_key(&headers);
    Json(json!({
        "slug": slug,
        "name": "Fetch Notion Data",
        "description": "Fetch Notion data",
        "input_parameters": {
            "type": "object",
            "properties": { "q": { "type": "integer" } }
        }
    }))
}

async fn execute(
    State(state): State<FakeComposio>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record_key(&headers);
    if slug == "BAD" {
        return (StatusCode::BAD_GATEWAY, Json(json!({ "x": 1 }))).into_response();
    }
    Json(json!({
        "data": { "echo": body },
        "error": null,
        "successful": true
    }))
    .into_response()
}

struct Remote {
    hub: ToolHub,
    state: FakeComposio,
    public_dir: PathBuf,
}

impl Drop for Remote {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.public_dir);
    }
}

async fn spawn_remote(name: &str) -> Remote {
    let state = FakeComposio::default();
    let app = Router::new()
        .route("/api/v3/tools/:slug", get(tool_info))
        .route("/api/v3/tools/execute/:slug", post(execute))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let public_dir = std::env::temp_dir().join(format!("voice_preview_remote_{}", name));
    let _ = std::fs::remove_dir_all(&public_dir);
    std::fs::create_dir_all(&public_dir).unwrap();

    let client = ComposioClient::new("key-1", &format!("http://{addr}/"), "u1");
    let hub = ToolHub::new(Arc::new(ToolRegistry::new(public_dir.clone())), Some(client));
    hub.ensure_registered();

    Remote {
        hub,
        state,
        public_dir,
    }
}

#[tokio::test]
async fn remote_schemas_are_fetched_for_non_local_tools() {
    let remote = spawn_remote("schemas").await;
    let slugs = vec![
        "WRITE_FULL_HTML_PREVIEW".to_string(),
        "NOTION_FETCH_DATA".to_string(),
    ];

    let schemas = remote.hub.tools(&slugs).await.unwrap();
    assert_eq!(schemas.len(), 2);
    assert_eq!(schemas[0]["function"]["name"], "WRITE_FULL_HTML_PREVIEW");
    assert_eq!(schemas[1]["function"]["name"], "NOTION_FETCH_DATA");
    assert_eq!(schemas[1]["function"]["description"], "Fetch Notion data");
    assert_eq!(
        schemas[1]["function"]["parameters"]["properties"]["q"]["type"],
        "integer"
    );

    // Only the remote slug hits the API.
    assert_eq!(*remote.state.api_keys.lock(), vec!["key-1".to_string()]);
}

#[tokio::test]
async fn remote_calls_send_user_and_arguments() {
    let remote = spawn_remote("execute").await;
    let completion = ChatCompletion::from_message(
        None,
        vec![ToolCall::function("call_1", "NOTION_FETCH_DATA", r#"{"q":1}"#)],
    );

    let output = remote.hub.handle_tool_calls(&completion).await.unwrap();
    let ToolOutput::Batch(results) = output else {
        panic!("Expected one result per call");
    };
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["successful"], true);
    assert_eq!(
        results[0]["data"]["echo"],
        json!({ "user_id": "u1", "arguments": { "q": 1 } })
    );
    assert_eq!(*remote.state.api_keys.lock(), vec!["key-1".to_string()]);
}

#[tokio::test]
async fn remote_error_status_propagates() {
    let remote = spawn_remote("errors").await;
    let completion = ChatCompletion::from_message(
        None,
        vec![ToolCall::function("call_1", "BAD", "{}")],
    );

    let err = remote.hub.handle_tool_calls(&completion).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Composio execute BAD failed"), "{message}");
    assert!(message.contains("502"), "{message}");
}
