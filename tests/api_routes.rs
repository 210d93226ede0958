use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use maestro::{
    adapters::{AgentPrompt, AgentReply, AgentTransport, TransportError},
    create_router, AppConfig, AppState,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// Answers like a healthy agent except for the endpoints listed as down
#[derive(Default)]
struct StubTransport {
    down: Vec<String>,
    seen: Mutex<Vec<(String, AgentPrompt)>>,
}

#[async_trait]
impl AgentTransport for StubTransport {
    async fn post_prompt(
        &self,
        endpoint: &str,
        payload: &AgentPrompt,
        _timeout: Option<Duration>,
    ) -> Result<AgentReply, TransportError> {
        self.seen
            .lock()
            .unwrap()
            .push((endpoint.to_string(), payload.clone()));

        if self.down.iter().any(|d| d == endpoint) {
            return Err(TransportError("connection refused".to_string()));
        }
        Ok(AgentReply {
            status: 200,
            body: json!({ "response": format!("ack {}", payload.prompt) }).to_string(),
        })
    }
}

fn app_with(transport: Arc<StubTransport>) -> (Router, AppState) {
    let state = AppState::with_transport(&AppConfig::default(), transport).unwrap();
    (create_router(state.clone()), state)
}

fn app() -> Router {
    app_with(Arc::new(StubTransport::default())).0
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = if let Some(payload) = body {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        builder.body(Body::from(payload.to_string())).unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    (status, String::from_utf8_lossy(&bytes).to_string())
}

fn as_json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("invalid JSON body ({e}): {body}"))
}

#[tokio::test]
async fn callback_rejects_missing_fields() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/agent_callback",
        Some(json!({ "response": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(as_json(&body)["error"], "No agent_id provided");

    let (status, body) = send(
        &app,
        Method::POST,
        "/agent_callback",
        Some(json!({ "agent_id": "agent_8000", "response": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(as_json(&body)["error"], "No response provided");

    let (_, body) = send(&app, Method::GET, "/get_all_responses", None).await;
    assert_eq!(as_json(&body)["raw_responses"]["agent_8000"], json!([]));
}

#[tokio::test]
async fn callback_stores_whitespace_only_reply() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/agent_callback",
        Some(json!({ "agent_id": "agent_8000", "response": "\n" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, body) = send(&app, Method::GET, "/get_all_responses", None).await;
    let snapshot = as_json(&body);
    let history = snapshot["raw_responses"]["agent_8000"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["message"], "\n");
    assert_eq!(snapshot["parsed_responses"]["agent_8000"], json!([]));
}

#[tokio::test]
async fn callback_rejects_malformed_json() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/agent_callback")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn callback_rejects_unknown_agent() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/agent_callback",
        Some(json!({ "agent_id": "agent_9999", "response": "received 1 ETH https://x.example" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(as_json(&body), json!({ "error": "Unknown agent ID: agent_9999" }));

    let (_, body) = send(&app, Method::GET, "/get_all_responses", None).await;
    let snapshot = as_json(&body);
    for id in ["agent_8000", "agent_8001", "agent_8002"] {
        assert_eq!(snapshot["raw_responses"][id], json!([]));
        assert_eq!(snapshot["parsed_responses"][id], json!([]));
    }
}

#[tokio::test]
async fn callback_records_raw_and_parsed_reply() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/agent_callback",
        Some(json!({
            "agent_id": "agent_8001",
            "prompt": "trade 0.25 ETH",
            "response": "Done! You received 0.25 ETH.\nTx: https://basescan.org/tx/0xabc"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_json(&body), json!({ "status": "success" }));

    // Same handler behind the legacy path; this one has nothing to parse
    let (status, _) = send(
        &app,
        Method::POST,
        "/agent_response",
        Some(json!({ "agent_id": "agent_8001", "response": "Balance is 3 USDC" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/get_all_responses", None).await;
    assert_eq!(status, StatusCode::OK);
    let snapshot = as_json(&body);

    let history = snapshot["raw_responses"]["agent_8001"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["prompt"], "trade 0.25 ETH");
    assert_eq!(history[0]["kind"], "agent");
    assert_eq!(history[1]["message"], "Balance is 3 USDC");

    assert_eq!(
        snapshot["parsed_responses"]["agent_8001"],
        json!([{ "0.25": "https://basescan.org/tx/0xabc" }])
    );
    assert_eq!(snapshot["parsed_responses"]["agent_8000"], json!([]));
}

#[tokio::test]
async fn query_is_stable_without_writes() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/agent_callback",
        Some(json!({ "agent_id": "agent_8000", "response": "hi" })),
    )
    .await;

    let (_, first) = send(&app, Method::GET, "/get_all_responses", None).await;
    let (_, second) = send(&app, Method::GET, "/get_all_responses", None).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn send_prompt_requires_prompt_and_known_chain() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/send_prompt", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(as_json(&body), json!({ "error": "No prompt provided" }));

    let (status, body) = send(
        &app,
        Method::POST,
        "/send_prompt",
        Some(json!({ "prompt": "swap", "chain": "31337" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(as_json(&body)["error"], "Unknown chain: 31337");
}

#[tokio::test]
async fn send_prompt_reports_each_agent_despite_failures() {
    let transport = Arc::new(StubTransport {
        down: vec!["http://127.0.0.1:8001/chat".to_string()],
        ..Default::default()
    });
    let (app, _) = app_with(Arc::clone(&transport));

    let (status, body) = send(
        &app,
        Method::POST,
        "/send_prompt",
        Some(json!({ "prompt": "swap 0.1 ETH for USDC", "chain": "8453" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body = as_json(&body);
    let outcomes = &body["immediate_responses"];
    assert_eq!(outcomes.as_object().unwrap().len(), 3);
    assert_eq!(
        outcomes["agent_8000"],
        json!({ "status": "delivered", "response": "ack swap 0.1 ETH for USDC" })
    );
    assert_eq!(outcomes["agent_8001"]["status"], "failed");
    assert_eq!(
        outcomes["agent_8001"]["error"],
        "Could not reach agent: connection refused"
    );
    assert_eq!(outcomes["agent_8002"]["status"], "delivered");
    assert_eq!(body["chain"], json!({ "id": "8453", "name": "Base Mainnet" }));

    let seen = transport.seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen
        .iter()
        .all(|(_, p)| p.chain_id.as_deref() == Some("8453")));
}

#[tokio::test]
async fn json_broadcast_acknowledges_immediately() {
    let transport = Arc::new(StubTransport::default());
    let (app, state) = app_with(Arc::clone(&transport));

    let (status, body) = send(
        &app,
        Method::POST,
        "/broadcast",
        Some(json!({ "prompt": "check balances" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body = as_json(&body);
    assert_eq!(body["status"], "dispatched");
    assert_eq!(
        body["agents"],
        json!(["agent_8000", "agent_8001", "agent_8002"])
    );

    let snapshot = state.store.snapshot().await;
    for history in snapshot.raw_responses.values() {
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].prompt, "[BROADCAST] check balances");
    }
    assert!(snapshot.parsed_responses.values().all(Vec::is_empty));
}

#[tokio::test]
async fn form_broadcast_renders_dashboard() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/broadcast")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("prompt=wrap+0.01+ETH&chain=84532"))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("Command broadcast successfully!"));
    assert!(html.contains("Prompt: [BROADCAST] wrap 0.01 ETH"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/broadcast")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("prompt="))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_and_health_render() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/agent_callback",
        Some(json!({ "agent_id": "agent_8002", "response": "<img src=x onerror=alert(1)>" })),
    )
    .await;

    let (status, html) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Agent 3 (agent_8002)"));
    assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
    assert!(!html.contains("<img src=x"));

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = as_json(&body);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["agents"], 3);
}
