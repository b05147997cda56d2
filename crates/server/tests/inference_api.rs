use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::extract::connect_info::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use prospector_agent::{GatewayError, ModelGateway};
use prospector_core::config::AppConfig;
use prospector_dataset::Dataset;
use prospector_server::bootstrap::build_state;
use prospector_server::router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

const CLIENT: &str = "10.1.2.3:40000";

/// Plays the model's part: one canned completion for the classification
/// prompt, another for whichever agent prompt follows.
struct ScriptedGateway {
    classification: &'static str,
    agent_output: &'static str,
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        if prompt.contains("Provide Intent of the user input") {
            Ok(self.classification.to_string())
        } else {
            Ok(self.agent_output.to_string())
        }
    }
}

struct DownGateway;

#[async_trait]
impl ModelGateway for DownGateway {
    async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
        Err(GatewayError::Timeout)
    }
}

fn lead_dataset() -> Arc<Dataset> {
    Arc::new(Dataset::new(
        vec!["Lead Number".to_string(), "Company".to_string(), "City".to_string()],
        vec![
            vec!["1".to_string(), "Acme University".to_string(), "Pune".to_string()],
            vec!["2".to_string(), "Globex Corp".to_string(), "Mumbai".to_string()],
            vec!["3".to_string(), "City University".to_string(), "Delhi".to_string()],
        ],
    ))
}

fn test_router(gateway: Arc<dyn ModelGateway>, requests_per_minute: u32) -> Router {
    let mut config = AppConfig::default();
    config.server.auth_username = "agent-api".to_string();
    config.server.auth_password = "agent-secret".to_string().into();
    config.server.requests_per_minute = requests_per_minute;

    router(build_state(&config, gateway, lead_dataset()))
}

fn inference_request(query: &str, credentials: Option<(&str, &str)>) -> Request<Body> {
    let addr: SocketAddr = CLIENT.parse().expect("valid socket address");
    let mut builder = Request::builder()
        .method("POST")
        .uri("/inference")
        .header("content-type", "application/json")
        .extension(ConnectInfo(addr));

    if let Some((username, password)) = credentials {
        let encoded = BASE64.encode(format!("{username}:{password}"));
        builder = builder.header("authorization", format!("Basic {encoded}"));
    }

    builder
        .body(Body::from(json!({"query": query}).to_string()))
        .expect("request builds")
}

fn raw_body_request(body: &str) -> Request<Body> {
    let addr: SocketAddr = CLIENT.parse().expect("valid socket address");
    let encoded = BASE64.encode("agent-api:agent-secret");
    Request::builder()
        .method("POST")
        .uri("/inference")
        .header("content-type", "application/json")
        .header("authorization", format!("Basic {encoded}"))
        .extension(ConnectInfo(addr))
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

async fn body_json(body: Body) -> Value {
    let bytes = to_bytes(body, usize::MAX).await.expect("body readable");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
async fn request_without_credentials_is_unauthorized() {
    let app = test_router(
        Arc::new(ScriptedGateway { classification: "{}", agent_output: "{}" }),
        10,
    );

    let response =
        app.oneshot(inference_request("find leads", None)).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("www-authenticate"));
    let body = body_json(response.into_body()).await;
    assert_eq!(body, json!({"detail": "Invalid credentials"}));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = test_router(
        Arc::new(ScriptedGateway { classification: "{}", agent_output: "{}" }),
        10,
    );

    let response = app
        .oneshot(inference_request("find leads", Some(("agent-api", "nope"))))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_query_is_bad_request() {
    let app = test_router(
        Arc::new(ScriptedGateway { classification: "{}", agent_output: "{}" }),
        10,
    );

    let response = app
        .oneshot(inference_request("   ", Some(("agent-api", "agent-secret"))))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body, json!({"error": "query must not be empty"}));
}

#[tokio::test]
async fn malformed_body_is_bad_request_with_json_body() {
    let app = test_router(
        Arc::new(ScriptedGateway { classification: "{}", agent_output: "{}" }),
        10,
    );

    let response = app.oneshot(raw_body_request("{not json")).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/json"), "got `{content_type}`");
    let body = body_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn missing_query_field_is_bad_request_with_json_body() {
    let app = test_router(
        Arc::new(ScriptedGateway { classification: "{}", agent_output: "{}" }),
        10,
    );

    let response = app
        .oneshot(raw_body_request(r#"{"prompt": "find leads"}"#))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn dataframe_query_flows_end_to_end() {
    let app = test_router(
        Arc::new(ScriptedGateway {
            classification: r#"```json{"intent": "search_dataframe", "action": "leads where Company contains university"}```"#,
            agent_output: r#"{"column": "Company", "condition": "university"}"#,
        }),
        10,
    );

    let response = app
        .oneshot(inference_request(
            "find leads where Company contains university",
            Some(("agent-api", "agent-secret")),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;

    assert_eq!(body["intent"]["intent"], "search_dataframe");
    assert_eq!(body["client_ip"], "10.1.2.3");
    assert!(body["response_id"].is_string());
    assert!(body["process_time"].is_number());

    let rows = body["query_response"].as_array().expect("rows array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Company"], "Acme University");
    assert_eq!(rows[1]["Company"], "City University");
}

#[tokio::test]
async fn email_draft_flows_end_to_end() {
    let app = test_router(
        Arc::new(ScriptedGateway {
            classification: r#"{"intent": "write_email", "action": "write an email to acme corp"}"#,
            agent_output: r#"{"subject": "Partnering with Acme", "body": "Hello Acme team,"}"#,
        }),
        10,
    );

    let response = app
        .oneshot(inference_request(
            "write an email to acme corp",
            Some(("agent-api", "agent-secret")),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;

    assert_eq!(body["intent"]["intent"], "write_email");
    assert_eq!(
        body["query_response"],
        json!({"subject": "Partnering with Acme", "body": "Hello Acme team,"})
    );
}

#[tokio::test]
async fn unmapped_intent_is_bad_request() {
    // `reply_email` is in the taxonomy the model sees, but no agent is
    // registered for it.
    let app = test_router(
        Arc::new(ScriptedGateway {
            classification: r#"{"intent": "reply_email", "action": "reply to the last email"}"#,
            agent_output: "{}",
        }),
        10,
    );

    let response = app
        .oneshot(inference_request("reply to that email", Some(("agent-api", "agent-secret"))))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body, json!({"error": "unknown intent `reply_email`"}));
}

#[tokio::test]
async fn classifier_prose_is_bad_request() {
    let app = test_router(
        Arc::new(ScriptedGateway {
            classification: "I'm not sure what you mean by that.",
            agent_output: "{}",
        }),
        10,
    );

    let response = app
        .oneshot(inference_request("gibberish", Some(("agent-api", "agent-secret"))))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn backend_failure_is_internal_error_with_opaque_body() {
    let app = test_router(Arc::new(DownGateway), 10);

    let response = app
        .oneshot(inference_request("find leads", Some(("agent-api", "agent-secret"))))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response.into_body()).await;
    assert_eq!(body, json!({"error": "An unexpected error occurred"}));
}

#[tokio::test]
async fn rate_limit_blocks_after_the_ceiling() {
    let app = test_router(
        Arc::new(ScriptedGateway {
            classification: r#"{"intent": "write_email", "action": "say hi"}"#,
            agent_output: r#"{"subject": "Hi", "body": "Hi"}"#,
        }),
        1,
    );

    let first = app
        .clone()
        .oneshot(inference_request("write an email", Some(("agent-api", "agent-secret"))))
        .await
        .expect("router responds");
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(inference_request("write an email", Some(("agent-api", "agent-secret"))))
        .await
        .expect("router responds");
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(second.into_body()).await;
    assert_eq!(body, json!({"detail": "rate limit exceeded"}));
}

#[tokio::test]
async fn health_reports_loaded_dataset() {
    let app = test_router(
        Arc::new(ScriptedGateway { classification: "{}", agent_output: "{}" }),
        10,
    );

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("request builds");
    let response = app.oneshot(request).await.expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["dataset"]["status"], "ready");
}
