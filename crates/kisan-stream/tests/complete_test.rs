use kisan_stream::{
    AgentClient, AgentError, ClientConfig, CompleteResponse, ConversationMessage, HttpAgentClient,
    OutboundPayload,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload() -> OutboundPayload {
    OutboundPayload::new(vec![ConversationMessage::user("hi")])
}

#[tokio::test]
async fn test_complete_returns_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent/complete"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"messages": [{"role": "user", "content": "hi"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpAgentClient::new(server.uri()).unwrap();
    let result = client.complete(&payload()).await.unwrap();

    assert_eq!(result, json!({"text": "ok"}));
}

#[tokio::test]
async fn test_complete_typed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "Detected intents: weather, market",
            "intent": "weather, market",
            "citations": [{"source": "IMD"}]
        })))
        .mount(&server)
        .await;

    let client = HttpAgentClient::new(server.uri()).unwrap();
    let response: CompleteResponse = client.complete_as(&payload()).await.unwrap();

    assert_eq!(response.intent.as_deref(), Some("weather, market"));
    assert_eq!(response.citations.len(), 1);
}

#[tokio::test]
async fn test_complete_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent/complete"))
        .respond_with(ResponseTemplate::new(500).set_body_string("graph crashed"))
        .mount(&server)
        .await;

    let client = HttpAgentClient::new(server.uri()).unwrap();
    let err = client.complete(&payload()).await.unwrap_err();

    match err {
        AgentError::RequestFailed { status, status_text, body } => {
            assert_eq!(status, 500);
            assert_eq!(status_text, "Internal Server Error");
            assert_eq!(body.as_deref(), Some("graph crashed"));
        }
        other => panic!("expected RequestFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_complete_malformed_json_is_hard_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/agent/complete"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not-json"))
        .mount(&server)
        .await;

    let client = HttpAgentClient::new(server.uri()).unwrap();
    let err = client.complete(&payload()).await.unwrap_err();

    assert!(matches!(err, AgentError::InvalidResponse { status: 200, .. }));
    assert!(err.user_message().is_some());
}

#[tokio::test]
async fn test_complete_custom_route() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/answer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "custom"})))
        .mount(&server)
        .await;

    let config = ClientConfig::new(server.uri()).with_complete_path("v2/answer");
    let client = HttpAgentClient::from_config(config).unwrap();
    let result = client.complete(&payload()).await.unwrap();

    assert_eq!(result["text"], "custom");
}

#[tokio::test]
async fn test_health_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let client = HttpAgentClient::new(server.uri()).unwrap();

    assert!(client.health().await.is_ok());
}

#[tokio::test]
async fn test_health_degraded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "degraded"})))
        .mount(&server)
        .await;

    let client = HttpAgentClient::new(server.uri()).unwrap();
    let err = client.health().await.unwrap_err();

    assert!(matches!(err, AgentError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Nothing listens on port 9 on the test host
    let client = HttpAgentClient::new("http://127.0.0.1:9").unwrap();
    let err = client.complete(&payload()).await.unwrap_err();

    assert!(matches!(err, AgentError::Transport(_)));
    assert!(!err.is_aborted());
}
