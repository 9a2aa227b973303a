//! Endpoint tests driven through the router with `tower::ServiceExt::oneshot`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use nudge_core::{GenerationOptions, Llm, LlmResponse, Message, NudgeError, NudgeResult};
use nudge_server::{create_server, AppState};

/// Replies with a fixed body, or fails when none is given; records prompts.
struct MockLlm {
    reply: Option<&'static str>,
    prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    fn replying(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Llm for MockLlm {
    async fn generate(
        &self,
        messages: &[Message],
        _options: Option<GenerationOptions>,
    ) -> NudgeResult<LlmResponse> {
        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);
        match self.reply {
            Some(reply) => Ok(LlmResponse {
                content: Some(reply.to_string()),
                usage: None,
            }),
            None => Err(NudgeError::llm("Gemini API error (429): quota exceeded")),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

fn app(llm: Arc<MockLlm>) -> Router {
    create_server(AppState::with_llm(llm))
}

async fn post(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/check-notification")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn conditions(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| json!({"id": format!("c{i}"), "condition": format!("조건 {i}"), "sensitivity": 50}))
            .collect(),
    )
}

#[tokio::test]
async fn test_health_reports_classifier() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(MockLlm::replying("")), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["classifierConfigured"], true);
    assert_eq!(body["model"], "mock-model");

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (_, body) = send(create_server(AppState::unconfigured()), request).await;
    assert_eq!(body["classifierConfigured"], false);
    assert!(body["model"].is_null());
}

#[tokio::test]
async fn test_batch_applies_threshold_per_condition() {
    let llm = MockLlm::replying("45|해외여행\n30|맛집\n");
    let (status, body) = post(
        app(llm.clone()),
        json!({
            "message": "다음 달에 해외여행 갈래?",
            "conditions": [
                {"id": "c1", "condition": "여행", "sensitivity": 60},
                {"id": "c2", "condition": "맛집", "sensitivity": 60},
                {"id": "c3", "condition": "운동", "sensitivity": 100}
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0], json!({"conditionId": "c1", "probability": 45, "shouldNotify": true, "topic": "해외여행"}));
    assert_eq!(results[1]["shouldNotify"], false);
    // A missing line never matches, even at sensitivity 100
    assert!(results[2].get("probability").is_none());
    assert_eq!(results[2]["shouldNotify"], false);
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn test_legacy_form() {
    let llm = MockLlm::replying("YES|해외여행");
    let (status, body) = post(
        app(llm),
        json!({"message": "다음 달에 해외여행 갈래?", "condition": "여행", "sensitivity": "medium"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"shouldNotify": true, "topic": "해외여행"}));

    let (status, body) = post(
        app(MockLlm::replying("NO")),
        json!({"message": "점심 뭐 먹지", "condition": "여행"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"shouldNotify": false}));
}

#[tokio::test]
async fn test_missing_fields_are_rejected_before_credentials() {
    let unconfigured = || create_server(AppState::unconfigured());

    let (status, body) = post(unconfigured(), json!({"condition": "여행"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message and condition are required");

    let (status, body) = post(unconfigured(), json!({"message": "hi", "conditions": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message and conditions are required");

    let (status, body) = post(unconfigured(), json!({"message": "hi", "condition": "여행"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "LLM API key not configured");
}

#[tokio::test]
async fn test_invalid_sensitivity_is_rejected() {
    let llm = MockLlm::replying("YES|여행");
    let (status, _) = post(
        app(llm.clone()),
        json!({"message": "hi", "condition": "여행", "sensitivity": 130}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(
        app(llm.clone()),
        json!({"message": "hi", "conditions": [{"id": "c1", "condition": "여행", "sensitivity": -5}]}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_oversized_batch_is_rejected() {
    let llm = MockLlm::replying("");
    let (status, _) = post(
        app(llm.clone()),
        json!({"message": "hi", "conditions": conditions(21)}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(llm.calls(), 0);

    let (status, body) = post(app(llm), json!({"message": "hi", "conditions": conditions(20)})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_upstream_failure_reports_details() {
    let (status, body) = post(
        app(MockLlm::failing()),
        json!({"message": "hi", "conditions": conditions(1)}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to call LLM API");
    assert!(body["details"].as_str().unwrap().contains("quota exceeded"));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/check-notification")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(MockLlm::replying("")), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request body");
}
