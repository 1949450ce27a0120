use axum::body::Body;
use axum::http::{Request, StatusCode};
use moderation_rs::api::{router, BatchModerateResponse, MAX_BATCH_SIZE};
use moderation_rs::llm::mock::MockLlm;
use moderation_rs::{ModerationLabel, ModerationVerdict, Moderator, VerdictSource};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> axum::Router {
    let moderator = Moderator::new(Arc::new(MockLlm::new()));
    router(Arc::new(moderator))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "mock-llm-v1");
}

#[tokio::test]
async fn test_moderate_endpoint() {
    let response = app()
        .oneshot(post_json("/moderate", json!({ "text": "you are such a loser" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(
        body,
        json!({
            "label": "HARASSMENT",
            "confidence": 0.8,
            "blocked": true,
            "source": "llm"
        })
    );
}

#[tokio::test]
async fn test_moderate_rule_based() {
    let response = app()
        .oneshot(post_json(
            "/moderate",
            json!({ "text": "aaaaaaaaaa http://a.com http://b.com WIN WIN WIN WIN" }),
        ))
        .await
        .unwrap();

    let verdict: ModerationVerdict = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(verdict.label, ModerationLabel::Spam);
    assert_eq!(verdict.source, VerdictSource::RuleBased);
    assert!(verdict.blocked);
}

#[tokio::test]
async fn test_moderate_batch_endpoint() {
    let response = app()
        .oneshot(post_json(
            "/moderate/batch",
            json!({ "texts": ["see you in the lab", "I will kill you"] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: BatchModerateResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.verdicts.len(), 2);
    assert!(!body.verdicts[0].blocked);
    assert_eq!(body.verdicts[1].label, ModerationLabel::Violence);
    assert!(body.verdicts[1].blocked);
}

#[tokio::test]
async fn test_batch_too_large() {
    let texts = vec!["hi"; MAX_BATCH_SIZE + 1];
    let response = app()
        .oneshot(post_json("/moderate/batch", json!({ "texts": texts })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_score_endpoint() {
    let response = app()
        .oneshot(post_json("/score", json!({ "text": "STOP STOP" })))
        .await
        .unwrap();

    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["score"], 0.3);
    assert_eq!(body["signals"], json!(["ALL_CAPS", "REPEATED_WORDS"]));
}

#[tokio::test]
async fn test_missing_text_is_rejected() {
    let response = app()
        .oneshot(post_json("/moderate", json!({ "message": "hi" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
