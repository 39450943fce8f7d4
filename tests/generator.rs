#![cfg(not(target_arch = "wasm32"))]

use httpmock::prelude::*;
use serde_json::json;

use veil_portfolio::config::GeneratorConfig;
use veil_portfolio::{GeminiGenerator, GenerateError, GenerationRequest, ProfileGenerator};

const MODEL: &str = "test-model";
const PATH: &str = "/v1beta/models/test-model:generateContent";

fn generator(endpoint: String, api_key: Option<&str>) -> GeminiGenerator {
    GeminiGenerator::new(GeneratorConfig {
        endpoint,
        model: MODEL.into(),
        api_key: api_key.map(str::to_owned),
    })
}

fn request() -> GenerationRequest {
    GenerationRequest {
        target_role: "Fullstack Engineer".into(),
        context: "move into platform engineering".into(),
    }
}

fn candidate(profile: serde_json::Value) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": profile.to_string() }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn returns_profile_from_structured_response() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PATH)
                .header("x-goog-api-key", "secret")
                .body_contains("move into platform engineering")
                .body_contains("responseSchema");
            then.status(200).json_body(candidate(json!({
                "name": "Sam Ortiz",
                "role": "Platform Engineer",
                "tagline": "Paved roads for product teams",
                "summary": "Builds internal platforms. Measures success in developer hours saved.",
                "skills": ["Rust", "Terraform", "Kubernetes"],
                "projects": [
                    { "title": "Runway", "description": "Self-service deploys", "tags": ["Go"] },
                    { "title": "Beacon", "description": "Fleet observability", "tags": ["Rust"] },
                    { "title": "Harbor", "description": "Artifact cache", "tags": ["S3"] }
                ],
                "hueShift": 190
            })));
        })
        .await;

    let profile = generator(server.base_url(), Some("secret"))
        .generate(&request())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(profile.name, "Sam Ortiz");
    assert_eq!(profile.role, "Platform Engineer");
    assert_eq!(profile.projects.len(), 3);
    assert_eq!(profile.hue_shift, 190.0);
}

#[tokio::test]
async fn provider_rejection_surfaces_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(429).json_body(json!({
                "error": { "code": 429, "message": "quota exhausted", "status": "RESOURCE_EXHAUSTED" }
            }));
        })
        .await;

    let err = generator(server.base_url(), Some("secret"))
        .generate(&request())
        .await
        .unwrap_err();

    match err {
        GenerateError::Rejected { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "quota exhausted");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn schema_mismatch_is_malformed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200)
                .json_body(candidate(json!({ "name": "No Role", "skills": "not-an-array" })));
        })
        .await;

    let err = generator(server.base_url(), Some("secret"))
        .generate(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::Malformed(_)), "{err:?}");
}

#[tokio::test]
async fn missing_key_fails_without_calling_provider() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(PATH);
            then.status(200);
        })
        .await;

    for key in [None, Some("")] {
        let err = generator(server.base_url(), key)
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::MissingApiKey));
    }
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let err = generator("http://127.0.0.1:9".into(), Some("secret"))
        .generate(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::Transport(_)), "{err:?}");
}
