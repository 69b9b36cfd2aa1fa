//! Chat API request handling

mod common;

use std::sync::Arc;

use common::{jewel_cache, pipeline, FakeEmbedder, FakeGenerator};
use earthie::chat::api::{GENERIC_ERROR_MESSAGE, QUOTA_MESSAGE, SAFETY_MESSAGE};
use earthie::chat::{ApiBody, ChatApi, ChatRequest};
use earthie::models::GenerationError;
use earthie::types::Message;

fn api_with(generator: FakeGenerator) -> (ChatApi, Arc<FakeGenerator>) {
    let generator = Arc::new(generator);
    let pipeline = pipeline(
        jewel_cache(),
        Arc::new(FakeEmbedder::returning(vec![1.0, 0.0])),
        generator.clone(),
    );
    (ChatApi::new(Arc::new(pipeline)), generator)
}

#[tokio::test]
async fn test_successful_chat_returns_response() {
    let (api, _) = api_with(FakeGenerator::replying("Combine gems at a forge."));

    let response = api
        .handle_json(r#"{"messages":[{"role":"user","content":"how to make a jewel"}]}"#)
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        ApiBody::Response {
            response: "Combine gems at a forge.".to_string()
        }
    );
    assert_eq!(response.to_json(), r#"{"response":"Combine gems at a forge."}"#);
}

#[tokio::test]
async fn test_safety_block_returns_fixed_message() {
    let (api, _) = api_with(FakeGenerator::failing(GenerationError::SafetyBlocked));

    let response = api
        .handle(ChatRequest {
            messages: vec![Message::user("how to make a jewel")],
            context: None,
        })
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        ApiBody::Response {
            response: SAFETY_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn test_quota_and_other_errors_map_to_messages() {
    let (api, _) = api_with(FakeGenerator::failing(GenerationError::QuotaExceeded));
    let response = api
        .handle(ChatRequest {
            messages: vec![Message::user("how to make a jewel")],
            context: None,
        })
        .await;
    assert_eq!(response.body, ApiBody::Response { response: QUOTA_MESSAGE.to_string() });

    let (api, _) = api_with(FakeGenerator::failing(GenerationError::Other("boom".to_string())));
    let response = api
        .handle(ChatRequest {
            messages: vec![Message::user("how to make a jewel")],
            context: None,
        })
        .await;
    assert_eq!(
        response.body,
        ApiBody::Response { response: GENERIC_ERROR_MESSAGE.to_string() }
    );
}

#[tokio::test]
async fn test_missing_user_message_is_client_error() {
    let (api, generator) = api_with(FakeGenerator::replying("unused"));

    let response = api
        .handle_json(r#"{"messages":[{"role":"assistant","content":"Hello!"}]}"#)
        .await;

    assert_eq!(response.status, 400);
    assert!(!response.is_success());
    match response.body {
        ApiBody::Error { error } => {
            assert_eq!(error, "Could not identify the latest user message")
        }
        other => panic!("expected error body, got {:?}", other),
    }
    assert_eq!(generator.prompt_count(), 0);
}

#[tokio::test]
async fn test_empty_messages_is_client_error() {
    let (api, _) = api_with(FakeGenerator::replying("unused"));
    let response = api.handle_json(r#"{"messages":[]}"#).await;
    assert_eq!(response.status, 400);
}

#[tokio::test]
async fn test_malformed_body_is_client_error() {
    let (api, generator) = api_with(FakeGenerator::replying("unused"));

    for body in ["not json", r#"{"msgs":[]}"#, r#"{"messages":[{"role":"robot","content":"x"}]}"#] {
        let response = api.handle_json(body).await;
        assert_eq!(response.status, 400, "body: {}", body);
        assert!(matches!(response.body, ApiBody::Error { .. }));
    }
    assert_eq!(generator.prompt_count(), 0);
}

#[tokio::test]
async fn test_request_context_reaches_prompt() {
    let (api, generator) = api_with(FakeGenerator::replying("ok"));

    let response = api
        .handle_json(
            r#"{"messages":[{"role":"user","content":"how to make a jewel"}],"context":"Player owns 12 tiles"}"#,
        )
        .await;

    assert!(response.is_success());
    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("--- Additional Context ---\nPlayer owns 12 tiles"));
}

#[tokio::test]
async fn test_latest_user_message_drives_retrieval() {
    let (api, generator) = api_with(FakeGenerator::replying("ok"));

    let response = api
        .handle(ChatRequest {
            messages: vec![
                Message::user("tell me about virtual land tiles please"),
                Message::assistant("Tiles are parcels."),
                Message::user("and how to make a jewel"),
            ],
            context: None,
        })
        .await;

    assert!(response.is_success());
    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("[Source: guide.md, chunk 0]"));
    assert!(!prompt.contains("[Source: tiles.md"));
}
