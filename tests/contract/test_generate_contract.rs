#[path = "../support/mod.rs"]
mod support;

use groundgen::services::google_ai::{
    GenerationError, GenerationRequest, GroundedClient, GroundingConfig, Source,
    TransportResponse,
};
use serde_json::json;
use std::sync::Arc;
use support::{text_body, ScriptedTransport};

fn client_with(transport: Arc<ScriptedTransport>) -> GroundedClient {
    let config = GroundingConfig::new("test_api_key".to_string())
        .with_model("gemini-test".to_string());
    GroundedClient::with_transport(config, transport).unwrap()
}

#[tokio::test]
async fn test_success_without_grounding_has_no_sources() {
    let transport = Arc::new(ScriptedTransport::statuses(&[200], &text_body("Plain answer")));
    let client = client_with(transport.clone());

    let result = client
        .generate(&GenerationRequest::new("What do reviewers say?"))
        .await
        .unwrap();

    assert_eq!(result.text, "Plain answer");
    assert!(result.sources.is_empty());
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_attributions_filtered_in_order() {
    let body = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "Grounded answer" }] },
            "groundingMetadata": {
                "groundingAttributions": [
                    { "web": { "uri": "a", "title": "" } },
                    { "web": { "uri": "b", "title": "B" } }
                ]
            }
        }]
    })
    .to_string();
    let transport = Arc::new(ScriptedTransport::statuses(&[200], &body));
    let client = client_with(transport);

    let result = client
        .generate(&GenerationRequest::new("q").with_search_grounding(true))
        .await
        .unwrap();

    assert_eq!(
        result.sources,
        vec![Source {
            uri: "b".to_string(),
            title: "B".to_string()
        }]
    );
}

#[tokio::test]
async fn test_payload_carries_system_instruction_and_tool() {
    let transport = Arc::new(ScriptedTransport::statuses(&[200], &text_body("ok")));
    let client = client_with(transport.clone());

    let request = GenerationRequest::new("Classify this review")
        .with_system_prompt("Answer with one word.")
        .with_search_grounding(true);
    client.generate(&request).await.unwrap();

    let sent = serde_json::to_value(&transport.requests()[0]).unwrap();
    assert_eq!(
        sent,
        json!({
            "contents": [{ "parts": [{ "text": "Classify this review" }] }],
            "systemInstruction": { "parts": [{ "text": "Answer with one word." }] },
            "tools": [{ "google_search": {} }]
        })
    );
}

#[tokio::test]
async fn test_bad_request_rejected_without_retry() {
    let transport = Arc::new(ScriptedTransport::statuses(&[400, 200], &text_body("unused")));
    let client = client_with(transport.clone());

    let error = client
        .generate(&GenerationRequest::new("q"))
        .await
        .unwrap_err();

    match error {
        GenerationError::UpstreamRejected { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.contains("status 400"));
        }
        other => panic!("Expected UpstreamRejected, got {other:?}"),
    }
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_empty_candidates_is_empty_generation() {
    let transport = Arc::new(ScriptedTransport::statuses(&[200], r#"{"candidates": []}"#));
    let client = client_with(transport);

    let error = client
        .generate(&GenerationRequest::new("q"))
        .await
        .unwrap_err();

    assert!(matches!(error, GenerationError::EmptyGeneration { .. }));
}

#[tokio::test]
async fn test_embedded_error_in_success_body() {
    let body = json!({ "error": { "code": 429, "message": "Resource exhausted" } }).to_string();
    let transport = Arc::new(ScriptedTransport::statuses(&[200], &body));
    let client = client_with(transport.clone());

    let error = client
        .generate(&GenerationRequest::new("q"))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        GenerationError::UpstreamRejected { status: 429, .. }
    ));
    // Parsing happens after the retry loop, so an embedded error is terminal.
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_empty_prompt_is_invalid_request() {
    let transport = Arc::new(ScriptedTransport::statuses(&[200], &text_body("unused")));
    let client = client_with(transport.clone());

    let error = client
        .generate(&GenerationRequest::new(""))
        .await
        .unwrap_err();

    assert!(matches!(error, GenerationError::InvalidRequest { .. }));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_repeated_calls_are_idempotent() {
    let body = json!({
        "candidates": [{
            "content": { "parts": [{ "text": "Same answer" }] },
            "groundingMetadata": {
                "groundingAttributions": [{ "web": { "uri": "https://a.example", "title": "A" } }]
            }
        }]
    })
    .to_string();
    let transport = Arc::new(ScriptedTransport::repeating(Ok(TransportResponse::new(
        200, body,
    ))));
    let client = client_with(transport.clone());
    let request = GenerationRequest::new("Same question").with_search_grounding(true);

    let first = client.generate(&request).await.unwrap();
    let second = client.generate(&request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_every_outcome_is_a_single_error_kind() {
    let cases: Vec<(u16, &str)> = vec![
        (200, r#"{"candidates": [{}]}"#),
        (200, "not json"),
        (200, r#"{"error": "boom"}"#),
        (401, "unauthorized"),
        (404, r#"{"error":{"message":"model not found"}}"#),
    ];

    for (status, body) in cases {
        let transport = Arc::new(ScriptedTransport::statuses(&[status], body));
        let client = client_with(transport);
        let error = client
            .generate(&GenerationRequest::new("q"))
            .await
            .unwrap_err();

        assert!(
            matches!(
                error,
                GenerationError::EmptyGeneration { .. } | GenerationError::UpstreamRejected { .. }
            ),
            "status {status}, body {body}: unexpected {error:?}"
        );
        assert!(!error.user_message().is_empty());
    }
}
