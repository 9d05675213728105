#[path = "../support/mod.rs"]
mod support;

use groundgen::services::google_ai::{
    GenerationError, GenerationRequest, GroundedClient, GroundingConfig,
};
use std::sync::Arc;
use std::time::Duration;
use support::{text_body, ScriptedTransport};
use tokio_util::sync::CancellationToken;

fn client_with(transport: Arc<ScriptedTransport>) -> GroundedClient {
    GroundedClient::with_transport(GroundingConfig::new("test_api_key".to_string()), transport)
        .unwrap()
}

fn cancel_after(token: &CancellationToken, delay: Duration) {
    let token = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        token.cancel();
    });
}

#[tokio::test(start_paused = true)]
async fn test_cancel_aborts_in_flight_attempt() {
    let transport = Arc::new(ScriptedTransport::hanging());
    let client = client_with(transport.clone());
    let token = CancellationToken::new();
    cancel_after(&token, Duration::from_millis(100));

    let error = client
        .generate_with_cancel(&GenerationRequest::new("q"), &token)
        .await
        .unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_skips_remaining_retries() {
    let transport = Arc::new(ScriptedTransport::statuses(
        &[503, 200],
        &text_body("too late"),
    ));
    let client = client_with(transport.clone());
    let token = CancellationToken::new();
    // First backoff is at least 1000ms
    cancel_after(&token, Duration::from_millis(500));

    let error = client
        .generate_with_cancel(&GenerationRequest::new("q"), &token)
        .await
        .unwrap_err();

    assert!(matches!(error, GenerationError::Cancelled));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_already_cancelled_token_makes_no_call() {
    let transport = Arc::new(ScriptedTransport::statuses(&[200], &text_body("unused")));
    let client = client_with(transport.clone());
    let token = CancellationToken::new();
    token.cancel();

    let error = client
        .generate_with_cancel(&GenerationRequest::new("q"), &token)
        .await
        .unwrap_err();

    assert!(error.is_cancelled());
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_uncancelled_token_does_not_interfere() {
    let transport = Arc::new(ScriptedTransport::statuses(&[200], &text_body("fine")));
    let client = client_with(transport);
    let token = CancellationToken::new();

    let result = client
        .generate_with_cancel(&GenerationRequest::new("q"), &token)
        .await
        .unwrap();

    assert_eq!(result.text, "fine");
}
