//! Groq Provider HTTP Integration Tests
//!
//! Drives the coaching service through the real Groq provider against a
//! mock chat-completions server.

use journal_coach::{CoachConfig, CoachService};
use mockito::Matcher;

use super::support::sample_journal;

const CHAT_PATH: &str = "/openai/v1/chat/completions";

fn completion(content: &str) -> String {
    serde_json::json!({
        "model": "llama-3.1-8b-instant",
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 60}
    })
    .to_string()
}

fn live_config(base: &str) -> CoachConfig {
    CoachConfig {
        api_key: Some("gsk-test".to_string()),
        api_base: base.to_string(),
        ..CoachConfig::default()
    }
}

#[tokio::test]
async fn test_suggestion_over_http_is_cached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", CHAT_PATH)
        .match_header("authorization", "Bearer gsk-test")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "llama-3.1-8b-instant",
            "max_tokens": 350,
            "stream": false
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("Nice consistency! 1. Stretch tonight."))
        .expect(1)
        .create_async()
        .await;

    let service = CoachService::new(live_config(&server.url())).unwrap();
    assert!(service.is_live());
    let journal = sample_journal();

    let first = service.suggest_for_journal(&journal, 5).await.unwrap();
    let second = service.suggest_for_journal(&journal, 5).await.unwrap();

    assert_eq!(first.text, "Nice consistency! 1. Stretch tonight.");
    assert!(second.cached);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_key_surfaces_user_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", CHAT_PATH)
        .with_status(401)
        .with_body(r#"{"error": {"message": "Invalid API Key"}}"#)
        .create_async()
        .await;

    let service = CoachService::new(live_config(&server.url())).unwrap();
    let err = service
        .suggest_for_journal(&sample_journal(), 5)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid GROQ API key (401).");
}

#[tokio::test]
async fn test_plan_backfill_over_http() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("POST", CHAT_PATH)
        .match_body(Matcher::Regex("Return the JSON plan now".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(r#"{"steps": [{"title": "Buy shoes"}]}"#))
        .expect(1)
        .create_async()
        .await;
    let backfill = server
        .mock("POST", CHAT_PATH)
        .match_body(Matcher::Regex("additional step".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(
            r#"{"steps": [{"title": "Train weekly"}, {"title": "Race day"}]}"#,
        ))
        .expect(1)
        .create_async()
        .await;

    let service = CoachService::new(live_config(&server.url())).unwrap();
    let plan = service
        .breakdown_goal("Run a 10k", "", Some(3))
        .await
        .unwrap();

    first.assert_async().await;
    backfill.assert_async().await;
    let titles: Vec<_> = plan.steps.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy shoes", "Train weekly", "Race day"]);
    assert_eq!(plan.backfilled, 2);
}

#[tokio::test]
async fn test_offline_service_makes_no_requests() {
    let service = CoachService::new(CoachConfig::default()).unwrap();
    assert!(!service.is_live());
    assert!(service.health_check().await.is_ok());

    let suggestion = service
        .suggest_for_journal(&sample_journal(), 5)
        .await
        .unwrap();
    assert!(suggestion.placeholder);
}
