//! Coaching Service Integration Tests

use chrono::NaiveDate;
use journal_coach::{AppError, CoachingContext};
use journal_coach_llm::LlmError;

use super::support::{sample_journal, service_with, text_response, MockLlmProvider};

// ============================================================================
// Suggestions
// ============================================================================

#[tokio::test]
async fn test_suggestion_is_cached_by_content() {
    let provider = MockLlmProvider::with_texts(&["  Great start! 1. Stretch 2. Sleep  "]);
    let service = service_with(provider.clone());
    let journal = sample_journal();

    let first = service.suggest_for_journal(&journal, 10).await.unwrap();
    assert_eq!(first.text, "Great start! 1. Stretch 2. Sleep");
    assert!(!first.cached);

    let second = service.suggest_for_journal(&journal, 10).await.unwrap();
    assert!(second.cached);
    assert_eq!(second.text, first.text);
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn test_suggestion_prompt_carries_goal_and_entries() {
    let provider = MockLlmProvider::with_texts(&["ok"]);
    let service = service_with(provider.clone());

    service
        .suggest_for_journal(&sample_journal(), 2)
        .await
        .unwrap();

    let call = &provider.calls()[0];
    assert!(call.system.as_deref().unwrap().contains("motivational coaching"));
    assert!(call.user.contains("Goal: Run a 10k"));
    assert!(call.user.contains("[2025-08-05 18:15] Rest day"));
    assert!(!call.user.contains("Ran 3km"));
    assert_eq!(call.options.max_tokens_override, Some(350));
    assert!(!call.options.json_mode);
}

#[tokio::test]
async fn test_changed_content_misses_cache() {
    let provider = MockLlmProvider::with_texts(&["first", "second"]);
    let service = service_with(provider.clone());

    let a = service
        .suggest(&CoachingContext::new(Some("Write"), "line one"))
        .await
        .unwrap();
    let b = service
        .suggest(&CoachingContext::new(Some("Write"), "line two"))
        .await
        .unwrap();
    assert_eq!(a.text, "first");
    assert_eq!(b.text, "second");
}

#[tokio::test]
async fn test_errors_are_not_cached() {
    let provider = MockLlmProvider::new(vec![
        Err(LlmError::RateLimited {
            message: "slow down".to_string(),
            retry_after: None,
        }),
        Ok(text_response("Recovered")),
    ]);
    let service = service_with(provider.clone());
    let ctx = CoachingContext::new(Some("Write"), "line");

    let err = service.suggest(&ctx).await.unwrap_err();
    assert!(err.user_message().starts_with("Rate limit hit"));

    let ok = service.suggest(&ctx).await.unwrap();
    assert_eq!(ok.text, "Recovered");
    assert!(!ok.cached);
}

#[tokio::test]
async fn test_blank_model_output_is_parse_error() {
    let provider = MockLlmProvider::with_texts(&["   "]);
    let service = service_with(provider);
    let err = service
        .suggest(&CoachingContext::new(None, ""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
}

// ============================================================================
// Goal breakdowns
// ============================================================================

#[tokio::test]
async fn test_breakdown_full_plan_needs_no_backfill() {
    let provider = MockLlmProvider::with_texts(&[r#"```json
{"steps": [
  {"title": "1. Buy running shoes", "detail": "Get fitted at a store"},
  {"title": "Run 2km three times a week"},
  {"title": "Add a long run on Sundays"}
]}
```"#]);
    let service = service_with(provider.clone());

    let plan = service
        .breakdown_goal("Run a 10k", "", Some(3))
        .await
        .unwrap();

    assert_eq!(plan.steps.len(), 3);
    assert_eq!(plan.backfilled, 0);
    assert_eq!(plan.steps[0].title, "Buy running shoes");
    assert_eq!(
        plan.steps[0].detail.as_deref(),
        Some("Get fitted at a store")
    );

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].options.json_mode);
    assert!(calls[0].system.as_deref().unwrap().contains("exactly 3"));
}

#[tokio::test]
async fn test_breakdown_filters_then_backfills() {
    let provider = MockLlmProvider::with_texts(&[
        // Duplicate and goal restatement leave two usable steps.
        r#"{"steps": [
            {"title": "Buy running shoes"},
            {"title": "buy running shoes!"},
            {"title": "Run a 10k"},
            {"title": "Run 2km three times a week"}
        ]}"#,
        // Backfill repeats one existing step; two new ones survive.
        r#"{"steps": ["Buy Running Shoes", "Add a long run on Sundays", "Sign up for a race"]}"#,
    ]);
    let service = service_with(provider.clone());

    let plan = service
        .breakdown_goal("Run a 10k", "", Some(4))
        .await
        .unwrap();

    let titles: Vec<_> = plan.steps.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Buy running shoes",
            "Run 2km three times a week",
            "Add a long run on Sundays",
            "Sign up for a race"
        ]
    );
    assert_eq!(plan.backfilled, 2);
    let orders: Vec<_> = plan.steps.iter().map(|s| s.order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4]);

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[1].user.contains("1. Buy running shoes"));
    assert!(calls[1].user.contains("exactly 2 additional"));
}

#[tokio::test]
async fn test_breakdown_reorders_by_explicit_step_numbers() {
    let provider = MockLlmProvider::with_texts(&[r#"[
        {"step": 3, "title": "Race day"},
        {"step": 1, "title": "Buy shoes"},
        {"step": 2, "title": "Train weekly"}
    ]"#]);
    let service = service_with(provider);

    let plan = service.breakdown_goal("Run a 10k", "", Some(3)).await.unwrap();
    let titles: Vec<_> = plan.steps.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy shoes", "Train weekly", "Race day"]);
}

#[tokio::test]
async fn test_breakdown_falls_back_to_list_lines() {
    let provider = MockLlmProvider::with_texts(&[
        "Here's a plan:\n1. Buy shoes\n2. Train weekly\n3. Race day\nGood luck!",
    ]);
    let service = service_with(provider);

    let plan = service.breakdown_goal("Run a 10k", "", Some(3)).await.unwrap();
    assert_eq!(plan.steps.len(), 3);
    assert_eq!(plan.steps[2].title, "Race day");
}

#[tokio::test]
async fn test_breakdown_reads_json_after_bracketed_prose() {
    let provider = MockLlmProvider::with_texts(&[
        "Plan [draft 1]:\n{\"steps\": [\"Buy shoes\", \"Train weekly\", \"Race day\"]}",
    ]);
    let service = service_with(provider.clone());

    let plan = service.breakdown_goal("Run a 10k", "", Some(3)).await.unwrap();
    let titles: Vec<_> = plan.steps.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy shoes", "Train weekly", "Race day"]);
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn test_breakdown_keeps_partial_plan_when_backfill_fails() {
    let provider = MockLlmProvider::new(vec![
        Ok(text_response(r#"{"steps": ["Buy shoes", "Train weekly"]}"#)),
        Err(LlmError::ServerError {
            message: "overloaded".to_string(),
            status: Some(503),
        }),
    ]);
    let service = service_with(provider);

    let plan = service.breakdown_goal("Run a 10k", "", Some(3)).await.unwrap();
    assert_eq!(plan.steps.len(), 2);
    assert_eq!(plan.backfilled, 0);
}

#[tokio::test]
async fn test_breakdown_without_usable_steps_is_parse_error() {
    let provider = MockLlmProvider::with_texts(&["I can't help with that."]);
    let service = service_with(provider.clone());

    let err = service
        .breakdown_goal("Run a 10k", "", Some(3))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Parse(_)));
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn test_breakdown_is_cached_per_step_count() {
    let provider = MockLlmProvider::with_texts(&[
        r#"{"steps": ["Buy shoes", "Train weekly", "Race day"]}"#,
        r#"{"steps": ["Buy shoes", "Train weekly", "Taper", "Race day"]}"#,
    ]);
    let service = service_with(provider.clone());

    let three = service.breakdown_goal("Run a 10k", "", Some(3)).await.unwrap();
    let again = service.breakdown_goal("Run a 10k", "", Some(3)).await.unwrap();
    assert!(again.cached);
    assert_eq!(again.steps, three.steps);

    let four = service.breakdown_goal("Run a 10k", "", Some(4)).await.unwrap();
    assert!(!four.cached);
    assert_eq!(four.steps.len(), 4);
    assert_eq!(provider.calls().len(), 2);
}

// ============================================================================
// Daily evaluations
// ============================================================================

#[tokio::test]
async fn test_evaluation_parses_structured_output() {
    let provider = MockLlmProvider::with_texts(&[r#"Here you go:
{"score": "7/10", "summary": "Good run, skipped recovery.",
 "wins": ["Ran before work"], "improvements": "Stretch after runs",}"#]);
    let service = service_with(provider.clone());
    let journal = sample_journal();
    let day = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();

    let eval = service.evaluate_day(&journal, Some(day)).await.unwrap();
    assert_eq!(eval.date, day);
    assert_eq!(eval.score, Some(7));
    assert_eq!(eval.summary, "Good run, skipped recovery.");
    assert_eq!(eval.wins, vec!["Ran before work"]);
    assert_eq!(eval.improvements, vec!["Stretch after runs"]);

    let call = &provider.calls()[0];
    assert!(call.options.json_mode);
    assert!(call.user.contains("Journal entries for 2025-08-04"));
    assert!(call.user.contains("Skipped stretching"));
    assert!(!call.user.contains("Rest day"));
}

#[tokio::test]
async fn test_evaluation_survives_echoed_entry_line() {
    let provider = MockLlmProvider::with_texts(&[
        "Looking at [2025-08-05 18:15] Rest day, walked 20 minutes:\n{\"score\": 6, \"summary\": \"Active recovery.\"}",
    ]);
    let service = service_with(provider);

    let eval = service.evaluate_day(&sample_journal(), None).await.unwrap();
    assert_eq!(eval.score, Some(6));
    assert_eq!(eval.summary, "Active recovery.");
}

#[tokio::test]
async fn test_evaluation_defaults_to_latest_day() {
    let provider = MockLlmProvider::with_texts(&[r#"{"score": 5, "summary": "Rest is fine."}"#]);
    let service = service_with(provider);

    let eval = service.evaluate_day(&sample_journal(), None).await.unwrap();
    assert_eq!(eval.date, NaiveDate::from_ymd_opt(2025, 8, 5).unwrap());
    assert_eq!(eval.score, Some(5));
}

#[tokio::test]
async fn test_unstructured_evaluation_keeps_text() {
    let provider = MockLlmProvider::with_texts(&["You did well today. Keep it up."]);
    let service = service_with(provider);

    let eval = service.evaluate_day(&sample_journal(), None).await.unwrap();
    assert_eq!(eval.score, None);
    assert_eq!(eval.summary, "You did well today. Keep it up.");
    assert!(eval.wins.is_empty());
}

#[tokio::test]
async fn test_evaluation_of_empty_day_makes_no_call() {
    let provider = MockLlmProvider::with_texts(&[]);
    let service = service_with(provider.clone());
    let day = NaiveDate::from_ymd_opt(2025, 8, 9).unwrap();

    let err = service
        .evaluate_day(&sample_journal(), Some(day))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(provider.calls().is_empty());
}
