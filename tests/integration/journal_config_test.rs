//! Journal File and Configuration Integration Tests

use chrono::{TimeZone, Utc};
use journal_coach::{CoachConfig, CoachService, ConfigFile, Journal};

use super::support::sample_journal;

#[tokio::test]
async fn test_journal_file_drives_offline_plan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fitness.json");
    std::fs::write(&path, serde_json::to_string_pretty(&sample_journal()).unwrap()).unwrap();

    let journal = Journal::load(&path).unwrap();
    assert_eq!(journal.entries.len(), 3);

    let service = CoachService::offline(CoachConfig::default());
    let plan = service
        .breakdown_goal(journal.goal.as_deref().unwrap(), &journal.recent_lines(5), None)
        .await
        .unwrap();
    assert_eq!(plan.goal, "Run a 10k");
    assert_eq!(plan.steps.len(), 5);
    assert!(plan.placeholder);
}

#[test]
fn test_journal_streak_display() {
    let journal = sample_journal();
    let now = Utc.with_ymd_and_hms(2025, 8, 11, 9, 1, 2).unwrap();
    assert_eq!(journal.streak_since_start(now).to_string(), "10:1:1:2");
}

#[test]
fn test_config_file_and_env_layering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coach.toml");
    std::fs::write(
        &path,
        "api_base = \"http://127.0.0.1:9\"\nplan_steps = 7\ncache_ttl_secs = 5\n",
    )
    .unwrap();

    let mut config = CoachConfig::default();
    config.apply_file(ConfigFile::load(&path).unwrap());
    config
        .apply_env(|key| match key {
            "AI_PLAN_STEPS" => Some("4".to_string()),
            _ => None,
        })
        .unwrap();

    assert_eq!(config.api_base, "http://127.0.0.1:9");
    assert_eq!(config.plan_steps, 4);
    assert_eq!(config.cache_ttl_secs, 5);
    assert!(!config.is_live());
}

#[tokio::test]
async fn test_configured_plan_length_is_default() {
    let config = CoachConfig {
        plan_steps: 6,
        ..CoachConfig::default()
    };
    let service = CoachService::offline(config);
    let plan = service.breakdown_goal("Learn Rust", "", None).await.unwrap();
    assert_eq!(plan.steps.len(), 6);
}
