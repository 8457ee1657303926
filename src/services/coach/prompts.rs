//! Coaching Prompts
//!
//! System prompts and user-message builders for each request kind.

use super::types::PlanStep;

const NO_GOAL: &str = "(No explicit goal provided)";
const NO_ENTRIES: &str = "(No recent entries)";

/// System prompt for coaching suggestions.
pub const SUGGESTION_SYSTEM_PROMPT: &str = "You are a concise motivational coaching assistant. \
Given a user's stated goal and their most recent journal entry text (timestamped lines), produce: \n\
1. A brief encouragement (1 sentence).\n\
2. 2-3 concrete, achievable next actions for the next 24 hours (numbered).\n\
3. A single reflective question to prompt deeper thinking.\n\
Keep total length under 160 words. Avoid repeating the goal verbatim more than once.";

/// System prompt for goal breakdowns.
pub fn plan_system_prompt(steps: usize) -> String {
    format!(
        r#"You are a practical planning coach. Break the user's goal into exactly {steps} concrete, sequential steps.

Each step must have:
- "title": a short imperative action (under 12 words)
- "detail": one sentence on how to do it or why it matters

Rules:
1. Steps are ordered from first to last.
2. No two steps may describe the same action.
3. Do not restate the goal itself as a step.

Respond with ONLY a JSON object of the form:
{{"steps": [{{"title": "...", "detail": "..."}}]}}"#
    )
}

/// System prompt for daily evaluations.
pub const EVALUATION_SYSTEM_PROMPT: &str = r#"You are a supportive but honest coach reviewing one day of a user's journal against their goal.

Respond with ONLY a JSON object:
{"score": <integer 1-10 for progress toward the goal>,
 "summary": "<two sentences at most>",
 "wins": ["<what went well>"],
 "improvements": ["<one concrete change for tomorrow>"]}"#;

fn goal_or_placeholder(goal: Option<&str>) -> &str {
    goal.map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(NO_GOAL)
}

fn entries_or_placeholder(entries: &str) -> &str {
    let trimmed = entries.trim();
    if trimmed.is_empty() {
        NO_ENTRIES
    } else {
        trimmed
    }
}

/// User message for a coaching suggestion.
pub fn build_suggestion_prompt(
    goal: Option<&str>,
    recent_entries: &str,
    journal_name: Option<&str>,
) -> String {
    let mut prompt = String::new();
    if let Some(name) = journal_name.map(str::trim).filter(|n| !n.is_empty()) {
        prompt.push_str(&format!("Journal: {}\n", name));
    }
    prompt.push_str(&format!(
        "Goal: {}\n\n\
         Recent journal lines (latest first):\n{}\n\n\
         Craft the response following the required 3-section structure.",
        goal_or_placeholder(goal),
        entries_or_placeholder(recent_entries)
    ));
    prompt
}

/// User message for a goal breakdown.
pub fn build_plan_prompt(goal: &str, recent_entries: &str) -> String {
    let mut prompt = format!("Goal: {}\n", goal.trim());
    let entries = recent_entries.trim();
    if !entries.is_empty() {
        prompt.push_str(&format!(
            "\nWhat the user has written recently (latest first):\n{}\n",
            entries
        ));
    }
    prompt.push_str("\nReturn the JSON plan now.");
    prompt
}

/// Follow-up message asking for the steps a first answer was missing.
pub fn build_backfill_prompt(goal: &str, existing: &[PlanStep], missing: usize) -> String {
    let listed = existing
        .iter()
        .map(|s| format!("{}. {}", s.order, s.title))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Goal: {}\n\n\
         A plan already has these steps:\n{}\n\n\
         Provide exactly {} additional step(s) that come after these, \
         without repeating or rephrasing any existing step.\n\
         Respond with ONLY a JSON object of the form \
         {{\"steps\": [{{\"title\": \"...\", \"detail\": \"...\"}}]}}",
        goal.trim(),
        if listed.is_empty() { "(none)".to_string() } else { listed },
        missing
    )
}

/// User message for a daily evaluation.
pub fn build_evaluation_prompt(goal: Option<&str>, date: &str, day_entries: &str) -> String {
    format!(
        "Goal: {}\n\nJournal entries for {} (oldest first):\n{}\n\nEvaluate this day.",
        goal_or_placeholder(goal),
        date,
        entries_or_placeholder(day_entries)
    )
}
