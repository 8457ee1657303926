//! Plan Step Refinement
//!
//! Turns raw step candidates into a clean, numbered plan: strips list
//! decoration, drops empty and duplicate steps, honors explicit ordering, and
//! merges in steps obtained from a backfill request.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::parsing::StepCandidate;
use super::types::PlanStep;

/// Titles shorter than this (in characters) are noise such as "a." or "-".
const MIN_TITLE_CHARS: usize = 3;

fn list_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:(?:step\s*)?\d{1,2}\s*[.):]\s*|[-*•]\s+)").expect("static regex")
    })
}

/// Strip numbering, bullets, markdown emphasis and wrapping quotes.
pub fn clean_title(raw: &str) -> String {
    let without_marker = list_marker_regex().replace(raw.trim(), "");
    without_marker
        .replace("**", "")
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim_end_matches(|c: char| c == '.' || c == ';' || c == ',' || c.is_whitespace())
        .trim()
        .to_string()
}

/// Case- and punctuation-insensitive key used to detect duplicate steps.
pub fn normalize_key(title: &str) -> String {
    title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn clean_detail(detail: Option<String>) -> Option<String> {
    detail
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Clean candidates and keep those worth showing, in their final order.
///
/// Returns the surviving candidates with cleaned titles; `seen` accumulates
/// the dedup keys so that later merges can reject repeats.
fn accept(
    candidates: Vec<StepCandidate>,
    goal_key: &str,
    seen: &mut HashSet<String>,
) -> Vec<StepCandidate> {
    let mut kept = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let title = clean_title(&candidate.title);
        if title.chars().count() < MIN_TITLE_CHARS {
            continue;
        }
        let key = normalize_key(&title);
        if key.is_empty() || key == goal_key {
            continue;
        }
        if !seen.insert(key) {
            continue;
        }
        kept.push(StepCandidate {
            title,
            detail: clean_detail(candidate.detail),
            order: candidate.order,
        });
    }
    kept
}

fn number(steps: impl IntoIterator<Item = StepCandidate>) -> Vec<PlanStep> {
    steps
        .into_iter()
        .enumerate()
        .map(|(idx, c)| PlanStep {
            order: idx as u32 + 1,
            title: c.title,
            detail: c.detail,
        })
        .collect()
}

/// Filter, deduplicate, reorder and number step candidates.
///
/// Explicit model-provided ordering is only trusted when every surviving
/// candidate carries one; the sort is stable so ties keep model order.
pub fn refine_steps(candidates: Vec<StepCandidate>, goal: &str, limit: usize) -> Vec<PlanStep> {
    let goal_key = normalize_key(goal);
    let mut seen = HashSet::new();
    let mut kept = accept(candidates, &goal_key, &mut seen);

    if !kept.is_empty() && kept.iter().all(|c| c.order.is_some()) {
        kept.sort_by_key(|c| c.order);
    }
    kept.truncate(limit);

    number(kept)
}

/// Append backfilled steps that do not repeat existing ones, up to `limit`.
///
/// Returns the merged plan and the number of steps that were added.
pub fn merge_backfill(
    existing: Vec<PlanStep>,
    extra: Vec<StepCandidate>,
    goal: &str,
    limit: usize,
) -> (Vec<PlanStep>, usize) {
    let goal_key = normalize_key(goal);
    let mut seen: HashSet<String> = existing.iter().map(|s| normalize_key(&s.title)).collect();
    let room = limit.saturating_sub(existing.len());

    let mut added = accept(extra, &goal_key, &mut seen);
    added.truncate(room);
    let added_count = added.len();

    let merged = existing
        .into_iter()
        .map(|s| StepCandidate {
            title: s.title,
            detail: s.detail,
            order: None,
        })
        .chain(added);

    (number(merged), added_count)
}
