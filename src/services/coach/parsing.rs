//! Model Output Parsing
//!
//! Pulls semi-structured data out of free-form model output. Models asked for
//! JSON still wrap it in prose or markdown fences, leave trailing commas, or
//! pick their own key names, so every reader here accepts a family of shapes.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// A plan step as read from model output, before cleanup and numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCandidate {
    pub title: String,
    pub detail: Option<String>,
    /// Position the model assigned explicitly, if any
    pub order: Option<u32>,
}

impl StepCandidate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: None,
            order: None,
        }
    }
}

/// Fields of a daily evaluation as read from model output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationParts {
    pub score: Option<u8>,
    pub summary: Option<String>,
    pub wins: Vec<String>,
    pub improvements: Vec<String>,
}

const STEP_ARRAY_KEYS: &[&str] = &["steps", "plan", "actions", "items"];
const STEP_TITLE_KEYS: &[&str] = &["title", "step", "name", "text", "action"];
const STEP_DETAIL_KEYS: &[&str] = &["detail", "details", "description", "why"];
const STEP_ORDER_KEYS: &[&str] = &["order", "step_number", "index", "number"];

const SUMMARY_KEYS: &[&str] = &["summary", "evaluation", "feedback", "assessment"];
const WINS_KEYS: &[&str] = &["wins", "strengths", "highlights"];
const IMPROVEMENT_KEYS: &[&str] = &["improvements", "suggestions", "next_steps", "tomorrow"];

fn trailing_comma_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([}\]])").expect("static regex"))
}

fn list_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:(?:step\s*)?(\d{1,2})\s*[.):]|[-*•])\s+(.+?)\s*$")
            .expect("static regex")
    })
}

fn first_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("static regex"))
}

/// Byte offset and body of the first fenced code block, when it looks like JSON.
fn fenced_block(text: &str) -> Option<(usize, &str)> {
    let start = text.find("```")? + 3;
    // Skip optional language identifier (e.g., "json")
    let body_start = start + text[start..].find('\n').map(|nl| nl + 1).unwrap_or(0);
    let body_end = body_start + text[body_start..].find("```")?;
    let raw = &text[body_start..body_end];
    let content = raw.trim();
    let offset = body_start + (raw.len() - raw.trim_start().len());
    (content.starts_with('{') || content.starts_with('[')).then_some((offset, content))
}

/// The bracketed span opened at position 0 of `span`.
fn span_from(span: &str) -> Option<&str> {
    match balanced_end(span) {
        Some(end) => Some(&span[..=end]),
        None => {
            // Unbalanced (often a truncated answer): fall back to the last closer.
            let closer = if span.starts_with('{') { '}' } else { ']' };
            span.rfind(closer).map(|end| &span[..=end])
        }
    }
}

/// Byte index of the bracket closing the one at position 0, ignoring brackets
/// inside string literals.
fn balanced_end(span: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in span.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a JSON span, retrying once with trailing commas removed.
fn parse_lenient(block: &str) -> Option<Value> {
    serde_json::from_str(block).ok().or_else(|| {
        let repaired = trailing_comma_regex().replace_all(block, "$1");
        serde_json::from_str(&repaired).ok()
    })
}

/// Every JSON value in model output, with the span it was read from.
///
/// A fenced block that parses comes first. After that each `{` or `[` is tried
/// in reading order: bracketed prose such as `[draft]` or an echoed
/// `[2025-08-04 07:30]` timestamp fails to parse and is skipped, and openers
/// nested inside an accepted value are not revisited.
pub fn json_values(text: &str) -> Vec<(&str, Value)> {
    let trimmed = text.trim();
    let mut found = Vec::new();
    let mut fence_range = None;

    if let Some((offset, block)) = fenced_block(trimmed) {
        if let Some(value) = parse_lenient(block) {
            fence_range = Some(offset..offset + block.len());
            found.push((block, value));
        }
    }

    let mut resume = 0;
    for (idx, _) in trimmed.match_indices(['{', '[']) {
        if idx < resume || fence_range.as_ref().is_some_and(|r| r.contains(&idx)) {
            continue;
        }
        let Some(block) = span_from(&trimmed[idx..]) else {
            continue;
        };
        if let Some(value) = parse_lenient(block) {
            resume = idx + block.len();
            found.push((block, value));
        }
    }
    found
}

/// Locate the first JSON payload in model output.
pub fn extract_json_block(text: &str) -> Option<&str> {
    json_values(text).into_iter().next().map(|(block, _)| block)
}

/// Extract and parse the first JSON value in model output.
pub fn parse_json_value(text: &str) -> Option<Value> {
    json_values(text).into_iter().next().map(|(_, value)| value)
}

fn first_str<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn first_value<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn as_order(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn step_from_value(value: &Value) -> Option<StepCandidate> {
    match value {
        Value::String(s) => Some(StepCandidate::new(s.trim())),
        Value::Object(obj) => {
            let title = first_str(obj, STEP_TITLE_KEYS)?;
            Some(StepCandidate {
                title: title.to_string(),
                detail: first_str(obj, STEP_DETAIL_KEYS).map(str::to_string),
                order: first_value(obj, STEP_ORDER_KEYS).and_then(as_order),
            })
        }
        _ => None,
    }
}

/// Read plan steps from any of the JSON shapes models produce.
///
/// Accepts an array of strings or step objects, or an object wrapping such an
/// array under a well-known key. A step object whose `step` field holds a
/// number (or numeric string) uses it as the explicit order.
pub fn coerce_steps(value: &Value) -> Vec<StepCandidate> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(obj) => match STEP_ARRAY_KEYS
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_array))
        {
            Some(items) => items,
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| {
            let mut candidate = step_from_value(item)?;
            if candidate.order.is_none() {
                if let Some(obj) = item.as_object() {
                    candidate.order = obj.get("step").and_then(as_order);
                }
            }
            Some(candidate)
        })
        .collect()
}

/// Fallback reader for numbered or bulleted lists in plain text.
pub fn parse_list_lines(text: &str) -> Vec<StepCandidate> {
    text.lines()
        .filter_map(|line| {
            let caps = list_line_regex().captures(line)?;
            let order = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let body = caps.get(2)?.as_str();
            let (title, detail) = split_bold_heading(body);
            Some(StepCandidate {
                title: title.to_string(),
                detail: detail.map(str::to_string),
                order,
            })
        })
        .collect()
}

/// Split `**Heading**: rest` into heading and rest.
fn split_bold_heading(body: &str) -> (&str, Option<&str>) {
    if let Some(inner) = body.strip_prefix("**") {
        if let Some(end) = inner.find("**") {
            let heading = inner[..end].trim().trim_end_matches(':');
            let rest = inner[end + 2..]
                .trim_start_matches([':', '-', ' ', '\u{2013}', '\u{2014}'])
                .trim();
            return (heading, Some(rest).filter(|r| !r.is_empty()));
        }
    }
    (body, None)
}

/// Read a score from a number or from text such as `"7/10"` or `"Score: 6"`.
///
/// Scores are rounded and clamped to 1..=10.
pub fn coerce_score(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => first_number_regex().find(s)?.as_str().parse().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(1.0, 10.0) as u8)
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(obj) => first_str(obj, STEP_TITLE_KEYS).map(str::to_string),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Read evaluation fields from a JSON object, tolerating alternate key names.
pub fn coerce_evaluation(value: &Value) -> Option<EvaluationParts> {
    let obj = value.as_object()?;
    Some(EvaluationParts {
        score: obj.get("score").or_else(|| obj.get("rating")).and_then(coerce_score),
        summary: first_str(obj, SUMMARY_KEYS).map(str::to_string),
        wins: first_value(obj, WINS_KEYS).map(string_list).unwrap_or_default(),
        improvements: first_value(obj, IMPROVEMENT_KEYS)
            .map(string_list)
            .unwrap_or_default(),
    })
}
