//! Coaching Types
//!
//! Request context and the result shapes returned by the coaching service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default completion budget for a coaching request.
pub const DEFAULT_MAX_TOKENS: u32 = 350;

/// The kind of coaching request. Part of every cache key so that different
/// requests over the same journal content never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Suggestion,
    GoalBreakdown,
    DailyEvaluation,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Suggestion => "suggestion",
            RequestKind::GoalBreakdown => "goal_breakdown",
            RequestKind::DailyEvaluation => "daily_evaluation",
        }
    }
}

/// Source content for a coaching request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingContext {
    pub goal: Option<String>,
    /// Recent entries as timestamped lines, latest first
    pub recent_entries: String,
    pub journal_name: Option<String>,
    pub max_tokens: u32,
}

impl CoachingContext {
    pub fn new(goal: Option<&str>, recent_entries: impl Into<String>) -> Self {
        Self {
            goal: goal.map(str::to_string),
            recent_entries: recent_entries.into(),
            journal_name: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_journal_name(mut self, name: impl Into<String>) -> Self {
        self.journal_name = Some(name.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Content hash identifying this request for caching.
    ///
    /// `extra` carries request-specific parameters (plan length, evaluated date).
    pub fn cache_key(&self, kind: RequestKind, extra: &str) -> String {
        let max_tokens = self.max_tokens.to_string();
        let parts: [&str; 6] = [
            kind.as_str(),
            self.goal.as_deref().unwrap_or(""),
            self.recent_entries.as_str(),
            self.journal_name.as_deref().unwrap_or(""),
            max_tokens.as_str(),
            extra,
        ];

        let mut hasher = Sha256::new();
        for part in parts {
            // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

/// A coaching suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    /// Served from the response cache
    #[serde(default)]
    pub cached: bool,
    /// Produced offline, without a model call
    #[serde(default)]
    pub placeholder: bool,
}

/// One step of a goal breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    /// 1-based position in the final plan
    pub order: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A goal broken down into ordered steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalBreakdown {
    pub goal: String,
    pub steps: Vec<PlanStep>,
    /// How many steps came from the backfill request
    #[serde(default)]
    pub backfilled: usize,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub placeholder: bool,
}

/// Assessment of one day's entries against the goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEvaluation {
    pub date: NaiveDate,
    /// 1..=10, `None` when the model gave no usable score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    pub summary: String,
    #[serde(default)]
    pub wins: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub placeholder: bool,
}
