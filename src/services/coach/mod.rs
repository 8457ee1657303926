//! Coaching Service
//!
//! Produces coaching suggestions, goal breakdowns and daily evaluations from
//! journal content. Each request builds a prompt, calls the chat-completion
//! provider, post-processes the free-form answer into a typed result and
//! caches it by content hash.
//!
//! Without an API key the service runs offline and returns deterministic
//! placeholder results without touching the network.

pub mod cache;
pub mod parsing;
pub mod prompts;
pub mod steps;
pub mod types;

use std::sync::Arc;

use chrono::NaiveDate;
use journal_coach_core::Journal;
use journal_coach_llm::{GroqProvider, LlmProvider, LlmRequestOptions, Message};
use tracing::{debug, info, warn};

use crate::config::{clamp_steps, CoachConfig};
use crate::utils::error::{AppError, AppResult};

use cache::{CachedResponse, ResponseCache};
use parsing::{
    coerce_evaluation, coerce_steps, json_values, parse_list_lines, EvaluationParts, StepCandidate,
};
use prompts::{
    build_backfill_prompt, build_evaluation_prompt, build_plan_prompt, build_suggestion_prompt,
    plan_system_prompt, EVALUATION_SYSTEM_PROMPT, SUGGESTION_SYSTEM_PROMPT,
};
use steps::{merge_backfill, refine_steps};

pub use types::{
    CoachingContext, DailyEvaluation, GoalBreakdown, PlanStep, RequestKind, Suggestion,
};

/// Default number of newest entries given to the model for a suggestion.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Completion budget for a daily evaluation.
const EVALUATION_MAX_TOKENS: u32 = 400;

const PLACEHOLDER_SUGGESTION: &str = "[Placeholder suggestion]\n\
Set GROQ_API_KEY to get live AI coaching. Meanwhile: Focus on one small, high-impact action \
you can finish today; write it down with a time block.";

const PLACEHOLDER_STEPS: &[&str] = &[
    "Write down what done looks like",
    "Pick the smallest first action and schedule it",
    "Block a recurring time slot for the work",
    "Log progress in your journal every day",
    "Review the week and adjust the next steps",
    "Remove one obstacle that slowed you down",
    "Ask someone to hold you accountable",
    "Raise the difficulty of the daily action",
    "Prepare for the final push",
    "Celebrate and record what you learned",
];

/// Completion budget for a plan of `steps` steps.
fn plan_max_tokens(steps: usize) -> u32 {
    120 + 60 * steps as u32
}

/// Coaching service over an optional chat-completion provider.
pub struct CoachService {
    provider: Option<Arc<dyn LlmProvider>>,
    cache: ResponseCache,
    config: CoachConfig,
}

impl CoachService {
    /// Build the service from configuration, going offline without an API key.
    pub fn new(config: CoachConfig) -> AppResult<Self> {
        let provider: Option<Arc<dyn LlmProvider>> = if config.is_live() {
            Some(Arc::new(GroqProvider::new(config.provider_config())?))
        } else {
            info!("GROQ_API_KEY not set; coaching runs offline with placeholder output");
            None
        };
        Ok(Self::build(provider, config))
    }

    /// Build the service around an existing provider.
    pub fn with_provider(provider: Arc<dyn LlmProvider>, config: CoachConfig) -> Self {
        Self::build(Some(provider), config)
    }

    /// Build an offline service.
    pub fn offline(config: CoachConfig) -> Self {
        Self::build(None, config)
    }

    fn build(provider: Option<Arc<dyn LlmProvider>>, config: CoachConfig) -> Self {
        let cache = ResponseCache::new(config.cache_ttl(), config.cache_capacity);
        Self {
            provider,
            cache,
            config,
        }
    }

    pub fn is_live(&self) -> bool {
        self.provider.is_some()
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }

    /// Verify the provider is reachable. Offline services are always healthy.
    pub async fn health_check(&self) -> AppResult<()> {
        match &self.provider {
            Some(provider) => Ok(provider.health_check().await?),
            None => Ok(()),
        }
    }

    /// One model call, returning the trimmed text of the answer.
    async fn complete(
        &self,
        provider: &Arc<dyn LlmProvider>,
        kind: RequestKind,
        system: &str,
        user: String,
        options: LlmRequestOptions,
    ) -> AppResult<String> {
        info!(
            kind = kind.as_str(),
            provider = provider.name(),
            model = provider.model(),
            "requesting completion"
        );
        let response = provider
            .send_message(vec![Message::user(user)], Some(system.to_string()), options)
            .await?;

        debug!(
            kind = kind.as_str(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            truncated = response.is_truncated(),
            "completion received"
        );

        response.text().map(str::to_string).ok_or_else(|| {
            AppError::parse(format!(
                "model returned no text (model: {}, stop_reason: {:?})",
                response.model, response.stop_reason
            ))
        })
    }

    /// Coaching suggestion for the context's goal and recent entries.
    pub async fn suggest(&self, ctx: &CoachingContext) -> AppResult<Suggestion> {
        let key = ctx.cache_key(RequestKind::Suggestion, "");
        if let Some(CachedResponse::Suggestion(hit)) = self.cache.get(&key) {
            debug!("suggestion cache hit");
            return Ok(Suggestion {
                cached: true,
                ..hit
            });
        }

        let Some(provider) = &self.provider else {
            return Ok(Suggestion {
                text: PLACEHOLDER_SUGGESTION.to_string(),
                cached: false,
                placeholder: true,
            });
        };

        let prompt = build_suggestion_prompt(
            ctx.goal.as_deref(),
            &ctx.recent_entries,
            ctx.journal_name.as_deref(),
        );
        let options = LlmRequestOptions {
            max_tokens_override: Some(ctx.max_tokens),
            ..Default::default()
        };
        let text = self
            .complete(
                provider,
                RequestKind::Suggestion,
                SUGGESTION_SYSTEM_PROMPT,
                prompt,
                options,
            )
            .await?;

        let suggestion = Suggestion {
            text,
            cached: false,
            placeholder: false,
        };
        self.cache
            .insert(key, CachedResponse::Suggestion(suggestion.clone()));
        Ok(suggestion)
    }

    /// Suggestion for a journal's goal and its newest `limit` entries.
    pub async fn suggest_for_journal(&self, journal: &Journal, limit: usize) -> AppResult<Suggestion> {
        let ctx = CoachingContext::new(journal.goal.as_deref(), journal.recent_lines(limit))
            .with_journal_name(journal.name.clone());
        self.suggest(&ctx).await
    }

    /// Break a goal into an ordered plan of steps.
    ///
    /// `steps` defaults to the configured plan length and is clamped into the
    /// supported range. When the first answer yields fewer usable steps than
    /// requested, one backfill request asks for the remainder; a failed
    /// backfill keeps the partial plan.
    pub async fn breakdown_goal(
        &self,
        goal: &str,
        recent_entries: &str,
        steps: Option<usize>,
    ) -> AppResult<GoalBreakdown> {
        let goal = goal.trim();
        if goal.is_empty() {
            return Err(AppError::validation("goal is empty"));
        }
        let wanted = clamp_steps(steps.unwrap_or(self.config.plan_steps));
        let max_tokens = plan_max_tokens(wanted);

        let ctx = CoachingContext::new(Some(goal), recent_entries).with_max_tokens(max_tokens);
        let key = ctx.cache_key(RequestKind::GoalBreakdown, &wanted.to_string());
        if let Some(CachedResponse::GoalBreakdown(hit)) = self.cache.get(&key) {
            debug!("goal breakdown cache hit");
            return Ok(GoalBreakdown { cached: true, ..hit });
        }

        let Some(provider) = &self.provider else {
            return Ok(placeholder_breakdown(goal, wanted));
        };

        let text = self
            .complete(
                provider,
                RequestKind::GoalBreakdown,
                &plan_system_prompt(wanted),
                build_plan_prompt(goal, recent_entries),
                LlmRequestOptions::json(max_tokens),
            )
            .await?;

        let plan = refine_steps(read_steps(&text), goal, wanted);
        if plan.is_empty() {
            return Err(AppError::parse(format!(
                "no usable plan steps in model output (starts with: {:?})",
                text.chars().take(120).collect::<String>()
            )));
        }

        let (plan, backfilled) = if plan.len() < wanted {
            let missing = wanted - plan.len();
            warn!(
                have = plan.len(),
                missing, "plan came back short; requesting backfill"
            );
            match self
                .complete(
                    provider,
                    RequestKind::GoalBreakdown,
                    &plan_system_prompt(missing),
                    build_backfill_prompt(goal, &plan, missing),
                    LlmRequestOptions::json(plan_max_tokens(missing)),
                )
                .await
            {
                Ok(extra_text) => merge_backfill(plan, read_steps(&extra_text), goal, wanted),
                Err(e) => {
                    warn!(error = %e, "backfill request failed; keeping partial plan");
                    (plan, 0)
                }
            }
        } else {
            (plan, 0)
        };

        let breakdown = GoalBreakdown {
            goal: goal.to_string(),
            steps: plan,
            backfilled,
            cached: false,
            placeholder: false,
        };
        self.cache
            .insert(key, CachedResponse::GoalBreakdown(breakdown.clone()));
        Ok(breakdown)
    }

    /// Evaluate one day of a journal against its goal.
    ///
    /// `date` defaults to the day of the newest entry.
    pub async fn evaluate_day(
        &self,
        journal: &Journal,
        date: Option<NaiveDate>,
    ) -> AppResult<DailyEvaluation> {
        let date = match date.or_else(|| journal.latest_day()) {
            Some(date) => date,
            None => return Err(AppError::validation("journal has no entries")),
        };
        let day_lines = journal.day_lines(date);
        if day_lines.is_empty() {
            return Err(AppError::validation(format!("no entries on {}", date)));
        }

        let ctx = CoachingContext::new(journal.goal.as_deref(), day_lines)
            .with_journal_name(journal.name.clone())
            .with_max_tokens(EVALUATION_MAX_TOKENS);
        let date_str = date.format("%Y-%m-%d").to_string();
        let key = ctx.cache_key(RequestKind::DailyEvaluation, &date_str);
        if let Some(CachedResponse::DailyEvaluation(hit)) = self.cache.get(&key) {
            debug!("daily evaluation cache hit");
            return Ok(DailyEvaluation { cached: true, ..hit });
        }

        let Some(provider) = &self.provider else {
            return Ok(placeholder_evaluation(date, journal.entries_on(date).len()));
        };

        let text = self
            .complete(
                provider,
                RequestKind::DailyEvaluation,
                EVALUATION_SYSTEM_PROMPT,
                build_evaluation_prompt(ctx.goal.as_deref(), &date_str, &ctx.recent_entries),
                LlmRequestOptions::json(EVALUATION_MAX_TOKENS),
            )
            .await?;

        let evaluation = match read_evaluation(&text) {
            Some(parts) => DailyEvaluation {
                date,
                score: parts.score,
                summary: parts.summary.unwrap_or_default(),
                wins: parts.wins,
                improvements: parts.improvements,
                cached: false,
                placeholder: false,
            },
            _ => {
                warn!("evaluation was not structured; keeping the raw text as summary");
                DailyEvaluation {
                    date,
                    score: None,
                    summary: text,
                    wins: Vec::new(),
                    improvements: Vec::new(),
                    cached: false,
                    placeholder: false,
                }
            }
        };

        self.cache
            .insert(key, CachedResponse::DailyEvaluation(evaluation.clone()));
        Ok(evaluation)
    }
}

/// Step candidates from model output: the first JSON value holding steps,
/// list lines as fallback.
fn read_steps(text: &str) -> Vec<StepCandidate> {
    let from_json = json_values(text)
        .into_iter()
        .map(|(_, value)| coerce_steps(&value))
        .find(|steps| !steps.is_empty());
    if let Some(steps) = from_json {
        return steps;
    }
    warn!("no JSON steps in model output; falling back to list lines");
    parse_list_lines(text)
}

/// Evaluation fields from the first JSON object carrying a score or summary.
fn read_evaluation(text: &str) -> Option<EvaluationParts> {
    json_values(text)
        .into_iter()
        .filter_map(|(_, value)| coerce_evaluation(&value))
        .find(|parts| parts.summary.is_some() || parts.score.is_some())
}

fn placeholder_breakdown(goal: &str, steps: usize) -> GoalBreakdown {
    let steps = PLACEHOLDER_STEPS
        .iter()
        .take(steps)
        .enumerate()
        .map(|(idx, title)| PlanStep {
            order: idx as u32 + 1,
            title: title.to_string(),
            detail: None,
        })
        .collect();
    GoalBreakdown {
        goal: goal.to_string(),
        steps,
        backfilled: 0,
        cached: false,
        placeholder: true,
    }
}

fn placeholder_evaluation(date: NaiveDate, entries: usize) -> DailyEvaluation {
    DailyEvaluation {
        date,
        score: None,
        summary: format!(
            "[Placeholder evaluation]\nSet GROQ_API_KEY to get live AI evaluations. \
             You wrote {} entr{} on {}.",
            entries,
            if entries == 1 { "y" } else { "ies" },
            date
        ),
        wins: Vec::new(),
        improvements: vec![
            "Pick one small action for tomorrow and give it a time block.".to_string(),
        ],
        cached: false,
        placeholder: true,
    }
}
