//! Journal Coach
//!
//! AI coaching for personal journals. It includes:
//! - Configuration from environment and an optional TOML file
//! - The coaching service: prompts, model output parsing, plan step
//!   refinement with backfill, and a content-hash response cache
//! - Error types shared by the library and the CLI

pub mod config;
pub mod services;
pub mod utils;

pub use config::{CoachConfig, ConfigFile};
pub use journal_coach_core::{ElapsedTime, Journal, JournalEntry};
pub use services::coach::{
    CoachService, CoachingContext, DailyEvaluation, GoalBreakdown, PlanStep, RequestKind,
    Suggestion,
};
pub use utils::error::{AppError, AppResult};
