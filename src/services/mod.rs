//! Services
//!
//! Business logic services for the application.

pub mod coach;

pub use coach::{CoachService, CoachingContext, DailyEvaluation, GoalBreakdown, PlanStep, Suggestion};
