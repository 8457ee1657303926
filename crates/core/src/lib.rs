//! Journal Coach Core
//!
//! Foundational types for the Journal Coach workspace. This crate has no
//! dependency on the LLM provider layer or the coaching service.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `journal` - Journals, dated entries and the excerpts handed to the model
//! - `elapsed` - Days/hours/minutes/seconds counter since a start instant

pub mod elapsed;
pub mod error;
pub mod journal;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Journal Model ──────────────────────────────────────────────────────
pub use journal::{Journal, JournalEntry};

// ── Elapsed Counter ────────────────────────────────────────────────────
pub use elapsed::ElapsedTime;
