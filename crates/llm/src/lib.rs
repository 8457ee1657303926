//! Journal Coach LLM
//!
//! Provides a small provider interface over chat-completion APIs:
//! - Groq (OpenAI-compatible `/openai/v1/chat/completions`)
//!
//! Also includes the HTTP client factory and the shared request/response types.

pub mod groq;
pub mod http_client;
pub mod provider;
pub mod types;

// Re-export main types
pub use groq::GroqProvider;
pub use http_client::build_http_client;
pub use provider::LlmProvider;
pub use types::*;
