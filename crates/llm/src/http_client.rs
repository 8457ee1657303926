//! HTTP Client Factory
//!
//! Builds the reqwest client shared by a provider, with the configured timeouts.

use std::time::Duration;

use crate::types::{LlmError, LlmResult, ProviderConfig};

/// Build a `reqwest::Client` honoring the request and connect timeouts.
pub fn build_http_client(config: &ProviderConfig) -> LlmResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(concat!("journal-coach/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| LlmError::Other {
            message: format!("failed to build HTTP client: {}", e),
        })
}
