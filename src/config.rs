//! Configuration
//!
//! Coaching configuration resolved from defaults, an optional TOML file and
//! the process environment, in that order of precedence (environment wins).

use std::path::Path;
use std::time::Duration;

use journal_coach_llm::types::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use journal_coach_llm::ProviderConfig;
use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// Allowed range for the number of steps in a goal breakdown.
pub const MIN_PLAN_STEPS: usize = 3;
pub const MAX_PLAN_STEPS: usize = 10;

/// Resolved configuration for the coaching service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachConfig {
    /// Groq API key; `None` runs the service offline with placeholder output
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// API host
    pub api_base: String,
    /// Chat model
    pub model: String,
    /// How long a cached result stays valid
    pub cache_ttl_secs: u64,
    /// Maximum number of cached results
    pub cache_capacity: u64,
    /// Default number of steps in a goal breakdown
    pub plan_steps: usize,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            cache_ttl_secs: 600,
            cache_capacity: 256,
            plan_steps: 5,
        }
    }
}

/// Partial configuration as read from a TOML file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub cache_ttl_secs: Option<u64>,
    pub cache_capacity: Option<u64>,
    pub plan_steps: Option<usize>,
}

impl ConfigFile {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))
    }
}

impl CoachConfig {
    /// Resolve configuration from an optional file plus the process environment.
    pub fn load(file: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();
        if let Some(path) = file {
            config.apply_file(ConfigFile::load(path)?);
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply a partial file configuration
    pub fn apply_file(&mut self, file: ConfigFile) {
        if let Some(key) = file.api_key {
            self.api_key = Some(key);
        }
        if let Some(base) = file.api_base {
            self.api_base = base;
        }
        if let Some(model) = file.model {
            self.model = model;
        }
        if let Some(ttl) = file.cache_ttl_secs {
            self.cache_ttl_secs = ttl;
        }
        if let Some(capacity) = file.cache_capacity {
            self.cache_capacity = capacity;
        }
        if let Some(steps) = file.plan_steps {
            self.plan_steps = clamp_steps(steps);
        }
        self.plan_steps = clamp_steps(self.plan_steps);
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Blank values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GROQ_API_KEY") {
            self.api_key = Some(key.trim().to_string());
        }
        if let Some(base) = get("GROQ_API_BASE") {
            self.api_base = base.trim().to_string();
        }
        if let Some(model) = get("GROQ_MODEL") {
            self.model = model.trim().to_string();
        }
        if let Some(ttl) = get("AI_CACHE_TTL") {
            self.cache_ttl_secs = parse_number("AI_CACHE_TTL", &ttl)?;
        }
        if let Some(capacity) = get("AI_CACHE_CAPACITY") {
            self.cache_capacity = parse_number("AI_CACHE_CAPACITY", &capacity)?;
        }
        if let Some(steps) = get("AI_PLAN_STEPS") {
            self.plan_steps = clamp_steps(parse_number("AI_PLAN_STEPS", &steps)?);
        }
        Ok(())
    }

    /// Whether a live provider can be built.
    pub fn is_live(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Provider configuration for the Groq client
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.api_key.clone(),
            base_url: self.api_base.clone(),
            model: self.model.clone(),
            ..ProviderConfig::default()
        }
    }
}

/// Clamp a requested plan length into the supported range.
pub fn clamp_steps(steps: usize) -> usize {
    steps.clamp(MIN_PLAN_STEPS, MAX_PLAN_STEPS)
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::config(format!("{} must be a non-negative integer, got {:?}", key, raw)))
}
