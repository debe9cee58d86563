//! Environment-driven configuration
//!
//! All knobs come from the process environment (a `.env` file is honored
//! by the binary before this runs).

use crate::error::AgentError;
use crate::Result;
use std::env;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_TURNS: u32 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_QUERY_DEADLINE_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Upper bound on model round-trips per query.
    pub max_turns: u32,
    /// Timeout for a single completion round-trip.
    pub request_timeout: Duration,
    /// Overall wall-clock budget for one query.
    pub query_deadline: Duration,
}

impl AgentConfig {
    /// Read configuration from the environment. Only the API key is
    /// mandatory; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| AgentError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let max_turns = parse_env("AGENT_MAX_TURNS", DEFAULT_MAX_TURNS)?;
        let request_timeout_secs =
            parse_env("AGENT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let query_deadline_secs =
            parse_env("AGENT_QUERY_DEADLINE_SECS", DEFAULT_QUERY_DEADLINE_SECS)?;

        Ok(Self {
            api_key,
            model,
            base_url,
            max_turns,
            request_timeout: Duration::from_secs(request_timeout_secs),
            query_deadline: Duration::from_secs(query_deadline_secs),
        })
    }

    /// Loop parameters with defaults and no credentials, for local use
    /// against a scripted backend.
    pub fn for_tests() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            query_deadline: Duration::from_secs(DEFAULT_QUERY_DEADLINE_SECS),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AgentError::Config(format!("{} has invalid value '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_tests() {
        let config = AgentConfig::for_tests();
        assert_eq!(config.max_turns, 5);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
