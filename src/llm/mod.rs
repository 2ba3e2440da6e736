//! LLM planner abstraction.
//!
//! The meal-plan pipeline delegates actual meal selection and query parsing
//! to a generative model. The boundary is a trait taking a prompt plus a
//! JSON response schema and returning schema-shaped JSON, so tests can
//! inject a deterministic fake.

mod anthropic;
mod fake;

pub use anthropic::AnthropicPlanner;
pub use fake::FakePlanner;

use crate::config::LlmConfig;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Error type for planner operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Schema-constrained generation boundary.
///
/// Implementations must be stateless and thread-safe. The returned JSON is
/// expected to match `response_schema`; shape is enforced by the provider,
/// content correctness is not, so callers post-process.
#[async_trait]
pub trait Planner: Send + Sync + fmt::Debug {
    async fn invoke(&self, prompt: &str, response_schema: &Value) -> Result<Value, LlmError>;

    /// Provider name (e.g., "anthropic", "fake").
    fn provider_name(&self) -> &'static str;

    /// Model name (e.g., "claude-3-5-sonnet-20241022").
    fn model_name(&self) -> &str;
}

/// Build a planner from config. Unknown providers and a missing API key are
/// configuration errors, not fallbacks.
pub fn create_planner(config: &LlmConfig) -> Result<Box<dyn Planner>, LlmError> {
    match config.provider.as_str() {
        "fake" => Ok(Box::new(FakePlanner::default())),
        "anthropic" => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;
            Ok(Box::new(AnthropicPlanner::new(
                api_key,
                config.model.clone(),
                config.max_tokens,
            )))
        }
        other => Err(LlmError::NotConfigured(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    #[test]
    fn create_planner_rejects_unknown_provider() {
        let config = LlmConfig {
            provider: "openai".into(),
            api_key: None,
            model: "x".into(),
            max_tokens: 1024,
        };
        let err = create_planner(&config).unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn create_planner_requires_api_key_for_anthropic() {
        let config = LlmConfig {
            provider: "anthropic".into(),
            api_key: None,
            model: "x".into(),
            max_tokens: 1024,
        };
        let err = create_planner(&config).unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }
}
