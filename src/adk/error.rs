// SPDX-License-Identifier: MIT

//! Typed error handling for mealplan-rs
//!
//! `PlannerError` is what a workflow run surfaces to its caller. Provider
//! errors (`ModelError`, `SearchError`) travel boxed through the `Model` and
//! `SearchService` traits and are wrapped, not rewritten, when they abort a run.

use thiserror::Error;

/// Boxed error used at the external-service seams
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for mealplan-rs
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Rejected before the workflow starts (empty task, zero revision budget)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A step was reached in a state the workflow wiring should never produce
    #[error("Precondition violated in {step}: {message}")]
    Precondition { step: String, message: String },

    /// The completion service failed
    #[error("Completion service failed during {step}: {source}")]
    Completion {
        step: String,
        #[source]
        source: BoxError,
    },

    /// The search service failed
    #[error("Search failed for query '{query}': {source}")]
    Search {
        query: String,
        #[source]
        source: BoxError,
    },

    /// An external call exceeded the configured timeout
    #[error("{step} timed out after {secs}s")]
    Timeout { step: String, secs: u64 },

    /// The run finished without producing a draft
    #[error("No draft produced")]
    NoDraft,

    /// Resume or inspection of a thread with no checkpoints
    #[error("Thread '{0}' not found")]
    ThreadNotFound(String),

    /// Configuration errors (missing env vars, invalid config)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Provider not supported
    #[error("Model provider not supported: {0}")]
    UnsupportedProvider(String),

    /// Non-success status from the provider
    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

/// Search-provider errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// API key not configured
    #[error("API key not configured for search provider: {0}")]
    ApiKeyMissing(String),

    /// Provider not supported
    #[error("Search provider not supported: {0}")]
    UnsupportedProvider(String),

    /// Non-success status from the provider
    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    /// Invalid response from the provider
    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}

impl PlannerError {
    /// Create an input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a precondition error
    pub fn precondition(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Precondition {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Wrap a completion-service failure
    pub fn completion(step: impl Into<String>, source: BoxError) -> Self {
        Self::Completion {
            step: step.into(),
            source,
        }
    }

    /// Wrap a search-service failure
    pub fn search(query: impl Into<String>, source: BoxError) -> Self {
        Self::Search {
            query: query.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True for failures raised by the completion or search services
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::Completion { .. } | Self::Search { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_error_keeps_source_message() {
        let source: BoxError = Box::new(ModelError::Api {
            provider: "Gemini".to_string(),
            message: "quota exceeded".to_string(),
        });
        let err = PlannerError::completion("plan", source);

        assert_eq!(
            err.to_string(),
            "Completion service failed during plan: Gemini API error: quota exceeded"
        );
        assert!(err.is_external());
        let inner = std::error::Error::source(&err).unwrap();
        assert_eq!(inner.to_string(), "Gemini API error: quota exceeded");
    }

    #[test]
    fn test_precondition_is_not_external() {
        let err = PlannerError::precondition("critique", "draft is empty");
        assert_eq!(
            err.to_string(),
            "Precondition violated in critique: draft is empty"
        );
        assert!(!err.is_external());
    }

    #[test]
    fn test_timeout_display() {
        let err = PlannerError::Timeout {
            step: "draft".to_string(),
            secs: 30,
        };
        assert_eq!(err.to_string(), "draft timed out after 30s");
        assert!(err.is_external());
    }
}
