// SPDX-License-Identifier: MIT

//! Model construction from configuration

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::adk::error::ModelError;
use crate::adk::model::anthropic::AnthropicModel;
use crate::adk::model::gemini::GeminiModel;
use crate::adk::model::openai::OpenAIModel;
use crate::adk::model::Model;
use crate::planner::config::ModelSettings;

/// Completion providers the planner can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAI,
    Anthropic,
}

impl Provider {
    /// Guess the provider from a model name, falling back to Gemini
    pub fn infer(model_name: &str) -> Self {
        let name = model_name.to_lowercase();
        let name = name.trim_start_matches("models/");
        if name.starts_with("gpt") || name.starts_with("o1") || name.starts_with("o3") {
            Provider::OpenAI
        } else if name.starts_with("claude") {
            Provider::Anthropic
        } else {
            Provider::Gemini
        }
    }
}

impl FromStr for Provider {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAI),
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            _ => Err(ModelError::UnsupportedProvider(s.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Gemini => "Gemini",
            Provider::OpenAI => "OpenAI",
            Provider::Anthropic => "Anthropic",
        };
        f.write_str(name)
    }
}

/// Resolve the provider for `settings`
///
/// An explicit, non-empty provider wins over the model-name prefix.
pub fn resolve_provider(settings: &ModelSettings) -> Result<Provider, ModelError> {
    match settings.provider.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.parse(),
        _ => Ok(Provider::infer(&settings.model_name)),
    }
}

/// Create the model named by `settings`
pub fn create_model(settings: &ModelSettings) -> Result<Arc<dyn Model>, ModelError> {
    let provider = resolve_provider(settings)?;
    let model_name = settings.model_name.clone();
    log::debug!("Using provider '{}' with model '{}'", provider, model_name);

    Ok(match provider {
        Provider::Gemini => Arc::new(GeminiModel::new(model_name)?),
        Provider::OpenAI => Arc::new(OpenAIModel::new(model_name)?),
        Provider::Anthropic => Arc::new(AnthropicModel::new(model_name)?),
    })
}
