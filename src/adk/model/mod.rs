// SPDX-License-Identifier: MIT

//! Model module - defines the LLM model trait and implementations
//!
//! This module provides the core Model trait and shared types.
//! Model implementations are in their own submodules:
//! - [anthropic] - Anthropic's Claude API
//! - [gemini] - Google's Gemini API
//! - [openai] - OpenAI's ChatGPT API

pub mod anthropic;
pub mod gemini;
pub mod openai;

use crate::adk::error::{BoxError, ModelError};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// Parts of a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Part {
    /// Regular text output from the model
    Text(String),
    /// Thinking/reasoning content from thinking models (e.g., Gemini's thinking mode)
    Thinking(String),
}

impl Content {
    /// A single-part text message
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Concatenated text parts, ignoring thinking output
    pub fn text_output(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text(t) => Some(t.as_str()),
                Part::Thinking(_) => None,
            })
            .collect()
    }

    /// First text part of a system message, if any
    pub fn system_instruction(history: &[Content]) -> Option<String> {
        history
            .iter()
            .find(|c| c.role == "system")
            .map(|c| c.text_output())
    }
}

/// POST `body` and return the decoded JSON reply
///
/// Non-2xx replies become `ModelError::Api` carrying the response text.
pub(crate) async fn send_json<B: Serialize>(
    request: RequestBuilder,
    provider: &str,
    body: &B,
) -> Result<serde_json::Value, BoxError> {
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "{} request body: {}",
            provider,
            serde_json::to_string_pretty(body).unwrap_or_default()
        );
    }

    let resp = request.json(body).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await?;
        return Err(Box::new(ModelError::Api {
            provider: provider.to_string(),
            message: format!("{}: {}", status, text),
        }));
    }

    let json: serde_json::Value = resp.json().await?;
    log::debug!("{} response: {}", provider, json);
    Ok(json)
}

/// Core trait for LLM model implementations
#[async_trait]
pub trait Model: Send + Sync {
    /// Provider label used in logs and errors
    fn provider(&self) -> &str;

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content, BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_output_skips_thinking() {
        let content = Content {
            role: "model".to_string(),
            parts: vec![
                Part::Thinking("hmm".to_string()),
                Part::Text("Day 1: ".to_string()),
                Part::Text("oats".to_string()),
            ],
        };
        assert_eq!(content.text_output(), "Day 1: oats");
    }

    #[test]
    fn test_system_instruction_lookup() {
        let history = vec![
            Content::text("system", "You are a critic."),
            Content::text("user", "draft"),
        ];
        assert_eq!(
            Content::system_instruction(&history),
            Some("You are a critic.".to_string())
        );
        assert_eq!(Content::system_instruction(&history[1..]), None);
    }
}
