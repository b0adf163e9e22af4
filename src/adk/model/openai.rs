// SPDX-License-Identifier: MIT

//! OpenAI Model - Chat Completions API

use super::{send_json, Content, GenerationConfig, Model, Part};
use crate::adk::error::{BoxError, ModelError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat model
pub struct OpenAIModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl OpenAIModel {
    /// Requires `OPENAI_API_KEY`; `OPENAI_BASE_URL` points at compatible endpoints.
    pub fn new(model_name: String) -> Result<Self, ModelError> {
        let api_key =
            env::var("OPENAI_API_KEY").map_err(|_| ModelError::ApiKeyMissing("OpenAI".into()))?;
        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
            base_url,
        })
    }

    fn to_message(content: &Content) -> ChatMessage {
        let role = match content.role.as_str() {
            "model" => "assistant",
            other => other,
        };
        ChatMessage {
            role: role.to_string(),
            content: Some(content.text_output()),
        }
    }

    fn build_request<'a>(
        &'a self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model_name,
            messages: history.iter().map(Self::to_message).collect(),
            temperature: config.and_then(|c| c.temperature),
            max_tokens: config.and_then(|c| c.max_output_tokens),
            top_p: config.and_then(|c| c.top_p),
        }
    }

    fn parse_response(json: serde_json::Value) -> Result<Content, ModelError> {
        let response: ChatResponse = serde_json::from_value(json)
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("No choices in OpenAI response".into()))?;

        if let Some(reason) = &choice.finish_reason {
            log::debug!("OpenAI finish reason: {}", reason);
        }

        let parts = choice
            .message
            .content
            .filter(|text| !text.is_empty())
            .map(Part::Text)
            .into_iter()
            .collect();
        Ok(Content {
            role: "model".to_string(),
            parts,
        })
    }
}

#[async_trait]
impl Model for OpenAIModel {
    fn provider(&self) -> &str {
        "OpenAI"
    }

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content, BoxError> {
        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key);
        let json = send_json(request, self.provider(), &self.build_request(history, config)).await?;
        Ok(Self::parse_response(json)?)
    }
}
