// SPDX-License-Identifier: MIT

//! Anthropic Model - Messages API

use super::{send_json, Content, GenerationConfig, Model, Part};
use crate::adk::error::{BoxError, ModelError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic Claude model
pub struct AnthropicModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    /// Required by the API
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: Vec<Block>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<Block>,
    #[serde(default)]
    stop_reason: Option<String>,
}

impl AnthropicModel {
    /// Requires `ANTHROPIC_API_KEY`; `ANTHROPIC_BASE_URL` overrides the endpoint.
    pub fn new(model_name: String) -> Result<Self, ModelError> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ModelError::ApiKeyMissing("Anthropic".into()))?;
        let base_url = env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
            base_url,
        })
    }

    /// System turns travel in the top-level `system` field instead
    fn to_message(content: &Content) -> Option<Message> {
        let role = match content.role.as_str() {
            "system" => return None,
            "model" | "assistant" => "assistant",
            _ => "user",
        };
        let blocks: Vec<Block> = content
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => Block::Text { text: text.clone() },
                Part::Thinking(thinking) => Block::Thinking {
                    thinking: thinking.clone(),
                },
            })
            .collect();

        (!blocks.is_empty()).then_some(Message {
            role,
            content: blocks,
        })
    }

    fn build_request<'a>(
        &'a self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model_name,
            max_tokens: config
                .and_then(|c| c.max_output_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            messages: history.iter().filter_map(Self::to_message).collect(),
            system: Content::system_instruction(history),
            temperature: config.and_then(|c| c.temperature),
            top_p: config.and_then(|c| c.top_p),
            top_k: config.and_then(|c| c.top_k),
        }
    }

    fn parse_response(json: serde_json::Value) -> Result<Content, ModelError> {
        let response: MessagesResponse = serde_json::from_value(json)
            .map_err(|e| ModelError::InvalidResponse(format!("Anthropic response: {}", e)))?;

        if let Some(reason) = &response.stop_reason {
            log::debug!("Anthropic stop reason: {}", reason);
        }

        let parts = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                Block::Text { text } if !text.is_empty() => Some(Part::Text(text)),
                Block::Thinking { thinking } if !thinking.is_empty() => {
                    Some(Part::Thinking(thinking))
                }
                _ => None,
            })
            .collect();
        Ok(Content {
            role: "model".to_string(),
            parts,
        })
    }
}

#[async_trait]
impl Model for AnthropicModel {
    fn provider(&self) -> &str {
        "Anthropic"
    }

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content, BoxError> {
        let request = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION);
        let json = send_json(request, self.provider(), &self.build_request(history, config)).await?;
        Ok(Self::parse_response(json)?)
    }
}
