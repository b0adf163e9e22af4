// SPDX-License-Identifier: MIT

//! Gemini Model - generateContent API

use super::{send_json, Content, GenerationConfig, Model, Part};
use crate::adk::error::{BoxError, ModelError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::env;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini model implementation
pub struct GeminiModel {
    client: Client,
    api_key: String,
    model_name: String,
}

impl GeminiModel {
    /// Create a new GeminiModel
    ///
    /// Requires `GOOGLE_API_KEY` environment variable to be set.
    pub fn new(model_name: String) -> Result<Self, ModelError> {
        let api_key =
            env::var("GOOGLE_API_KEY").map_err(|_| ModelError::ApiKeyMissing("Gemini".into()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
        })
    }

    /// Build the generateContent request body
    ///
    /// Gemini takes the system message as `systemInstruction`, not as a turn.
    fn build_request_body(
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> serde_json::Value {
        let contents: Vec<serde_json::Value> = history
            .iter()
            .filter(|c| c.role != "system")
            .map(|c| {
                let parts: Vec<serde_json::Value> =
                    c.parts.iter().filter_map(part_to_gemini_json).collect();
                json!({ "role": c.role, "parts": parts })
            })
            .collect();

        let mut body = json!({ "contents": contents });

        if let Some(system) = Content::system_instruction(history) {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        if let Some(cfg) = config {
            let mut generation = serde_json::Map::new();
            if let Some(temp) = cfg.temperature {
                generation.insert("temperature".into(), json!(temp));
            }
            if let Some(max_tokens) = cfg.max_output_tokens {
                generation.insert("maxOutputTokens".into(), json!(max_tokens));
            }
            if let Some(top_p) = cfg.top_p {
                generation.insert("topP".into(), json!(top_p));
            }
            if let Some(top_k) = cfg.top_k {
                generation.insert("topK".into(), json!(top_k));
            }
            if !generation.is_empty() {
                body["generationConfig"] = serde_json::Value::Object(generation);
            }
        }

        body
    }

    /// Parse a generateContent response into Content
    fn parse_response(resp_json: &serde_json::Value) -> Result<Content, ModelError> {
        let candidate = resp_json["candidates"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| ModelError::InvalidResponse("No candidates in response".into()))?;

        if let Some(finish_reason) = candidate.get("finishReason").and_then(|v| v.as_str()) {
            log::debug!("Gemini finish reason: {}", finish_reason);
            if finish_reason == "SAFETY" {
                return Err(ModelError::Api {
                    provider: "Gemini".into(),
                    message: "response blocked by safety filters".into(),
                });
            }
        }

        let parts_json = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                log::error!("No parts in candidate. Full response: {}", resp_json);
                ModelError::InvalidResponse(format!("No content in candidate: {}", candidate))
            })?;

        Ok(Content {
            role: "model".to_string(),
            parts: parts_json.iter().flat_map(parse_gemini_part).collect(),
        })
    }
}

#[async_trait]
impl Model for GeminiModel {
    fn provider(&self) -> &str {
        "Gemini"
    }

    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content, BoxError> {
        let url = format!(
            "{}/models/{}:generateContent",
            BASE_URL,
            self.model_name.trim_start_matches("models/")
        );
        let request = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key);

        let body = Self::build_request_body(history, config);
        let resp_json = send_json(request, self.provider(), &body).await?;

        Ok(Self::parse_response(&resp_json)?)
    }
}

/// Serialize a Part to Gemini API JSON format
/// Returns None for parts that shouldn't be sent (e.g., Thinking)
pub fn part_to_gemini_json(part: &Part) -> Option<serde_json::Value> {
    match part {
        Part::Text(t) => Some(json!({ "text": t })),
        Part::Thinking(_) => None, // Thinking is internal, not sent to API
    }
}

/// Parse a Gemini API JSON part into Parts
pub fn parse_gemini_part(p: &serde_json::Value) -> Vec<Part> {
    let mut parts = Vec::new();

    if let Some(thought) = p.get("thought").and_then(|t| t.as_str()) {
        if !thought.is_empty() {
            parts.push(Part::Thinking(thought.to_string()));
        }
    }

    if let Some(text) = p["text"].as_str() {
        parts.push(Part::Text(text.to_string()));
    }

    parts
}
