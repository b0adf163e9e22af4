// SPDX-License-Identifier: MIT

//! LLM Agent - one system instruction, one human turn, one completion

use super::Agent;
use crate::adk::error::BoxError;
use crate::adk::model::{Content, GenerationConfig, Model};
use async_trait::async_trait;
use std::sync::Arc;

/// Standard LLM agent
#[derive(Clone)]
pub struct LLMAgent {
    pub name: String,
    pub instruction: String,
    pub model: Arc<dyn Model>,
    pub config: Option<GenerationConfig>,
}

impl LLMAgent {
    pub fn new(name: String, instruction: String, model: Arc<dyn Model>) -> Self {
        Self {
            name,
            instruction,
            model,
            config: None,
        }
    }

    /// Set the generation config sent with every request
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Same agent with a different system instruction
    pub fn with_instruction(&self, instruction: String) -> Self {
        Self {
            instruction,
            ..self.clone()
        }
    }

    fn history(&self, input: String) -> Vec<Content> {
        vec![
            Content::text("system", self.instruction.clone()),
            Content::text("user", input),
        ]
    }
}

#[async_trait]
impl Agent for LLMAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: String) -> Result<String, BoxError> {
        let history = self.history(input);

        log::debug!(
            "Agent {} calling {} model",
            self.name,
            self.model.provider()
        );
        let response = self
            .model
            .generate_content(&history, self.config.as_ref())
            .await?;

        let text = response.text_output();
        if text.is_empty() {
            log::warn!("Agent {} received empty response", self.name);
        } else {
            log::debug!(
                "Agent {} received response (length: {})",
                self.name,
                text.len()
            );
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::model::Part;
    use std::sync::Mutex;

    /// Records the history it receives and echoes the last user turn
    struct EchoModel {
        seen: Mutex<Vec<Vec<Content>>>,
    }

    #[async_trait]
    impl Model for EchoModel {
        fn provider(&self) -> &str {
            "Echo"
        }

        async fn generate_content(
            &self,
            history: &[Content],
            _config: Option<&GenerationConfig>,
        ) -> Result<Content, BoxError> {
            self.seen.lock().unwrap().push(history.to_vec());
            let last = history.last().map(|c| c.text_output()).unwrap_or_default();
            Ok(Content {
                role: "model".to_string(),
                parts: vec![Part::Thinking("...".into()), Part::Text(last)],
            })
        }
    }

    #[tokio::test]
    async fn test_run_sends_system_then_user() {
        let model = Arc::new(EchoModel {
            seen: Mutex::new(Vec::new()),
        });
        let agent = LLMAgent::new("planner".into(), "Be brief.".into(), model.clone());

        let out = agent.run("two days, vegan".into()).await.unwrap();
        assert_eq!(out, "two days, vegan");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].role, "system");
        assert_eq!(seen[0][0].text_output(), "Be brief.");
        assert_eq!(seen[0][1].role, "user");
    }

    #[tokio::test]
    async fn test_with_instruction_keeps_model_and_config() {
        let model = Arc::new(EchoModel {
            seen: Mutex::new(Vec::new()),
        });
        let agent = LLMAgent::new("writer".into(), "old".into(), model.clone()).with_config(
            GenerationConfig {
                temperature: Some(0.4),
                ..Default::default()
            },
        );

        let derived = agent.with_instruction("new".into());
        assert_eq!(derived.name, "writer");
        assert_eq!(derived.instruction, "new");
        assert_eq!(derived.config, agent.config);

        derived.run("x".into()).await.unwrap();
        assert_eq!(model.seen.lock().unwrap()[0][0].text_output(), "new");
    }
}
