// SPDX-License-Identifier: MIT

//! Planner configuration - YAML file plus environment overrides
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Secrets never live here; providers read their API keys from the
//! environment.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::adk::error::PlannerError;
use crate::adk::model::GenerationConfig;
use crate::planner::workflow::query::QueryParser;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    pub model: ModelSettings,
    pub search: SearchSettings,
    /// Revision budget used when the caller does not pass one
    pub max_revisions: u32,
    pub query_parser: QueryParser,
    /// Timeout wrapped around each completion and search call
    pub call_timeout_secs: Option<u64>,
    /// Ask for an N-day plan when the task doesn't already
    pub plan_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelSettings {
    /// Inferred from `model_name` when absent
    pub provider: Option<String>,
    pub model_name: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSettings {
    pub provider: String,
    /// Snippets kept per query
    pub max_results: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            model: ModelSettings::default(),
            search: SearchSettings::default(),
            max_revisions: 2,
            query_parser: QueryParser::default(),
            call_timeout_secs: None,
            plan_days: None,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: None,
            model_name: "gemini-1.5-pro".to_string(),
            temperature: Some(0.4),
            max_output_tokens: None,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: "tavily".to_string(),
            max_results: 2,
        }
    }
}

impl PlannerConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PlannerError> {
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse from a YAML string
    pub fn parse_yaml(content: &str) -> Result<Self, PlannerError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: PlannerConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Apply `MODEL_PROVIDER`, `MODEL_NAME`, `SEARCH_PROVIDER` and `MAX_REVISIONS`
    pub fn with_env_overrides(self) -> Result<Self, PlannerError> {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, PlannerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = lookup("MODEL_PROVIDER") {
            self.model.provider = Some(provider);
        }
        if let Some(name) = lookup("MODEL_NAME") {
            self.model.model_name = name;
        }
        if let Some(provider) = lookup("SEARCH_PROVIDER") {
            self.search.provider = provider;
        }
        if let Some(raw) = lookup("MAX_REVISIONS") {
            self.max_revisions = raw.trim().parse().map_err(|_| {
                PlannerError::config(format!(
                    "MAX_REVISIONS must be a positive integer, got '{}'",
                    raw
                ))
            })?;
        }
        Ok(self)
    }

    /// Reject budgets and limits the workflow cannot run with
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.max_revisions == 0 {
            return Err(PlannerError::config("max_revisions must be at least 1"));
        }
        if self.search.max_results == 0 {
            return Err(PlannerError::config("search.max_results must be at least 1"));
        }
        if self.model.model_name.trim().is_empty() {
            return Err(PlannerError::config("model.model_name must not be empty"));
        }
        if self.plan_days == Some(0) {
            return Err(PlannerError::config("plan_days must be at least 1"));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: self.model.temperature,
            max_output_tokens: self.model.max_output_tokens,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.model.model_name, "gemini-1.5-pro");
        assert_eq!(config.model.temperature, Some(0.4));
        assert_eq!(config.search.provider, "tavily");
        assert_eq!(config.search.max_results, 2);
        assert_eq!(config.max_revisions, 2);
        assert_eq!(config.query_parser, QueryParser::BoldQuoted);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
model:
  model_name: gpt-4o
  temperature: 0.6
search:
  provider: brave
max_revisions: 3
query_parser: json
call_timeout_secs: 45
plan_days: 7
"#;
        let config = PlannerConfig::parse_yaml(yaml).unwrap();
        assert_eq!(config.model.model_name, "gpt-4o");
        assert_eq!(config.model.provider, None);
        assert_eq!(config.search.provider, "brave");
        assert_eq!(config.search.max_results, 2);
        assert_eq!(config.max_revisions, 3);
        assert_eq!(config.query_parser, QueryParser::Json);
        assert_eq!(config.call_timeout(), Some(Duration::from_secs(45)));
        assert_eq!(config.plan_days, Some(7));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            PlannerConfig::parse_yaml("  \n").unwrap(),
            PlannerConfig::default()
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let err = PlannerConfig::parse_yaml("max_revisions: [1, 2]").unwrap_err();
        assert!(matches!(err, PlannerError::Yaml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_revisions: 4").unwrap();

        let config = PlannerConfig::load(file.path()).unwrap();
        assert_eq!(config.max_revisions, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PlannerConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, PlannerError::Io(_)));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("MODEL_PROVIDER", "Anthropic"),
            ("MODEL_NAME", "claude-3-5-sonnet"),
            ("SEARCH_PROVIDER", "brave"),
            ("MAX_REVISIONS", "5"),
        ]
        .into_iter()
        .collect();

        let config = PlannerConfig::default()
            .with_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.model.provider.as_deref(), Some("Anthropic"));
        assert_eq!(config.model.model_name, "claude-3-5-sonnet");
        assert_eq!(config.search.provider, "brave");
        assert_eq!(config.max_revisions, 5);
    }

    #[test]
    fn test_bad_max_revisions_override() {
        let err = PlannerConfig::default()
            .with_overrides(|k| (k == "MAX_REVISIONS").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, PlannerError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let config = PlannerConfig {
            max_revisions: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PlannerError::Config(_))));

        let mut config = PlannerConfig::default();
        config.search.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_generation_config() {
        let generation = PlannerConfig::default().generation_config();
        assert_eq!(generation.temperature, Some(0.4));
        assert_eq!(generation.top_k, None);
    }
}
