// SPDX-License-Identifier: MIT

use crate::adk::error::{BoxError, SearchError};
use crate::adk::search::{SearchHit, SearchService};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;

const TAVILY_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Tavily search API client
pub struct TavilySearch {
    client: Client,
    api_key: String,
}

impl TavilySearch {
    /// Requires `TAVILY_API_KEY` environment variable to be set.
    pub fn new() -> Result<Self, SearchError> {
        let api_key =
            env::var("TAVILY_API_KEY").map_err(|_| SearchError::ApiKeyMissing("tavily".into()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    fn request_body(query: &str, max_results: usize) -> Value {
        json!({
            "query": query,
            "max_results": max_results,
            "search_depth": "basic"
        })
    }

    fn parse_results(body: Value) -> Result<Vec<SearchHit>, SearchError> {
        let parsed: TavilyResponse =
            serde_json::from_value(body).map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                content: r.content,
            })
            .collect())
    }
}

#[async_trait]
impl SearchService for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, BoxError> {
        let body = Self::request_body(query, max_results);

        log::debug!("Tavily request: {}", body);

        let resp = self
            .client
            .post(TAVILY_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(Box::new(SearchError::Api {
                provider: "tavily".into(),
                message: text,
            }));
        }

        let body: Value = resp.json().await?;
        Ok(Self::parse_results(body)?)
    }
}
