// SPDX-License-Identifier: MIT

use crate::adk::error::{BoxError, SearchError};
use crate::adk::search::{SearchHit, SearchService};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::env;

/// Brave caps `count` at 20
const MAX_COUNT: usize = 20;

#[derive(Debug, Deserialize)]
struct BraveResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

pub struct BraveSearch {
    client: Client,
    api_key: String,
}

impl BraveSearch {
    /// Requires `BRAVE_API_KEY` environment variable to be set.
    pub fn new() -> Result<Self, SearchError> {
        let api_key =
            env::var("BRAVE_API_KEY").map_err(|_| SearchError::ApiKeyMissing("brave".into()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    fn parse_results(body: &Value) -> Result<Vec<SearchHit>, SearchError> {
        let results_json = body
            .get("web")
            .and_then(|w| w.get("results"))
            .ok_or_else(|| {
                SearchError::InvalidResponse("missing web.results".to_string())
            })?;

        let results: Vec<BraveResult> = serde_json::from_value(results_json.clone())
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                content: r.description,
            })
            .collect())
    }
}

#[async_trait]
impl SearchService for BraveSearch {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, BoxError> {
        let count = max_results.clamp(1, MAX_COUNT);

        let mut url = reqwest::Url::parse("https://api.search.brave.com/res/v1/web/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("count", &count.to_string());

        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(Box::new(SearchError::Api {
                provider: "brave".into(),
                message: text,
            }));
        }

        let body: Value = resp.json().await?;
        Ok(Self::parse_results(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_results_maps_description_to_content() {
        let body = json!({
            "web": {
                "results": [
                    {
                        "title": "Chicken breast nutrition",
                        "url": "https://example.com/chicken",
                        "description": "31g protein per 100g",
                        "age": "2 days"
                    },
                    { "title": "No snippet", "url": "https://example.com/empty" }
                ]
            }
        });

        let hits = BraveSearch::parse_results(&body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "31g protein per 100g");
        assert_eq!(hits[0].url, "https://example.com/chicken");
        assert_eq!(hits[1].content, "");
    }

    #[test]
    fn test_parse_results_missing_web() {
        let body = json!({ "query": {} });
        let err = BraveSearch::parse_results(&body).unwrap_err();
        assert!(matches!(err, SearchError::InvalidResponse(_)));
    }
}
