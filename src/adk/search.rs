// SPDX-License-Identifier: MIT

use crate::adk::error::BoxError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One result returned by a search provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    /// Text snippet that ends up in the research content pool
    pub content: String,
}

/// Trait for web-search providers used by the research steps.
///
/// Implementations return hits in provider ranking order. `max_results` is a
/// request, not a guarantee; callers that need a hard bound truncate.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Returns the provider name
    fn name(&self) -> &str;

    /// Search the web for `query`
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, BoxError>;
}
