// SPDX-License-Identifier: MIT

//! Web-search providers
//!
//! - [tavily] - Tavily search API (default)
//! - [brave] - Brave Search API

pub mod brave;
pub mod tavily;

pub use brave::BraveSearch;
pub use tavily::TavilySearch;

use crate::adk::error::SearchError;
use crate::adk::search::SearchService;
use std::sync::Arc;

/// Build a search service by provider name
pub fn create_search_service(provider: &str) -> Result<Arc<dyn SearchService>, SearchError> {
    match provider.to_lowercase().as_str() {
        "tavily" | "" => Ok(Arc::new(TavilySearch::new()?)),
        "brave" => Ok(Arc::new(BraveSearch::new()?)),
        other => Err(SearchError::UnsupportedProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = create_search_service("altavista").err().unwrap();
        assert!(matches!(err, SearchError::UnsupportedProvider(p) if p == "altavista"));
    }
}
