// SPDX-License-Identifier: MIT

//! Search-query extraction from free-form model output
//!
//! The researcher prompt asks for at most three queries but the model answers
//! in prose. The default parser picks out every `**"..."**` span; the strict
//! parser only accepts a JSON object with a `queries` array. Neither parser
//! caps the number of queries: the limit lives in the prompt.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static BOLD_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\*\*"(.*?)"\*\*"#).expect("bold-quoted pattern is valid"));

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("fenced json pattern is valid")
});

/// Which extraction strategy the research steps use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryParser {
    /// `**"query"**` spans, in order of appearance
    #[default]
    BoldQuoted,
    /// `{"queries": ["...", ...]}`, optionally inside a fenced code block
    Json,
}

#[derive(Debug, Deserialize)]
struct Queries {
    queries: Vec<String>,
}

impl QueryParser {
    pub fn extract(&self, text: &str) -> Vec<String> {
        match self {
            QueryParser::BoldQuoted => extract_queries(text),
            QueryParser::Json => extract_json_queries(text),
        }
    }
}

/// Every `**"..."**` match in order of appearance; empty when there is none
pub fn extract_queries(text: &str) -> Vec<String> {
    BOLD_QUOTED
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Queries from a JSON `{"queries": [...]}` object; empty on anything else
pub fn extract_json_queries(text: &str) -> Vec<String> {
    let candidate = match FENCED_JSON.captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => return Vec::new(),
        },
    };

    match serde_json::from_str::<Queries>(candidate) {
        Ok(q) => q
            .queries
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_bold_quoted_in_order() {
        let text = r#"Search for **"chicken protein content"** and **"low carb dinner ideas"**"#;
        assert_eq!(
            extract_queries(text),
            vec!["chicken protein content", "low carb dinner ideas"]
        );
    }

    #[test]
    fn test_no_matches_is_empty() {
        assert!(extract_queries("Here are some ideas: keto, paleo, vegan").is_empty());
        assert!(extract_queries("").is_empty());
        // Plain bold or plain quotes alone don't count
        assert!(extract_queries(r#"**keto snacks** and "paleo lunch""#).is_empty());
    }

    #[test]
    fn test_does_not_cap_query_count() {
        let text = r#"1. **"a"** 2. **"b"** 3. **"c"** 4. **"d"**"#;
        assert_eq!(extract_queries(text).len(), 4);
    }

    #[test]
    fn test_match_does_not_span_lines() {
        let text = "**\"split\nquery\"** then **\"whole\"**";
        assert_eq!(extract_queries(text), vec!["whole"]);
    }

    #[test]
    fn test_numbered_list_output() {
        let text = r#"Here are 3 queries:

1. **"high protein vegetarian breakfast"**
2. **"lentil recipes under 500 calories"**
3. **"budget weekly shopping list vegetarian"**"#;
        assert_eq!(
            extract_queries(text),
            vec![
                "high protein vegetarian breakfast",
                "lentil recipes under 500 calories",
                "budget weekly shopping list vegetarian"
            ]
        );
    }

    #[test]
    fn test_json_parser_plain_object() {
        let text = r#"{"queries": ["oat milk calories", " tofu scramble "]}"#;
        assert_eq!(
            extract_json_queries(text),
            vec!["oat milk calories", "tofu scramble"]
        );
    }

    #[test]
    fn test_json_parser_fenced_block() {
        let text = "Sure!\n```json\n{\"queries\": [\"gluten free pasta\"]}\n```\nDone.";
        assert_eq!(extract_json_queries(text), vec!["gluten free pasta"]);
    }

    #[test]
    fn test_json_parser_rejects_prose_and_bold() {
        let text = r#"Search for **"chicken protein content"**"#;
        assert!(extract_json_queries(text).is_empty());
        assert!(extract_json_queries(r#"{"terms": ["x"]}"#).is_empty());
    }

    #[test]
    fn test_parser_dispatch() {
        let bold = r#"**"salmon omega 3"**"#;
        assert_eq!(QueryParser::BoldQuoted.extract(bold), vec!["salmon omega 3"]);
        assert!(QueryParser::Json.extract(bold).is_empty());
        assert_eq!(QueryParser::default(), QueryParser::BoldQuoted);
    }

    #[test]
    fn test_parser_deserialize() {
        let parser: QueryParser = serde_yaml::from_str("json").unwrap();
        assert_eq!(parser, QueryParser::Json);
        let parser: QueryParser = serde_yaml::from_str("bold_quoted").unwrap();
        assert_eq!(parser, QueryParser::BoldQuoted);
    }
}
