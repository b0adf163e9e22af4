// SPDX-License-Identifier: MIT

//! Agent module - a fixed instruction bound to a model
//!
//! An agent turns one human turn into one text response. The workflow steps
//! are built on `LLMAgent`; tests substitute their own `Model`.

mod llm;

pub use llm::LLMAgent;

use crate::adk::error::BoxError;
use async_trait::async_trait;

/// Core agent trait
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent name
    fn name(&self) -> &str;

    /// Run the agent with the given input
    async fn run(&self, input: String) -> Result<String, BoxError>;
}
