// SPDX-License-Identifier: MIT

//! Workflow steps
//!
//! Each step reads a snapshot of the state and returns the fields it
//! changes. Steps do no logging and hold no per-run data, so one set of steps
//! serves any number of concurrent runs.

mod critique;
mod draft;
mod plan;
mod research;

pub use critique::CritiqueStep;
pub use draft::DraftStep;
pub use plan::PlanStep;
pub use research::{ResearchSource, ResearchStep};

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use super::stage::Stage;
use super::state::{StateUpdate, WorkflowState};
use crate::adk::agent::{Agent, LLMAgent};
use crate::adk::error::PlannerError;

/// What a step hands back to the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutput {
    pub update: StateUpdate,
    /// Raw completion text, surfaced as a `ModelOutput` event
    pub model_output: Option<String>,
    /// Queries a research step extracted, surfaced as a `QueriesExtracted` event
    pub queries: Option<Vec<String>>,
}

impl StepOutput {
    fn from_completion(update: StateUpdate, text: &str) -> Self {
        Self {
            update,
            model_output: Some(text.to_string()),
            queries: None,
        }
    }
}

#[async_trait]
pub trait Step: Send + Sync {
    /// The stage this step implements
    fn stage(&self) -> Stage;

    async fn run(&self, state: &WorkflowState) -> Result<StepOutput, PlannerError>;
}

/// Apply the optional per-call timeout to an external call
pub(crate) async fn guarded<T, F>(
    stage: Stage,
    timeout: Option<Duration>,
    call: F,
) -> Result<T, PlannerError>
where
    F: Future<Output = Result<T, PlannerError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| PlannerError::Timeout {
                step: stage.to_string(),
                secs: limit.as_secs(),
            })?,
        None => call.await,
    }
}

/// One completion through `agent`, with failures tagged by stage
pub(crate) async fn complete(
    stage: Stage,
    timeout: Option<Duration>,
    agent: &LLMAgent,
    input: String,
) -> Result<String, PlannerError> {
    guarded(stage, timeout, async {
        agent
            .run(input)
            .await
            .map_err(|e| PlannerError::completion(stage.as_str(), e))
    })
    .await
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted model and search doubles shared by the step tests

    use crate::adk::error::BoxError;
    use crate::adk::model::{Content, GenerationConfig, Model};
    use crate::adk::search::{SearchHit, SearchService};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Returns canned responses in order and records every history it saw
    pub struct ScriptedModel {
        responses: Vec<String>,
        index: AtomicUsize,
        pub seen: Mutex<Vec<Vec<Content>>>,
    }

    impl ScriptedModel {
        pub fn new(responses: &[&str]) -> Self {
            Self {
                responses: responses.iter().map(|s| s.to_string()).collect(),
                index: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.index.load(Ordering::SeqCst)
        }

        pub fn last_instruction(&self) -> String {
            let seen = self.seen.lock().unwrap();
            seen.last().unwrap()[0].text_output()
        }

        pub fn last_input(&self) -> String {
            let seen = self.seen.lock().unwrap();
            seen.last().unwrap()[1].text_output()
        }
    }

    #[async_trait]
    impl Model for ScriptedModel {
        fn provider(&self) -> &str {
            "Scripted"
        }

        async fn generate_content(
            &self,
            history: &[Content],
            _config: Option<&GenerationConfig>,
        ) -> Result<Content, BoxError> {
            self.seen.lock().unwrap().push(history.to_vec());
            let idx = self.index.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(idx) {
                Some(text) => Ok(Content::text("model", text.clone())),
                None => Err("scripted model exhausted".into()),
            }
        }
    }

    /// Returns `per_query` hits named after the query; fails on `fail_on`
    pub struct FakeSearch {
        pub per_query: usize,
        pub fail_on: Option<String>,
        pub queries: Mutex<Vec<(String, usize)>>,
    }

    impl FakeSearch {
        pub fn new(per_query: usize) -> Self {
            Self {
                per_query,
                fail_on: None,
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn failing_on(mut self, query: &str) -> Self {
            self.fail_on = Some(query.to_string());
            self
        }
    }

    #[async_trait]
    impl SearchService for FakeSearch {
        fn name(&self) -> &str {
            "fake"
        }

        async fn search(
            &self,
            query: &str,
            max_results: usize,
        ) -> Result<Vec<SearchHit>, BoxError> {
            self.queries
                .lock()
                .unwrap()
                .push((query.to_string(), max_results));
            if self.fail_on.as_deref() == Some(query) {
                return Err("search backend unavailable".into());
            }
            Ok((0..self.per_query)
                .map(|i| SearchHit {
                    title: format!("{} #{}", query, i),
                    url: format!("https://example.com/{}", i),
                    content: format!("{}:{}", query, i),
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guarded_times_out() {
        let result: Result<(), PlannerError> = guarded(
            Stage::Draft,
            Some(Duration::from_millis(10)),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
        )
        .await;

        match result {
            Err(PlannerError::Timeout { step, .. }) => assert_eq!(step, "draft"),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_guarded_without_limit_passes_through() {
        let result = guarded(Stage::Plan, None, async { Ok::<_, PlannerError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
