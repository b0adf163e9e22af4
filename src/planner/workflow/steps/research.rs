// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::{complete, guarded, Step, StepOutput};
use crate::adk::agent::LLMAgent;
use crate::adk::error::PlannerError;
use crate::adk::search::SearchService;
use crate::planner::workflow::query::QueryParser;
use crate::planner::workflow::stage::Stage;
use crate::planner::workflow::state::{StateUpdate, WorkflowState};

/// Which state field seeds query generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchSource {
    Task,
    Critique,
}

impl ResearchSource {
    fn seed(self, state: &WorkflowState) -> &str {
        match self {
            ResearchSource::Task => state.task(),
            ResearchSource::Critique => state.critique(),
        }
    }

    fn stage(self) -> Stage {
        match self {
            ResearchSource::Task => Stage::ResearchTask,
            ResearchSource::Critique => Stage::ResearchCritique,
        }
    }
}

/// Asks the model for search queries and extends the content pool
///
/// Returns the whole pool, not a delta. The first search failure aborts the
/// step and nothing gathered in this call reaches the state.
pub struct ResearchStep {
    source: ResearchSource,
    agent: LLMAgent,
    search: Arc<dyn SearchService>,
    parser: QueryParser,
    max_results: usize,
    timeout: Option<Duration>,
}

impl ResearchStep {
    pub fn new(source: ResearchSource, agent: LLMAgent, search: Arc<dyn SearchService>) -> Self {
        Self {
            source,
            agent,
            search,
            parser: QueryParser::default(),
            max_results: 2,
            timeout: None,
        }
    }

    pub fn with_parser(mut self, parser: QueryParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Step for ResearchStep {
    fn stage(&self) -> Stage {
        self.source.stage()
    }

    async fn run(&self, state: &WorkflowState) -> Result<StepOutput, PlannerError> {
        let stage = self.stage();
        let seed = self.source.seed(state).to_string();

        let response = complete(stage, self.timeout, &self.agent, seed).await?;
        let queries = self.parser.extract(&response);

        let mut content = state.content().to_vec();
        for query in &queries {
            let hits = guarded(stage, self.timeout, async {
                self.search
                    .search(query, self.max_results)
                    .await
                    .map_err(|e| PlannerError::search(query.as_str(), e))
            })
            .await?;
            content.extend(hits.into_iter().take(self.max_results).map(|h| h.content));
        }

        Ok(StepOutput {
            update: StateUpdate::content(content),
            model_output: Some(response),
            queries: Some(queries),
        })
    }
}
