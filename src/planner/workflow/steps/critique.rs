// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use super::{complete, Step, StepOutput};
use crate::adk::agent::LLMAgent;
use crate::adk::error::PlannerError;
use crate::planner::workflow::stage::Stage;
use crate::planner::workflow::state::{StateUpdate, WorkflowState};

/// Reviews the current draft for nutrition and dietary fit
pub struct CritiqueStep {
    agent: LLMAgent,
    timeout: Option<Duration>,
}

impl CritiqueStep {
    pub fn new(agent: LLMAgent) -> Self {
        Self {
            agent,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Step for CritiqueStep {
    fn stage(&self) -> Stage {
        Stage::Critique
    }

    async fn run(&self, state: &WorkflowState) -> Result<StepOutput, PlannerError> {
        // Reaching here without a draft means the stage wiring is wrong
        if state.draft().trim().is_empty() {
            return Err(PlannerError::precondition(
                Stage::Critique.as_str(),
                "no draft available for critique",
            ));
        }

        let critique = complete(
            Stage::Critique,
            self.timeout,
            &self.agent,
            state.draft().to_string(),
        )
        .await?;
        Ok(StepOutput::from_completion(
            StateUpdate::critique(critique.clone()),
            &critique,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::workflow::prompts::CRITIQUE_PROMPT;
    use crate::planner::workflow::steps::testing::ScriptedModel;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_empty_draft_is_precondition_failure_without_call() {
        let model = Arc::new(ScriptedModel::new(&["should not be used"]));
        let step = CritiqueStep::new(LLMAgent::new(
            "critic".into(),
            CRITIQUE_PROMPT.into(),
            model.clone(),
        ));
        let state = WorkflowState::new("keto", 2).unwrap();

        let err = step.run(&state).await.unwrap_err();

        assert!(matches!(err, PlannerError::Precondition { .. }));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_critique_reviews_draft() {
        let model = Arc::new(ScriptedModel::new(&["Needs more fiber"]));
        let step = CritiqueStep::new(LLMAgent::new(
            "critic".into(),
            CRITIQUE_PROMPT.into(),
            model.clone(),
        ));
        let mut state = WorkflowState::new("keto", 2).unwrap();
        state.apply(StateUpdate::draft("Day 1: bacon".into(), 2)).unwrap();

        let out = step.run(&state).await.unwrap();

        assert_eq!(out.update, StateUpdate::critique("Needs more fiber".into()));
        assert_eq!(model.last_input(), "Day 1: bacon");
        assert_eq!(model.last_instruction(), CRITIQUE_PROMPT);
    }
}
