// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use super::{complete, Step, StepOutput};
use crate::adk::agent::LLMAgent;
use crate::adk::error::PlannerError;
use crate::planner::workflow::stage::Stage;
use crate::planner::workflow::state::{StateUpdate, WorkflowState};

/// Produces the outline the writer follows
pub struct PlanStep {
    agent: LLMAgent,
    timeout: Option<Duration>,
}

impl PlanStep {
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
impl Step for PlanStep {
    fn stage(&self) -> Stage {
        Stage::Plan
    }

    async fn run(&self, state: &WorkflowState) -> Result<StepOutput, PlannerError> {
        if state.task().trim().is_empty() {
            return Err(PlannerError::precondition(
                Stage::Plan.as_str(),
                "task is empty",
            ));
        }

        let plan = complete(
            Stage::Plan,
            self.timeout,
            &self.agent,
            state.task().to_string(),
        )
        .await?;
        Ok(StepOutput::from_completion(StateUpdate::plan(plan.clone()), &plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::workflow::prompts::PLAN_PROMPT;
    use crate::planner::workflow::steps::testing::ScriptedModel;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_plan_sends_task_as_human_turn() {
        let model = Arc::new(ScriptedModel::new(&["Day 1: oats; Day 2: eggs"]));
        let step = PlanStep::new(LLMAgent::new(
            "planner".into(),
            PLAN_PROMPT.into(),
            model.clone(),
        ));
        let state = WorkflowState::new("2-day high protein plan", 2).unwrap();

        let out = step.run(&state).await.unwrap();

        assert_eq!(out.update, StateUpdate::plan("Day 1: oats; Day 2: eggs".into()));
        assert_eq!(model.last_instruction(), PLAN_PROMPT);
        assert_eq!(model.last_input(), "2-day high protein plan");
    }

    #[tokio::test]
    async fn test_plan_propagates_completion_error() {
        let model = Arc::new(ScriptedModel::new(&[]));
        let step = PlanStep::new(LLMAgent::new("planner".into(), PLAN_PROMPT.into(), model));
        let state = WorkflowState::new("keto", 2).unwrap();

        let err = step.run(&state).await.unwrap_err();
        match err {
            PlannerError::Completion { step, source } => {
                assert_eq!(step, "plan");
                assert_eq!(source.to_string(), "scripted model exhausted");
            }
            other => panic!("expected completion error, got {:?}", other),
        }
    }
}
