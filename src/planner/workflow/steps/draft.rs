// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use super::{complete, Step, StepOutput};
use crate::adk::agent::LLMAgent;
use crate::adk::error::{ModelError, PlannerError};
use crate::planner::workflow::prompts::{writer_input, writer_instruction};
use crate::planner::workflow::stage::Stage;
use crate::planner::workflow::state::{StateUpdate, WorkflowState};

/// Writes the full meal plan from the task, the outline and the research pool
///
/// Every call counts as a revision, whether or not a critique follows.
pub struct DraftStep {
    writer: LLMAgent,
    timeout: Option<Duration>,
}

impl DraftStep {
    /// `writer`'s own instruction is replaced on every call by the rendered
    /// writer template
    pub fn new(writer: LLMAgent) -> Self {
        Self {
            writer,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Step for DraftStep {
    fn stage(&self) -> Stage {
        Stage::Draft
    }

    async fn run(&self, state: &WorkflowState) -> Result<StepOutput, PlannerError> {
        let writer = self
            .writer
            .with_instruction(writer_instruction(state.content()));
        let input = writer_input(state.task(), state.plan());

        let draft = complete(Stage::Draft, self.timeout, &writer, input).await?;
        if draft.trim().is_empty() {
            return Err(PlannerError::completion(
                Stage::Draft.as_str(),
                Box::new(ModelError::InvalidResponse(
                    "writer returned an empty draft".into(),
                )),
            ));
        }
        let update = StateUpdate::draft(draft.clone(), state.revision_number() + 1);
        Ok(StepOutput::from_completion(update, &draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::workflow::steps::testing::ScriptedModel;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_draft_renders_pool_and_bumps_revision() {
        let model = Arc::new(ScriptedModel::new(&["Day 1: Breakfast 8am oats"]));
        let step = DraftStep::new(LLMAgent::new("writer".into(), String::new(), model.clone()));

        let mut state = WorkflowState::new("vegetarian", 2).unwrap();
        state.apply(StateUpdate::plan("Outline".into())).unwrap();
        state
            .apply(StateUpdate::content(vec!["fact one".into(), "fact two".into()]))
            .unwrap();

        let out = step.run(&state).await.unwrap();

        assert_eq!(
            out.update,
            StateUpdate::draft("Day 1: Breakfast 8am oats".into(), 2)
        );
        assert!(model.last_instruction().ends_with("fact one\n\nfact two"));
        assert_eq!(
            model.last_input(),
            "vegetarian\n\nHere is my meal plan:\n\nOutline"
        );
    }

    #[tokio::test]
    async fn test_empty_draft_is_completion_failure() {
        let model = Arc::new(ScriptedModel::new(&["  \n "]));
        let step = DraftStep::new(LLMAgent::new("writer".into(), String::new(), model));
        let state = WorkflowState::new("vegetarian", 2).unwrap();

        let err = step.run(&state).await.unwrap_err();

        match err {
            PlannerError::Completion { step, source } => {
                assert_eq!(step, "draft");
                assert!(source.to_string().contains("empty draft"));
            }
            other => panic!("expected completion error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_revision_counts_from_current_state() {
        let model = Arc::new(ScriptedModel::new(&["second"]));
        let step = DraftStep::new(LLMAgent::new("writer".into(), String::new(), model));

        let mut state = WorkflowState::new("vegetarian", 3).unwrap();
        state.apply(StateUpdate::draft("first".into(), 2)).unwrap();

        let out = step.run(&state).await.unwrap();
        assert_eq!(out.update.revision_number, Some(3));
    }
}
