// SPDX-License-Identifier: MIT

//! Workflow stages and the transition table
//!
//! ```text
//! Plan -> ResearchTask -> Draft -> End
//!                           |  ^
//!                           v  |
//!               Critique -> ResearchCritique
//! ```
//!
//! The only branch is after `Draft`: once `revision_number > max_revisions`
//! the run ends, otherwise the draft is critiqued.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::state::WorkflowState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Plan,
    ResearchTask,
    Draft,
    Critique,
    ResearchCritique,
    End,
}

impl Stage {
    /// Entry stage of every run
    pub const START: Stage = Stage::Plan;

    /// Stage that follows `self` given the state after `self` completed
    pub fn next(self, state: &WorkflowState) -> Stage {
        match self {
            Stage::Plan => Stage::ResearchTask,
            Stage::ResearchTask => Stage::Draft,
            Stage::Draft => {
                if state.budget_exhausted() {
                    Stage::End
                } else {
                    Stage::Critique
                }
            }
            Stage::Critique => Stage::ResearchCritique,
            Stage::ResearchCritique => Stage::Draft,
            Stage::End => Stage::End,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::End
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Plan => "plan",
            Stage::ResearchTask => "research_task",
            Stage::Draft => "draft",
            Stage::Critique => "critique",
            Stage::ResearchCritique => "research_critique",
            Stage::End => "end",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
