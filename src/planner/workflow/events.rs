// SPDX-License-Identifier: MIT

//! Progress events emitted by a streaming run

use serde::{Deserialize, Serialize};

use super::stage::Stage;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    StageStarted {
        stage: Stage,
        revision_number: u32,
    },
    /// Raw completion text produced inside a stage
    ModelOutput {
        stage: Stage,
        text: String,
    },
    QueriesExtracted {
        stage: Stage,
        queries: Vec<String>,
    },
    StageCompleted {
        stage: Stage,
        updated: Vec<String>,
        next: Stage,
    },
    Finished {
        thread_id: String,
        draft: String,
        revisions: u32,
    },
    Error {
        message: String,
    },
}

impl RunEvent {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RunEvent::StageStarted { stage, .. }
            | RunEvent::ModelOutput { stage, .. }
            | RunEvent::QueriesExtracted { stage, .. }
            | RunEvent::StageCompleted { stage, .. } => Some(*stage),
            RunEvent::Finished { .. } | RunEvent::Error { .. } => None,
        }
    }
}
