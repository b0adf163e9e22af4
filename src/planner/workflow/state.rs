// SPDX-License-Identifier: MIT

//! Runtime state for one meal-planning run
//!
//! Steps never mutate `WorkflowState` directly. Each returns a `StateUpdate`
//! holding only the fields it changes and the engine merges it with
//! `WorkflowState::apply`. Merge is last-write-wins per field; `content` is
//! replaced wholesale because research steps return the full pool.

use serde::{Deserialize, Serialize};

use crate::adk::error::PlannerError;

/// The record threaded through every step of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    task: String,
    plan: String,
    draft: String,
    critique: String,
    content: Vec<String>,
    revision_number: u32,
    max_revisions: u32,
}

/// Partial update returned by a step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critique: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_number: Option<u32>,
}

/// Externally visible result of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FinalDraft {
    Produced(String),
    NotProduced,
}

impl FinalDraft {
    /// The draft text, or `PlannerError::NoDraft`
    pub fn into_result(self) -> Result<String, PlannerError> {
        match self {
            FinalDraft::Produced(draft) => Ok(draft),
            FinalDraft::NotProduced => Err(PlannerError::NoDraft),
        }
    }
}

impl WorkflowState {
    /// Fresh state for a new run; rejects an empty task or a zero budget
    pub fn new(task: impl Into<String>, max_revisions: u32) -> Result<Self, PlannerError> {
        let task = task.into();
        if task.trim().is_empty() {
            return Err(PlannerError::invalid_input("task must not be empty"));
        }
        if max_revisions == 0 {
            return Err(PlannerError::invalid_input(
                "max_revisions must be at least 1",
            ));
        }

        Ok(Self {
            task,
            plan: String::new(),
            draft: String::new(),
            critique: String::new(),
            content: Vec::new(),
            revision_number: 1,
            max_revisions,
        })
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn plan(&self) -> &str {
        &self.plan
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn critique(&self) -> &str {
        &self.critique
    }

    pub fn content(&self) -> &[String] {
        &self.content
    }

    pub fn revision_number(&self) -> u32 {
        self.revision_number
    }

    pub fn max_revisions(&self) -> u32 {
        self.max_revisions
    }

    /// Number of draft passes completed so far
    pub fn drafts_completed(&self) -> u32 {
        self.revision_number.saturating_sub(1)
    }

    /// True once the revision budget is spent
    pub fn budget_exhausted(&self) -> bool {
        self.revision_number > self.max_revisions
    }

    /// Merge a step's update into the state
    ///
    /// The plan is written once; the revision number only ever moves by one.
    pub fn apply(&mut self, update: StateUpdate) -> Result<(), PlannerError> {
        if update.plan.is_some() && !self.plan.is_empty() {
            return Err(PlannerError::precondition(
                "merge",
                "plan is already set for this run",
            ));
        }
        if let Some(next) = update.revision_number {
            if next != self.revision_number + 1 {
                return Err(PlannerError::precondition(
                    "merge",
                    format!(
                        "revision number must advance from {} to {}, got {}",
                        self.revision_number,
                        self.revision_number + 1,
                        next
                    ),
                ));
            }
        }

        if let Some(plan) = update.plan {
            self.plan = plan;
        }
        if let Some(draft) = update.draft {
            self.draft = draft;
        }
        if let Some(critique) = update.critique {
            self.critique = critique;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(revision_number) = update.revision_number {
            self.revision_number = revision_number;
        }
        Ok(())
    }

    /// The current draft as the run's result
    pub fn final_draft(&self) -> FinalDraft {
        if self.drafts_completed() == 0 || self.draft.is_empty() {
            FinalDraft::NotProduced
        } else {
            FinalDraft::Produced(self.draft.clone())
        }
    }
}

impl StateUpdate {
    pub fn plan(plan: String) -> Self {
        Self {
            plan: Some(plan),
            ..Default::default()
        }
    }

    pub fn draft(draft: String, revision_number: u32) -> Self {
        Self {
            draft: Some(draft),
            revision_number: Some(revision_number),
            ..Default::default()
        }
    }

    pub fn critique(critique: String) -> Self {
        Self {
            critique: Some(critique),
            ..Default::default()
        }
    }

    pub fn content(content: Vec<String>) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }

    /// Names of the fields this update sets
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.plan.is_some() {
            fields.push("plan");
        }
        if self.draft.is_some() {
            fields.push("draft");
        }
        if self.critique.is_some() {
            fields.push("critique");
        }
        if self.content.is_some() {
            fields.push("content");
        }
        if self.revision_number.is_some() {
            fields.push("revision_number");
        }
        fields
    }
}

/// Ask for an N-day plan unless the task already does
pub fn normalize_task(task: &str, plan_days: Option<u32>) -> String {
    match plan_days {
        Some(days) => {
            let phrase = format!("{}-day meal plan", days);
            if task.contains(&phrase) {
                task.to_string()
            } else {
                format!("{}\nPlease create a {}.", task, phrase)
            }
        }
        None => task.to_string(),
    }
}
