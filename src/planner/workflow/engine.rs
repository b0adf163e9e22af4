// SPDX-License-Identifier: MIT

//! Workflow engine - drives a run through the stage machine
//!
//! One `MealPlanner` serves many runs. Each run owns its `WorkflowState`;
//! the only shared piece is the checkpoint store, which is keyed by thread
//! id. Stages run strictly one after another and a stage only starts once
//! the previous update has been merged and checkpointed.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::checkpoint::{Checkpoint, CheckpointStore, InMemoryCheckpointer, ThreadId};
use super::events::RunEvent;
use super::prompts::{
    CRITIQUE_PROMPT, JSON_QUERIES_HINT, PLAN_PROMPT, RESEARCH_CRITIQUE_PROMPT,
    RESEARCH_PLAN_PROMPT,
};
use super::query::QueryParser;
use super::stage::Stage;
use super::state::{normalize_task, FinalDraft, WorkflowState};
use super::steps::{
    CritiqueStep, DraftStep, PlanStep, ResearchSource, ResearchStep, Step, StepOutput,
};
use crate::adk::agent::LLMAgent;
use crate::adk::error::PlannerError;
use crate::adk::model::Model;
use crate::adk::search::SearchService;
use crate::planner::config::PlannerConfig;

/// The five steps the stage machine dispatches to
pub struct StepSet {
    pub plan: Box<dyn Step>,
    pub research_task: Box<dyn Step>,
    pub draft: Box<dyn Step>,
    pub critique: Box<dyn Step>,
    pub research_critique: Box<dyn Step>,
}

impl StepSet {
    /// Standard steps over one model and one search provider
    pub fn standard(
        model: Arc<dyn Model>,
        search: Arc<dyn SearchService>,
        config: &PlannerConfig,
    ) -> Self {
        let generation = config.generation_config();
        let timeout = config.call_timeout();
        let agent = |name: &str, instruction: String| {
            LLMAgent::new(name.to_string(), instruction, model.clone())
                .with_config(generation.clone())
        };
        let researcher_prompt = |base: &str| match config.query_parser {
            QueryParser::BoldQuoted => base.to_string(),
            QueryParser::Json => format!("{} {}", base, JSON_QUERIES_HINT),
        };
        let research = |source: ResearchSource, prompt: &str| {
            let researcher = agent("researcher", researcher_prompt(prompt));
            ResearchStep::new(source, researcher, search.clone())
                .with_parser(config.query_parser)
                .with_max_results(config.search.max_results)
                .with_timeout(timeout)
        };

        Self {
            plan: Box::new(
                PlanStep::new(agent("planner", PLAN_PROMPT.to_string())).with_timeout(timeout),
            ),
            research_task: Box::new(research(ResearchSource::Task, RESEARCH_PLAN_PROMPT)),
            // The writer instruction is rebuilt from the content pool on every draft
            draft: Box::new(DraftStep::new(agent("writer", String::new())).with_timeout(timeout)),
            critique: Box::new(
                CritiqueStep::new(agent("critic", CRITIQUE_PROMPT.to_string()))
                    .with_timeout(timeout),
            ),
            research_critique: Box::new(research(
                ResearchSource::Critique,
                RESEARCH_CRITIQUE_PROMPT,
            )),
        }
    }

    fn for_stage(&self, stage: Stage) -> Option<&dyn Step> {
        match stage {
            Stage::Plan => Some(self.plan.as_ref()),
            Stage::ResearchTask => Some(self.research_task.as_ref()),
            Stage::Draft => Some(self.draft.as_ref()),
            Stage::Critique => Some(self.critique.as_ref()),
            Stage::ResearchCritique => Some(self.research_critique.as_ref()),
            Stage::End => None,
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub thread_id: ThreadId,
    pub draft: FinalDraft,
    /// Draft passes performed
    pub revisions: u32,
    pub state: WorkflowState,
}

impl RunReport {
    fn from_state(thread_id: ThreadId, state: WorkflowState) -> Self {
        Self {
            thread_id,
            draft: state.final_draft(),
            revisions: state.drafts_completed(),
            state,
        }
    }
}

/// Sends events when a stream is attached; a closed receiver is ignored
struct EventSink<'a>(Option<&'a mpsc::Sender<RunEvent>>);

impl EventSink<'_> {
    async fn emit(&self, event: RunEvent) {
        if let Some(tx) = self.0 {
            let _ = tx.send(event).await;
        }
    }
}

pub struct MealPlanner {
    steps: StepSet,
    checkpointer: Arc<dyn CheckpointStore>,
    max_revisions: u32,
    plan_days: Option<u32>,
}

impl MealPlanner {
    /// Planner over `model` and `search` with default settings
    pub fn new(model: Arc<dyn Model>, search: Arc<dyn SearchService>) -> Self {
        Self::from_config(&PlannerConfig::default(), model, search)
    }

    pub fn from_config(
        config: &PlannerConfig,
        model: Arc<dyn Model>,
        search: Arc<dyn SearchService>,
    ) -> Self {
        Self {
            steps: StepSet::standard(model, search, config),
            checkpointer: Arc::new(InMemoryCheckpointer::new()),
            max_revisions: config.max_revisions,
            plan_days: config.plan_days,
        }
    }

    /// Planner over custom steps
    pub fn with_steps(steps: StepSet) -> Self {
        Self {
            steps,
            checkpointer: Arc::new(InMemoryCheckpointer::new()),
            max_revisions: PlannerConfig::default().max_revisions,
            plan_days: None,
        }
    }

    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn CheckpointStore>) -> Self {
        self.checkpointer = checkpointer;
        self
    }

    /// Default revision budget
    pub fn max_revisions(&self) -> u32 {
        self.max_revisions
    }

    /// Run on a fresh thread and return the final draft
    ///
    /// The thread id never leaves this call, so its checkpoints are dropped
    /// once the run ends, whether it succeeded or not. Use `invoke` to keep
    /// a resumable thread.
    pub async fn run(&self, task: &str, max_revisions: u32) -> Result<String, PlannerError> {
        let thread_id = ThreadId::generate();
        let result = self.invoke(thread_id.clone(), task, max_revisions).await;
        self.checkpointer.clear(&thread_id).await;
        result?.draft.into_result()
    }

    /// Run on `thread_id`, discarding whatever the thread held before
    pub async fn invoke(
        &self,
        thread_id: ThreadId,
        task: &str,
        max_revisions: u32,
    ) -> Result<RunReport, PlannerError> {
        self.start(thread_id, task, max_revisions, EventSink(None))
            .await
    }

    /// Like `invoke`, reporting progress on `tx`
    pub async fn run_stream(
        &self,
        thread_id: ThreadId,
        task: &str,
        max_revisions: u32,
        tx: mpsc::Sender<RunEvent>,
    ) -> Result<RunReport, PlannerError> {
        let sink = EventSink(Some(&tx));
        let result = self.start(thread_id, task, max_revisions, sink).await;
        if let Err(e) = &result {
            let _ = tx
                .send(RunEvent::Error {
                    message: e.to_string(),
                })
                .await;
        }
        result
    }

    /// Continue a thread from its latest checkpoint
    ///
    /// A thread that already finished returns its draft without any
    /// external call.
    pub async fn resume(&self, thread_id: ThreadId) -> Result<RunReport, PlannerError> {
        let latest = self
            .checkpointer
            .latest(&thread_id)
            .await
            .ok_or_else(|| PlannerError::ThreadNotFound(thread_id.to_string()))?;

        log::info!(
            "Resuming thread {} at stage {} (step {})",
            thread_id,
            latest.next,
            latest.step_index + 1
        );
        self.drive(
            thread_id,
            latest.state,
            latest.next,
            latest.step_index + 1,
            EventSink(None),
        )
        .await
    }

    /// Latest state recorded for a thread
    pub async fn state(&self, thread_id: &ThreadId) -> Option<WorkflowState> {
        self.checkpointer
            .latest(thread_id)
            .await
            .map(|c| c.state)
    }

    /// Every checkpoint recorded for a thread, oldest first
    pub async fn history(&self, thread_id: &ThreadId) -> Vec<Checkpoint> {
        self.checkpointer.history(thread_id).await
    }

    async fn start(
        &self,
        thread_id: ThreadId,
        task: &str,
        max_revisions: u32,
        sink: EventSink<'_>,
    ) -> Result<RunReport, PlannerError> {
        if task.trim().is_empty() {
            return Err(PlannerError::invalid_input("task must not be empty"));
        }
        let state = WorkflowState::new(normalize_task(task, self.plan_days), max_revisions)?;

        self.checkpointer.clear(&thread_id).await;
        log::info!(
            "Starting run on thread {} (max_revisions: {})",
            thread_id,
            max_revisions
        );

        self.drive(thread_id, state, Stage::START, 0, sink).await
    }

    async fn drive(
        &self,
        thread_id: ThreadId,
        mut state: WorkflowState,
        mut stage: Stage,
        mut step_index: usize,
        sink: EventSink<'_>,
    ) -> Result<RunReport, PlannerError> {
        while let Some(step) = self.steps.for_stage(stage) {
            sink.emit(RunEvent::StageStarted {
                stage,
                revision_number: state.revision_number(),
            })
            .await;
            log::info!(
                "Thread {}: entering {} (revision {}/{})",
                thread_id,
                stage,
                state.revision_number(),
                state.max_revisions()
            );

            let StepOutput {
                update,
                model_output,
                queries,
            } = step.run(&state).await.map_err(|e| {
                if e.is_external() {
                    log::error!(
                        "Thread {}: {} failed on an external call, resumable: {}",
                        thread_id,
                        stage,
                        e
                    );
                } else {
                    log::error!("Thread {}: {} failed: {}", thread_id, stage, e);
                }
                e
            })?;

            if let Some(text) = model_output {
                log::debug!("Thread {}: {} model output: {}", thread_id, stage, text);
                sink.emit(RunEvent::ModelOutput { stage, text }).await;
            }
            if let Some(queries) = queries {
                log::debug!("Thread {}: {} queries: {:?}", thread_id, stage, queries);
                sink.emit(RunEvent::QueriesExtracted { stage, queries }).await;
            }

            let updated: Vec<String> = update.fields().into_iter().map(String::from).collect();
            state.apply(update)?;
            let next = stage.next(&state);

            self.checkpointer
                .put(Checkpoint {
                    thread_id: thread_id.clone(),
                    step_index,
                    completed: stage,
                    next,
                    state: state.clone(),
                    created_at: Utc::now(),
                })
                .await?;
            log::debug!(
                "Thread {}: checkpoint {} saved after {}",
                thread_id,
                step_index,
                stage
            );

            sink.emit(RunEvent::StageCompleted {
                stage,
                updated,
                next,
            })
            .await;

            stage = next;
            step_index += 1;
        }

        let report = RunReport::from_state(thread_id, state);
        log::info!(
            "Thread {} finished after {} draft(s)",
            report.thread_id,
            report.revisions
        );
        if let FinalDraft::Produced(draft) = &report.draft {
            sink.emit(RunEvent::Finished {
                thread_id: report.thread_id.to_string(),
                draft: draft.clone(),
                revisions: report.revisions,
            })
            .await;
        }
        Ok(report)
    }
}
