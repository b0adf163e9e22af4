// SPDX-License-Identifier: MIT

//! Per-thread checkpoints
//!
//! The engine saves one checkpoint after every completed stage. A thread's
//! history is cleared when a new run starts on it, so an id reused for a new
//! task never sees the previous task's state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::stage::Stage;
use super::state::WorkflowState;
use crate::adk::error::PlannerError;

/// Opaque identifier scoping one run's state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Snapshot taken after a stage completed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub thread_id: ThreadId,
    /// 0-based position in the thread's history
    pub step_index: usize,
    pub completed: Stage,
    pub next: Stage,
    pub state: WorkflowState,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Append a checkpoint to its thread's history
    async fn put(&self, checkpoint: Checkpoint) -> Result<(), PlannerError>;

    /// Most recent checkpoint for the thread
    async fn latest(&self, thread_id: &ThreadId) -> Option<Checkpoint>;

    /// All checkpoints for the thread, oldest first
    async fn history(&self, thread_id: &ThreadId) -> Vec<Checkpoint>;

    /// Drop the thread's history
    async fn clear(&self, thread_id: &ThreadId);
}

/// Process-local checkpoint store
#[derive(Clone, Default)]
pub struct InMemoryCheckpointer {
    threads: Arc<RwLock<HashMap<ThreadId, Vec<Checkpoint>>>>,
}

impl InMemoryCheckpointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads with at least one checkpoint
    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointer {
    async fn put(&self, checkpoint: Checkpoint) -> Result<(), PlannerError> {
        let mut threads = self.threads.write().await;
        threads
            .entry(checkpoint.thread_id.clone())
            .or_default()
            .push(checkpoint);
        Ok(())
    }

    async fn latest(&self, thread_id: &ThreadId) -> Option<Checkpoint> {
        let threads = self.threads.read().await;
        threads.get(thread_id).and_then(|h| h.last().cloned())
    }

    async fn history(&self, thread_id: &ThreadId) -> Vec<Checkpoint> {
        let threads = self.threads.read().await;
        threads.get(thread_id).cloned().unwrap_or_default()
    }

    async fn clear(&self, thread_id: &ThreadId) {
        let mut threads = self.threads.write().await;
        threads.remove(thread_id);
    }
}
