//! Execution status table.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};

use super::types::{ExecutionStatus, LifecycleEvent, StatusChange, TaskResult};
use crate::key;

/// Live status per identity key.
///
/// Cloning is cheap and every clone sees the same table. Each lifecycle event
/// is committed under a single write lock, then announced on the change
/// channel.
#[derive(Clone)]
pub struct StatusTracker {
    inner: Arc<StatusTrackerInner>,
}

struct StatusTrackerInner {
    records: RwLock<HashMap<String, ExecutionStatus>>,
    change_tx: broadcast::Sender<StatusChange>,
}

impl StatusTracker {
    pub fn new() -> Self {
        let (change_tx, _) = broadcast::channel(256);

        let inner = StatusTrackerInner {
            records: RwLock::new(HashMap::new()),
            change_tx,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.inner.change_tx.subscribe()
    }

    /// Live change listeners.
    pub fn receiver_count(&self) -> usize {
        self.inner.change_tx.receiver_count()
    }

    fn emit(&self, change: StatusChange) {
        // No subscribers is fine.
        let _ = self.inner.change_tx.send(change);
    }

    /// Commit one lifecycle event. Returns the change it produced, or `None`
    /// for a stale end event of an execution that was already replaced.
    pub async fn apply(&self, event: LifecycleEvent) -> Option<StatusChange> {
        let change = {
            let mut records = self.inner.records.write().await;
            match event {
                LifecycleEvent::ProcessStarted { task, handle } => {
                    let key = task.key();
                    let execution_id = handle.execution_id.clone();
                    let record = records.entry(key.clone()).or_default();
                    record.is_active = true;
                    record.handle = Some(handle);
                    record.started_at = Some(Utc::now());
                    record.finished_at = None;
                    StatusChange::Started { key, execution_id }
                }
                LifecycleEvent::ProcessEnded {
                    task,
                    execution_id,
                    exit_code,
                } => {
                    let key = task.key();
                    let record = records.entry(key.clone()).or_default();
                    let stale = match (&record.handle, &execution_id) {
                        (Some(current), Some(ended)) => current.execution_id != *ended,
                        _ => false,
                    };
                    if stale {
                        tracing::debug!(%key, "ignoring end of a replaced execution");
                        return None;
                    }
                    let result = TaskResult::from_exit_code(exit_code);
                    record.is_active = false;
                    record.handle = None;
                    record.last_result = Some(result);
                    record.finished_at = Some(Utc::now());
                    StatusChange::Ended { key, result }
                }
            }
        };

        tracing::debug!(?change, "task status changed");
        self.emit(change.clone());
        Some(change)
    }

    /// Status for `(scope, name)`, falling back to the bare name.
    pub async fn get(&self, scope: Option<&str>, name: &str) -> Option<ExecutionStatus> {
        let records = self.inner.records.read().await;
        key::lookup(&records, scope, name).cloned()
    }

    pub async fn snapshot(&self) -> HashMap<String, ExecutionStatus> {
        self.inner.records.read().await.clone()
    }

    pub async fn active_count(&self) -> usize {
        self.inner
            .records
            .read()
            .await
            .values()
            .filter(|r| r.is_active)
            .count()
    }

    /// Forget every record, running ones included.
    pub async fn clear(&self) {
        self.inner.records.write().await.clear();
        self.emit(StatusChange::Cleared);
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}
