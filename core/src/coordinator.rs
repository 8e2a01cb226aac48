//! User-facing task operations: run, stop, edit and select.

use serde_json::json;
use tokio::sync::broadcast;

use crate::error::{LogFailure, PanelError};
use crate::host::PickItem;
use crate::key;
use crate::model::TaskDescriptor;
use crate::panel::{TaskPanel, SELECTED_TASKS_KEY};
use crate::status::{ExecutionHandle, StatusChange};
use crate::view::TaskNode;

impl TaskPanel {
    /// Start `task`. A running execution of the same task is soft-stopped
    /// first and given up to the restart timeout to end.
    pub async fn run_task(&self, task: &TaskDescriptor) -> Result<(), PanelError> {
        // Subscribe before looking at the handle so an end that lands in
        // between is still observed.
        let mut changes = self.inner.status.subscribe();
        let running = self
            .inner
            .status
            .get(task.scope(), &task.name)
            .await
            .filter(|s| s.is_active)
            .and_then(|s| s.handle);

        if let Some(handle) = running {
            tracing::info!(task = %task.key(), execution = %handle.execution_id, "restarting task");
            soft_stop(&handle).await;
            let timeout = self.inner.config.restart_timeout();
            if tokio::time::timeout(timeout, wait_for_end(&mut changes, task))
                .await
                .is_err()
            {
                tracing::warn!(
                    task = %task.key(),
                    "task did not end within {timeout:?}, starting a new execution anyway"
                );
            }
        }
        drop(changes);

        self.inner.host.executor.execute(task).await?;
        Ok(())
    }

    /// Interrupt or terminate the execution behind `node`. Best-effort.
    pub async fn stop_task(&self, node: &TaskNode) {
        self.stop_execution(&node.task).await;
    }

    pub async fn stop_execution(&self, task: &TaskDescriptor) {
        let handle = self
            .inner
            .status
            .get(task.scope(), &task.name)
            .await
            .and_then(|s| s.handle);
        match handle {
            Some(handle) => soft_stop(&handle).await,
            None => tracing::debug!(task = %task.key(), "stop requested for a task that is not running"),
        }
    }

    /// Open the file declaring `node` at its line.
    pub async fn edit_task(&self, node: &TaskNode) {
        self.edit_definition(&node.task).await;
    }

    pub async fn edit_definition(&self, task: &TaskDescriptor) {
        let location = self.index().location(task.scope(), &task.name).cloned();
        let Some(location) = location else {
            self.inner.host.ui.show_warning(&format!(
                "Could not find where task \"{}\" is defined.",
                task.name
            ));
            return;
        };
        self.inner
            .host
            .ui
            .open_document(&location.document_path, location.line)
            .await
            .log_failure("failed to open task definition");
    }

    /// Let the user pick which tasks the panel shows. Returns whether the
    /// selection changed.
    pub async fn select_tasks(&self) -> bool {
        let tasks = self.available_tasks().await;
        let selection = self.selection();
        let items = tasks
            .iter()
            .map(|task| PickItem {
                label: task.name.clone(),
                description: Some(match task.scope() {
                    Some(scope) => format!("{scope} · {}", task.task_type),
                    None => task.task_type.clone(),
                }),
                picked: key::list_contains(&selection, task.scope(), &task.name),
                key: task.key(),
            })
            .collect();

        match self
            .inner
            .host
            .ui
            .pick_many("Select tasks to show", items)
            .await
        {
            Some(chosen) => {
                self.set_selection(chosen.into_iter().map(|item| item.key).collect())
                    .await;
                true
            }
            None => false,
        }
    }

    /// Persist `keys` as the selection and re-render. An empty list shows
    /// every task.
    pub async fn set_selection(&self, keys: Vec<String>) {
        self.inner
            .host
            .storage
            .update(SELECTED_TASKS_KEY, json!(keys))
            .await
            .log_failure("failed to persist task selection");
        tracing::info!(count = keys.len(), "task selection changed");
        *self.inner.selection.write() = keys;
        self.notify_tree_changed();
    }
}

/// Interrupt when the execution has an interactive surface, otherwise (or
/// when the interrupt fails) terminate it. Failures are only logged.
async fn soft_stop(handle: &ExecutionHandle) {
    if handle.interruptible {
        match handle.interrupt().await {
            Ok(()) => return,
            Err(e) => tracing::warn!(
                execution = %handle.execution_id,
                "interrupt failed, terminating instead: {e:#}"
            ),
        }
    }
    handle
        .terminate()
        .await
        .log_failure("failed to terminate task");
}

async fn wait_for_end(changes: &mut broadcast::Receiver<StatusChange>, task: &TaskDescriptor) {
    let scoped = task.key();
    loop {
        match changes.recv().await {
            Ok(StatusChange::Ended { key, .. }) if key == scoped || key == task.name => return,
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "status listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}
