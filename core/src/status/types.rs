use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::host::ExecutionControl;
use crate::key::task_key;
use crate::model::TaskDescriptor;

/// Outcome of a finished execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskResult {
    Success,
    Failed(i32),
}

impl TaskResult {
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            TaskResult::Success
        } else {
            TaskResult::Failed(code)
        }
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskResult::Success => write!(f, "Success"),
            TaskResult::Failed(code) => write!(f, "Failed (exit code {code})"),
        }
    }
}

/// A live execution and what can be done to it. The capability flags are
/// fixed when the handle is created.
#[derive(Clone)]
pub struct ExecutionHandle {
    pub execution_id: String,
    /// Whether an interrupt can be delivered through an interactive surface.
    pub interruptible: bool,
    control: Arc<dyn ExecutionControl>,
}

impl ExecutionHandle {
    pub fn new(
        execution_id: impl Into<String>,
        interruptible: bool,
        control: Arc<dyn ExecutionControl>,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            interruptible,
            control,
        }
    }

    pub async fn interrupt(&self) -> anyhow::Result<()> {
        if !self.interruptible {
            anyhow::bail!("execution {} has no interactive surface", self.execution_id);
        }
        self.control.interrupt().await
    }

    pub async fn terminate(&self) -> anyhow::Result<()> {
        self.control.terminate().await
    }
}

impl fmt::Debug for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionHandle")
            .field("execution_id", &self.execution_id)
            .field("interruptible", &self.interruptible)
            .finish_non_exhaustive()
    }
}

/// The identity part of a task as carried by lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaskRef {
    pub name: String,
    pub scope: Option<String>,
}

impl TaskRef {
    pub fn new(scope: Option<&str>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            scope: scope.map(str::to_string),
        }
    }

    pub fn key(&self) -> String {
        task_key(self.scope.as_deref(), &self.name)
    }
}

impl From<&TaskDescriptor> for TaskRef {
    fn from(task: &TaskDescriptor) -> Self {
        TaskRef::new(task.scope(), &task.name)
    }
}

#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    ProcessStarted {
        task: TaskRef,
        handle: ExecutionHandle,
    },
    ProcessEnded {
        task: TaskRef,
        execution_id: Option<String>,
        exit_code: i32,
    },
}

impl LifecycleEvent {
    pub fn task(&self) -> &TaskRef {
        match self {
            LifecycleEvent::ProcessStarted { task, .. } | LifecycleEvent::ProcessEnded { task, .. } => task,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionStatus {
    pub is_active: bool,
    pub last_result: Option<TaskResult>,
    pub handle: Option<ExecutionHandle>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Broadcast after each committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    Started { key: String, execution_id: String },
    Ended { key: String, result: TaskResult },
    Cleared,
}
