use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::key::task_key;

/// Where a task definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskSourceKind {
    /// A folder's `.vscode/tasks.json`.
    Workspace,
    /// The `tasks` block of a multi-root workspace file.
    WorkspaceFile,
    /// The user-level tasks file.
    User,
    /// Auto-detected by a task provider, no persisted definition.
    Detected,
}

impl TaskSourceKind {
    /// Configured tasks are the ones a user wrote down somewhere.
    pub fn is_configured(self) -> bool {
        matches!(
            self,
            TaskSourceKind::Workspace | TaskSourceKind::WorkspaceFile | TaskSourceKind::User
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExecutionSpec {
    /// A single command line handed to the shell.
    Shell { command_line: String },
    /// A program plus argument vector.
    Process { program: String, args: Vec<String> },
}

impl ExecutionSpec {
    pub fn display(&self) -> String {
        match self {
            ExecutionSpec::Shell { command_line } => command_line.clone(),
            ExecutionSpec::Process { program, args } => {
                let mut out = program.clone();
                for arg in args {
                    out.push(' ');
                    out.push_str(arg);
                }
                out
            }
        }
    }
}

/// A runnable unit known to the host. Read-only for the panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    pub name: String,
    /// Owning workspace folder name, `None` for workspace-file and user tasks.
    #[serde(default)]
    pub scope: Option<String>,
    pub task_type: String,
    #[serde(default)]
    pub detail: Option<String>,
    pub source: TaskSourceKind,
    #[serde(default)]
    pub execution: Option<ExecutionSpec>,
    /// Raw `icon` value from the task's own declaration.
    #[serde(default)]
    pub icon: Option<serde_json::Value>,
}

impl TaskDescriptor {
    pub fn key(&self) -> String {
        task_key(self.scope.as_deref(), &self.name)
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

/// A workspace folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRoot {
    pub name: String,
    pub path: PathBuf,
}

impl WorkspaceRoot {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconAnnotation {
    pub icon_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
}

impl IconAnnotation {
    /// Accepts `{ "id": "<non-empty>", "color"?: "<non-empty>" }`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id")?.as_str()?.trim();
        if id.is_empty() {
            return None;
        }
        let color_id = match obj.get("color") {
            None | Some(serde_json::Value::Null) => None,
            Some(color) => {
                let color = color.as_str()?.trim();
                if color.is_empty() {
                    return None;
                }
                Some(color.to_string())
            }
        };
        Some(Self {
            icon_id: id.to_string(),
            color_id,
        })
    }
}

/// Where a task is declared. `line` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub document_path: PathBuf,
    pub line: u32,
}
