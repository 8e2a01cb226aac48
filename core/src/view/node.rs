use serde::Serialize;

use super::icons::ThemeIcon;
use crate::model::TaskDescriptor;

pub const CONTEXT_TASK: &str = "task";
pub const CONTEXT_RUNNING_TASK: &str = "runningTask";
pub const CONTEXT_FOLDER: &str = "workspaceFolder";

pub const RUN_TASK_COMMAND: &str = "fastTasks.runTask";
pub const RESOURCE_SCHEME: &str = "task";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Collapsible {
    None,
    Expanded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeCommand {
    pub command: String,
    pub title: String,
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    pub root_name: String,
    pub label: String,
    pub icon: ThemeIcon,
    pub collapsible: Collapsible,
    pub context_value: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub key: String,
    pub task: TaskDescriptor,
    pub label: String,
    pub description: Option<String>,
    /// Markdown.
    pub tooltip: String,
    pub icon: ThemeIcon,
    pub context_value: &'static str,
    pub resource_uri: Option<String>,
    pub command: Option<NodeCommand>,
    pub collapsible: Collapsible,
}

impl TaskNode {
    pub fn is_running(&self) -> bool {
        self.context_value == CONTEXT_RUNNING_TASK
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DisplayNode {
    Group(GroupNode),
    Task(TaskNode),
}

impl DisplayNode {
    pub fn label(&self) -> &str {
        match self {
            DisplayNode::Group(g) => &g.label,
            DisplayNode::Task(t) => &t.label,
        }
    }

    pub fn as_task(&self) -> Option<&TaskNode> {
        match self {
            DisplayNode::Task(t) => Some(t),
            DisplayNode::Group(_) => None,
        }
    }
}
