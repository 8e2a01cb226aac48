use std::collections::HashMap;

use super::icons::{resolve_icon, ThemeIcon, RUNNING_ICON};
use super::node::{
    Collapsible, DisplayNode, GroupNode, NodeCommand, TaskNode, CONTEXT_FOLDER,
    CONTEXT_RUNNING_TASK, CONTEXT_TASK, RESOURCE_SCHEME, RUN_TASK_COMMAND,
};
use crate::indexer::ConfigIndex;
use crate::key;
use crate::model::{TaskDescriptor, WorkspaceRoot};
use crate::status::ExecutionStatus;

pub const RUNNING_DESCRIPTION: &str = "Running…";

/// Everything one render reads. The pieces may have been refreshed at
/// different times; rendering only needs each to be internally consistent.
pub struct ViewSnapshot<'a> {
    pub tasks: &'a [TaskDescriptor],
    pub roots: &'a [WorkspaceRoot],
    pub statuses: &'a HashMap<String, ExecutionStatus>,
    pub index: &'a ConfigIndex,
    pub selection: &'a [String],
    pub flat_list: bool,
    pub ignore_hidden: bool,
}

impl<'a> ViewSnapshot<'a> {
    /// A single root always renders flat.
    pub fn is_flat(&self) -> bool {
        self.roots.len() == 1 || self.flat_list
    }

    pub fn visible_tasks(&self) -> Vec<&'a TaskDescriptor> {
        self.tasks
            .iter()
            .filter(|t| self.ignore_hidden || !self.index.is_hidden(t.scope(), &t.name))
            // An empty selection shows everything.
            .filter(|t| {
                self.selection.is_empty() || key::list_contains(self.selection, t.scope(), &t.name)
            })
            .collect()
    }

    pub fn children(&self, parent: Option<&DisplayNode>) -> Vec<DisplayNode> {
        match parent {
            None if self.is_flat() => {
                let prefix = self.roots.len() > 1;
                self.visible_tasks()
                    .into_iter()
                    .map(|t| DisplayNode::Task(self.task_node(t, prefix)))
                    .collect()
            }
            None => self.grouped_top_level(),
            Some(DisplayNode::Group(group)) => self
                .visible_tasks()
                .into_iter()
                .filter(|t| t.scope() == Some(group.root_name.as_str()))
                .map(|t| DisplayNode::Task(self.task_node(t, false)))
                .collect(),
            Some(DisplayNode::Task(_)) => Vec::new(),
        }
    }

    fn grouped_top_level(&self) -> Vec<DisplayNode> {
        let visible = self.visible_tasks();

        let mut nodes: Vec<DisplayNode> = self
            .roots
            .iter()
            .filter(|root| visible.iter().any(|t| t.scope() == Some(root.name.as_str())))
            .map(|root| {
                DisplayNode::Group(GroupNode {
                    root_name: root.name.clone(),
                    label: root.name.clone(),
                    icon: ThemeIcon {
                        id: "folder".into(),
                        color: None,
                    },
                    collapsible: Collapsible::Expanded,
                    context_value: CONTEXT_FOLDER,
                })
            })
            .collect();

        // Workspace-file and user tasks belong to no folder.
        nodes.extend(
            visible
                .into_iter()
                .filter(|t| {
                    !self
                        .roots
                        .iter()
                        .any(|root| t.scope() == Some(root.name.as_str()))
                })
                .map(|t| DisplayNode::Task(self.task_node(t, false))),
        );
        nodes
    }

    fn task_node(&self, task: &TaskDescriptor, prefix_scope: bool) -> TaskNode {
        let key = task.key();
        let status = key::lookup(self.statuses, task.scope(), &task.name);
        let is_active = status.is_some_and(|s| s.is_active);
        let selected = key::list_contains(self.selection, task.scope(), &task.name);

        let label = match task.scope() {
            Some(scope) if prefix_scope => format!("{scope}: {}", task.name),
            _ => task.name.clone(),
        };

        let mut icon = resolve_icon(task, self.index);
        let mut description = Some(task.task_type.clone());
        let mut context_value = CONTEXT_TASK;
        if is_active {
            icon.id = RUNNING_ICON.to_string();
            description = Some(RUNNING_DESCRIPTION.to_string());
            context_value = CONTEXT_RUNNING_TASK;
        } else if let Some(result) = status.and_then(|s| s.last_result) {
            description = Some(result.to_string());
        }

        let resource_uri = (is_active || selected).then(|| resource_uri(&key));

        TaskNode {
            tooltip: tooltip(task, status),
            command: Some(NodeCommand {
                command: RUN_TASK_COMMAND.to_string(),
                title: "Run Task".to_string(),
                arguments: vec![key.clone()],
            }),
            key,
            task: task.clone(),
            label,
            description,
            icon,
            context_value,
            resource_uri,
            collapsible: Collapsible::None,
        }
    }
}

/// `task://<key>` with the key URL-encoded, so `scope:name` stays one segment.
pub fn resource_uri(key: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
    format!("{RESOURCE_SCHEME}://{encoded}")
}

fn tooltip(task: &TaskDescriptor, status: Option<&ExecutionStatus>) -> String {
    let mut out = format!("**Task:** {}\n\n**Type:** {}", task.name, task.task_type);
    if let Some(scope) = task.scope() {
        out.push_str(&format!("\n\n**Folder:** {scope}"));
    }
    if let Some(detail) = task.detail.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("\n\n{detail}"));
    }
    if let Some(exec) = &task.execution {
        out.push_str(&format!("\n\n**Command:** `{}`", exec.display()));
    }
    if let Some(status) = status {
        if status.is_active {
            if let Some(started) = status.started_at {
                out.push_str(&format!("\n\n**Started:** {}", started.format("%H:%M:%S")));
            }
        } else if let (Some(result), Some(finished)) = (status.last_result, status.finished_at) {
            out.push_str(&format!(
                "\n\n**Last run:** {result} at {}",
                finished.format("%H:%M:%S")
            ));
        }
    }
    out
}
