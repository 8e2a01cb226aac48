use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::jsonc::{Node, NodeKind, Segment};
use crate::model::{TaskSourceKind, WorkspaceRoot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// `<folder>/.vscode/tasks.json`
    FolderTasks,
    /// `.vscode/tasks.json` next to the workspace file.
    RootTasks,
    /// `*.code-workspace`
    WorkspaceFile,
    /// The user-level `tasks.json`.
    UserTasks,
}

impl DocumentKind {
    pub fn source_kind(self) -> TaskSourceKind {
        match self {
            DocumentKind::FolderTasks | DocumentKind::RootTasks => TaskSourceKind::Workspace,
            DocumentKind::WorkspaceFile => TaskSourceKind::WorkspaceFile,
            DocumentKind::UserTasks => TaskSourceKind::User,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub scope: Option<String>,
}

pub fn folder_tasks_path(folder: &Path) -> PathBuf {
    folder.join(".vscode").join("tasks.json")
}

/// Every configuration document that may declare tasks, in indexing order.
/// Later documents overwrite entries of earlier ones.
pub fn locate_documents(
    roots: &[WorkspaceRoot],
    workspace_file: Option<&Path>,
    user_tasks_file: Option<&Path>,
) -> Vec<ConfigDocument> {
    let mut docs: Vec<ConfigDocument> = roots
        .iter()
        .map(|root| ConfigDocument {
            path: folder_tasks_path(&root.path),
            kind: DocumentKind::FolderTasks,
            scope: Some(root.name.clone()),
        })
        .collect();

    if let Some(workspace_file) = workspace_file {
        if let Some(dir) = workspace_file.parent() {
            let path = folder_tasks_path(dir);
            if !docs.iter().any(|d| d.path == path) {
                docs.push(ConfigDocument {
                    path,
                    kind: DocumentKind::RootTasks,
                    scope: None,
                });
            }
        }
        docs.push(ConfigDocument {
            path: workspace_file.to_path_buf(),
            kind: DocumentKind::WorkspaceFile,
            scope: None,
        });
    }

    if let Some(user) = user_tasks_file {
        docs.push(ConfigDocument {
            path: user.to_path_buf(),
            kind: DocumentKind::UserTasks,
            scope: None,
        });
    }

    docs
}

/// The array node holding task entries for a document of `kind`.
///
/// Workspace files carry tasks either in a top-level `tasks` block or nested
/// under `settings.tasks`; both accept the block form (`{ "tasks": [...] }`)
/// and a bare array.
pub fn task_array(root: &Node, kind: DocumentKind) -> Option<&Node> {
    fn block_tasks(block: &Node) -> Option<&Node> {
        match block.kind {
            NodeKind::Array => Some(block),
            NodeKind::Object => block
                .find(&[Segment::Key("tasks")])
                .filter(|n| n.kind == NodeKind::Array),
            _ => None,
        }
    }

    match kind {
        DocumentKind::WorkspaceFile => root
            .find(&[Segment::Key("tasks")])
            .and_then(block_tasks)
            .or_else(|| {
                root.find(&[Segment::Key("settings"), Segment::Key("tasks")])
                    .and_then(block_tasks)
            }),
        _ => root
            .find(&[Segment::Key("tasks")])
            .filter(|n| n.kind == NodeKind::Array),
    }
}

/// One declared task inside a configuration document.
#[derive(Debug, Clone)]
pub struct TaskEntry<'a> {
    pub node: &'a Node,
    pub value: Value,
}

impl TaskEntry<'_> {
    pub fn label(&self) -> Option<&str> {
        self.value
            .get("label")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Offset of the `label` property, or of the entry itself.
    pub fn declaration_offset(&self) -> usize {
        self.node
            .property("label")
            .map_or(self.node.offset, |prop| prop.offset)
    }
}

pub fn task_entries(root: &Node, kind: DocumentKind) -> Vec<TaskEntry<'_>> {
    task_array(root, kind)
        .map(|array| {
            array
                .children
                .iter()
                .filter(|n| n.kind == NodeKind::Object)
                .map(|node| TaskEntry {
                    node,
                    value: node.to_value(),
                })
                .collect()
        })
        .unwrap_or_default()
}
