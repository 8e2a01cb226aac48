//! Task enumeration straight from configuration files.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use fast_tasks_core::api::{
    locate_documents, parse_tree, task_entries, ConfigDocument, ExecutionSpec, FileSystem,
    TaskDescriptor, TaskSource, TaskSourceKind, WorkspaceHost,
};
use serde_json::Value;

pub const PACKAGE_JSON: &str = "package.json";

/// Reads tasks from the same documents the indexer reads, plus `npm`
/// scripts of each folder's `package.json` as detected tasks.
pub struct ConfigFileTaskSource {
    workspace: Arc<dyn WorkspaceHost>,
    files: Arc<dyn FileSystem>,
}

impl ConfigFileTaskSource {
    pub fn new(workspace: Arc<dyn WorkspaceHost>, files: Arc<dyn FileSystem>) -> Self {
        Self { workspace, files }
    }

    async fn read(&self, path: &Path) -> Option<String> {
        if !self.files.exists(path).await {
            return None;
        }
        match self.files.read_to_string(path).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("{e:#}");
                None
            }
        }
    }

    async fn configured_tasks(&self, doc: &ConfigDocument) -> Vec<TaskDescriptor> {
        let Some(text) = self.read(&doc.path).await else {
            return Vec::new();
        };
        let parsed = parse_tree(&text);
        let Some(root) = parsed.root.as_ref() else {
            tracing::warn!(path = %doc.path.display(), "no tasks read from malformed document");
            return Vec::new();
        };
        task_entries(root, doc.kind)
            .iter()
            .filter_map(|entry| {
                let label = entry.label()?;
                Some(descriptor(
                    label,
                    doc.scope.clone(),
                    doc.kind.source_kind(),
                    &entry.value,
                ))
            })
            .collect()
    }

    async fn npm_scripts(&self, scope: &str, folder: &Path) -> Vec<TaskDescriptor> {
        let Some(text) = self.read(&folder.join(PACKAGE_JSON)).await else {
            return Vec::new();
        };
        let manifest: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(folder = %folder.display(), "unreadable package.json: {e}");
                return Vec::new();
            }
        };
        let Some(scripts) = manifest.get("scripts").and_then(Value::as_object) else {
            return Vec::new();
        };
        scripts
            .iter()
            .map(|(script, body)| TaskDescriptor {
                name: format!("npm: {script}"),
                scope: Some(scope.to_string()),
                task_type: "npm".to_string(),
                detail: body.as_str().map(str::to_string),
                source: TaskSourceKind::Detected,
                execution: Some(ExecutionSpec::Shell {
                    command_line: format!("npm run {script}"),
                }),
                icon: None,
            })
            .collect()
    }
}

#[async_trait]
impl TaskSource for ConfigFileTaskSource {
    async fn fetch_tasks(&self) -> anyhow::Result<Vec<TaskDescriptor>> {
        let roots = self.workspace.roots();
        let documents = locate_documents(
            &roots,
            self.workspace.workspace_file().as_deref(),
            self.workspace.user_tasks_file().as_deref(),
        );

        let mut tasks = Vec::new();
        for doc in &documents {
            tasks.extend(self.configured_tasks(doc).await);
        }
        for root in &roots {
            tasks.extend(self.npm_scripts(&root.name, &root.path).await);
        }
        tracing::debug!(count = tasks.len(), "enumerated tasks from config files");
        Ok(tasks)
    }
}

fn descriptor(
    label: &str,
    scope: Option<String>,
    source: TaskSourceKind,
    value: &Value,
) -> TaskDescriptor {
    let task_type = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("shell")
        .to_string();
    TaskDescriptor {
        name: label.to_string(),
        scope,
        execution: execution(&task_type, value),
        task_type,
        detail: value
            .get("detail")
            .and_then(Value::as_str)
            .map(str::to_string),
        source,
        icon: value.get("icon").cloned(),
    }
}

fn platform_section(value: &Value) -> Option<&Value> {
    let key = if cfg!(windows) {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    };
    value.get(key)
}

fn execution(task_type: &str, value: &Value) -> Option<ExecutionSpec> {
    let field = |name: &str| {
        platform_section(value)
            .and_then(|p| p.get(name))
            .or_else(|| value.get(name))
    };

    if task_type == "npm" {
        if let Some(script) = value.get("script").and_then(Value::as_str) {
            return Some(ExecutionSpec::Shell {
                command_line: format!("npm run {script}"),
            });
        }
    }

    let command = field("command").and_then(string_arg)?;
    let args: Vec<String> = field("args")
        .and_then(Value::as_array)
        .map(|args| args.iter().filter_map(string_arg).collect())
        .unwrap_or_default();

    if task_type == "process" {
        return Some(ExecutionSpec::Process {
            program: command,
            args,
        });
    }
    let mut command_line = command;
    for arg in &args {
        command_line.push(' ');
        command_line.push_str(&shell_quote(arg));
    }
    Some(ExecutionSpec::Shell { command_line })
}

/// A plain string or a `{ "value": "..." }` quoting object.
fn string_arg(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => obj.get("value").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn shell_quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || "'\"$`\\".contains(c)) {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}
