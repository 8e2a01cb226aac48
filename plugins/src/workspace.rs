//! Workspace layout on the local machine.

use std::path::{Path, PathBuf};

use anyhow::Context;
use fast_tasks_core::api::{parse_tree, WorkspaceHost, WorkspaceRoot};
use serde_json::Value;

pub const WORKSPACE_FILE_EXTENSION: &str = "code-workspace";

#[derive(Debug, Clone, Default)]
pub struct LocalWorkspace {
    roots: Vec<WorkspaceRoot>,
    workspace_file: Option<PathBuf>,
    user_tasks_file: Option<PathBuf>,
}

impl LocalWorkspace {
    /// One root per folder, named after its last path component.
    pub fn from_folders(folders: Vec<PathBuf>) -> Self {
        let roots = folders
            .into_iter()
            .map(|path| WorkspaceRoot::new(folder_name(&path), path))
            .collect();
        Self {
            roots,
            ..Default::default()
        }
    }

    /// Roots listed in the `folders` array of a workspace file. Relative
    /// paths resolve against the file's directory.
    pub fn from_workspace_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read workspace file {}", path.display()))?;
        let parsed = parse_tree(&text);
        let Some(root) = parsed.root else {
            anyhow::bail!("workspace file {} is not valid JSON", path.display());
        };
        if parsed.errors.is_empty() {
            tracing::debug!(path = %path.display(), "parsed workspace file");
        } else {
            tracing::warn!(
                path = %path.display(),
                errors = parsed.errors.len(),
                "workspace file has syntax errors, using what could be read"
            );
        }

        let base = path.parent().unwrap_or(Path::new("."));
        let roots = root
            .to_value()
            .get("folders")
            .and_then(Value::as_array)
            .map(|folders| folders.iter().filter_map(|f| workspace_folder(base, f)).collect())
            .unwrap_or_default();

        Ok(Self {
            roots,
            workspace_file: Some(path.to_path_buf()),
            user_tasks_file: None,
        })
    }

    /// A single `.code-workspace` file in `dir` makes a multi-root
    /// workspace; anything else opens `dir` as the only folder.
    pub fn discover(dir: &Path) -> anyhow::Result<Self> {
        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == WORKSPACE_FILE_EXTENSION) {
                candidates.push(path);
            }
        }
        match candidates.as_slice() {
            [file] => Self::from_workspace_file(file),
            _ => Ok(Self::from_folders(vec![dir.to_path_buf()])),
        }
    }

    pub fn with_user_tasks_file(mut self, path: Option<PathBuf>) -> Self {
        self.user_tasks_file = path;
        self
    }

    /// Where per-workspace state is keyed: the workspace file, else the
    /// first folder.
    pub fn identity_path(&self) -> PathBuf {
        self.workspace_file
            .clone()
            .or_else(|| self.roots.first().map(|r| r.path.clone()))
            .unwrap_or_default()
    }

    pub fn root_path(&self, scope: Option<&str>) -> Option<PathBuf> {
        match scope {
            Some(name) => self
                .roots
                .iter()
                .find(|r| r.name == name)
                .map(|r| r.path.clone()),
            None => self
                .workspace_file
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .or_else(|| self.roots.first().map(|r| r.path.clone())),
        }
    }
}

fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn workspace_folder(base: &Path, folder: &Value) -> Option<WorkspaceRoot> {
    let raw = folder.get("path")?.as_str()?;
    let path = Path::new(raw);
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let name = folder
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| folder_name(&path));
    Some(WorkspaceRoot::new(name, path))
}

impl WorkspaceHost for LocalWorkspace {
    fn roots(&self) -> Vec<WorkspaceRoot> {
        self.roots.clone()
    }

    fn workspace_file(&self) -> Option<PathBuf> {
        self.workspace_file.clone()
    }

    fn user_tasks_file(&self) -> Option<PathBuf> {
        self.user_tasks_file.clone()
    }
}
