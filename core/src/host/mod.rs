//! Seams to the environment hosting the panel.
//!
//! The panel never spawns processes, renders widgets or touches storage
//! directly; everything outside its own state goes through these traits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::model::{TaskDescriptor, WorkspaceRoot};
use crate::status::LifecycleEvent;

pub const SETTING_FLAT_LIST: &str = "fastTasks.flatList";
pub const SETTING_IGNORE_HIDDEN: &str = "fastTasks.ignoreHidden";

/// Enumerates every task the host knows about, configured or not.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_tasks(&self) -> anyhow::Result<Vec<TaskDescriptor>>;
}

/// Starts tasks and reports their lifecycle.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, task: &TaskDescriptor) -> anyhow::Result<()>;

    /// Registers for process started / ended events.
    fn subscribe_lifecycle(&self) -> anyhow::Result<mpsc::Receiver<LifecycleEvent>>;
}

/// Control surface of one running execution.
#[async_trait]
pub trait ExecutionControl: Send + Sync {
    /// Sends an interrupt to the interactive surface (terminal) of the task.
    async fn interrupt(&self) -> anyhow::Result<()>;
    async fn terminate(&self) -> anyhow::Result<()>;
}

/// Durable key-value storage scoped to the current workspace.
#[async_trait]
pub trait Memento: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>>;
    async fn update(&self, key: &str, value: serde_json::Value) -> anyhow::Result<()>;
}

pub trait WorkspaceHost: Send + Sync {
    fn roots(&self) -> Vec<WorkspaceRoot>;
    /// The multi-root workspace definition file, if the workspace has one.
    fn workspace_file(&self) -> Option<PathBuf>;
    fn user_tasks_file(&self) -> Option<PathBuf>;
}

pub trait SettingsSource: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;
}

#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn exists(&self, path: &Path) -> bool;
    async fn read_to_string(&self, path: &Path) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: Option<String>,
    pub picked: bool,
    /// Value persisted when the item is chosen.
    pub key: String,
}

#[async_trait]
pub trait UserInterface: Send + Sync {
    fn show_warning(&self, message: &str);
    fn show_error(&self, message: &str);
    /// `None` when the user dismissed the picker.
    async fn pick_many(&self, title: &str, items: Vec<PickItem>) -> Option<Vec<PickItem>>;
    /// Open `path` with the caret on zero-based `line`.
    async fn open_document(&self, path: &Path, line: u32) -> anyhow::Result<()>;
}

/// Everything the panel needs from its host.
#[derive(Clone)]
pub struct HostServices {
    pub tasks: Arc<dyn TaskSource>,
    pub executor: Arc<dyn TaskExecutor>,
    pub workspace: Arc<dyn WorkspaceHost>,
    pub files: Arc<dyn FileSystem>,
    pub storage: Arc<dyn Memento>,
    pub settings: Arc<dyn SettingsSource>,
    pub ui: Arc<dyn UserInterface>,
}
