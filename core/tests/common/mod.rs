#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fast_tasks_core::api::{
    ExecutionControl, ExecutionHandle, FileSystem, HostServices, LifecycleEvent, Memento,
    PanelEvent, PickItem, SettingsSource, TaskDescriptor, TaskExecutor, TaskRef, TaskSource,
    TaskSourceKind, UserInterface, WorkspaceHost, WorkspaceRoot,
};
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

pub const APP_TASKS: &str = r#"{
  // build tasks
  "version": "2.0.0",
  "tasks": [
    {
      "label": "build",
      "type": "shell",
      "command": "make",
      "icon": { "id": "tools", "color": "terminal.ansiGreen" }
    },
    {
      "label": "secret",
      "type": "shell",
      "hide": true,
    },
  ]
}"#;

pub const LIB_TASKS: &str = r#"{
  "tasks": [
    { "label": "test", "type": "shell", "command": "cargo test" }
  ]
}"#;

/// What the fake control does when asked to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBehavior {
    /// Acknowledge but never report an end.
    Ignore,
    /// Report the end with exit code 130.
    End,
    /// Fail the interrupt; terminate still works.
    FailInterrupt,
}

/// One in-memory implementation of every host seam.
pub struct FakeHost {
    pub tasks: Mutex<Vec<TaskDescriptor>>,
    pub fail_fetch: Mutex<bool>,
    pub fetch_count: Mutex<usize>,
    pub files: Mutex<HashMap<PathBuf, String>>,
    pub roots: Mutex<Vec<WorkspaceRoot>>,
    pub workspace_file: Option<PathBuf>,
    pub storage: Mutex<HashMap<String, serde_json::Value>>,
    pub settings: Mutex<HashMap<String, bool>>,
    pub warnings: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    /// Keys the picker answers with; `None` dismisses it.
    pub pick_answer: Mutex<Option<Vec<String>>>,
    pub offered: Mutex<Vec<PickItem>>,
    pub opened: Mutex<Vec<(PathBuf, u32)>>,
    pub executed: Mutex<Vec<(String, Instant)>>,
    pub stop_calls: Arc<Mutex<Vec<String>>>,
    pub fail_subscribe: bool,
    lifecycle_tx: Mutex<Option<mpsc::Sender<LifecycleEvent>>>,
}

impl FakeHost {
    pub fn two_roots() -> Self {
        let mut files = HashMap::new();
        files.insert(PathBuf::from("/ws/app/.vscode/tasks.json"), APP_TASKS.to_string());
        files.insert(PathBuf::from("/ws/lib/.vscode/tasks.json"), LIB_TASKS.to_string());
        Self {
            tasks: Mutex::new(vec![
                task(Some("app"), "build", TaskSourceKind::Workspace),
                task(Some("app"), "secret", TaskSourceKind::Workspace),
                task(Some("lib"), "test", TaskSourceKind::Workspace),
                task(None, "global", TaskSourceKind::User),
                task(Some("app"), "npm: lint", TaskSourceKind::Detected),
            ]),
            fail_fetch: Mutex::new(false),
            fetch_count: Mutex::new(0),
            files: Mutex::new(files),
            roots: Mutex::new(vec![
                WorkspaceRoot::new("app", "/ws/app"),
                WorkspaceRoot::new("lib", "/ws/lib"),
            ]),
            workspace_file: None,
            storage: Mutex::new(HashMap::new()),
            settings: Mutex::new(HashMap::new()),
            warnings: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
            pick_answer: Mutex::new(None),
            offered: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
            stop_calls: Arc::new(Mutex::new(Vec::new())),
            fail_subscribe: false,
            lifecycle_tx: Mutex::new(None),
        }
    }

    pub fn services(self: &Arc<Self>) -> HostServices {
        HostServices {
            tasks: self.clone(),
            executor: self.clone(),
            workspace: self.clone(),
            files: self.clone(),
            storage: self.clone(),
            settings: self.clone(),
            ui: self.clone(),
        }
    }

    pub fn sender(&self) -> mpsc::Sender<LifecycleEvent> {
        self.lifecycle_tx
            .lock()
            .clone()
            .expect("lifecycle not subscribed")
    }

    pub async fn start(&self, scope: Option<&str>, name: &str, id: &str, interruptible: bool, stop: StopBehavior) {
        let control = FakeControl {
            task: TaskRef::new(scope, name),
            execution_id: id.to_string(),
            behavior: stop,
            tx: self.sender(),
            calls: self.stop_calls.clone(),
        };
        self.sender()
            .send(LifecycleEvent::ProcessStarted {
                task: TaskRef::new(scope, name),
                handle: ExecutionHandle::new(id, interruptible, Arc::new(control)),
            })
            .await
            .unwrap();
    }

    pub async fn end(&self, scope: Option<&str>, name: &str, id: &str, exit_code: i32) {
        self.sender()
            .send(LifecycleEvent::ProcessEnded {
                task: TaskRef::new(scope, name),
                execution_id: Some(id.to_string()),
                exit_code,
            })
            .await
            .unwrap();
    }

    pub fn executed_keys(&self) -> Vec<String> {
        self.executed.lock().iter().map(|(k, _)| k.clone()).collect()
    }
}

pub fn task(scope: Option<&str>, name: &str, source: TaskSourceKind) -> TaskDescriptor {
    TaskDescriptor {
        name: name.to_string(),
        scope: scope.map(str::to_string),
        task_type: if source == TaskSourceKind::Detected {
            "npm".to_string()
        } else {
            "shell".to_string()
        },
        detail: None,
        source,
        execution: None,
        icon: None,
    }
}

/// Wait until the panel has committed a status change.
pub async fn next_status(rx: &mut broadcast::Receiver<PanelEvent>) {
    loop {
        if let PanelEvent::Status(_) = rx.recv().await.unwrap() {
            return;
        }
    }
}

#[async_trait]
impl TaskSource for FakeHost {
    async fn fetch_tasks(&self) -> anyhow::Result<Vec<TaskDescriptor>> {
        *self.fetch_count.lock() += 1;
        if *self.fail_fetch.lock() {
            anyhow::bail!("task provider crashed");
        }
        Ok(self.tasks.lock().clone())
    }
}

#[async_trait]
impl TaskExecutor for FakeHost {
    async fn execute(&self, task: &TaskDescriptor) -> anyhow::Result<()> {
        self.executed.lock().push((task.key(), Instant::now()));
        Ok(())
    }

    fn subscribe_lifecycle(&self) -> anyhow::Result<mpsc::Receiver<LifecycleEvent>> {
        if self.fail_subscribe {
            anyhow::bail!("lifecycle events unavailable");
        }
        let (tx, rx) = mpsc::channel(64);
        *self.lifecycle_tx.lock() = Some(tx);
        Ok(rx)
    }
}

impl WorkspaceHost for FakeHost {
    fn roots(&self) -> Vec<WorkspaceRoot> {
        self.roots.lock().clone()
    }

    fn workspace_file(&self) -> Option<PathBuf> {
        self.workspace_file.clone()
    }

    fn user_tasks_file(&self) -> Option<PathBuf> {
        None
    }
}

#[async_trait]
impl FileSystem for FakeHost {
    async fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }

    async fn read_to_string(&self, path: &Path) -> anyhow::Result<String> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such file: {}", path.display()))
    }
}

#[async_trait]
impl Memento for FakeHost {
    async fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
        Ok(self.storage.lock().get(key).cloned())
    }

    async fn update(&self, key: &str, value: serde_json::Value) -> anyhow::Result<()> {
        self.storage.lock().insert(key.to_string(), value);
        Ok(())
    }
}

impl SettingsSource for FakeHost {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.settings.lock().get(key).copied()
    }
}

#[async_trait]
impl UserInterface for FakeHost {
    fn show_warning(&self, message: &str) {
        self.warnings.lock().push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    async fn pick_many(&self, _title: &str, items: Vec<PickItem>) -> Option<Vec<PickItem>> {
        *self.offered.lock() = items.clone();
        let answer = self.pick_answer.lock().clone()?;
        Some(
            items
                .into_iter()
                .filter(|item| answer.contains(&item.key))
                .collect(),
        )
    }

    async fn open_document(&self, path: &Path, line: u32) -> anyhow::Result<()> {
        self.opened.lock().push((path.to_path_buf(), line));
        Ok(())
    }
}

pub struct FakeControl {
    task: TaskRef,
    execution_id: String,
    behavior: StopBehavior,
    tx: mpsc::Sender<LifecycleEvent>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeControl {
    async fn report_end(&self) {
        if self.behavior == StopBehavior::End {
            let _ = self
                .tx
                .send(LifecycleEvent::ProcessEnded {
                    task: self.task.clone(),
                    execution_id: Some(self.execution_id.clone()),
                    exit_code: 130,
                })
                .await;
        }
    }
}

#[async_trait]
impl ExecutionControl for FakeControl {
    async fn interrupt(&self) -> anyhow::Result<()> {
        self.calls.lock().push(format!("interrupt {}", self.execution_id));
        if self.behavior == StopBehavior::FailInterrupt {
            anyhow::bail!("terminal is gone");
        }
        self.report_end().await;
        Ok(())
    }

    async fn terminate(&self) -> anyhow::Result<()> {
        self.calls.lock().push(format!("terminate {}", self.execution_id));
        self.report_end().await;
        Ok(())
    }
}
