//! The task panel aggregate.
//!
//! One [`TaskPanel`] owns the inventory cache, status table, configuration
//! indices and the persisted selection for a workspace. Cloning is cheap and
//! every clone drives the same panel.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::config::PanelConfig;
use crate::error::{LogFailure, PanelError};
use crate::host::{HostServices, Memento, SETTING_FLAT_LIST, SETTING_IGNORE_HIDDEN};
use crate::indexer::{build_index, locate_documents, ConfigIndex};
use crate::inventory::InventoryCache;
use crate::model::TaskDescriptor;
use crate::status::{ExecutionStatus, LifecycleEvent, StatusChange, StatusTracker};
use crate::view::{DisplayNode, ViewSnapshot};

/// Storage key of the persisted selection.
pub const SELECTED_TASKS_KEY: &str = "selectedTasks";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOptions {
    pub clear_statuses: bool,
    pub reload_config: bool,
    pub invalidate_inventory: bool,
}

impl RefreshOptions {
    pub fn full() -> Self {
        Self {
            clear_statuses: true,
            reload_config: true,
            invalidate_inventory: true,
        }
    }
}

/// Re-render signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    TreeChanged,
    Status(StatusChange),
}

#[derive(Clone)]
pub struct TaskPanel {
    pub(crate) inner: Arc<PanelInner>,
}

pub(crate) struct PanelInner {
    pub(crate) host: HostServices,
    pub(crate) config: PanelConfig,
    pub(crate) inventory: InventoryCache,
    pub(crate) status: StatusTracker,
    index: RwLock<Arc<ConfigIndex>>,
    pub(crate) selection: RwLock<Vec<String>>,
    events_tx: broadcast::Sender<PanelEvent>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for PanelInner {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.lock().take() {
            pump.abort();
        }
    }
}

impl TaskPanel {
    /// A panel with empty indices and no live status. See [`TaskPanel::activate`]
    /// for the fully wired version.
    pub fn new(host: HostServices, config: PanelConfig, selection: Vec<String>) -> Self {
        let (events_tx, _) = broadcast::channel(256);
        let inner = PanelInner {
            inventory: InventoryCache::new(config.inventory_ttl()),
            status: StatusTracker::new(),
            index: RwLock::new(Arc::new(ConfigIndex::default())),
            selection: RwLock::new(selection),
            events_tx,
            pump: Mutex::new(None),
            host,
            config,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Load the persisted selection, start status tracking and build the
    /// indices.
    ///
    /// A failure to hook into lifecycle events is reported once and the panel
    /// is returned anyway, without live status.
    pub async fn activate(host: HostServices, config: PanelConfig) -> Self {
        let selection = load_selection(host.storage.as_ref()).await;
        let panel = Self::new(host, config, selection);

        if let Err(e) = panel.start_status_tracking() {
            tracing::error!("failed to initialize task panel: {e}");
            panel
                .inner
                .host
                .ui
                .show_error(&format!("Fast Tasks could not track running tasks: {e}"));
        }

        panel.reload_index().await;
        tracing::info!(
            selected = panel.inner.selection.read().len(),
            live_status = panel.is_tracking_status(),
            "task panel activated"
        );
        panel
    }

    /// Subscribe to the executor's lifecycle queue and commit its events to
    /// the status table until the queue closes.
    pub fn start_status_tracking(&self) -> Result<(), PanelError> {
        let rx = self
            .inner
            .host
            .executor
            .subscribe_lifecycle()
            .map_err(|e| PanelError::Activation(format!("{e:#}")))?;
        let pump = self.spawn_lifecycle_pump(rx);
        if let Some(previous) = self.inner.pump.lock().replace(pump) {
            previous.abort();
        }
        Ok(())
    }

    pub fn is_tracking_status(&self) -> bool {
        self.inner
            .pump
            .lock()
            .as_ref()
            .is_some_and(|pump| !pump.is_finished())
    }

    /// Listeners currently attached to the status table. Each pending
    /// restart wait holds one.
    pub fn status_listener_count(&self) -> usize {
        self.inner.status.receiver_count()
    }

    fn spawn_lifecycle_pump(&self, mut rx: mpsc::Receiver<LifecycleEvent>) -> JoinHandle<()> {
        let status = self.inner.status.clone();
        let events_tx = self.inner.events_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Some(change) = status.apply(event).await {
                    let _ = events_tx.send(PanelEvent::Status(change));
                }
            }
            tracing::debug!("lifecycle queue closed");
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.inner.events_tx.subscribe()
    }

    pub(crate) fn notify_tree_changed(&self) {
        let _ = self.inner.events_tx.send(PanelEvent::TreeChanged);
    }

    pub async fn refresh(&self, options: RefreshOptions) {
        tracing::debug!(?options, "refreshing task panel");
        if options.clear_statuses {
            self.inner.status.clear().await;
        }
        if options.invalidate_inventory {
            self.inner.inventory.invalidate();
        }
        if options.reload_config {
            self.reload_index().await;
        }
        self.notify_tree_changed();
    }

    /// Rebuild the indices from scratch and swap them in.
    pub async fn reload_index(&self) {
        let workspace = &self.inner.host.workspace;
        let documents = locate_documents(
            &workspace.roots(),
            workspace.workspace_file().as_deref(),
            workspace.user_tasks_file().as_deref(),
        );
        let index = build_index(self.inner.host.files.as_ref(), &documents).await;
        *self.inner.index.write() = Arc::new(index);
    }

    pub fn index(&self) -> Arc<ConfigIndex> {
        self.inner.index.read().clone()
    }

    pub fn selection(&self) -> Vec<String> {
        self.inner.selection.read().clone()
    }

    pub async fn status(&self, task: &TaskDescriptor) -> Option<ExecutionStatus> {
        self.inner.status.get(task.scope(), &task.name).await
    }

    /// Configured tasks, hidden ones included.
    pub async fn available_tasks(&self) -> Arc<Vec<TaskDescriptor>> {
        self.inner
            .inventory
            .get_available_tasks(self.inner.host.tasks.as_ref())
            .await
    }

    /// Resolve a task by identity key, falling back to a unique bare name.
    pub async fn find_task(&self, key_or_name: &str) -> Option<TaskDescriptor> {
        let tasks = self.available_tasks().await;
        if let Some(task) = tasks.iter().find(|t| t.key() == key_or_name) {
            return Some(task.clone());
        }
        let mut by_name = tasks.iter().filter(|t| t.name == key_or_name);
        match (by_name.next(), by_name.next()) {
            (Some(task), None) => Some(task.clone()),
            (Some(_), Some(_)) => {
                tracing::warn!(name = key_or_name, "task name is ambiguous across folders");
                None
            }
            _ => None,
        }
    }

    /// Children of `parent`, or the top level for `None`. Never fails; a
    /// failed enumeration renders as an empty list.
    pub async fn get_children(&self, parent: Option<&DisplayNode>) -> Vec<DisplayNode> {
        let tasks = self.available_tasks().await;
        let statuses = self.inner.status.snapshot().await;
        let index = self.index();
        let selection = self.selection();
        let roots = self.inner.host.workspace.roots();
        let settings = &self.inner.host.settings;

        let view = ViewSnapshot {
            tasks: &tasks,
            roots: &roots,
            statuses: &statuses,
            index: &index,
            selection: &selection,
            flat_list: settings.get_bool(SETTING_FLAT_LIST).unwrap_or(false),
            ignore_hidden: settings.get_bool(SETTING_IGNORE_HIDDEN).unwrap_or(false),
        };
        view.children(parent)
    }
}

/// Read the persisted selection. Anything unreadable counts as no selection.
pub async fn load_selection(storage: &dyn Memento) -> Vec<String> {
    let Some(value) = storage
        .get(SELECTED_TASKS_KEY)
        .await
        .log_failure("failed to read task selection")
        .flatten()
    else {
        return Vec::new();
    };
    match serde_json::from_value::<Vec<String>>(value) {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!("ignoring malformed task selection: {e}");
            Vec::new()
        }
    }
}
