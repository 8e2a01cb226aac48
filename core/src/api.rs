//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `fast_tasks_core::api` instead of reaching into internal modules.

pub use crate::config::{
    get_data_dir, load_default, AppConfig, LoggingConfig, PanelConfig, PathsConfig, StorageConfig,
};
pub use crate::error::{CliError, LogFailure, PanelError};
pub use crate::host::{
    ExecutionControl, FileSystem, HostServices, Memento, PickItem, SettingsSource, TaskExecutor,
    TaskSource, UserInterface, WorkspaceHost, SETTING_FLAT_LIST, SETTING_IGNORE_HIDDEN,
};
pub use crate::indexer::{
    build_index, locate_documents, task_entries, ConfigDocument, ConfigIndex, DocumentKind,
};
pub use crate::inventory::InventoryCache;
pub use crate::jsonc::{line_at, parse_tree, ParsedDocument};
pub use crate::key::task_key;
pub use crate::model::{
    ExecutionSpec, IconAnnotation, SourceLocation, TaskDescriptor, TaskSourceKind, WorkspaceRoot,
};
pub use crate::panel::{load_selection, PanelEvent, RefreshOptions, TaskPanel, SELECTED_TASKS_KEY};
pub use crate::status::{
    ExecutionHandle, ExecutionStatus, LifecycleEvent, StatusChange, StatusTracker, TaskRef,
    TaskResult,
};
pub use crate::view::{Collapsible, DisplayNode, GroupNode, NodeCommand, TaskNode, ThemeIcon};
