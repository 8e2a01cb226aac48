use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use fast_tasks_core::api::{get_data_dir, AppConfig, HostServices, UserInterface};

use crate::discovery::ConfigFileTaskSource;
use crate::executor::ProcessExecutor;
use crate::fs::LocalFileSystem;
use crate::storage::JsonFileMemento;
use crate::workspace::LocalWorkspace;

pub const USER_TASKS_FILE_NAME: &str = "tasks.json";

pub fn user_tasks_file(cfg: &AppConfig) -> Result<PathBuf> {
    match cfg.paths.user_tasks_file.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(get_data_dir()?.join(USER_TASKS_FILE_NAME)),
    }
}

pub fn storage_dir(cfg: &AppConfig) -> Result<PathBuf> {
    match cfg.storage.directory.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => Ok(get_data_dir()?.join("workspaces")),
    }
}

/// Wire local adapters for `workspace` into the seams the panel consumes.
pub async fn build_host(
    cfg: &AppConfig,
    workspace: LocalWorkspace,
    ui: Arc<dyn UserInterface>,
) -> Result<HostServices> {
    let workspace = Arc::new(workspace.with_user_tasks_file(Some(user_tasks_file(cfg)?)));
    let files = Arc::new(LocalFileSystem);
    let storage =
        JsonFileMemento::for_workspace(&storage_dir(cfg)?, &workspace.identity_path()).await?;
    tracing::debug!(state = %storage.path().display(), "workspace state file");

    Ok(HostServices {
        tasks: Arc::new(ConfigFileTaskSource::new(workspace.clone(), files.clone())),
        executor: Arc::new(ProcessExecutor::new(
            workspace.clone(),
            cfg.panel.lifecycle_queue_capacity,
        )),
        workspace,
        files,
        storage: Arc::new(storage),
        settings: Arc::new(cfg.panel.clone()),
        ui,
    })
}
