use std::path::{Path, PathBuf};
use std::sync::Arc;

use fast_tasks_core::api::{AppConfig, CliError, PanelError, TaskPanel, UserInterface};
use fast_tasks_plugins::build_host;
use fast_tasks_plugins::workspace::{LocalWorkspace, WORKSPACE_FILE_EXTENSION};

use crate::commands::cli::Args;

/// Everything a command needs: the effective config and an activated panel.
pub struct AppContext {
    pub cfg: AppConfig,
    pub panel: TaskPanel,
}

impl AppContext {
    pub async fn open(
        cfg: AppConfig,
        args: &Args,
        ui: Arc<dyn UserInterface>,
    ) -> Result<Self, CliError> {
        let workspace = resolve_workspace(args)?;
        let host = build_host(&cfg, workspace, ui)
            .await
            .map_err(PanelError::Host)?;
        let panel = TaskPanel::activate(host, cfg.panel.clone()).await;
        Ok(Self { cfg, panel })
    }
}

pub fn resolve_workspace(args: &Args) -> Result<LocalWorkspace, CliError> {
    let cwd = std::env::current_dir()?;
    if !args.folders.is_empty() {
        let folders = args.folders.iter().map(|f| absolute(&cwd, f)).collect();
        return Ok(LocalWorkspace::from_folders(folders));
    }

    let target = args
        .workspace
        .as_deref()
        .map(|p| absolute(&cwd, p))
        .unwrap_or(cwd);
    let is_workspace_file = target
        .extension()
        .is_some_and(|ext| ext == WORKSPACE_FILE_EXTENSION);
    let workspace = if is_workspace_file {
        LocalWorkspace::from_workspace_file(&target)
    } else if target.is_dir() {
        LocalWorkspace::discover(&target)
    } else {
        return Err(CliError::Command(format!(
            "{} is neither a folder nor a .{WORKSPACE_FILE_EXTENSION} file",
            target.display()
        )));
    };
    workspace.map_err(|e| CliError::Panel(PanelError::Host(e)))
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
