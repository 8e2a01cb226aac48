use std::path::{Path, PathBuf};

use super::types::AppConfig;
use crate::error::PanelError;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOCAL_CONFIG_FILE_NAME: &str = "fast-tasks.toml";

/// Get the default data directory: ~/.fast-tasks
pub fn get_data_dir() -> Result<PathBuf, PanelError> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| PanelError::Config("cannot determine home directory".into()))?;
    Ok(PathBuf::from(home).join(".fast-tasks"))
}

pub fn load_default() -> Result<AppConfig, PanelError> {
    let data_dir = get_data_dir()?;
    let mut cfg = load_from(&[
        data_dir.join(CONFIG_FILE_NAME),
        PathBuf::from(LOCAL_CONFIG_FILE_NAME),
    ])?;

    if cfg
        .logging
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }
    if cfg
        .storage
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true)
    {
        cfg.storage.directory = Some(data_dir.join("workspaces").to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg, |name| std::env::var(name).ok());
    Ok(cfg)
}

/// First existing file wins; none existing gives defaults.
pub fn load_from(candidates: &[PathBuf]) -> Result<AppConfig, PanelError> {
    match candidates.iter().find(|p| p.exists()) {
        Some(path) => parse_file(path),
        None => Ok(AppConfig::default()),
    }
}

fn parse_file(path: &Path) -> Result<AppConfig, PanelError> {
    let s = std::fs::read_to_string(path).map_err(|source| PanelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s)
        .map_err(|e| PanelError::Config(format!("{}: {e}", path.display())))
}

pub fn apply_env_overrides(cfg: &mut AppConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("FAST_TASKS_FLAT_LIST").and_then(|v| parse_flag(&v)) {
        cfg.panel.flat_list = v;
    }
    if let Some(v) = var("FAST_TASKS_IGNORE_HIDDEN").and_then(|v| parse_flag(&v)) {
        cfg.panel.ignore_hidden = v;
    }
    if let Some(v) = var("FAST_TASKS_USER_TASKS") {
        if !v.trim().is_empty() {
            cfg.paths.user_tasks_file = Some(v);
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("missing.toml");
        let second = dir.path().join("fast-tasks.toml");
        std::fs::write(&second, "[panel]\nflat_list = true\n").unwrap();

        let cfg = load_from(&[first, second]).unwrap();
        assert!(cfg.panel.flat_list);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[panel\n").unwrap();

        let err = load_from(&[path]).unwrap_err();
        assert!(matches!(err, PanelError::Config(_)));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            ("FAST_TASKS_FLAT_LIST", "yes"),
            ("FAST_TASKS_IGNORE_HIDDEN", "maybe"),
            ("FAST_TASKS_USER_TASKS", "/tmp/tasks.json"),
        ]
        .into_iter()
        .collect();

        let mut cfg = AppConfig::default();
        cfg.panel.ignore_hidden = true;
        apply_env_overrides(&mut cfg, |k| env.get(k).map(|v| v.to_string()));

        assert!(cfg.panel.flat_list);
        // Unparseable values leave the setting alone.
        assert!(cfg.panel.ignore_hidden);
        assert_eq!(cfg.paths.user_tasks_file.as_deref(), Some("/tmp/tasks.json"));
    }
}
