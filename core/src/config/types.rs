use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::host::{SettingsSource, SETTING_FLAT_LIST, SETTING_IGNORE_HIDDEN};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub panel: PanelConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "fast_tasks_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    false
}

fn default_logging_file() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub flat_list: bool,

    #[serde(default)]
    pub ignore_hidden: bool,

    #[serde(default = "default_inventory_ttl_ms")]
    pub inventory_ttl_ms: u64,

    /// Upper bound on waiting for a stopped task before it is restarted.
    #[serde(default = "default_restart_timeout_ms")]
    pub restart_timeout_ms: u64,

    #[serde(default = "default_lifecycle_queue_capacity")]
    pub lifecycle_queue_capacity: usize,
}

fn default_inventory_ttl_ms() -> u64 {
    5000
}

fn default_restart_timeout_ms() -> u64 {
    2000
}

fn default_lifecycle_queue_capacity() -> usize {
    256
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            flat_list: false,
            ignore_hidden: false,
            inventory_ttl_ms: default_inventory_ttl_ms(),
            restart_timeout_ms: default_restart_timeout_ms(),
            lifecycle_queue_capacity: default_lifecycle_queue_capacity(),
        }
    }
}

impl PanelConfig {
    pub fn inventory_ttl(&self) -> Duration {
        Duration::from_millis(self.inventory_ttl_ms)
    }

    pub fn restart_timeout(&self) -> Duration {
        Duration::from_millis(self.restart_timeout_ms)
    }
}

impl SettingsSource for PanelConfig {
    fn get_bool(&self, key: &str) -> Option<bool> {
        match key {
            SETTING_FLAT_LIST => Some(self.flat_list),
            SETTING_IGNORE_HIDDEN => Some(self.ignore_hidden),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where per-workspace state files live. Defaults to
    /// `~/.fast-tasks/workspaces`.
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default)]
    pub user_tasks_file: Option<String>,
}
