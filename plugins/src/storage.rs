//! Per-workspace key-value state persisted as a JSON object on disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use fast_tasks_core::api::Memento;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::workspace_id::workspace_id;

pub struct JsonFileMemento {
    path: PathBuf,
    state: Mutex<Map<String, Value>>,
}

impl JsonFileMemento {
    /// State file for `workspace` inside `directory`.
    pub async fn for_workspace(directory: &Path, workspace: &Path) -> anyhow::Result<Self> {
        let path = directory.join(format!("{}.json", workspace_id(workspace)));
        Self::open(path).await
    }

    /// Open `path`, starting empty when it does not exist. A corrupt file is
    /// logged and replaced on the next update.
    pub async fn open(path: PathBuf) -> anyhow::Result<Self> {
        let state = match tokio::fs::read_to_string(&path).await {
            Ok(text) => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "discarding unreadable workspace state: {e}");
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, state: &Map<String, Value>) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let text = serde_json::to_string_pretty(state)?;
        // Write then rename so readers never see half a file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, text)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl Memento for JsonFileMemento {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.state.lock().await.get(key).cloned())
    }

    async fn update(&self, key: &str, value: Value) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        if value.is_null() {
            next.remove(key);
        } else {
            next.insert(key.to_string(), value);
        }
        // Memory only changes once the file does.
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }
}
