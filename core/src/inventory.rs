//! Short-lived cache over the host's task enumeration.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::host::TaskSource;
use crate::model::TaskDescriptor;

pub const DEFAULT_INVENTORY_TTL: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub tasks: Arc<Vec<TaskDescriptor>>,
    pub fetched_at: Instant,
}

pub struct InventoryCache {
    ttl: Duration,
    entry: Mutex<Option<CacheEntry>>,
}

impl InventoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Configured tasks, served from cache while the entry is fresh.
    ///
    /// Enumeration failures are logged and yield an empty list that is not
    /// cached, so the next call retries.
    pub async fn get_available_tasks(&self, source: &dyn TaskSource) -> Arc<Vec<TaskDescriptor>> {
        if let Some(tasks) = self.fresh() {
            tracing::debug!(count = tasks.len(), "task inventory cache hit");
            return tasks;
        }

        let fetched = match source.fetch_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::warn!("task enumeration failed: {e:#}");
                return Arc::new(Vec::new());
            }
        };

        let total = fetched.len();
        let tasks: Arc<Vec<TaskDescriptor>> = Arc::new(
            fetched
                .into_iter()
                .filter(|task| task.source.is_configured())
                .collect(),
        );
        tracing::debug!(total, configured = tasks.len(), "task inventory refreshed");

        *self.entry.lock() = Some(CacheEntry {
            tasks: tasks.clone(),
            fetched_at: Instant::now(),
        });
        tasks
    }

    pub fn invalidate(&self) {
        *self.entry.lock() = None;
    }

    pub fn entry(&self) -> Option<CacheEntry> {
        self.entry.lock().clone()
    }

    fn fresh(&self) -> Option<Arc<Vec<TaskDescriptor>>> {
        let entry = self.entry.lock();
        entry
            .as_ref()
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.tasks.clone())
    }
}

impl Default for InventoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_INVENTORY_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskSourceKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    fn task(name: &str, source: TaskSourceKind) -> TaskDescriptor {
        TaskDescriptor {
            name: name.into(),
            scope: Some("app".into()),
            task_type: "shell".into(),
            detail: None,
            source,
            execution: None,
            icon: None,
        }
    }

    #[async_trait]
    impl TaskSource for CountingSource {
        async fn fetch_tasks(&self) -> anyhow::Result<Vec<TaskDescriptor>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("provider crashed");
            }
            Ok(vec![
                task("build", TaskSourceKind::Workspace),
                task("ws", TaskSourceKind::WorkspaceFile),
                task("user", TaskSourceKind::User),
                task("npm: lint", TaskSourceKind::Detected),
            ])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn serves_cached_list_within_window() {
        let source = CountingSource::new(false);
        let cache = InventoryCache::default();

        let first = cache.get_available_tasks(&source).await;
        tokio::time::advance(Duration::from_millis(4_999)).await;
        let second = cache.get_available_tasks(&source).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        let third = cache.get_available_tasks(&source).await;
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_enumeration() {
        let source = CountingSource::new(false);
        let cache = InventoryCache::default();

        cache.get_available_tasks(&source).await;
        cache.invalidate();
        assert!(cache.entry().is_none());
        cache.get_available_tasks(&source).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn drops_detected_tasks() {
        let source = CountingSource::new(false);
        let cache = InventoryCache::default();
        let names: Vec<_> = cache
            .get_available_tasks(&source)
            .await
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(names, vec!["build", "ws", "user"]);
    }

    #[tokio::test]
    async fn enumeration_failure_degrades_to_empty() {
        let source = CountingSource::new(true);
        let cache = InventoryCache::default();
        assert!(cache.get_available_tasks(&source).await.is_empty());
        assert!(cache.entry().is_none());
        cache.get_available_tasks(&source).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
