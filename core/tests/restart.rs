mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{next_status, task, FakeHost, StopBehavior};
use fast_tasks_core::api::{PanelConfig, TaskPanel, TaskSourceKind};
use tokio::time::Instant;

async fn running_panel(interruptible: bool, behavior: StopBehavior) -> (Arc<FakeHost>, TaskPanel) {
    let host = Arc::new(FakeHost::two_roots());
    let panel = TaskPanel::activate(host.services(), PanelConfig::default()).await;
    let mut events = panel.subscribe();
    host.start(Some("app"), "build", "e1", interruptible, behavior)
        .await;
    next_status(&mut events).await;
    (host, panel)
}

#[tokio::test(start_paused = true)]
async fn idle_task_executes_immediately() {
    let host = Arc::new(FakeHost::two_roots());
    let panel = TaskPanel::activate(host.services(), PanelConfig::default()).await;

    let started = Instant::now();
    panel
        .run_task(&task(Some("lib"), "test", TaskSourceKind::Workspace))
        .await
        .unwrap();

    assert_eq!(host.executed_keys(), vec!["lib:test".to_string()]);
    assert_eq!(host.executed.lock()[0].1, started);
    assert!(host.stop_calls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn restart_waits_for_the_old_execution_to_end() {
    let (host, panel) = running_panel(true, StopBehavior::End).await;

    let started = Instant::now();
    panel
        .run_task(&task(Some("app"), "build", TaskSourceKind::Workspace))
        .await
        .unwrap();

    assert_eq!(host.stop_calls.lock().clone(), vec!["interrupt e1".to_string()]);
    assert_eq!(host.executed_keys(), vec!["app:build".to_string()]);
    assert!(host.executed.lock()[0].1 - started < Duration::from_millis(2000));

    let status = panel
        .status(&task(Some("app"), "build", TaskSourceKind::Workspace))
        .await
        .unwrap();
    assert!(!status.is_active);
}

#[tokio::test(start_paused = true)]
async fn restart_gives_up_waiting_after_the_timeout() {
    let (host, panel) = running_panel(true, StopBehavior::Ignore).await;

    let started = Instant::now();
    panel
        .run_task(&task(Some("app"), "build", TaskSourceKind::Workspace))
        .await
        .unwrap();

    let waited = host.executed.lock()[0].1 - started;
    assert!(waited >= Duration::from_millis(2000));
    assert!(waited < Duration::from_millis(2100));
    assert_eq!(host.executed_keys(), vec!["app:build".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn failed_interrupt_falls_back_to_terminate() {
    let (host, panel) = running_panel(true, StopBehavior::FailInterrupt).await;

    panel
        .run_task(&task(Some("app"), "build", TaskSourceKind::Workspace))
        .await
        .unwrap();

    assert_eq!(
        host.stop_calls.lock().clone(),
        vec!["interrupt e1".to_string(), "terminate e1".to_string()]
    );
    assert_eq!(host.executed_keys(), vec!["app:build".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn non_interruptible_execution_is_terminated() {
    let (host, panel) = running_panel(false, StopBehavior::End).await;

    panel
        .run_task(&task(Some("app"), "build", TaskSourceKind::Workspace))
        .await
        .unwrap();

    assert_eq!(host.stop_calls.lock().clone(), vec!["terminate e1".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn custom_restart_timeout_is_honored() {
    let host = Arc::new(FakeHost::two_roots());
    let config = PanelConfig {
        restart_timeout_ms: 300,
        ..Default::default()
    };
    let panel = TaskPanel::activate(host.services(), config).await;
    let mut events = panel.subscribe();
    host.start(Some("app"), "build", "e1", true, StopBehavior::Ignore)
        .await;
    next_status(&mut events).await;

    let started = Instant::now();
    panel
        .run_task(&task(Some("app"), "build", TaskSourceKind::Workspace))
        .await
        .unwrap();
    let waited = host.executed.lock()[0].1 - started;
    assert!(waited >= Duration::from_millis(300));
    assert!(waited < Duration::from_millis(2000));
}

#[tokio::test(start_paused = true)]
async fn restart_wait_detaches_when_the_end_arrives() {
    let (host, panel) = running_panel(true, StopBehavior::End).await;
    let baseline = panel.status_listener_count();
    let build = task(Some("app"), "build", TaskSourceKind::Workspace);

    for id in ["e2", "e3"] {
        panel.run_task(&build).await.unwrap();
        assert_eq!(panel.status_listener_count(), baseline);

        let mut events = panel.subscribe();
        host.start(Some("app"), "build", id, true, StopBehavior::End)
            .await;
        next_status(&mut events).await;
    }
    panel.run_task(&build).await.unwrap();

    assert_eq!(panel.status_listener_count(), baseline);
    assert_eq!(host.executed_keys().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn restart_wait_detaches_when_the_timeout_fires() {
    let (host, panel) = running_panel(true, StopBehavior::Ignore).await;
    let baseline = panel.status_listener_count();
    let build = task(Some("app"), "build", TaskSourceKind::Workspace);

    for _ in 0..3 {
        panel.run_task(&build).await.unwrap();
        assert_eq!(panel.status_listener_count(), baseline);
    }

    // e1 never ended, so every call waited out the full timeout.
    assert_eq!(host.executed_keys().len(), 3);
    assert_eq!(host.stop_calls.lock().len(), 3);
}
