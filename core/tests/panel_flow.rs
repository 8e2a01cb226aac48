mod common;

use std::path::PathBuf;
use std::sync::Arc;

use common::{next_status, FakeHost, StopBehavior};
use fast_tasks_core::api::{
    DisplayNode, PanelConfig, PanelEvent, RefreshOptions, TaskNode, TaskPanel, SELECTED_TASKS_KEY,
    SETTING_FLAT_LIST, SETTING_IGNORE_HIDDEN,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn labels(nodes: &[DisplayNode]) -> Vec<&str> {
    nodes.iter().map(DisplayNode::label).collect()
}

async fn activate(host: &Arc<FakeHost>) -> TaskPanel {
    TaskPanel::activate(host.services(), PanelConfig::default()).await
}

async fn find_node(panel: &TaskPanel, key: &str) -> TaskNode {
    let mut pending = panel.get_children(None).await;
    while let Some(node) = pending.pop() {
        match node {
            DisplayNode::Task(task) if task.key == key => return task,
            DisplayNode::Task(_) => {}
            group @ DisplayNode::Group(_) => pending.extend(panel.get_children(Some(&group)).await),
        }
    }
    panic!("no node for {key}");
}

#[tokio::test]
async fn activation_indexes_and_renders_grouped_tree() {
    let host = Arc::new(FakeHost::two_roots());
    let panel = activate(&host).await;
    assert!(panel.is_tracking_status());

    let top = panel.get_children(None).await;
    assert_eq!(labels(&top), vec!["app", "lib", "global"]);

    let app = panel.get_children(Some(&top[0])).await;
    assert_eq!(labels(&app), vec!["build"]);
    let build = app[0].as_task().unwrap();
    assert_eq!(build.icon.id, "tools");
    assert_eq!(build.icon.color.as_deref(), Some("terminal.ansiGreen"));
    assert_eq!(build.description.as_deref(), Some("shell"));
    assert_eq!(build.resource_uri, None);
}

#[tokio::test]
async fn settings_switch_hidden_and_flat_rendering() {
    let host = Arc::new(FakeHost::two_roots());
    let panel = activate(&host).await;

    host.settings.lock().insert(SETTING_IGNORE_HIDDEN.into(), true);
    let top = panel.get_children(None).await;
    let app = panel.get_children(Some(&top[0])).await;
    assert_eq!(labels(&app), vec!["build", "secret"]);

    host.settings.lock().insert(SETTING_IGNORE_HIDDEN.into(), false);
    host.settings.lock().insert(SETTING_FLAT_LIST.into(), true);
    let top = panel.get_children(None).await;
    assert_eq!(labels(&top), vec!["app: build", "lib: test", "global"]);
}

#[tokio::test]
async fn single_root_renders_flat_whatever_the_setting() {
    let host = Arc::new(FakeHost::two_roots());
    host.roots.lock().truncate(1);
    let panel = activate(&host).await;

    for flat in [false, true] {
        host.settings.lock().insert(SETTING_FLAT_LIST.into(), flat);
        let top = panel.get_children(None).await;
        assert!(top.iter().all(|n| n.as_task().is_some()));
        assert_eq!(labels(&top), vec!["build", "test", "global"]);
    }
}

#[tokio::test]
async fn persisted_bare_names_select_scoped_tasks() {
    let host = Arc::new(FakeHost::two_roots());
    host.storage
        .lock()
        .insert(SELECTED_TASKS_KEY.into(), json!(["build", "global"]));
    let panel = activate(&host).await;

    let top = panel.get_children(None).await;
    assert_eq!(labels(&top), vec!["app", "global"]);
    let build = find_node(&panel, "app:build").await;
    assert_eq!(build.resource_uri.as_deref(), Some("task://app%3Abuild"));
}

#[tokio::test]
async fn confirmed_pick_persists_keys_and_rerenders() {
    let host = Arc::new(FakeHost::two_roots());
    host.storage
        .lock()
        .insert(SELECTED_TASKS_KEY.into(), json!(["build"]));
    *host.pick_answer.lock() = Some(vec!["lib:test".into()]);
    let panel = activate(&host).await;
    let mut events = panel.subscribe();

    assert!(panel.select_tasks().await);

    let offered: Vec<(String, bool)> = host
        .offered
        .lock()
        .iter()
        .map(|item| (item.key.clone(), item.picked))
        .collect();
    assert_eq!(
        offered,
        vec![
            ("app:build".to_string(), true),
            ("app:secret".to_string(), false),
            ("lib:test".to_string(), false),
            ("global".to_string(), false),
        ]
    );
    assert_eq!(events.recv().await.unwrap(), PanelEvent::TreeChanged);
    assert_eq!(panel.selection(), vec!["lib:test".to_string()]);
    assert_eq!(
        host.storage.lock().get(SELECTED_TASKS_KEY),
        Some(&json!(["lib:test"]))
    );
    assert_eq!(labels(&panel.get_children(None).await), vec!["lib"]);
}

#[tokio::test]
async fn dismissed_pick_changes_nothing() {
    let host = Arc::new(FakeHost::two_roots());
    let panel = activate(&host).await;

    assert!(!panel.select_tasks().await);
    assert!(panel.selection().is_empty());
    assert!(host.storage.lock().get(SELECTED_TASKS_KEY).is_none());
}

#[tokio::test]
async fn edit_opens_declaration_or_warns() {
    let host = Arc::new(FakeHost::two_roots());
    let panel = activate(&host).await;

    let build = find_node(&panel, "app:build").await;
    panel.edit_task(&build).await;
    assert_eq!(
        host.opened.lock().clone(),
        vec![(PathBuf::from("/ws/app/.vscode/tasks.json"), 5)]
    );

    let global = find_node(&panel, "global").await;
    panel.edit_task(&global).await;
    assert_eq!(host.opened.lock().len(), 1);
    assert_eq!(host.warnings.lock().len(), 1);
}

#[tokio::test]
async fn lifecycle_events_drive_node_state() {
    let host = Arc::new(FakeHost::two_roots());
    let panel = activate(&host).await;
    let mut events = panel.subscribe();

    host.start(Some("app"), "build", "e1", true, StopBehavior::Ignore)
        .await;
    next_status(&mut events).await;
    let build = find_node(&panel, "app:build").await;
    assert!(build.is_running());
    assert_eq!(build.description.as_deref(), Some("Running…"));
    assert_eq!(build.icon.id, "sync~spin");
    assert_eq!(build.resource_uri.as_deref(), Some("task://app%3Abuild"));

    host.end(Some("app"), "build", "e1", 7).await;
    next_status(&mut events).await;
    let build = find_node(&panel, "app:build").await;
    assert!(!build.is_running());
    assert_eq!(build.description.as_deref(), Some("Failed (exit code 7)"));

    panel
        .refresh(RefreshOptions {
            clear_statuses: true,
            ..Default::default()
        })
        .await;
    let build = find_node(&panel, "app:build").await;
    assert_eq!(build.description.as_deref(), Some("shell"));
}

#[tokio::test]
async fn stop_interrupts_or_terminates() {
    let host = Arc::new(FakeHost::two_roots());
    let panel = activate(&host).await;
    let mut events = panel.subscribe();

    host.start(Some("app"), "build", "e1", true, StopBehavior::Ignore)
        .await;
    host.start(Some("lib"), "test", "e2", false, StopBehavior::Ignore)
        .await;
    next_status(&mut events).await;
    next_status(&mut events).await;

    panel.stop_task(&find_node(&panel, "app:build").await).await;
    panel.stop_task(&find_node(&panel, "lib:test").await).await;
    // Not running: nothing to do.
    panel.stop_task(&find_node(&panel, "global").await).await;

    assert_eq!(
        host.stop_calls.lock().clone(),
        vec!["interrupt e1".to_string(), "terminate e2".to_string()]
    );
}

#[tokio::test]
async fn failed_lifecycle_subscription_still_yields_a_panel() {
    let mut fake = FakeHost::two_roots();
    fake.fail_subscribe = true;
    let host = Arc::new(fake);
    let panel = activate(&host).await;

    assert_eq!(host.errors.lock().len(), 1);
    assert!(!panel.is_tracking_status());
    assert_eq!(
        labels(&panel.get_children(None).await),
        vec!["app", "lib", "global"]
    );
}

#[tokio::test]
async fn enumeration_failure_renders_empty_and_is_not_cached() {
    let host = Arc::new(FakeHost::two_roots());
    let panel = activate(&host).await;

    *host.fail_fetch.lock() = true;
    assert!(panel.get_children(None).await.is_empty());

    *host.fail_fetch.lock() = false;
    assert_eq!(panel.get_children(None).await.len(), 3);
    assert_eq!(*host.fetch_count.lock(), 2);

    // Served from cache now.
    panel.get_children(None).await;
    assert_eq!(*host.fetch_count.lock(), 2);
    panel
        .refresh(RefreshOptions {
            invalidate_inventory: true,
            ..Default::default()
        })
        .await;
    panel.get_children(None).await;
    assert_eq!(*host.fetch_count.lock(), 3);
}

#[tokio::test]
async fn reload_picks_up_edited_config() {
    let host = Arc::new(FakeHost::two_roots());
    let panel = activate(&host).await;
    assert!(panel.index().is_hidden(Some("app"), "secret"));

    host.files.lock().insert(
        PathBuf::from("/ws/app/.vscode/tasks.json"),
        r#"{ "tasks": [ { "label": "secret", "type": "shell" } ] }"#.to_string(),
    );
    let before = panel.index();
    panel.refresh(RefreshOptions::full()).await;
    assert!(!panel.index().is_hidden(Some("app"), "secret"));
    assert!(panel.index().icon(Some("app"), "build").is_none());

    // Rebuilding from unchanged files gives identical indices.
    panel.reload_index().await;
    let again = panel.index();
    panel.reload_index().await;
    assert_eq!(*again, *panel.index());
    assert_ne!(*before, *again);
}
