use fast_tasks_core::api::{CliError, PanelEvent, StatusChange, TaskResult};
use tokio::sync::broadcast;

use crate::app::AppContext;
use crate::commands::cli::TaskArgs;

/// Exit code reported when the user gave up waiting.
const INTERRUPTED: i32 = 130;

pub async fn handle_run(args: TaskArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let panel = &ctx.panel;
    let task = panel
        .find_task(&args.name)
        .await
        .ok_or_else(|| CliError::Command(format!("unknown task: {}", args.name)))?;
    if !panel.is_tracking_status() {
        return Err(CliError::Command(
            "task status is unavailable, cannot wait for the task".into(),
        ));
    }

    let mut events = panel.subscribe();
    panel.run_task(&task).await?;
    let key = task.key();

    let mut stopping = false;
    loop {
        tokio::select! {
            ended = wait_for_end(&mut events, &key, &task.name) => {
                let Some(result) = ended else {
                    return Err(CliError::Command("lost track of the task".into()));
                };
                eprintln!("{}: {result}", task.name);
                return Ok(match result {
                    TaskResult::Success => 0,
                    TaskResult::Failed(code) => code,
                });
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                if stopping {
                    return Ok(INTERRUPTED);
                }
                stopping = true;
                eprintln!("Stopping {} (Ctrl-C again to stop waiting)", task.name);
                panel.stop_execution(&task).await;
            }
        }
    }
}

async fn wait_for_end(
    events: &mut broadcast::Receiver<PanelEvent>,
    key: &str,
    name: &str,
) -> Option<TaskResult> {
    loop {
        match events.recv().await {
            Ok(PanelEvent::Status(StatusChange::Ended { key: ended, result }))
                if ended == key || ended == name =>
            {
                return Some(result)
            }
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "run listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}
