use fast_tasks_core::api::CliError;

use crate::app::AppContext;
use crate::commands::cli::SelectArgs;

pub async fn handle_select(args: SelectArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let panel = &ctx.panel;
    if args.all {
        panel.set_selection(Vec::new()).await;
        println!("Showing all tasks.");
        return Ok(0);
    }

    if args.keys.is_empty() {
        if !panel.select_tasks().await {
            println!("Selection unchanged.");
            return Ok(0);
        }
    } else {
        let mut keys = Vec::with_capacity(args.keys.len());
        for wanted in &args.keys {
            let task = panel
                .find_task(wanted)
                .await
                .ok_or_else(|| CliError::Command(format!("unknown task: {wanted}")))?;
            keys.push(task.key());
        }
        panel.set_selection(keys).await;
    }

    let selection = panel.selection();
    if selection.is_empty() {
        println!("Showing all tasks.");
    } else {
        println!("Showing {} task(s): {}", selection.len(), selection.join(", "));
    }
    Ok(0)
}
