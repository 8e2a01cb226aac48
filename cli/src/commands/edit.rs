use fast_tasks_core::api::CliError;

use crate::app::AppContext;
use crate::commands::cli::TaskArgs;

pub async fn handle_edit(args: TaskArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let task = ctx
        .panel
        .find_task(&args.name)
        .await
        .ok_or_else(|| CliError::Command(format!("unknown task: {}", args.name)))?;
    ctx.panel.edit_definition(&task).await;
    Ok(0)
}
