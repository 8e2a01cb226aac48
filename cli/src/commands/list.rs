use fast_tasks_core::api::CliError;

use crate::app::AppContext;
use crate::render::render_tree;

pub async fn handle_list(ctx: &AppContext) -> Result<i32, CliError> {
    let lines = render_tree(&ctx.panel).await;
    if lines.is_empty() {
        println!("No tasks.");
    }
    for line in lines {
        println!("{line}");
    }
    Ok(0)
}
