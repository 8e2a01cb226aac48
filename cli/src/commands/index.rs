use fast_tasks_core::api::{CliError, ConfigIndex};
use serde_json::{json, Value};

use crate::app::AppContext;

pub async fn handle_index(ctx: &AppContext) -> Result<i32, CliError> {
    let dump = index_json(&ctx.panel.index())?;
    println!(
        "{}",
        serde_json::to_string_pretty(&dump).map_err(anyhow::Error::from)?
    );
    Ok(0)
}

/// JSON view with keys in a stable order.
pub fn index_json(index: &ConfigIndex) -> Result<Value, CliError> {
    let mut hidden: Vec<&String> = index.hidden.iter().collect();
    hidden.sort();
    Ok(json!({
        "icons": serde_json::to_value(&index.icons).map_err(anyhow::Error::from)?,
        "locations": serde_json::to_value(&index.locations).map_err(anyhow::Error::from)?,
        "hidden": hidden,
    }))
}
