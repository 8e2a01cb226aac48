use serde::Serialize;

use crate::indexer::ConfigIndex;
use crate::model::{IconAnnotation, TaskDescriptor};

/// Label keyword → icon. First match in this order wins.
pub const LABEL_ICONS: &[(&str, &str)] = &[
    ("debug", "bug"),
    ("build", "package"),
    ("test", "beaker"),
    ("launch", "rocket"),
    ("terminal", "terminal"),
    ("watch", "eye"),
    ("clean", "trash"),
    ("deploy", "cloud-upload"),
    ("start", "play"),
    ("stop", "stop"),
    ("publish", "cloud"),
    ("run", "run"),
];
pub const DEFAULT_ICON: &str = "gear";

/// Task type keyword → theme color. First match wins.
pub const TYPE_COLORS: &[(&str, &str)] = &[
    ("npm", "charts.red"),
    ("shell", "charts.blue"),
    ("typescript", "charts.purple"),
    ("gulp", "charts.orange"),
    ("grunt", "charts.yellow"),
];
pub const DEFAULT_COLOR: &str = "charts.yellow";

pub const RUNNING_ICON: &str = "sync~spin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeIcon {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl From<&IconAnnotation> for ThemeIcon {
    fn from(icon: &IconAnnotation) -> Self {
        Self {
            id: icon.icon_id.clone(),
            color: icon.color_id.clone(),
        }
    }
}

fn first_match(haystack: &str, table: &[(&'static str, &'static str)]) -> Option<&'static str> {
    let haystack = haystack.to_lowercase();
    table
        .iter()
        .find(|(keyword, _)| haystack.contains(keyword))
        .map(|(_, value)| *value)
}

pub fn keyword_icon(label: &str) -> &'static str {
    first_match(label, LABEL_ICONS).unwrap_or(DEFAULT_ICON)
}

pub fn type_color(task_type: &str) -> &'static str {
    first_match(task_type, TYPE_COLORS).unwrap_or(DEFAULT_COLOR)
}

/// Config-file icon, then the task's inline icon, then keyword defaults.
pub fn resolve_icon(task: &TaskDescriptor, index: &ConfigIndex) -> ThemeIcon {
    if let Some(icon) = index.icon(task.scope(), &task.name) {
        return icon.into();
    }
    if let Some(icon) = task.icon.as_ref().and_then(IconAnnotation::from_value) {
        return (&icon).into();
    }
    ThemeIcon {
        id: keyword_icon(&task.name).to_string(),
        color: Some(type_color(&task.task_type).to_string()),
    }
}
