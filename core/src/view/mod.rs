//! Display model for the task tree.

pub mod icons;
pub mod materialize;
pub mod node;

pub use icons::{keyword_icon, resolve_icon, type_color, ThemeIcon};
pub use materialize::{resource_uri, ViewSnapshot, RUNNING_DESCRIPTION};
pub use node::{Collapsible, DisplayNode, GroupNode, NodeCommand, TaskNode};
