//! Plain-text rendering of the task tree.

use fast_tasks_core::api::{DisplayNode, TaskPanel};

const INDENT: &str = "  ";

/// Walk the tree from the top level and render one line per node.
pub async fn render_tree(panel: &TaskPanel) -> Vec<String> {
    let mut lines = Vec::new();
    for node in panel.get_children(None).await {
        lines.push(node_line(&node, 0));
        if let DisplayNode::Group(_) = node {
            for child in panel.get_children(Some(&node)).await {
                lines.push(node_line(&child, 1));
            }
        }
    }
    lines
}

pub fn node_line(node: &DisplayNode, depth: usize) -> String {
    let indent = INDENT.repeat(depth);
    match node {
        DisplayNode::Group(group) => format!("{indent}{}/", group.label),
        DisplayNode::Task(task) => {
            let marker = if task.is_running() { '*' } else { '-' };
            let mut line = format!("{indent}{marker} {} [{}]", task.label, task.icon.id);
            if let Some(desc) = &task.description {
                line.push_str(&format!("  {desc}"));
            }
            line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fast_tasks_core::api::{
        Collapsible, GroupNode, TaskDescriptor, TaskNode, TaskSourceKind, ThemeIcon,
    };

    fn task_node(label: &str, context_value: &'static str, description: &str) -> DisplayNode {
        DisplayNode::Task(TaskNode {
            key: label.into(),
            task: TaskDescriptor {
                name: label.into(),
                scope: None,
                task_type: "shell".into(),
                detail: None,
                source: TaskSourceKind::User,
                execution: None,
                icon: None,
            },
            label: label.into(),
            description: Some(description.into()),
            tooltip: String::new(),
            icon: ThemeIcon {
                id: "package".into(),
                color: None,
            },
            context_value,
            resource_uri: None,
            command: None,
            collapsible: Collapsible::None,
        })
    }

    #[test]
    fn lines() {
        let group = DisplayNode::Group(GroupNode {
            root_name: "app".into(),
            label: "app".into(),
            icon: ThemeIcon {
                id: "folder".into(),
                color: None,
            },
            collapsible: Collapsible::Expanded,
            context_value: "workspaceFolder",
        });
        assert_eq!(node_line(&group, 0), "app/");
        assert_eq!(
            node_line(&task_node("build", "task", "shell"), 1),
            "  - build [package]  shell"
        );
        assert_eq!(
            node_line(&task_node("watch", "runningTask", "Running…"), 0),
            "* watch [package]  Running…"
        );
    }
}
