//! Identity keys for tasks.
//!
//! A task is identified by `"{scope}:{name}"` when it belongs to a workspace
//! folder and by its bare `name` otherwise. Data written before scoped keys
//! existed only carries bare names, so every keyed lookup goes through
//! [`lookup`] / [`contains`], which try the scoped key first and the bare name
//! second.

use std::collections::{HashMap, HashSet};

pub const SCOPE_SEPARATOR: char = ':';

/// Derive the identity key for a task.
pub fn task_key(scope: Option<&str>, name: &str) -> String {
    match scope {
        Some(scope) => format!("{scope}{SCOPE_SEPARATOR}{name}"),
        None => name.to_string(),
    }
}

/// Look up `(scope, name)` in a keyed map, falling back to the bare name.
pub fn lookup<'a, V>(map: &'a HashMap<String, V>, scope: Option<&str>, name: &str) -> Option<&'a V> {
    if scope.is_some() {
        if let Some(v) = map.get(&task_key(scope, name)) {
            return Some(v);
        }
    }
    map.get(name)
}

/// Whether a keyed set contains `(scope, name)` or the bare name.
pub fn contains(set: &HashSet<String>, scope: Option<&str>, name: &str) -> bool {
    (scope.is_some() && set.contains(&task_key(scope, name))) || set.contains(name)
}

/// Same as [`contains`] for an ordered list such as the persisted selection.
pub fn list_contains(list: &[String], scope: Option<&str>, name: &str) -> bool {
    let key = task_key(scope, name);
    list.iter().any(|entry| *entry == key || entry == name)
}
