//! Icon, location and hidden-task indices recovered from configuration files.
//!
//! The host's task enumeration does not expose where a task is declared or
//! the panel-specific annotations (`icon`, `hide`), so these are read back
//! from the documents themselves. Indices are always rebuilt as a whole.

pub mod documents;

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::PanelError;
use crate::host::FileSystem;
use crate::jsonc::{self, is_truthy};
use crate::key::{self, task_key};
use crate::model::{IconAnnotation, SourceLocation};

pub use documents::{locate_documents, task_entries, ConfigDocument, DocumentKind, TaskEntry};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigIndex {
    pub icons: HashMap<String, IconAnnotation>,
    pub locations: HashMap<String, SourceLocation>,
    pub hidden: HashSet<String>,
}

impl ConfigIndex {
    pub fn icon(&self, scope: Option<&str>, name: &str) -> Option<&IconAnnotation> {
        key::lookup(&self.icons, scope, name)
    }

    pub fn location(&self, scope: Option<&str>, name: &str) -> Option<&SourceLocation> {
        key::lookup(&self.locations, scope, name)
    }

    pub fn is_hidden(&self, scope: Option<&str>, name: &str) -> bool {
        key::contains(&self.hidden, scope, name)
    }

    /// Index one document's text. Entries overwrite what earlier documents
    /// recorded under the same keys.
    pub fn record_document(&mut self, doc: &ConfigDocument, text: &str) -> Result<usize, PanelError> {
        let parsed = jsonc::parse_tree(text);
        let Some(root) = parsed.root.as_ref() else {
            return Err(PanelError::Document {
                path: doc.path.clone(),
                reason: parsed
                    .errors
                    .first()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "empty document".into()),
            });
        };
        if parsed.has_errors() {
            tracing::debug!(
                path = %doc.path.display(),
                errors = parsed.errors.len(),
                "indexing partially malformed document"
            );
        }

        let entries = task_entries(root, doc.kind);
        for entry in &entries {
            let Some(label) = entry.label() else {
                continue;
            };
            let scoped = task_key(doc.scope.as_deref(), label);
            let mut keys = vec![label.to_string()];
            if scoped != label {
                keys.insert(0, scoped);
            }

            let icon = entry.value.get("icon").and_then(IconAnnotation::from_value);
            let location = SourceLocation {
                document_path: doc.path.clone(),
                line: jsonc::line_at(text, entry.declaration_offset()),
            };
            let hidden = entry.value.get("hide").is_some_and(is_truthy);

            for k in keys {
                if let Some(icon) = &icon {
                    self.icons.insert(k.clone(), icon.clone());
                }
                self.locations.insert(k.clone(), location.clone());
                if hidden {
                    self.hidden.insert(k);
                }
            }
        }
        Ok(entries.len())
    }
}

/// Build fresh indices from `documents`. Missing files are skipped, broken
/// ones are logged and skipped; neither stops the pass.
pub async fn build_index(files: &dyn FileSystem, documents: &[ConfigDocument]) -> ConfigIndex {
    let mut index = ConfigIndex::default();
    for doc in documents {
        if !files.exists(&doc.path).await {
            continue;
        }
        let text = match files.read_to_string(&doc.path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %doc.path.display(), "failed to read task config: {e:#}");
                continue;
            }
        };
        match index.record_document(doc, &text) {
            Ok(count) => {
                tracing::debug!(path = %doc.path.display(), count, "indexed task config")
            }
            Err(e) => tracing::warn!("skipping task config: {e}"),
        }
    }
    tracing::info!(
        icons = index.icons.len(),
        locations = index.locations.len(),
        hidden = index.hidden.len(),
        "task config index rebuilt"
    );
    index
}
