//! Engine of the fast-tasks panel: indexes task configuration files, caches
//! the task inventory, tracks running executions and materializes the tree
//! shown to the user.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod indexer;
pub mod inventory;
pub mod jsonc;
pub mod key;
pub mod model;
pub mod panel;
pub mod status;
pub mod view;
