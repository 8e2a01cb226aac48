//! Execution status tracking fed by lifecycle events.

pub mod tracker;
pub mod types;

pub use tracker::StatusTracker;
pub use types::{
    ExecutionHandle, ExecutionStatus, LifecycleEvent, StatusChange, TaskRef, TaskResult,
};
