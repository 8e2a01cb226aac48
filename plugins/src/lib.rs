//! Local implementations of the host seams, so the panel engine can run
//! outside an editor.

pub mod discovery;
pub mod executor;
pub mod factory;
pub mod fs;
pub mod storage;
pub mod workspace;
pub mod workspace_id;

pub use factory::build_host;
