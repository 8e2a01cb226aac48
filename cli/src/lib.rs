//! fast-tasks CLI library, split out so commands can be unit tested.

pub mod app;
pub mod commands;
pub mod render;
pub mod ui;
