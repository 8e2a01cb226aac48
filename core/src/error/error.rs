use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("config error: {0}")]
    Config(String),
    #[error("host error: {0}")]
    Host(#[from] anyhow::Error),
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed document {path}: {reason}")]
    Document { path: PathBuf, reason: String },
    #[error("activation failed: {0}")]
    Activation(String),
}

/// Errors surfaced by the `fast-tasks` binary.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit code: 11 config, 20 IO and host failures, 50 anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 11,
            CliError::Panel(pe) => match pe {
                PanelError::Config(_) => 11,
                PanelError::Io { .. } | PanelError::Host(_) | PanelError::Document { .. } => 20,
                PanelError::Activation(_) => 50,
            },
            CliError::Io(_) | CliError::Command(_) => 20,
            CliError::Anyhow(_) => 50,
        }
    }
}

/// Turns a best-effort `Result` into an `Option`, logging the failure once.
///
/// Everything that is allowed to fail quietly (interrupt, terminate, opening a
/// document, persisting state) goes through here so failures are reported the
/// same way everywhere.
pub trait LogFailure<T> {
    fn log_failure(self, context: &str) -> Option<T>;
}

impl<T, E> LogFailure<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn log_failure(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }
}
