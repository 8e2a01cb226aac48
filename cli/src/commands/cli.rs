use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "fast-tasks", version, about = "Browse, run and curate workspace tasks")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace folder or `.code-workspace` file. Defaults to the current
    /// directory.
    #[arg(long, short = 'w', global = true)]
    pub workspace: Option<PathBuf>,

    /// Open these folders as a multi-root workspace instead.
    #[arg(long = "folder", global = true, conflicts_with = "workspace")]
    pub folders: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the task tree.
    List(ListArgs),
    /// Choose which tasks the tree shows.
    Select(SelectArgs),
    /// Run a task and wait for it. Ctrl-C stops it.
    Run(TaskArgs),
    /// Open the file declaring a task at its line.
    Edit(TaskArgs),
    /// Dump the icon, location and hidden indices as JSON.
    Index,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ListArgs {
    /// List every task at the top level, prefixed with its folder.
    #[arg(long)]
    pub flat: bool,

    /// Also show tasks marked `"hide": true`.
    #[arg(long)]
    pub ignore_hidden: bool,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Clear the selection so every task is shown.
    #[arg(long, conflicts_with = "keys")]
    pub all: bool,

    /// Task keys (`folder:label`) or unique labels. Without any, an
    /// interactive picker opens.
    pub keys: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TaskArgs {
    /// Task key (`folder:label`) or a label unique across folders.
    pub name: String,
}
