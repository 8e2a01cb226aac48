use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use fast_tasks_cli::app::AppContext;
use fast_tasks_cli::commands::{cli, edit, index, list, run, select};
use fast_tasks_cli::ui::TerminalUi;
use fast_tasks_core::api::{get_data_dir, load_default, CliError, LoggingConfig};
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let mut cfg = load_default().map_err(|e| CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    if let cli::Commands::List(list_args) = &args.command {
        cfg.panel.flat_list |= list_args.flat;
        cfg.panel.ignore_hidden |= list_args.ignore_hidden;
    }

    let ctx = AppContext::open(cfg, &args, Arc::new(TerminalUi::new())).await?;
    dispatch(args.command, &ctx).await
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 11: config error
    // 20: IO / host error
    // 50: internal/uncategorized
    e.exit_code()
}

async fn dispatch(cmd: cli::Commands, ctx: &AppContext) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::List(_) => list::handle_list(ctx).await,
        cli::Commands::Select(args) => select::handle_select(args, ctx).await,
        cli::Commands::Run(args) => run::handle_run(args, ctx).await,
        cli::Commands::Edit(args) => edit::handle_edit(args, ctx).await,
        cli::Commands::Index => index::handle_index(ctx).await,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(&logging.level).map_err(|e| e.to_string())?,
    };

    let file_writer = if logging.file {
        Some(log_file_writer(logging)?)
    } else {
        None
    };
    if !logging.console && file_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });
    let file_layer = file_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}

/// One log file per process, so concurrent `run` invocations never share one.
fn log_file_writer(logging: &LoggingConfig) -> Result<NonBlocking, String> {
    let dir = match logging
        .directory
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(d) => PathBuf::from(d),
        None => get_data_dir().map_err(|e| e.to_string())?.join("logs"),
    };
    std::fs::create_dir_all(&dir)
        .map_err(|e| format!("create log dir {} failed: {e}", dir.display()))?;

    let file_name = format!("fast-tasks.{}.log", std::process::id());
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    let _ = LOG_GUARD.set(guard);
    Ok(writer)
}
