//! Codex Runner - supervised Codex CLI runs with session capture.

use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use codex_runner::cli::InvocationDescriptor;
use codex_runner::config::{timeout_from_env, ConfigLoader, RunnerConfig};
use codex_runner::display;
use codex_runner::supervisor::{RunError, Supervisor};

#[derive(Parser)]
#[command(
    name = "codex-runner",
    about = "Run Codex with a hard timeout and print its final message and session id",
    override_usage = "codex-runner [OPTIONS] <TASK> [MODEL] [WORKDIR]\n       \
                      codex-runner [OPTIONS] resume <SESSION_ID> <TASK> [MODEL] [WORKDIR]",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (defaults to .codex-runner.toml, then the user config dir).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// `<task> [model] [workdir]` or `resume <session_id> <task> [model] [workdir]`.
    #[arg(
        value_name = "ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<String>,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<RunnerConfig, RunError> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    Ok(loader.load()?)
}

/// Cancel `token` on Ctrl-C.
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, stopping Codex");
                token.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
}

async fn run(cli: Cli) -> i32 {
    let config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            display::print_error(&e.to_string());
            return e.exit_code();
        }
    };

    let desc = match InvocationDescriptor::from_positionals(&cli.args, &config) {
        Ok(desc) => desc,
        Err(e) => {
            let e = RunError::from(e);
            display::print_error(&e.to_string());
            return e.exit_code();
        }
    };

    let timeout = timeout_from_env(config.default_timeout_secs);
    tracing::info!(
        resume = desc.is_resume(),
        model = %desc.model,
        workdir = %desc.workdir,
        timeout_secs = timeout.as_secs(),
        "Starting Codex run"
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let mut supervisor = Supervisor::new(config, timeout).with_cancellation(cancel);
    let outcome = supervisor.run(&desc).await;
    tracing::debug!(state = ?supervisor.state(), "Run finished");

    display::report(&outcome)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = run(cli).await;
    std::process::exit(code);
}
