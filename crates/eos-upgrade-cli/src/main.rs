mod dispatch;
mod render;
mod stages;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser};
use tracing_subscriber::EnvFilter;

use crate::dispatch::{exit_code_for_error, run_cli};
use crate::render::{current_output_style, render_status_line};

#[derive(Parser, Debug)]
#[command(name = "eos-upgrade")]
#[command(version, about = "Drives a staged operating system release upgrade", long_about = None)]
struct Cli {
    #[command(flatten)]
    action: ActionFlags,
    /// Release being upgraded from
    #[arg(long)]
    current: Option<String>,
    /// Release being upgraded to
    #[arg(long)]
    next: Option<String>,
    /// Upgrade config file (defaults to /etc/io.elementary.upgrade.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Give up waiting on a package manager lock after this many seconds
    #[arg(long, value_name = "SECS")]
    lock_timeout: Option<u64>,
    /// Pause between simulated checkpoints for --test
    #[arg(long, value_name = "MS", default_value_t = 500)]
    simulate_delay_ms: u64,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct ActionFlags {
    /// Run every stage in order
    #[arg(long)]
    upgrade: bool,
    /// Emit a full upgrade's progress without touching the system
    #[arg(long)]
    test: bool,
    /// Bring the current release fully up to date
    #[arg(long)]
    prepare: bool,
    /// Point package sources at the next release
    #[arg(long)]
    update_channels: bool,
    /// Download the upgrade without installing it
    #[arg(long)]
    download: bool,
    /// Install previously downloaded packages
    #[arg(long)]
    install: bool,
    /// Remove caches and packages no longer needed
    #[arg(long)]
    clean_up: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!(
                "{}",
                render_status_line(current_output_style(), "error", &format!("{err:#}"))
            );
            ExitCode::from(exit_code_for_error(&err))
        }
    }
}

// Logs go to stderr; stdout is reserved for the progress protocol.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
