//! `leveldeck` - validated tower-defense level configuration service

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use clap::Parser;
use tokio_util::sync::CancellationToken;

use leveldeck::cli::args::Cli;
use leveldeck::cli::commands;
use leveldeck::error::ExitCode;
use leveldeck::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::USAGE_ERROR
            } else {
                ExitCode::SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_logging(cli.log_format, cli.verbose, cli.quiet, cli.color);

    let cancel = CancellationToken::new();
    let signal_code = Arc::new(AtomicI32::new(ExitCode::SUCCESS));
    tokio::spawn(watch_signals(cancel.clone(), Arc::clone(&signal_code)));

    match commands::dispatch(cli, cancel).await {
        Ok(()) => std::process::exit(signal_code.load(Ordering::SeqCst)),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// First signal requests a graceful shutdown, a second one forces exit.
async fn watch_signals(cancel: CancellationToken, code: Arc<AtomicI32>) {
    let first = wait_for_signal().await;
    eprintln!("\nShutting down gracefully... (press Ctrl+C again to force)");
    code.store(first, Ordering::SeqCst);
    cancel.cancel();

    std::process::exit(wait_for_signal().await);
}

/// Waits for SIGINT or SIGTERM and returns the matching exit code.
#[cfg(unix)]
async fn wait_for_signal() -> i32 {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => tokio::select! {
            _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
            _ = sigterm.recv() => ExitCode::TERMINATED,
        },
        Err(e) => {
            tracing::warn!(error = %e, "failed to register SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            ExitCode::INTERRUPTED
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> i32 {
    let _ = tokio::signal::ctrl_c().await;
    ExitCode::INTERRUPTED
}
