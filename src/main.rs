//! `lifeserve` binary: serves a random world on port 8081.
//!
//! Run with:
//!   RUST_LOG=info cargo run -- --height 20 --width 40
//!
//! Try:
//!   curl http://localhost:8081/
//!   curl http://localhost:8081/nextstate

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{Dispatch, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Game of Life over HTTP")]
struct Args {
    /// Rows in the world.
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Columns in the world.
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Seconds to let in-flight requests finish on shutdown.
    #[arg(long, default_value_t = 5)]
    grace_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let logger: Dispatch = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish()
        .into();

    let ctx = CancellationToken::new();
    let server = match lifeserve::run(&ctx, logger.clone(), args.height, args.width).await {
        Ok(server) => server,
        Err(e) => {
            tracing::dispatcher::with_default(&logger, || error!(error = %e, "startup failed"));
            return ExitCode::FAILURE;
        }
    };

    shutdown_signal().await;
    ctx.cancel();

    let result = server.shutdown_timeout(Duration::from_secs(args.grace_secs)).await;
    tracing::dispatcher::with_default(&logger, || match &result {
        Ok(()) => info!("shutdown complete"),
        Err(e) => error!(error = %e, "shutdown failed"),
    });

    if result.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C) the process receives.
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
