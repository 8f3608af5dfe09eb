//! `esguard-agent` -- disk-space guardian for a search cluster.
//!
//! Polls node filesystem stats on a fixed interval and, while cluster free
//! space is at or below the threshold, deletes the oldest dated index one
//! at a time until space recovers.
//!
//! # Configuration
//!
//! | Flag                | Env var                   | Default                 |
//! |---------------------|---------------------------|-------------------------|
//! | `--server`          | `ESGUARD_SERVER`          | `http://localhost:9200` |
//! | `--space`           | `ESGUARD_SPACE`           | `15`                    |
//! | `--duration`        | `ESGUARD_DURATION`        | `1h`                    |
//! | `--skip` (repeat)   | `ESGUARD_SKIP`            | --                      |
//! | `--space-mode`      | `ESGUARD_SPACE_MODE`      | `min`                   |
//! | `--allow-undated`   | `ESGUARD_ALLOW_UNDATED`   | off                     |
//! | `--cooldown`        | `ESGUARD_COOLDOWN`        | `1m`                    |
//! | `--request-timeout` | `ESGUARD_REQUEST_TIMEOUT` | `30s`                   |

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use esguard_agent::config::{Args, GuardConfig};
use esguard_agent::controller::RetirementController;
use esguard_client::api::ElasticsearchApi;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "esguard_agent=info,esguard_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GuardConfig::from_args(Args::parse()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    });

    tracing::info!(
        server = %config.server,
        threshold_percent = config.threshold_percent,
        interval_secs = config.interval.as_secs(),
        request_timeout_secs = config.request_timeout.as_secs(),
        version = env!("CARGO_PKG_VERSION"),
        "Starting esguard-agent",
    );

    let api = ElasticsearchApi::new(config.server.clone(), Some(config.request_timeout))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        });

    let controller = RetirementController::new(api, config.controller_settings());

    let cancel = CancellationToken::new();
    let run_cancel = cancel.clone();
    let handle = tokio::spawn(async move { controller.run(run_cancel).await });

    shutdown_signal().await;
    cancel.cancel();

    // An in-flight request is not interrupted; it is bounded by the
    // request timeout.
    if let Err(e) = handle.await {
        tracing::error!(error = %e, "Controller task failed");
    }

    tracing::info!("esguard-agent stopped");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
