//! hearthd - an IRC daemon core.
//!
//! A multi-threaded IRC server built on zero-copy message parsing.

mod config;
mod handlers;
mod network;
mod security;
mod state;

use crate::config::Config;
use crate::network::Gateway;
use crate::state::Matrix;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Resolve the configuration path from CLI arguments.
/// Supports `-c <path>`, `--config <path>`, or a bare path.
/// Falls back to `config.toml` when no argument is provided.
fn resolve_config_path() -> String {
    let mut args = std::env::args().skip(1);

    let raw_path = match args.next() {
        Some(flag) if flag == "-c" || flag == "--config" => args.next().unwrap_or_else(|| {
            eprintln!("Missing path after {}", flag);
            std::process::exit(1);
        }),
        Some(path) => path,
        None => "config.toml".to_string(),
    };

    match std::fs::canonicalize(Path::new(&raw_path)) {
        Ok(p) => p.to_string_lossy().into_owned(),
        Err(_) => raw_path,
    }
}

fn init_tracing(config: &config::LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.level.clone()));

    match config.format {
        config::LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .json()
                .init();
        }
        config::LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = resolve_config_path();

    let config = Config::load(&config_path).map_err(|e| {
        eprintln!("ERROR: Failed to load config from {}: {}", config_path, e);
        e
    })?;

    init_tracing(&config.logging);

    info!(
        server = %config.server.name,
        network = %config.server.network,
        sid = %config.server.sid,
        "Starting hearthd"
    );

    // Refuse to start with a default/ephemeral cloak secret unless explicitly overridden.
    // This prevents operators from accidentally running in production with predictable
    // IP cloaks that reset on every restart.
    if crate::security::cloaking::is_default_secret(&config.security.cloak_secret) {
        if std::env::var("HEARTHD_ALLOW_INSECURE_CLOAK").is_ok() {
            tracing::warn!(
                "running with a weak cloak_secret (allowed via HEARTHD_ALLOW_INSECURE_CLOAK)"
            );
        } else {
            error!("FATAL: insecure cloak_secret detected");
            error!("  cloak_secret is used to hash user IP addresses for privacy.");
            error!("  A weak or default secret makes IP cloaks predictable and reversible.");
            error!("");
            error!("  Set a strong secret in config.toml:");
            error!("    [security]");
            error!("    cloak_secret = \"<random-32-char-string>\"");
            error!("");
            error!("  Generate one with: openssl rand -hex 32");
            error!("  For testing only, set HEARTHD_ALLOW_INSECURE_CLOAK=1 to bypass this check.");
            return Err(anyhow::anyhow!(
                "refusing to start with insecure cloak_secret"
            ));
        }
    }

    let matrix = Arc::new(Matrix::new(&config));
    info!("Matrix initialized");

    {
        let matrix = Arc::clone(&matrix);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                let before: usize = matrix.whowas.iter().map(|e| e.value().len()).sum();
                matrix.whowas.retain(|_, entries| {
                    entries.retain(|e| chrono::Utc::now().timestamp() - e.logout_time < 7 * 86400);
                    !entries.is_empty()
                });
                let after: usize = matrix.whowas.iter().map(|e| e.value().len()).sum();
                if before != after {
                    info!(removed = before - after, "WHOWAS cleanup completed");
                }
            }
        });
    }

    {
        let matrix = Arc::clone(&matrix);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(5));
            loop {
                interval.tick().await;
                matrix.snotice.flush_all(&matrix).await;
            }
        });
    }

    tokio::spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        }
        std::process::exit(0);
    });

    let gateway = Gateway::bind(config.listen.address, matrix).await?;
    gateway.run().await?;

    Ok(())
}
