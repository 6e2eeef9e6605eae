// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use http_watchdog::{
    cli::{Cli, RunMode},
    config::{self, Config},
    metrics::{start_metrics_server, MetricsRegistry},
    monitor::Watchdog,
    notify::{Dispatcher, EmailNotifier, Notifier, PushNotifier},
    probe::HttpProber,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Validate before detaching so the operator sees config errors.
    let config = match &cli.config {
        Some(path) => config::load_config(path).await?,
        None => {
            let config = Config::default();
            config.validate()?;
            config
        }
    };

    match cli.mode() {
        RunMode::Launch => {
            let pid = cli
                .spawn_detached()
                .context("Failed to start background process")?;
            println!("Watchdog process started... (PID: {})", pid);
            return Ok(());
        }
        RunMode::Foreground => {
            // Initialize tracing
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive("http_watchdog=debug".parse()?),
                )
                .init();
            println!("PID: {}", std::process::id());
        }
        // No subscriber: the detached child has no console.
        RunMode::Detached => {}
    }

    match &cli.config {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => info!("No configuration file given, using built-in defaults"),
    }

    let mut dispatcher = build_dispatcher(&config)?;
    let prober = HttpProber::new(&config.probe)?;

    let metrics = if config.metrics.enabled {
        let registry = Arc::new(MetricsRegistry::new()?);
        let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
        start_metrics_server(metrics_addr, registry.clone(), config.metrics.path.clone()).await?;
        Some(registry.collector())
    } else {
        None
    };

    if let Some(metrics) = &metrics {
        dispatcher = dispatcher.with_metrics(metrics.clone());
    }

    let mut watchdog = Watchdog::new(prober, config.policy.clone(), dispatcher);
    if let Some(metrics) = metrics {
        watchdog = watchdog.with_metrics(metrics);
    }

    watchdog.run_until(shutdown_signal()).await;
    Ok(())
}

fn build_dispatcher(config: &Config) -> Result<Dispatcher> {
    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();

    if config.email.enabled {
        let email = EmailNotifier::new(&config.email, config.probe.url.clone())
            .context("Invalid email configuration")?;
        notifiers.push(Box::new(email));
    } else {
        info!("Email notifications disabled.");
    }

    if config.push.enabled {
        notifiers.push(Box::new(PushNotifier::new(&config.push)?));
    } else {
        info!("Push notifications disabled.");
    }

    Ok(Dispatcher::new(notifiers))
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
