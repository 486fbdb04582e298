use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carwash_admin::config::Config;
use carwash_admin::AppState;

#[derive(Parser, Debug)]
#[command(name = "carwash-admin")]
#[command(author, version, about = "Admin front end for car-wash inventory and services", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "carwash-admin.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Products backend base URL (also serves categories, suppliers and reports)
    #[arg(long, env = "CARWASH_PRODUCTS_API_URL")]
    products_url: Option<String>,

    /// Services backend base URL
    #[arg(long, env = "CARWASH_SERVICES_API_URL")]
    services_url: Option<String>,

    /// Users backend base URL
    #[arg(long, env = "CARWASH_USERS_API_URL")]
    users_url: Option<String>,

    /// Full URL of the upstream appointments listing
    #[arg(long, env = "CARWASH_APPOINTMENTS_URL")]
    appointments_url: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        let backends = &mut config.backends;
        if let Some(url) = &self.products_url {
            backends.products_url = url.clone();
        }
        if let Some(url) = &self.services_url {
            backends.services_url = url.clone();
        }
        if let Some(url) = &self.users_url {
            backends.users_url = url.clone();
        }
        if let Some(url) = &self.appointments_url {
            backends.appointments_url = url.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    cli.apply_overrides(&mut config);

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting carwash-admin v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        products = %config.backends.products_url,
        services = %config.backends.services_url,
        users = %config.backends.users_url,
        appointments = %config.backends.appointments_url,
        "Backends configured"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config)?);
    let shutdown = state.shutdown.clone();
    let app = carwash_admin::create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // abandon in-flight view loads instead of waiting on slow backends
            shutdown.cancel();
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
