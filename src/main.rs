use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use appman_api::auth::JwtKeys;
use appman_api::config::AppConfig;
use appman_api::{app, database, AppState};

#[derive(Parser)]
#[command(name = "appman-api")]
#[command(about = "Job application tracking API")]
#[command(version)]
struct Cli {
    #[arg(short, long, env = "APPMAN_CONFIG", help = "Path to a YAML configuration file")]
    config: Option<PathBuf>,

    #[arg(value_name = "CONFIG", help = "Same as --config; takes precedence when both are given")]
    config_path: Option<PathBuf>,
}

impl Cli {
    fn config_file(&self) -> Option<&Path> {
        self.config_path.as_deref().or(self.config.as_deref())
    }
}

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up APPMAN_* settings
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("appman_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config_file()).context("failed to load configuration")?;

    let keys = JwtKeys::from_secret(config.jwt.sign_key.as_bytes()).context("invalid signing key")?;

    let pool = database::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    let state = AppState::from_pool(pool.clone(), keys);

    if config.database.reset_schema {
        state
            .applications
            .create_schema()
            .await
            .context("failed to initialize database schema")?;
    }

    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Application service listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Application service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
