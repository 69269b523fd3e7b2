use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinelog_server::{
    create_app,
    infra::{
        config::{Config, ConfigLoader},
        startup,
    },
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "cinelog-server")]
#[command(about = "Records watches from media-server playback webhooks")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone, Default)]
struct ServeArgs {
    /// Path to a cinelog.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host
    #[arg(long)]
    host: Option<String>,

    /// Serve from in-memory repositories instead of PostgreSQL
    #[arg(long, default_value_t = false)]
    in_memory: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Check that PostgreSQL answers and exit
    Preflight,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_runtime_config(&cli.serve)?;

    if let Some(command) = cli.command {
        match command {
            Command::Db(DbCommand::Preflight) => {
                let db = startup::connect_postgres(&config).await?;
                db.preflight_only()
                    .await
                    .context("database preflight failed")?;
                info!("Database preflight passed");
                return Ok(());
            }
            Command::Db(DbCommand::Migrate) => {
                let db = startup::connect_postgres(&config).await?;
                db.initialize_schema()
                    .await
                    .context("database migration failed")?;
                info!("Database migrations applied successfully");
                return Ok(());
            }
        }
    }

    run_server(config, cli.serve.in_memory).await
}

fn load_runtime_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "loaded configuration file");
    }
    Ok(config)
}

async fn run_server(config: Config, in_memory: bool) -> anyhow::Result<()> {
    let config = Arc::new(config);
    let state = if in_memory {
        info!("Serving from in-memory repositories; data is lost on exit");
        startup::in_memory_state(config.clone()).await?.0
    } else {
        startup::postgres_state(config.clone()).await?
    };

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Cinelog listening");

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
