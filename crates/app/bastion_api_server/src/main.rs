//! Bastion API server binary.
//!
//! Reads configuration from the environment (and `.env`), runs migrations,
//! then serves the frontend and admin APIs until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use bastion_api::config::ApiConfig;
use bastion_core::store::PgStore;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// CLI arguments. Flags override the matching environment variables.
#[derive(Parser, Debug)]
#[command(name = "bastion_api_server", about = "Bastion API server")]
struct Args {
    /// Address to listen on, e.g. `0.0.0.0:8080`.
    #[arg(long)]
    bind: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(long)]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Skip embedded migrations at startup.
    #[arg(long, default_value_t = false)]
    skip_migrations: bool,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bastion_api=debug,bastion_core=debug".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = ApiConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(url) = args.database_url {
        config.database_url = url;
    }

    info!(
        version = bastion_core::version(),
        bind_addr = %config.bind_addr,
        max_connections = args.max_connections,
        user_token_ttl_secs = config.user_token_ttl.num_seconds(),
        "starting bastion_api_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    if args.skip_migrations {
        info!("skipping database migrations");
    } else {
        bastion_api::migrate(&pool).await?;
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    let state = bastion_api::AppState::new(Arc::new(PgStore::new(pool)), config);
    let app = bastion_api::router(state);

    info!(addr = %local_addr, "REST API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
