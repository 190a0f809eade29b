//! Competition server: REST API over a PostgreSQL-backed engine.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use log::info;
use pico_args::Arguments;
use tourney::{CompetitionService, access::TokenKeys, db::Database};
use tourney_server::{api, config::ServerConfig, logging, metrics};

const HELP: &str = "\
Run the tournament competition server

USAGE:
  tourney_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --migrate                Apply pending migrations before serving
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string (required)
  JWT_SECRET               JWT signing secret, at least 32 characters (required)
  ACCESS_TOKEN_MINUTES     Lifetime of issued access tokens [default: 15]
  METRICS_BIND             Prometheus exporter address; disabled when unset
  RUN_MIGRATIONS           Same as --migrate when set to true
  DB_MAX_CONNECTIONS, DB_MIN_CONNECTIONS, DB_CONNECTION_TIMEOUT_SECS,
  DB_IDLE_TIMEOUT_SECS, DB_MAX_LIFETIME_SECS
  RUST_LOG                 Log filter (e.g., info,tourney=debug)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        migrate: pargs.contains("--migrate"),
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    let config = ServerConfig::from_env(args.bind, args.database_url, args.migrate)?;
    config.validate()?;

    logging::init();
    info!("Starting competition server at {}", config.bind);

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics exposed on {}", metrics_bind);
    }

    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    info!("Database connected successfully");

    if config.run_migrations {
        db.migrate()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to apply migrations: {}", e))?;
    }

    let pool = Arc::new(db.pool().clone());
    let tokens = TokenKeys::new(
        config.security.jwt_secret.clone(),
        chrono::Duration::minutes(config.security.access_token_minutes),
    );

    let api_state = api::AppState {
        service: Arc::new(CompetitionService::new(pool.clone())),
        tokens: Arc::new(tokens),
        pool,
    };

    let app = api::create_router(api_state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for CTRL+C: {}", e);
    }
}
