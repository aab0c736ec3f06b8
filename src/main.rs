//! Bugtrack server CLI
//!
//! Connects the database, applies migrations, and serves the REST API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bugtrack_api::{ApiServer, ApiServerConfig};

/// Bugtrack - a bug tracker REST API
#[derive(Parser, Debug)]
#[command(name = "bugtrack")]
#[command(about = "Bug tracker REST API with JWT authentication")]
#[command(version)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nCommit: ", env!("GIT_HASH"),
    "\nBuilt: ", env!("BUILD_TIME")
))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run migrations and serve the API
    Serve {
        /// Address to bind the API server
        #[arg(long, env = "BUGTRACK_BIND", default_value = "127.0.0.1:8080")]
        bind: SocketAddr,

        /// Database URL (SQLite or Postgres)
        #[arg(
            long,
            env = "BUGTRACK_DATABASE_URL",
            default_value = "sqlite://bugtrack.db?mode=rwc"
        )]
        database_url: String,

        /// Secret for signing bearer tokens
        #[arg(long, env = "BUGTRACK_JWT_SECRET")]
        jwt_secret: String,

        /// Token lifetime in days
        #[arg(long, env = "BUGTRACK_TOKEN_LIFETIME_DAYS", default_value = "7")]
        token_lifetime_days: i64,

        /// Disable public signup
        #[arg(long, env = "BUGTRACK_DISABLE_SIGNUP")]
        disable_signup: bool,

        /// Disable permissive development CORS
        #[arg(long)]
        no_cors: bool,
    },

    /// Apply pending database migrations and exit
    Migrate {
        /// Database URL (SQLite or Postgres)
        #[arg(
            long,
            env = "BUGTRACK_DATABASE_URL",
            default_value = "sqlite://bugtrack.db?mode=rwc"
        )]
        database_url: String,
    },
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Serve {
            bind,
            database_url,
            jwt_secret,
            token_lifetime_days,
            disable_signup,
            no_cors,
        } => {
            let db = bugtrack_db::connect(&database_url)
                .await
                .context("Failed to connect to database")?;
            bugtrack_db::migrate(&db)
                .await
                .context("Failed to run migrations")?;

            let config = ApiServerConfig {
                bind_addr: bind,
                enable_cors: !no_cors,
                jwt_secret,
                token_lifetime_days,
                allow_signup: !disable_signup,
            };

            ApiServer::new(config, db).start().await
        }

        Commands::Migrate { database_url } => {
            let db = bugtrack_db::connect(&database_url)
                .await
                .context("Failed to connect to database")?;
            bugtrack_db::migrate(&db)
                .await
                .context("Failed to run migrations")?;

            info!("Migrations applied");
            Ok(())
        }
    }
}
