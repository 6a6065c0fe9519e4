mod config;
mod database;
mod entities;
mod http_server;
mod logging;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config, database::Database, http_server::app::HttpServerConfig,
    logging::init_tracing,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "BOOKING_DIRECTORY_CONFIG")]
    config: Option<PathBuf>,

    /// Tracing filter directive, e.g. `info` or `booking_directory=debug,tower_http=debug`
    #[arg(long, default_value = "info", global = true, env = "RUST_LOG")]
    tracing_level: String,

    /// OTLP (gRPC) endpoint to export spans to
    #[arg(long, global = true, env = "OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the HTTP server
    Serve {
        /// The port to run the server on
        #[arg(short, long, env = "BOOKING_DIRECTORY_HTTP_PORT")]
        port: Option<u16>,

        /// The address to bind to
        #[arg(long, env = "BOOKING_DIRECTORY_HTTP_HOST")]
        host: Option<String>,

        /// SQLite database file, or `:memory:`
        #[arg(short, long, env = "BOOKING_DIRECTORY_DATABASE")]
        database: Option<String>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(args.otlp_endpoint.as_deref(), &args.tracing_level)?;

    let result = run(args).await;

    if let Some(tracer_provider) = tracer_provider
        && let Err(e) = tracer_provider.shutdown()
    {
        eprintln!("Failed to shut down tracer provider: {e}");
    }

    result
}

async fn run(args: Args) -> Result<()> {
    tracing::debug!("Loading configuration");
    let mut config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .wrap_err("Failed to load booking-directory config")?;

    match args.command {
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                tracing::info!("Default config available at {}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
        Commands::Serve {
            port,
            host,
            database,
        } => {
            if let Some(database) = database {
                config.set_database(database);
            }

            let database = if config.is_in_memory() {
                tracing::warn!("Using an in-memory database; nothing will be persisted");
                Database::open_in_memory().await?
            } else {
                Database::open(&config.database_path()).await?
            };

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            tracing::info!("Starting HTTP server on {}:{}", host, port);
            http_server::app::start(HttpServerConfig {
                host,
                port,
                database,
            })
            .await?;
        }
    }

    Ok(())
}
