mod config;
mod database;
mod entities;
mod forms;
mod http_server;
mod logging;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};
use tracing_subscriber::filter::LevelFilter;

use crate::{
    config::Config, database::Database, http_server::app::HttpServerConfig,
    logging::setup_logging, services::seed::SeedService,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "VENUE_BOOKING_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Console log filter, e.g. `info` or `venue_booking=debug,tower_http=debug`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// File log level (default: info)
    #[arg(long, default_value = "info", global = true)]
    log_file_level: LevelFilter,

    /// Path to log file
    #[arg(long, env = "VENUE_BOOKING_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the booking site
    Serve {
        /// Address to listen on (default: from config)
        #[arg(long, env = "VENUE_BOOKING_HOST")]
        host: Option<String>,

        /// The port to run the server on (default: from config)
        #[arg(short, long, env = "VENUE_BOOKING_PORT")]
        port: Option<u16>,
    },
    /// Insert demo venues, artists and shows into an empty database
    Seed,
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
    setup_logging(&args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Venue booking starting");

    // Config commands must work without a readable config or database
    if let Commands::Config(config_command) = &args.command {
        match config_command {
            ConfigCommands::CreateDefault => {
                log::debug!("Creating default config");
                if Config::create_default()? {
                    log::info!("Default config created successfully");
                }
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        }
        return Ok(());
    }

    log::debug!("Loading configuration");
    let config = {
        if let Some(config) = &args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .wrap_err("Failed to load venue-booking config")?;

    log::debug!("Opening database at: {}", config.database_path().display());
    let database = Database::open(&config.database_path()).await?;

    match args.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            log::info!("Starting HTTP server on {}:{}", host, port);
            http_server::app::start(HttpServerConfig {
                host,
                port,
                database,
                static_dir: config.static_dir(),
            })
            .await?;
        }
        Commands::Seed => {
            let seeded = SeedService::new(Arc::new(database))
                .seed_demo_data()
                .await
                .wrap_err("Failed to seed demo data")?;
            if seeded {
                log::info!("Seed command completed successfully");
            }
        }
        Commands::Config(_) => {}
    }

    Ok(())
}
