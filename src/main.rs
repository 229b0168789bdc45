//! Laboratory sample tracking service entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lab_track::api::{create_router, AppState};
use lab_track::config::Config;
use lab_track::metrics;
use lab_track::store::{LabStore, MongoStore};
use lab_track::utils::shutdown_signal;

/// Laboratory sample tracking service.
#[derive(Parser, Debug)]
#[command(name = "lab-track")]
#[command(about = "HTTP API for tracking laboratory samples and test results")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port (overrides PORT from the environment).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the API server (default).
    Run {
        /// HTTP server port (overrides PORT from the environment).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Check database connectivity.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("lab_track=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Ping) => cmd_ping().await,
        Some(Command::Run { port }) => cmd_run(port).await,
        None => cmd_run(args.port).await,
    }
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("LAB-TRACK - CONFIGURATION CHECK");
    println!("======================================================================");

    // Load configuration
    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    // Validate configuration
    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    // Show configuration summary
    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Mongo URI: {}", config.mongo_uri);
    println!("  Database: {}", config.mongo_db);
    println!(
        "  Collections: {} / {}",
        config.samples_collection, config.tests_collection
    );
    println!("  Port: {}", config.port);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Check database connectivity.
async fn cmd_ping() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("LAB-TRACK - CONNECTIVITY CHECK");
    println!("======================================================================");

    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!("URI: {}", config.mongo_uri);
    println!("Database: {}", config.mongo_db);

    print!("\nPinging MongoDB... ");
    let store = MongoStore::connect(&config).await?;

    let start = Instant::now();
    match store.ping().await {
        Ok(()) => {
            println!("OK ({:.1}ms)", start.elapsed().as_secs_f64() * 1000.0);
            println!("======================================================================");
            println!("CONNECTIVITY CHECK PASSED");
            println!("======================================================================");
            Ok(())
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            println!("======================================================================");
            Err(anyhow::anyhow!("MongoDB connectivity check failed"))
        }
    }
}

/// Run the API server.
async fn cmd_run(port_override: Option<u16>) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(port) = port_override {
        config.port = port;
    }

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!("Database: {} at {}", config.mongo_db, config.mongo_uri);

    // Install metrics recorder
    let metrics_handle = PrometheusBuilder::new().install_recorder()?;
    metrics::init_metrics();

    // Create the store; the client connects lazily, so an unreachable
    // server does not prevent startup.
    let store = Arc::new(MongoStore::connect(&config).await?);

    // Create app state
    let app_state = AppState::new(store.clone()).with_metrics(metrics_handle);

    // Startup connectivity check: logged, never gates serving.
    {
        let app_state = app_state.clone();
        tokio::spawn(async move {
            match store.ping().await {
                Ok(()) => {
                    info!("Connected to MongoDB");
                    app_state.set_ready(true);
                }
                Err(e) => {
                    warn!("MongoDB connectivity check failed: {}", e);
                }
            }
        });
    }

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
