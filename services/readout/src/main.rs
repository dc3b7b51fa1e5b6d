//! Tile readout service.
//!
//! Reads measurement values back out of color-ramp heatmap tiles:
//! - `probe`: the value under a lat/lon across the configured layers
//! - `serve`: the query worker protocol as JSON lines on stdin/stdout

mod config;
mod probe;
mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tile_decoder::{worker, HttpFetcher, QueryEngine, TileFetcher};
use tokio::io::BufReader;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::ReadoutConfig;
use probe::ProbeReport;

#[derive(Parser, Debug)]
#[command(name = "readout")]
#[command(about = "Read measurement values out of heatmap tile layers")]
struct Cli {
    /// Path to the readout YAML config
    #[arg(short, long, env = "READOUT_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read the value under a location
    Probe {
        /// Latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Zoom level of the 256px base pyramid
        #[arg(short, long, default_value = "13")]
        zoom: u32,

        /// Layer URL template with {z}/{x}/{y}; replaces configured layers.
        /// Repeat to stack layers, bottom-most first.
        #[arg(long = "layer")]
        layers: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve worker requests as JSON lines on stdin/stdout
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing; stdout carries results
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => ReadoutConfig::load(path)?,
        None => ReadoutConfig::default(),
    };

    let fetcher: Arc<dyn TileFetcher> = Arc::new(HttpFetcher::new(&config.http)?);

    match cli.command {
        Commands::Probe {
            lat,
            lon,
            zoom,
            layers,
            json,
        } => {
            let config = config.with_templates(&layers)?;
            if config.layers.is_empty() {
                bail!("No layers to probe; pass --config or --layer");
            }

            let mut engine = QueryEngine::new(config.engine.clone(), fetcher);
            let reading = probe::probe(&mut engine, &config.layers, lat, lon, zoom, 1).await?;

            if json {
                let report = ProbeReport {
                    lat,
                    lon,
                    zoom,
                    reading,
                };
                println!("{}", serde_json::to_string(&report)?);
            } else {
                match &reading {
                    Some(reading) => println!("{}  [{}]", probe::format_reading(reading), reading.layer),
                    None => println!("NO TARGET"),
                }
            }

            info!(stats = ?engine.stats(), "Probe finished");
        }
        Commands::Serve => {
            info!("Serving worker protocol on stdin/stdout");
            let handle = worker::spawn(config.engine, fetcher);
            let summary =
                serve::serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), handle).await?;
            info!(
                requests = summary.requests,
                malformed = summary.malformed,
                responses = summary.responses,
                "Input exhausted, worker drained"
            );
        }
    }

    Ok(())
}
