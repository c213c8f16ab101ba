mod services;

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ecoscan_config::{validate, EcoScanConfig};
use ecoscan_core::{Coordinate, DeviceAnalysis, RecyclerLocator};
use ecoscan_gateway::start_server;
use ecoscan_logging::init_logger;

#[derive(Parser)]
#[command(name = "ecoscan")]
#[command(about = "EcoScan — e-waste device analysis and recycler lookup")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the EcoScan HTTP API server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Query a running server's health endpoint
    Status,
    /// Analyze one image and print the structured result
    Analyze {
        /// http(s) URL, base64 data URL, or local file path
        image: String,
    },
    /// List e-waste recyclers near a location
    Recyclers {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = EcoScanConfig::from_env()?;
    init_logger(&config.log_level, config.log_dir.as_deref().map(Path::new));

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = EcoScanConfig {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => {
            let client = reqwest::Client::new();
            match client
                .get(format!("http://127.0.0.1:{}/api/health", config.port))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("EcoScan is not running on port {}", config.port);
                }
            }
        }
        Commands::Analyze { image } => {
            let image_ref = services::image_from_arg(&image)?;
            let image_url = if image_ref.is_remote() { image.as_str() } else { "" };
            let analysis = services::orchestrator(&config)
                .analyze_device(&image_ref, image_url)
                .await?;
            print_analysis(&analysis)?;
        }
        Commands::Recyclers {
            latitude,
            longitude,
        } => {
            let recyclers = services::locator(&config)
                .nearby(Coordinate::new(latitude, longitude))
                .await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "recyclers": recyclers }))?
            );
        }
    }

    Ok(())
}

fn print_analysis(analysis: &DeviceAnalysis) -> Result<()> {
    let highlights = analysis.highlights();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "highlights": highlights,
            "analysis": analysis,
        }))?
    );
    Ok(())
}

async fn run_server(config: EcoScanConfig) -> Result<()> {
    info!(config = %config.redacted(), "Starting EcoScan backend");

    let report = validate(&config);
    for warning in &report.warnings {
        warn!(field = %warning.path, "{}", warning.message);
    }

    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.listen_addr()))?;

    let state = services::gateway_state(&config)?;
    start_server(addr, state).await
}
