use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};
use ramal_geo::Coordinate;
use tracing_subscriber::EnvFilter;

use crate::ramal::forecast::ForecastUrl;
use crate::ramal::resolve::{Resolution, Resolver};

pub mod ramal;
pub mod ramal_web;

/// Exit status of `resolve` when the dataset holds no unit at all.
const EXIT_NOT_FOUND: u8 = 2;

#[derive(Parser)]
#[command(name = "ramal")]
#[command(about = "Resolve a coordinate to the nearest kelurahan and its adm4 region code")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "./ramal.config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a single coordinate and print its region code
    Resolve {
        /// Latitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Serve the resolver over http
    Serve,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // logs go to stderr, stdout is reserved for resolve output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = ramal::config::load(&args.config)?;

    let dataset = ramal::dataset::open(&config.dataset)?;
    let resolver = Resolver::new(dataset);

    match args.command {
        Command::Resolve { lat, lon } => {
            let query = Coordinate::new(lat, lon);
            let status = resolve_once(&resolver, &config.forecast_url, query, &mut std::io::stdout()).await?;
            Ok(ExitCode::from(status))
        }

        Command::Serve => {
            ramal_web::serve(ramal_web::Options {
                resolver,
                forecast_url: config.forecast_url,
                addr: config.http_address,
            }).await?;

            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn resolve_once(
    resolver: &Resolver,
    forecast_url: &ForecastUrl,
    query: Coordinate,
    out: &mut impl Write,
) -> Result<u8> {
    ensure!(
        query.latitude.is_finite() && query.longitude.is_finite(),
        "coordinates must be finite numbers, got {}, {}", query.latitude, query.longitude,
    );

    let found = match resolver.resolve(query).await? {
        Resolution::Found(found) => found,
        Resolution::NotFound => {
            writeln!(out, "No kelurahan found near {}, {}", query.latitude, query.longitude)?;
            return Ok(EXIT_NOT_FOUND);
        }
    };

    writeln!(out, "Kelurahan:   {} (id {})", found.unit.name, found.unit.id)?;
    writeln!(out, "Distance:    {:.3} km", found.distance_km)?;
    writeln!(out, "Region code: {}", found.code)?;
    writeln!(out, "Forecast:    {}", forecast_url.for_region(&found.code))?;

    Ok(0)
}
