//! WildGrid CLI - command-line grid inspector
//!
//! Prints the geodesic cell identifiers a map query would cover for a given
//! position and neighborhood width. Useful for debugging what a client is
//! about to ask the service for.

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Print the grid cells covering a neighborhood around a position.
#[derive(Parser)]
#[command(name = "wildgrid", version, about)]
struct Args {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Neighborhood width in cells (odd values give a centered square)
    #[arg(long, default_value_t = 3)]
    width: i32,

    /// Print identifiers as hex instead of decimal
    #[arg(long)]
    hex: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let cells = wildgrid::cell_ids_for(args.lat, args.lon, args.width);

    tracing::debug!(
        lat = args.lat,
        lon = args.lon,
        width = args.width,
        count = cells.len(),
        "computed neighborhood"
    );

    for cell in cells {
        if args.hex {
            println!("{cell}");
        } else {
            println!("{}", cell.id());
        }
    }
}
