//! Command-line interface argument parsing.

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// Monthly average fuel retail prices as a bar chart.
///
/// Loads a fuel price dataset, then lets you pick a city, fuel type and
/// year from a menu and redraws the chart after every change.
///
/// Examples:
///   fuel-price-chart --data data/fuel_prices.json
///   fuel-price-chart --city Mumbai --fuel Diesel --svg out/prices.svg
///   fuel-price-chart --init-config > fuelchart.toml
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Dataset file (.json or .csv)
    #[arg(short, long, value_name = "FILE", env = "FUELCHART_DATA")]
    pub data: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for fuelchart.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Initial city
    #[arg(long)]
    pub city: Option<String>,

    /// Initial fuel type
    #[arg(long)]
    pub fuel: Option<String>,

    /// Initial year, as the raw label found in the data (e.g. 2021-22)
    #[arg(long)]
    pub year: Option<String>,

    /// Render to this SVG file instead of the terminal
    #[arg(long, value_name = "FILE")]
    pub svg: Option<PathBuf>,

    /// Chart width (columns for the terminal, pixels for SVG)
    #[arg(long)]
    pub width: Option<u32>,

    /// Chart height (rows for the terminal, pixels for SVG)
    #[arg(long)]
    pub height: Option<u32>,

    /// Directory for exported series files
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub export_dir: PathBuf,

    /// Print a default configuration file and exit
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["fuel-price-chart"]);
        assert!(args.svg.is_none());
        assert_eq!(args.export_dir, PathBuf::from("."));
        assert_eq!(args.log_level(), Level::INFO);
    }

    #[test]
    fn test_log_level_flags() {
        let verbose = Args::parse_from(["fuel-price-chart", "-v"]);
        assert_eq!(verbose.log_level(), Level::DEBUG);
        let quiet = Args::parse_from(["fuel-price-chart", "--quiet"]);
        assert_eq!(quiet.log_level(), Level::WARN);
        assert!(Args::try_parse_from(["fuel-price-chart", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_svg_and_size() {
        let args = Args::parse_from([
            "fuel-price-chart",
            "--svg",
            "out/chart.svg",
            "--width",
            "1024",
        ]);
        assert_eq!(args.svg, Some(PathBuf::from("out/chart.svg")));
        assert_eq!(args.width, Some(1024));
    }
}
