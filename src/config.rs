//! Configuration file handling.
//!
//! Settings come from an optional `fuelchart.toml`; command-line flags
//! override whatever the file says.

use crate::chart::{ChartStyle, DEFAULT_BAR_COLOR, DEFAULT_LABEL_ROTATION};
use crate::cli::Args;
use crate::types::{DEFAULT_CITY, DEFAULT_FUEL};
use crate::view::SelectionDefaults;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "fuelchart.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub svg: SvgConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data/fuel_prices.json")
}

/// Initial filter selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_city")]
    pub city: String,

    #[serde(default = "default_fuel")]
    pub fuel: String,

    /// Raw year label; the first year in the data when absent.
    #[serde(default)]
    pub year: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            fuel: default_fuel(),
            year: None,
        }
    }
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

fn default_fuel() -> String {
    DEFAULT_FUEL.to_string()
}

/// Terminal chart settings. Width and height are in character cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: u32,

    #[serde(default = "default_chart_height")]
    pub height: u32,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_label_rotation")]
    pub label_rotation: i32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            color: default_color(),
            label_rotation: default_label_rotation(),
        }
    }
}

fn default_chart_width() -> u32 {
    80
}

fn default_chart_height() -> u32 {
    24
}

fn default_color() -> String {
    DEFAULT_BAR_COLOR.to_string()
}

fn default_label_rotation() -> i32 {
    DEFAULT_LABEL_ROTATION
}

/// SVG output size in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvgConfig {
    #[serde(default = "default_svg_width")]
    pub width: u32,

    #[serde(default = "default_svg_height")]
    pub height: u32,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            width: default_svg_width(),
            height: default_svg_height(),
        }
    }
}

fn default_svg_width() -> u32 {
    800
}

fn default_svg_height() -> u32 {
    400
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load the explicit config file, or `fuelchart.toml` from the working
    /// directory if it exists, or fall back to defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref data) = args.data {
            self.data.path = data.clone();
        }
        if let Some(ref city) = args.city {
            self.defaults.city = city.clone();
        }
        if let Some(ref fuel) = args.fuel {
            self.defaults.fuel = fuel.clone();
        }
        if let Some(ref year) = args.year {
            self.defaults.year = Some(year.clone());
        }
        if let Some(width) = args.width {
            self.chart.width = width;
            self.svg.width = width;
        }
        if let Some(height) = args.height {
            self.chart.height = height;
            self.svg.height = height;
        }
    }

    pub fn selection_defaults(&self) -> SelectionDefaults {
        SelectionDefaults {
            city: self.defaults.city.clone(),
            fuel: self.defaults.fuel.clone(),
            year: self.defaults.year.clone(),
        }
    }

    pub fn chart_style(&self) -> ChartStyle {
        ChartStyle {
            color: self.chart.color.clone(),
            label_rotation: self.chart.label_rotation,
        }
    }

    pub fn default_toml() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.defaults.city, "Delhi");
        assert_eq!(config.defaults.fuel, "Petrol");
        assert_eq!(config.defaults.year, None);
        assert_eq!(config.chart.color, "#5470C6");
        assert_eq!(config.chart.label_rotation, 45);
        assert_eq!(config.svg.width, 800);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[defaults]\ncity = \"Mumbai\"\nyear = \"2021-22\"\n\n[chart]\nwidth = 120").unwrap();
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.defaults.city, "Mumbai");
        assert_eq!(config.defaults.fuel, "Petrol");
        assert_eq!(config.defaults.year.as_deref(), Some("2021-22"));
        assert_eq!(config.chart.width, 120);
        assert_eq!(config.chart.height, 24);
        assert_eq!(config.data.path, PathBuf::from("data/fuel_prices.json"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chart]\nwidth = \"wide\"").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let args = Args::parse_from([
            "fuel-price-chart",
            "--city",
            "Chennai",
            "--year",
            "2020-21",
            "--width",
            "100",
        ]);
        config.merge_with_args(&args);

        let defaults = config.selection_defaults();
        assert_eq!(defaults.city, "Chennai");
        assert_eq!(defaults.fuel, "Petrol");
        assert_eq!(defaults.year.as_deref(), Some("2020-21"));
        assert_eq!(config.chart.width, 100);
        assert_eq!(config.svg.width, 100);
    }

    #[test]
    fn test_default_toml_round_trips() {
        let parsed: Config = toml::from_str(&Config::default_toml()).unwrap();
        assert_eq!(parsed.chart.width, 80);
    }
}
