//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.fatalviz.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Chart settings.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory rendered artifacts are written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> String {
    "charts".to_string()
}

/// Dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the deaths CSV file.
    #[serde(default)]
    pub deaths_path: Option<String>,

    /// Path to the poverty CSV file.
    #[serde(default)]
    pub poverty_path: Option<String>,

    /// Field delimiter for both CSV files, one character.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            deaths_path: None,
            poverty_path: None,
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

impl DataConfig {
    /// The configured delimiter as a single character, or `None` when the
    /// config holds something other than exactly one character.
    pub fn delimiter_char(&self) -> Option<char> {
        let mut chars = self.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Canvas width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Canvas height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Bar color for the monthly deaths chart.
    #[serde(default = "default_monthly_color")]
    pub monthly_color: String,

    /// Bar color for the poverty-by-area chart.
    #[serde(default = "default_area_color")]
    pub area_color: String,

    /// Point color for the scatter chart.
    #[serde(default = "default_scatter_color")]
    pub scatter_color: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            monthly_color: default_monthly_color(),
            area_color: default_area_color(),
            scatter_color: default_scatter_color(),
        }
    }
}

fn default_width() -> u32 {
    960
}

fn default_height() -> u32 {
    540
}

fn default_monthly_color() -> String {
    "skyblue".to_string()
}

fn default_area_color() -> String {
    "red".to_string()
}

fn default_scatter_color() -> String {
    "blue".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".fatalviz.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref deaths) = args.deaths {
            self.data.deaths_path = Some(deaths.display().to_string());
        }
        if let Some(ref poverty) = args.poverty {
            self.data.poverty_path = Some(poverty.display().to_string());
        }
        if let Some(delimiter) = args.delimiter {
            self.data.delimiter = delimiter.to_string();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.output_dir, "charts");
        assert_eq!(config.data.delimiter, ",");
        assert_eq!(config.data.deaths_path, None);
        assert_eq!(config.chart.width, 960);
        assert_eq!(config.chart.monthly_color, "skyblue");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r##"
[general]
output_dir = "out"
verbose = true

[data]
deaths_path = "deaths.csv"
delimiter = ";"

[chart]
width = 1280
area_color = "#cc0000"
"##;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, "out");
        assert!(config.general.verbose);
        assert_eq!(config.data.deaths_path.as_deref(), Some("deaths.csv"));
        assert_eq!(config.data.delimiter, ";");
        assert_eq!(config.chart.width, 1280);
        assert_eq!(config.chart.height, 540);
        assert_eq!(config.chart.area_color, "#cc0000");
    }

    #[test]
    fn test_delimiter_char() {
        let mut data = DataConfig::default();
        assert_eq!(data.delimiter_char(), Some(','));

        data.delimiter = "\t".to_string();
        assert_eq!(data.delimiter_char(), Some('\t'));

        data.delimiter = "||".to_string();
        assert_eq!(data.delimiter_char(), None);

        data.delimiter = String::new();
        assert_eq!(data.delimiter_char(), None);
    }

    #[test]
    fn test_merge_with_args() {
        use clap::Parser;

        let args = crate::cli::Args::parse_from([
            "fatalviz",
            "--deaths",
            "d.csv",
            "--delimiter",
            ";",
            "--verbose",
        ]);
        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.data.deaths_path.as_deref(), Some("d.csv"));
        assert_eq!(config.data.delimiter, ";");
        assert!(config.general.verbose);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[chart]"));
        assert!(toml_str.contains("skyblue"));
    }
}
