//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

use crate::models::View;

/// fatalviz - chart explorer for police-involved death data
///
/// Loads the deaths and poverty CSV tables and renders one of five
/// canned charts as an SVG document, a terminal text chart, or a JSON
/// export. Without --view, an interactive menu asks which chart to
/// render.
///
/// Examples:
///   fatalviz --deaths deaths.csv --poverty poverty.csv
///   fatalviz --view 1 --output monthly.svg
///   fatalviz --view 4 --format text
///   fatalviz --summary
///   fatalviz --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the deaths CSV file
    ///
    /// Must contain the columns `date`, `race`, `signs_of_mental_illness`
    /// and `state`. Can also be set via DATA_PATH or the config file.
    #[arg(short, long, value_name = "FILE", env = "DATA_PATH")]
    pub deaths: Option<PathBuf>,

    /// Path to the poverty CSV file
    ///
    /// Must contain the columns `Geographic Area` and `poverty_rate`.
    /// Can also be set via POVERTY_PATH or the config file.
    #[arg(short, long, value_name = "FILE", env = "POVERTY_PATH")]
    pub poverty: Option<PathBuf>,

    /// Chart to render (1-5), skipping the interactive menu
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=5))]
    pub view: Option<u8>,

    /// Output format (svg, text, json)
    #[arg(short, long, default_value = "svg", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Artifact file path
    ///
    /// Defaults to <output_dir>/<chart name>.<ext> for svg and json.
    /// Text renders to stdout and is only written to a file when this
    /// is given.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Field delimiter used by both CSV files
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .fatalviz.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print dataset statistics and exit without rendering
    #[arg(long)]
    pub summary: bool,

    /// Generate a default .fatalviz.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for rendered charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// SVG document (default)
    #[default]
    Svg,
    /// Aligned text chart on stdout
    Text,
    /// Pretty-printed JSON export
    Json,
}

impl OutputFormat {
    /// File extension for saved artifacts.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The view picked with --view, if any.
    pub fn selected_view(&self) -> Option<View> {
        self.view.and_then(View::from_number)
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // The CSV reader works on raw bytes, so the delimiter must be ASCII
        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() {
                return Err("Delimiter must be a single ASCII character".to_string());
            }
        }

        if self.summary && self.view.is_some() {
            return Err("Cannot use both --summary and --view".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            deaths: Some(PathBuf::from("deaths.csv")),
            poverty: Some(PathBuf::from("poverty.csv")),
            view: None,
            format: OutputFormat::Svg,
            output: None,
            delimiter: None,
            config: None,
            summary: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        let args = make_args();
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_non_ascii_delimiter() {
        let mut args = make_args();
        args.delimiter = Some('§');
        assert!(args.validate().is_err());

        args.delimiter = Some(';');
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_summary_conflicts_with_view() {
        let mut args = make_args();
        args.summary = true;
        args.view = Some(1);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_view_range_enforced_by_parser() {
        assert!(Args::try_parse_from(["fatalviz", "--view", "0"]).is_err());
        assert!(Args::try_parse_from(["fatalviz", "--view", "6"]).is_err());

        let args = Args::try_parse_from(["fatalviz", "--view", "5"]).unwrap();
        assert_eq!(args.selected_view(), Some(View::DeathsVsPoverty));
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(OutputFormat::Svg.extension(), "svg");
        assert_eq!(OutputFormat::Text.extension(), "txt");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
