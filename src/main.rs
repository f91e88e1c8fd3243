//! fatalviz - chart explorer for police-involved death data
//!
//! A CLI tool that loads two CSV tables (police-involved deaths and
//! poverty by geographic area) and renders one of five canned charts as
//! SVG, terminal text, or JSON.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable dataset, missing column, write failure, etc.)

mod analysis;
mod chart;
mod cli;
mod config;
mod data;
mod menu;
mod models;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use models::{DeathRecord, PovertyRecord, View};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("fatalviz v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("fatalviz failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .fatalviz.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".fatalviz.toml");

    if path.exists() {
        eprintln!("⚠️  .fatalviz.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .fatalviz.toml")?;

    println!("✅ Created .fatalviz.toml with default settings.");
    println!("   Edit it to customize dataset paths, delimiter, and chart colors.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete load → select → aggregate → render workflow.
fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let delimiter = config
        .data
        .delimiter_char()
        .context("Config delimiter must be a single character")?;

    let deaths_path = resolve_path(config.data.deaths_path.as_deref(), "deaths", "--deaths", "DATA_PATH")?;
    let poverty_path = resolve_path(
        config.data.poverty_path.as_deref(),
        "poverty",
        "--poverty",
        "POVERTY_PATH",
    )?;

    // Step 1: Load both source tables
    println!("📥 Loading datasets...");
    let show_progress = !args.quiet;
    let deaths = data::load_death_records(&deaths_path, delimiter, show_progress)
        .with_context(|| format!("Failed to load deaths table from {}", deaths_path.display()))?;
    let poverty = data::load_poverty_records(&poverty_path, delimiter, show_progress)
        .with_context(|| format!("Failed to load poverty table from {}", poverty_path.display()))?;

    println!("Total deaths in file: {}", deaths.len());

    // Handle --summary: report dataset statistics and exit
    if args.summary {
        print_summary(&deaths, &poverty);
        return Ok(());
    }

    // Step 2: Pick the view, from --view or the interactive menu
    let view = match args.selected_view() {
        Some(view) => view,
        None => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut output = std::io::stdout();
            match menu::prompt_view(&mut input, &mut output)? {
                Some(view) => view,
                None => {
                    info!("Input ended before a chart was chosen");
                    return Ok(());
                }
            }
        }
    };

    info!("Rendering view {}: {}", view.number(), view);

    // Step 3: Aggregate and render
    let series = analysis::compute_view(view, &deaths, &poverty);

    match args.format {
        OutputFormat::Svg => {
            let svg = chart::svg::render_view(view, &series, &config.chart);
            let path = artifact_path(&args, &config, view);
            write_artifact(&path, &svg)?;
            println!("\n✅ Chart saved to: {}", path.display());
        }
        OutputFormat::Json => {
            let json = chart::to_json(&series)?;
            let path = artifact_path(&args, &config, view);
            write_artifact(&path, &json)?;
            println!("\n✅ Data saved to: {}", path.display());
        }
        OutputFormat::Text => {
            let text = chart::text::render_view(view, &series);
            println!("\n{}", text);
            if let Some(ref path) = args.output {
                write_artifact(path, &text)?;
                println!("✅ Chart saved to: {}", path.display());
            }
        }
    }

    Ok(())
}

/// Print dataset statistics for --summary.
fn print_summary(deaths: &[DeathRecord], poverty: &[PovertyRecord]) {
    let parseable_dates = deaths
        .iter()
        .filter(|r| analysis::parse_death_date(&r.date).is_some())
        .count();
    let states: BTreeSet<&str> = deaths.iter().filter_map(|r| r.state.as_deref()).collect();
    let numeric_rates = poverty
        .iter()
        .filter(|r| analysis::parse_poverty_rate(&r.rate).is_some())
        .count();
    let areas: BTreeSet<&str> = poverty.iter().filter_map(|r| r.area.as_deref()).collect();

    println!("\n📊 Dataset Summary:");
    println!("   Death records: {}", deaths.len());
    println!("   - with parseable dates: {}", parseable_dates);
    println!("   - distinct states: {}", states.len());
    println!("   Poverty records: {}", poverty.len());
    println!("   - with numeric rates: {}", numeric_rates);
    println!("   - distinct areas: {}", areas.len());
}

/// A dataset path from config/CLI/env, or an error naming every way to set it.
fn resolve_path(
    configured: Option<&str>,
    table: &str,
    flag: &str,
    env_var: &str,
) -> Result<PathBuf> {
    match configured {
        Some(path) => Ok(PathBuf::from(path)),
        None => anyhow::bail!(
            "No {} file configured. Pass {}, set {}, or add it to .fatalviz.toml",
            table,
            flag,
            env_var
        ),
    }
}

/// Where the rendered artifact goes: --output, or output_dir/<slug>.<ext>.
fn artifact_path(args: &Args, config: &Config, view: View) -> PathBuf {
    match args.output {
        Some(ref output) => output.clone(),
        None => Path::new(&config.general.output_dir)
            .join(format!("{}.{}", view.slug(), args.format.extension())),
    }
}

fn write_artifact(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory {}", parent.display())
            })?;
        }
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .fatalviz.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
