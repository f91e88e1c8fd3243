//! Record mapping for the two source tables.
//!
//! Columns are located by exact, case-sensitive header match. Cells are
//! trimmed; empty cells become `None`. Rows shorter than the header row
//! surface as missing cells.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::data::{read_table, CsvTable, DatasetError};
use crate::models::{DeathRecord, PovertyRecord};

/// Required columns in the deaths table.
const COL_DATE: &str = "date";
const COL_RACE: &str = "race";
const COL_MENTAL_ILLNESS: &str = "signs_of_mental_illness";
const COL_STATE: &str = "state";

/// Required columns in the poverty table.
const COL_AREA: &str = "Geographic Area";
const COL_RATE: &str = "poverty_rate";

/// Load the police-involved-deaths table into records.
pub fn load_death_records(
    path: &Path,
    delimiter: char,
    show_progress: bool,
) -> Result<Vec<DeathRecord>, DatasetError> {
    debug!("Loading death records from {}", path.display());
    let table = read_table(path, delimiter)?;

    let date_idx = require_column(&table, COL_DATE, path)?;
    let race_idx = require_column(&table, COL_RACE, path)?;
    let mental_idx = require_column(&table, COL_MENTAL_ILLNESS, path)?;
    let state_idx = require_column(&table, COL_STATE, path)?;

    let progress = row_progress(&table, show_progress);
    let mut records = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        records.push(DeathRecord {
            date: cell(row, date_idx).unwrap_or_default(),
            race: optional(cell(row, race_idx)),
            mental_illness: parse_bool_flag(cell(row, mental_idx).as_deref()),
            state: optional(cell(row, state_idx)),
        });
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    info!(
        "Loaded {} death records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Load the poverty-by-area table into records.
pub fn load_poverty_records(
    path: &Path,
    delimiter: char,
    show_progress: bool,
) -> Result<Vec<PovertyRecord>, DatasetError> {
    debug!("Loading poverty records from {}", path.display());
    let table = read_table(path, delimiter)?;

    let area_idx = require_column(&table, COL_AREA, path)?;
    let rate_idx = require_column(&table, COL_RATE, path)?;

    let progress = row_progress(&table, show_progress);
    let mut records = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        records.push(PovertyRecord {
            area: optional(cell(row, area_idx)),
            rate: cell(row, rate_idx).unwrap_or_default(),
        });
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    info!(
        "Loaded {} poverty records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

fn require_column(table: &CsvTable, name: &str, path: &Path) -> Result<usize, DatasetError> {
    table.column(name).ok_or_else(|| DatasetError::MissingColumn {
        path: path.display().to_string(),
        column: name.to_string(),
    })
}

fn row_progress(table: &CsvTable, show_progress: bool) -> Option<ProgressBar> {
    if !show_progress {
        return None;
    }
    let pb = ProgressBar::new(table.rows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} rows")
            .unwrap()
            .progress_chars("#>-"),
    );
    Some(pb)
}

/// Trimmed cell text, or `None` when the row is shorter than the header.
fn cell(row: &[String], idx: usize) -> Option<String> {
    row.get(idx).map(|value| value.trim().to_string())
}

/// Empty cells count as missing.
fn optional(cell: Option<String>) -> Option<String> {
    cell.filter(|value| !value.is_empty())
}

/// Parse a True/False flag cell, case-insensitively. Anything else is
/// treated as missing.
fn parse_bool_flag(cell: Option<&str>) -> Option<bool> {
    let value = cell?;
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
