//! Aggregation over the two source tables.
//!
//! Every operation is a pure function of the record slices it is handed:
//! nothing is cached and each call recomputes from scratch. Rows that fail
//! an operation's parse rule are dropped from that aggregate silently,
//! never reported as errors, and empty input yields an empty series.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::models::{
    AreaRate, AreaSeries, DeathRecord, Dimension, MonthlyBucket, MonthlySeries, PovertyRecord,
    ScatterPoint, ScatterSeries, StackedRow, StackedSeries, View, ViewData, YearMonth,
    UNKNOWN_LABEL,
};

/// Date formats accepted in the `date` column, first match wins.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m/%d/%y"];

/// Parse a death record's date cell. `None` marks the row as unusable for
/// monthly bucketing.
pub fn parse_death_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cell, format).ok())
}

/// Parse a poverty rate cell. Non-numeric and non-finite values count as
/// missing.
pub fn parse_poverty_rate(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|rate| rate.is_finite())
}

/// Death counts per calendar month, in chronological order.
pub fn monthly_counts(records: &[DeathRecord]) -> MonthlySeries {
    let mut buckets: BTreeMap<YearMonth, u64> = BTreeMap::new();

    for record in records {
        if let Some(date) = parse_death_date(&record.date) {
            *buckets.entry(YearMonth::from_date(date)).or_insert(0) += 1;
        }
    }

    MonthlySeries {
        buckets: buckets
            .into_iter()
            .map(|(month, count)| MonthlyBucket { month, count })
            .collect(),
    }
}

/// Death counts per (month, dimension value) with explicit zeros.
///
/// Rows with unparseable dates are dropped; rows missing the dimension
/// value land in the `Unknown` bucket, ordered after the known labels.
/// The grid is dense: every returned row carries a count for every label.
pub fn monthly_counts_by_dimension(records: &[DeathRecord], dimension: Dimension) -> StackedSeries {
    let mut grid: BTreeMap<YearMonth, BTreeMap<String, u64>> = BTreeMap::new();
    let mut known: BTreeSet<String> = BTreeSet::new();
    let mut saw_unknown = false;

    for record in records {
        let Some(date) = parse_death_date(&record.date) else {
            continue;
        };
        let label = match dimension.value_of(record) {
            Some(value) => {
                known.insert(value.clone());
                value
            }
            None => {
                saw_unknown = true;
                UNKNOWN_LABEL.to_string()
            }
        };
        *grid.entry(YearMonth::from_date(date))
            .or_default()
            .entry(label)
            .or_insert(0) += 1;
    }

    let mut labels: Vec<String> = known.into_iter().collect();
    // A literal "Unknown" value in the data shares the missing-value bucket.
    if saw_unknown && !labels.iter().any(|label| label == UNKNOWN_LABEL) {
        labels.push(UNKNOWN_LABEL.to_string());
    }

    let rows = grid
        .into_iter()
        .map(|(month, counts)| StackedRow {
            month,
            counts: labels
                .iter()
                .map(|label| counts.get(label).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    StackedSeries {
        legend: dimension.legend_title().to_string(),
        labels,
        rows,
    }
}

/// Mean poverty rate per area, sorted by rate descending.
///
/// Rows with a missing area or an unparseable rate are dropped before
/// averaging; ties keep area-label order.
pub fn average_rate_by_area(records: &[PovertyRecord]) -> AreaSeries {
    let mut entries: Vec<AreaRate> = mean_rate_by_area(records)
        .into_iter()
        .map(|(area, rate)| AreaRate { area, rate })
        .collect();

    // Stable sort keeps the map's alphabetical order within ties.
    entries.sort_by(|a, b| b.rate.partial_cmp(&a.rate).unwrap_or(std::cmp::Ordering::Equal));

    AreaSeries { entries }
}

/// Join per-state death counts with per-area mean poverty rates.
///
/// The death table drives the join: a state appears only when it has at
/// least one death record and a matching poverty area. Unmatched states
/// are dropped silently. Points come back ordered by state label.
pub fn deaths_vs_poverty(records: &[DeathRecord], poverty: &[PovertyRecord]) -> ScatterSeries {
    let rates = mean_rate_by_area(poverty);

    let points = deaths_by_state(records)
        .into_iter()
        .filter_map(|(state, deaths)| {
            rates.get(&state).map(|rate| ScatterPoint {
                rate: *rate,
                state,
                deaths,
            })
        })
        .collect();

    ScatterSeries { points }
}

/// Compute the series behind a view, fresh from the source tables.
pub fn compute_view(view: View, deaths: &[DeathRecord], poverty: &[PovertyRecord]) -> ViewData {
    match view {
        View::MonthlyDeaths => ViewData::Monthly(monthly_counts(deaths)),
        View::MonthlyDeathsByRace => {
            ViewData::Stacked(monthly_counts_by_dimension(deaths, Dimension::Race))
        }
        View::MonthlyDeathsByMentalIllness => {
            ViewData::Stacked(monthly_counts_by_dimension(deaths, Dimension::MentalIllness))
        }
        View::PovertyByArea => ViewData::Area(average_rate_by_area(poverty)),
        View::DeathsVsPoverty => ViewData::Scatter(deaths_vs_poverty(deaths, poverty)),
    }
}

/// Arithmetic mean of the numeric rates per area. Shared by the area
/// ranking and the scatter join so both see identical means.
fn mean_rate_by_area(records: &[PovertyRecord]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, u64)> = BTreeMap::new();

    for record in records {
        let Some(area) = record.area.as_deref() else {
            continue;
        };
        if let Some(rate) = parse_poverty_rate(&record.rate) {
            let entry = sums.entry(area.to_string()).or_insert((0.0, 0));
            entry.0 += rate;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(area, (sum, count))| (area, sum / count as f64))
        .collect()
}

/// Death counts per state, excluding records with a missing state.
fn deaths_by_state(records: &[DeathRecord]) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();

    for record in records {
        if let Some(state) = record.state.as_deref() {
            *counts.entry(state.to_string()).or_insert(0) += 1;
        }
    }

    counts
}
