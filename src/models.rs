//! Data models for the chart explorer.
//!
//! This module contains the core data structures used throughout the
//! application: source records as loaded from the two CSV tables, the
//! derived aggregates handed to the renderers, and the selectable views.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One police-involved death incident, as loaded from the deaths table.
///
/// The `date` cell stays raw text: whether it parses is decided per
/// aggregation call, and unparseable rows are dropped there rather than at
/// load time. Absent cells become `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeathRecord {
    /// Raw `date` cell.
    pub date: String,
    /// Race label, if present.
    pub race: Option<String>,
    /// Mental-illness flag, if the cell held a recognizable boolean.
    pub mental_illness: Option<bool>,
    /// State code, if present. Matched against `PovertyRecord::area`.
    pub state: Option<String>,
}

/// One poverty measurement for a geographic area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PovertyRecord {
    /// `Geographic Area` label, if present.
    pub area: Option<String>,
    /// Raw `poverty_rate` cell; parsed as numeric at aggregation time.
    pub rate: String,
}

/// A calendar date truncated to month granularity, used as a grouping key.
///
/// Ordering is chronological, so sorted containers keyed by `YearMonth`
/// iterate in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Truncate a date to its calendar month.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Bucket label for records whose dimension value is absent.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Categorical column used as a secondary grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    Race,
    MentalIllness,
}

impl Dimension {
    /// The label a record falls under for this dimension, if the field is
    /// present. Absent values are bucketed under [`UNKNOWN_LABEL`] by the
    /// aggregation, not dropped.
    pub fn value_of(&self, record: &DeathRecord) -> Option<String> {
        match self {
            Dimension::Race => record.race.clone(),
            Dimension::MentalIllness => record
                .mental_illness
                .map(|flag| if flag { "True" } else { "False" }.to_string()),
        }
    }

    /// Legend title shown next to the stacked charts.
    pub fn legend_title(&self) -> &'static str {
        match self {
            Dimension::Race => "Race",
            Dimension::MentalIllness => "Signs of Mental Illness",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Race => write!(f, "race"),
            Dimension::MentalIllness => write!(f, "mental illness"),
        }
    }
}

/// Death counts bucketed by calendar month, ordered chronologically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlySeries {
    pub buckets: Vec<MonthlyBucket>,
}

/// A single month's death count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub month: YearMonth,
    pub count: u64,
}

impl MonthlySeries {
    /// True when no input row had a parseable date.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of all bucket counts.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Largest single-month count (0 for an empty series).
    pub fn max_count(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Month-by-dimension count grid with explicit zeros for absent combinations.
///
/// `labels` fixes the column order (known labels sorted ascending, the
/// missing-value bucket last); every row carries one count per label, so a
/// label with no occurrences in a month is reported as zero, not omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackedSeries {
    /// Legend title for the stratifying column.
    pub legend: String,
    /// Dimension values in display order.
    pub labels: Vec<String>,
    /// One row per observed month, chronological.
    pub rows: Vec<StackedRow>,
}

/// One month's counts, parallel to [`StackedSeries::labels`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackedRow {
    pub month: YearMonth,
    pub counts: Vec<u64>,
}

impl StackedRow {
    /// Total deaths in this month across all labels.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

impl StackedSeries {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Largest per-month total (0 for an empty grid).
    pub fn max_total(&self) -> u64 {
        self.rows.iter().map(StackedRow::total).max().unwrap_or(0)
    }
}

/// Mean poverty rate per geographic area, sorted descending by rate.
/// Ties keep area-label order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaSeries {
    pub entries: Vec<AreaRate>,
}

/// One area's mean poverty rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaRate {
    pub area: String,
    pub rate: f64,
}

impl AreaSeries {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest mean rate (0.0 for an empty series).
    pub fn max_rate(&self) -> f64 {
        self.entries.iter().map(|e| e.rate).fold(0.0, f64::max)
    }
}

/// Per-state death counts joined with mean poverty rates, ordered by state.
///
/// States without a matching poverty-area entry are absent by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub points: Vec<ScatterPoint>,
}

/// One state's joined (poverty rate, death count) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub state: String,
    pub deaths: u64,
    pub rate: f64,
}

impl ScatterSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A computed aggregate ready for rendering.
#[derive(Debug, Clone)]
pub enum ViewData {
    Monthly(MonthlySeries),
    Stacked(StackedSeries),
    Area(AreaSeries),
    Scatter(ScatterSeries),
}

/// The five selectable chart renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    MonthlyDeaths,
    MonthlyDeathsByRace,
    MonthlyDeathsByMentalIllness,
    PovertyByArea,
    DeathsVsPoverty,
}

impl View {
    /// All views in menu order.
    pub const ALL: [View; 5] = [
        View::MonthlyDeaths,
        View::MonthlyDeathsByRace,
        View::MonthlyDeathsByMentalIllness,
        View::PovertyByArea,
        View::DeathsVsPoverty,
    ];

    /// Menu number (1-5).
    pub fn number(&self) -> u8 {
        match self {
            View::MonthlyDeaths => 1,
            View::MonthlyDeathsByRace => 2,
            View::MonthlyDeathsByMentalIllness => 3,
            View::PovertyByArea => 4,
            View::DeathsVsPoverty => 5,
        }
    }

    /// Resolve a menu number.
    pub fn from_number(n: u8) -> Option<View> {
        View::ALL.iter().copied().find(|view| view.number() == n)
    }

    /// Menu entry wording.
    pub fn menu_label(&self) -> &'static str {
        match self {
            View::MonthlyDeaths => "Visualize Monthly Deaths",
            View::MonthlyDeathsByRace => "Visualize Monthly Deaths by Race",
            View::MonthlyDeathsByMentalIllness => "Visualize Monthly Deaths by Mental Illness",
            View::PovertyByArea => "Visualize Average Poverty Rate by Geographical Area",
            View::DeathsVsPoverty => "Compare Deaths with Poverty Rate by State",
        }
    }

    /// Chart title.
    pub fn title(&self) -> &'static str {
        match self {
            View::MonthlyDeaths => "Number of Deaths by Police (Monthly)",
            View::MonthlyDeathsByRace => "Number of Deaths by Police (Monthly, Stacked by Race)",
            View::MonthlyDeathsByMentalIllness => {
                "Number of Deaths by Police (Monthly, Stacked by Mental Illness)"
            }
            View::PovertyByArea => "Average Poverty Rate by Geographic Area",
            View::DeathsVsPoverty => "Scatter Plot of Deaths vs. Poverty Rate by State",
        }
    }

    /// Horizontal axis title.
    pub fn x_label(&self) -> &'static str {
        match self {
            View::MonthlyDeaths | View::MonthlyDeathsByRace | View::MonthlyDeathsByMentalIllness => {
                "Year-Month"
            }
            View::PovertyByArea => "Geographic Area",
            View::DeathsVsPoverty => "Poverty Rate (%)",
        }
    }

    /// Vertical axis title.
    pub fn y_label(&self) -> &'static str {
        match self {
            View::PovertyByArea => "Average Poverty Rate (%)",
            _ => "Number of Deaths",
        }
    }

    /// Filename stem for rendered artifacts.
    pub fn slug(&self) -> &'static str {
        match self {
            View::MonthlyDeaths => "monthly_deaths",
            View::MonthlyDeathsByRace => "monthly_deaths_by_race",
            View::MonthlyDeathsByMentalIllness => "monthly_deaths_by_mental_illness",
            View::PovertyByArea => "poverty_by_area",
            View::DeathsVsPoverty => "deaths_vs_poverty",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}
