//! Terminal chart rendering.
//!
//! Bar views render as proportional block rows, stacked views as an
//! aligned count grid, the scatter join as an aligned table. Output goes
//! to stdout, so everything here is plain UTF-8 text.

use crate::models::{AreaSeries, MonthlySeries, ScatterSeries, StackedSeries, View, ViewData};

/// Widest bar, in block characters.
const BAR_WIDTH: usize = 40;

/// Render a computed series as terminal text.
pub fn render_view(view: View, data: &ViewData) -> String {
    match data {
        ViewData::Monthly(series) => monthly_chart(view, series),
        ViewData::Stacked(series) => stacked_table(view, series),
        ViewData::Area(series) => area_chart(view, series),
        ViewData::Scatter(series) => scatter_table(view, series),
    }
}

fn monthly_chart(view: View, series: &MonthlySeries) -> String {
    if series.is_empty() {
        return empty_note(view);
    }

    let mut out = header(view);
    let max = series.max_count().max(1) as f64;

    for bucket in &series.buckets {
        out.push_str(&format!(
            "{} | {} {}\n",
            bucket.month,
            bar(bucket.count as f64, max),
            bucket.count
        ));
    }

    out
}

fn area_chart(view: View, series: &AreaSeries) -> String {
    if series.is_empty() {
        return empty_note(view);
    }

    let mut out = header(view);
    let max = series.max_rate();
    let max = if max > 0.0 { max } else { 1.0 };
    let label_w = series
        .entries
        .iter()
        .map(|e| e.area.len())
        .max()
        .unwrap_or(0);

    for entry in &series.entries {
        out.push_str(&format!(
            "{:<width$} | {} {:.2}\n",
            entry.area,
            bar(entry.rate, max),
            entry.rate,
            width = label_w
        ));
    }

    out
}

fn stacked_table(view: View, series: &StackedSeries) -> String {
    if series.is_empty() {
        return empty_note(view);
    }

    let mut out = header(view);

    let month_w = "Month".len().max(7);
    let mut widths: Vec<usize> = series.labels.iter().map(|l| l.len()).collect();
    for row in &series.rows {
        for (j, count) in row.counts.iter().enumerate() {
            widths[j] = widths[j].max(count.to_string().len());
        }
    }
    let total_w = "Total".len().max(
        series
            .rows
            .iter()
            .map(|r| r.total().to_string().len())
            .max()
            .unwrap_or(0),
    );

    out.push_str(&format!("{:<width$}", "Month", width = month_w));
    for (label, w) in series.labels.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", label, width = *w));
    }
    out.push_str(&format!("  {:>width$}\n", "Total", width = total_w));

    for row in &series.rows {
        out.push_str(&format!(
            "{:<width$}",
            row.month.to_string(),
            width = month_w
        ));
        for (count, w) in row.counts.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", count, width = *w));
        }
        out.push_str(&format!("  {:>width$}\n", row.total(), width = total_w));
    }

    out
}

fn scatter_table(view: View, series: &ScatterSeries) -> String {
    if series.is_empty() {
        return empty_note(view);
    }

    let mut out = header(view);
    let state_w = "State".len().max(
        series
            .points
            .iter()
            .map(|p| p.state.len())
            .max()
            .unwrap_or(0),
    );

    out.push_str(&format!(
        "{:<width$}  {:>16}  {:>6}\n",
        "State",
        "Poverty Rate (%)",
        "Deaths",
        width = state_w
    ));
    for point in &series.points {
        out.push_str(&format!(
            "{:<width$}  {:>16.1}  {:>6}\n",
            point.state,
            point.rate,
            point.deaths,
            width = state_w
        ));
    }

    out
}

fn header(view: View) -> String {
    let title = view.title();
    format!("{}\n{}\n", title, "=".repeat(title.chars().count()))
}

fn empty_note(view: View) -> String {
    format!("{}\n(no data)\n", view.title())
}

fn bar(value: f64, max: f64) -> String {
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    let len = if value > 0.0 { len.max(1) } else { 0 };
    "█".repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AreaRate, MonthlyBucket, ScatterPoint, StackedRow, YearMonth,
    };

    fn month(year: i32, m: u32) -> YearMonth {
        YearMonth { year, month: m }
    }

    #[test]
    fn test_monthly_chart_rows() {
        let data = ViewData::Monthly(MonthlySeries {
            buckets: vec![
                MonthlyBucket { month: month(2020, 1), count: 12 },
                MonthlyBucket { month: month(2020, 2), count: 6 },
            ],
        });

        let text = render_view(View::MonthlyDeaths, &data);

        assert!(text.starts_with("Number of Deaths by Police (Monthly)\n"));
        assert!(text.contains("2020-01 | "));
        assert!(text.contains(" 12\n"));
        // The largest bucket fills the full bar width.
        assert!(text.contains(&"█".repeat(40)));
        assert!(text.contains(&format!("2020-02 | {} 6", "█".repeat(20))));
    }

    #[test]
    fn test_area_chart_aligns_labels() {
        let data = ViewData::Area(AreaSeries {
            entries: vec![
                AreaRate { area: "Texas".to_string(), rate: 20.0 },
                AreaRate { area: "CA".to_string(), rate: 10.0 },
            ],
        });

        let text = render_view(View::PovertyByArea, &data);

        assert!(text.contains("Texas | "));
        assert!(text.contains("CA    | "));
        assert!(text.contains("20.00"));
    }

    #[test]
    fn test_stacked_table_grid() {
        let data = ViewData::Stacked(StackedSeries {
            legend: "Race".to_string(),
            labels: vec!["Black".to_string(), "White".to_string()],
            rows: vec![
                StackedRow { month: month(2020, 1), counts: vec![3, 5] },
                StackedRow { month: month(2020, 2), counts: vec![0, 2] },
            ],
        });

        let text = render_view(View::MonthlyDeathsByRace, &data);

        assert!(text.contains("Month"));
        assert!(text.contains("Black"));
        assert!(text.contains("Total"));
        assert!(text.contains("2020-01"));
        // Zero cells are printed, not blanked.
        assert!(text.contains("2020-02      0      2      2"));
    }

    #[test]
    fn test_scatter_table() {
        let data = ViewData::Scatter(ScatterSeries {
            points: vec![ScatterPoint { state: "CA".to_string(), deaths: 42, rate: 10.5 }],
        });

        let text = render_view(View::DeathsVsPoverty, &data);

        assert!(text.contains("State"));
        assert!(text.contains("Poverty Rate (%)"));
        assert!(text.contains("10.5"));
        assert!(text.contains("42"));
    }

    #[test]
    fn test_empty_series() {
        let data = ViewData::Monthly(MonthlySeries::default());

        let text = render_view(View::MonthlyDeaths, &data);

        assert!(text.contains("(no data)"));
    }
}
