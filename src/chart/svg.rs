//! Hand-built SVG chart documents.
//!
//! Three chart shapes cover all five views: a vertical bar chart, a
//! stacked vertical bar chart with a legend, and a scatter plot. Each
//! renderer returns a complete standalone SVG document as a string.
//!
//! Series colors carry the palette the views have always used: sky-blue
//! monthly bars, red poverty bars, blue scatter points, a light-blue and
//! orange pair for the mental-illness stack and a qualitative palette for
//! race.

use crate::config::ChartConfig;
use crate::models::{ScatterSeries, StackedSeries, View, ViewData};

/// Qualitative palette for the race stack, cycled when labels outnumber it.
const RACE_PALETTE: [&str; 8] = [
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3",
];

/// Mental-illness stack: False, True, then the missing-value bucket.
const MENTAL_ILLNESS_PALETTE: [&str; 3] = ["lightblue", "orange", "#b3b3b3"];

const MARGIN_TOP: f64 = 56.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 96.0;
const LEGEND_WIDTH: f64 = 190.0;

/// Render a computed series as an SVG document.
pub fn render_view(view: View, data: &ViewData, config: &ChartConfig) -> String {
    match data {
        ViewData::Monthly(series) => {
            if series.is_empty() {
                return empty_chart(view, config);
            }
            let categories: Vec<String> =
                series.buckets.iter().map(|b| b.month.to_string()).collect();
            let values: Vec<f64> = series.buckets.iter().map(|b| b.count as f64).collect();
            bar_chart(view, &categories, &values, &config.monthly_color, config)
        }
        ViewData::Stacked(series) => {
            if series.is_empty() {
                return empty_chart(view, config);
            }
            let palette: &[&str] = match view {
                View::MonthlyDeathsByMentalIllness => &MENTAL_ILLNESS_PALETTE,
                _ => &RACE_PALETTE,
            };
            stacked_bar_chart(view, series, palette, config)
        }
        ViewData::Area(series) => {
            if series.is_empty() {
                return empty_chart(view, config);
            }
            let categories: Vec<String> =
                series.entries.iter().map(|e| e.area.clone()).collect();
            let values: Vec<f64> = series.entries.iter().map(|e| e.rate).collect();
            bar_chart(view, &categories, &values, &config.area_color, config)
        }
        ViewData::Scatter(series) => {
            if series.is_empty() {
                return empty_chart(view, config);
            }
            scatter_chart(view, series, &config.scatter_color, config)
        }
    }
}

/// Plot rectangle inside the document margins.
struct Frame {
    height: f64,
    left: f64,
    top: f64,
    plot_w: f64,
    plot_h: f64,
}

impl Frame {
    fn new(config: &ChartConfig, with_legend: bool) -> Self {
        let width = config.width as f64;
        let height = config.height as f64;
        let right = if with_legend { LEGEND_WIDTH } else { MARGIN_RIGHT };
        Frame {
            height,
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            plot_w: (width - MARGIN_LEFT - right).max(50.0),
            plot_h: (height - MARGIN_TOP - MARGIN_BOTTOM).max(50.0),
        }
    }

    fn bottom(&self) -> f64 {
        self.top + self.plot_h
    }
}

fn bar_chart(
    view: View,
    categories: &[String],
    values: &[f64],
    color: &str,
    config: &ChartConfig,
) -> String {
    let frame = Frame::new(config, false);
    let max_value = values.iter().copied().fold(0.0, f64::max);
    let step = nice_step(max_value, 6);
    let axis_max = tick_ceil(max_value, step);

    let mut doc = open_document(config);
    doc.push_str(&title_text(view.title(), config));
    doc.push_str(&y_axis(&frame, axis_max, step));

    let slot = frame.plot_w / categories.len() as f64;
    let bar_w = slot * 0.8;
    for (i, value) in values.iter().enumerate() {
        let bar_h = value / axis_max * frame.plot_h;
        let x = frame.left + slot * i as f64 + slot * 0.1;
        doc.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
            x,
            frame.bottom() - bar_h,
            bar_w,
            bar_h,
            color
        ));
    }

    doc.push_str(&category_labels(&frame, categories));
    doc.push_str(&axis_lines(&frame));
    doc.push_str(&axis_titles(view, &frame));
    doc.push_str("</svg>\n");
    doc
}

fn stacked_bar_chart(
    view: View,
    series: &StackedSeries,
    palette: &[&str],
    config: &ChartConfig,
) -> String {
    let frame = Frame::new(config, true);
    let max_total = series.max_total() as f64;
    let step = nice_step(max_total, 6);
    let axis_max = tick_ceil(max_total, step);

    let mut doc = open_document(config);
    doc.push_str(&title_text(view.title(), config));
    doc.push_str(&y_axis(&frame, axis_max, step));

    let categories: Vec<String> = series.rows.iter().map(|r| r.month.to_string()).collect();
    let slot = frame.plot_w / series.rows.len() as f64;
    let bar_w = slot * 0.8;

    for (i, row) in series.rows.iter().enumerate() {
        let x = frame.left + slot * i as f64 + slot * 0.1;
        let mut stacked = 0.0;
        for (j, count) in row.counts.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let segment_h = *count as f64 / axis_max * frame.plot_h;
            stacked += segment_h;
            doc.push_str(&format!(
                "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\"/>\n",
                x,
                frame.bottom() - stacked,
                bar_w,
                segment_h,
                palette[j % palette.len()]
            ));
        }
    }

    doc.push_str(&category_labels(&frame, &categories));
    doc.push_str(&legend(&frame, &series.legend, &series.labels, palette));
    doc.push_str(&axis_lines(&frame));
    doc.push_str(&axis_titles(view, &frame));
    doc.push_str("</svg>\n");
    doc
}

fn scatter_chart(view: View, series: &ScatterSeries, color: &str, config: &ChartConfig) -> String {
    let frame = Frame::new(config, false);
    let max_rate = series.points.iter().map(|p| p.rate).fold(0.0, f64::max);
    let max_deaths = series.points.iter().map(|p| p.deaths as f64).fold(0.0, f64::max);
    let x_step = nice_step(max_rate, 8);
    let x_max = tick_ceil(max_rate, x_step);
    let y_step = nice_step(max_deaths, 6);
    let y_max = tick_ceil(max_deaths, y_step);

    let mut doc = open_document(config);
    doc.push_str(&title_text(view.title(), config));
    doc.push_str(&y_axis(&frame, y_max, y_step));
    doc.push_str(&x_axis(&frame, x_max, x_step));

    for point in &series.points {
        let cx = frame.left + point.rate / x_max * frame.plot_w;
        let cy = frame.bottom() - point.deaths as f64 / y_max * frame.plot_h;
        doc.push_str(&format!(
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{}\" fill-opacity=\"0.7\"><title>{}: {} deaths, {:.1}% poverty</title></circle>\n",
            cx,
            cy,
            color,
            xml_escape(&point.state),
            point.deaths,
            point.rate
        ));
    }

    doc.push_str(&axis_lines(&frame));
    doc.push_str(&axis_titles(view, &frame));
    doc.push_str("</svg>\n");
    doc
}

/// Document with a title and a note that nothing was plottable.
fn empty_chart(view: View, config: &ChartConfig) -> String {
    let mut doc = open_document(config);
    doc.push_str(&title_text(view.title(), config));
    doc.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"14\" fill=\"#666\">No usable rows to plot</text>\n",
        config.width as f64 / 2.0,
        config.height as f64 / 2.0
    ));
    doc.push_str("</svg>\n");
    doc
}

fn open_document(config: &ChartConfig) -> String {
    let mut doc = String::new();
    doc.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" height=\"{1}\" viewBox=\"0 0 {0} {1}\" font-family=\"sans-serif\">\n",
        config.width, config.height
    ));
    doc.push_str(&format!(
        "  <rect width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
        config.width, config.height
    ));
    doc
}

fn title_text(title: &str, config: &ChartConfig) -> String {
    format!(
        "  <text x=\"{:.1}\" y=\"30\" text-anchor=\"middle\" font-size=\"16\" font-weight=\"bold\">{}</text>\n",
        config.width as f64 / 2.0,
        xml_escape(title)
    )
}

/// Horizontal grid lines with value labels on the left.
fn y_axis(frame: &Frame, axis_max: f64, step: f64) -> String {
    let ticks = (axis_max / step).round() as usize;
    let mut out = String::new();

    for i in 0..=ticks {
        let value = step * i as f64;
        let y = frame.bottom() - value / axis_max * frame.plot_h;
        out.push_str(&format!(
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#ddd\"/>\n",
            frame.left,
            y,
            frame.left + frame.plot_w,
            y
        ));
        out.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\">{}</text>\n",
            frame.left - 8.0,
            y + 4.0,
            format_tick(value)
        ));
    }

    out
}

/// Vertical grid lines with value labels below, for the numeric x axis.
fn x_axis(frame: &Frame, axis_max: f64, step: f64) -> String {
    let ticks = (axis_max / step).round() as usize;
    let mut out = String::new();

    for i in 0..=ticks {
        let value = step * i as f64;
        let x = frame.left + value / axis_max * frame.plot_w;
        out.push_str(&format!(
            "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#ddd\"/>\n",
            x,
            frame.top,
            x,
            frame.bottom()
        ));
        out.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\">{}</text>\n",
            x,
            frame.bottom() + 16.0,
            format_tick(value)
        ));
    }

    out
}

/// Category labels under the bars, rotated when they would collide.
fn category_labels(frame: &Frame, categories: &[String]) -> String {
    let slot = frame.plot_w / categories.len() as f64;
    let rotate = categories.len() > 8 || categories.iter().any(|c| c.len() > 6);
    let mut out = String::new();

    for (i, label) in categories.iter().enumerate() {
        let cx = frame.left + slot * (i as f64 + 0.5);
        let y = frame.bottom() + 14.0;
        if rotate {
            out.push_str(&format!(
                "  <text x=\"{0:.1}\" y=\"{1:.1}\" font-size=\"10\" text-anchor=\"end\" transform=\"rotate(-90 {0:.1} {1:.1})\">{2}</text>\n",
                cx,
                y,
                xml_escape(label)
            ));
        } else {
            out.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\" text-anchor=\"middle\">{}</text>\n",
                cx,
                y,
                xml_escape(label)
            ));
        }
    }

    out
}

fn legend(frame: &Frame, title: &str, labels: &[String], palette: &[&str]) -> String {
    let x = frame.left + frame.plot_w + 24.0;
    let mut out = String::new();

    out.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" font-weight=\"bold\">{}</text>\n",
        x,
        frame.top + 4.0,
        xml_escape(title)
    ));
    for (i, label) in labels.iter().enumerate() {
        let y = frame.top + 16.0 + i as f64 * 18.0;
        out.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/>\n",
            x,
            y,
            palette[i % palette.len()]
        ));
        out.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>\n",
            x + 18.0,
            y + 10.0,
            xml_escape(label)
        ));
    }

    out
}

fn axis_lines(frame: &Frame) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#333\"/>\n",
        frame.left,
        frame.bottom(),
        frame.left + frame.plot_w,
        frame.bottom()
    ));
    out.push_str(&format!(
        "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#333\"/>\n",
        frame.left,
        frame.top,
        frame.left,
        frame.bottom()
    ));
    out
}

fn axis_titles(view: View, frame: &Frame) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\">{}</text>\n",
        frame.left + frame.plot_w / 2.0,
        frame.height - 10.0,
        xml_escape(view.x_label())
    ));
    let mid = frame.top + frame.plot_h / 2.0;
    out.push_str(&format!(
        "  <text x=\"16\" y=\"{0:.1}\" text-anchor=\"middle\" font-size=\"12\" transform=\"rotate(-90 16 {0:.1})\">{1}</text>\n",
        mid,
        xml_escape(view.y_label())
    ));
    out
}

/// Round a raw per-tick interval up to 1, 2 or 5 times a power of ten.
fn nice_step(max_value: f64, target_ticks: usize) -> f64 {
    if max_value <= 0.0 {
        return 1.0;
    }
    let raw = max_value / target_ticks as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let scaled = raw / magnitude;
    let factor = if scaled <= 1.0 {
        1.0
    } else if scaled <= 2.0 {
        2.0
    } else if scaled <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// Axis maximum: the smallest whole number of steps covering the data.
fn tick_ceil(max_value: f64, step: f64) -> f64 {
    (max_value / step).ceil().max(1.0) * step
}

fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else if (value * 10.0).fract().abs() < 1e-6 {
        format!("{:.1}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AreaRate, AreaSeries, MonthlyBucket, MonthlySeries, ScatterPoint, StackedRow, YearMonth,
    };

    fn month(year: i32, month: u32) -> YearMonth {
        YearMonth { year, month }
    }

    fn monthly_data() -> ViewData {
        ViewData::Monthly(MonthlySeries {
            buckets: vec![
                MonthlyBucket { month: month(2020, 1), count: 12 },
                MonthlyBucket { month: month(2020, 2), count: 7 },
            ],
        })
    }

    #[test]
    fn test_monthly_bar_chart() {
        let svg = render_view(View::MonthlyDeaths, &monthly_data(), &ChartConfig::default());

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert!(svg.contains("Number of Deaths by Police (Monthly)"));
        assert!(svg.contains("skyblue"));
        // Background rect plus one bar per bucket.
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains("2020-01"));
        assert!(svg.contains("Year-Month"));
    }

    #[test]
    fn test_empty_series_renders_placeholder() {
        let data = ViewData::Monthly(MonthlySeries::default());
        let svg = render_view(View::MonthlyDeaths, &data, &ChartConfig::default());

        assert!(svg.contains("No usable rows to plot"));
        assert_eq!(svg.matches("<rect").count(), 1);
    }

    #[test]
    fn test_stacked_chart_legend_and_segments() {
        let data = ViewData::Stacked(StackedSeries {
            legend: "Race".to_string(),
            labels: vec!["Black".to_string(), "White".to_string()],
            rows: vec![
                StackedRow { month: month(2020, 1), counts: vec![3, 5] },
                StackedRow { month: month(2020, 2), counts: vec![0, 2] },
            ],
        });

        let svg = render_view(View::MonthlyDeathsByRace, &data, &ChartConfig::default());

        assert!(svg.contains("Stacked by Race"));
        assert!(svg.contains(">Race</text>"));
        assert!(svg.contains(">Black</text>"));
        // Background + 3 nonzero segments + 2 legend swatches.
        assert_eq!(svg.matches("<rect").count(), 6);
        assert!(svg.contains(RACE_PALETTE[0]));
    }

    #[test]
    fn test_mental_illness_chart_uses_its_palette() {
        let data = ViewData::Stacked(StackedSeries {
            legend: "Signs of Mental Illness".to_string(),
            labels: vec!["False".to_string(), "True".to_string()],
            rows: vec![StackedRow { month: month(2020, 1), counts: vec![4, 2] }],
        });

        let svg = render_view(
            View::MonthlyDeathsByMentalIllness,
            &data,
            &ChartConfig::default(),
        );

        assert!(svg.contains("lightblue"));
        assert!(svg.contains("orange"));
        assert!(svg.contains("Signs of Mental Illness"));
    }

    #[test]
    fn test_area_chart_color_and_labels() {
        let data = ViewData::Area(AreaSeries {
            entries: vec![
                AreaRate { area: "TX".to_string(), rate: 20.0 },
                AreaRate { area: "CA".to_string(), rate: 10.5 },
            ],
        });

        let svg = render_view(View::PovertyByArea, &data, &ChartConfig::default());

        assert!(svg.contains("Average Poverty Rate by Geographic Area"));
        assert!(svg.contains("red"));
        assert!(svg.contains(">TX</text>"));
        assert!(svg.contains("Average Poverty Rate (%)"));
    }

    #[test]
    fn test_scatter_chart_points_and_tooltips() {
        let data = ViewData::Scatter(ScatterSeries {
            points: vec![
                ScatterPoint { state: "CA".to_string(), deaths: 42, rate: 10.5 },
                ScatterPoint { state: "TX".to_string(), deaths: 35, rate: 20.0 },
            ],
        });

        let svg = render_view(View::DeathsVsPoverty, &data, &ChartConfig::default());

        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("<title>CA: 42 deaths, 10.5% poverty</title>"));
        assert!(svg.contains("Poverty Rate (%)"));
        assert!(svg.contains("blue"));
    }

    #[test]
    fn test_nice_step() {
        assert_eq!(nice_step(87.0, 6), 20.0);
        assert_eq!(nice_step(10.0, 6), 2.0);
        assert!((nice_step(4.0, 6) - 1.0).abs() < 1e-9);
        assert_eq!(nice_step(0.0, 6), 1.0);
    }

    #[test]
    fn test_tick_ceil() {
        assert_eq!(tick_ceil(87.0, 20.0), 100.0);
        assert_eq!(tick_ceil(40.0, 20.0), 40.0);
        assert_eq!(tick_ceil(0.0, 1.0), 1.0);
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a<b&c>\"d\""), "a&lt;b&amp;c&gt;&quot;d&quot;");
        assert_eq!(xml_escape("plain"), "plain");
    }
}
