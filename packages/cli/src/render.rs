//! Plain-text rendering of the session view.

use std::fmt::Write as _;

use resas_chart_chart::{ChartSeries, ChartView, MergedRow, RegionGroup, format_value, tooltip};
use resas_chart_population_models::PopulationCategory;
use resas_chart_session::SessionView;

pub const NO_SELECTION_MESSAGE: &str = "Select a prefecture to display its population trend.";
pub const NO_DATA_MESSAGE: &str = "No population data is available for the selected prefectures.";

const YEAR_WIDTH: usize = 6;
const MIN_COLUMN_WIDTH: usize = 12;

/// Renders the whole view for `category`.
pub fn view(view: &SessionView, category: PopulationCategory) -> String {
    match view {
        SessionView::Loading => "Loading prefectures...".to_string(),
        SessionView::Failed(message) => format!("Error: {message}"),
        SessionView::Ready(ChartView::NoSelection) => NO_SELECTION_MESSAGE.to_string(),
        SessionView::Ready(ChartView::NoData) => NO_DATA_MESSAGE.to_string(),
        SessionView::Ready(ChartView::Chart { series, table }) => {
            let mut out = String::new();
            writeln!(out, "{} ({})", category.label_ja(), category.label()).unwrap();
            writeln!(out).unwrap();
            out.push_str(&legend(series));
            writeln!(out).unwrap();
            out.push_str(&table_text(series, table.rows()));
            out
        }
    }
}

/// One legend line per series, in display order.
pub fn legend(series: &[ChartSeries]) -> String {
    let mut out = String::new();
    for s in series {
        writeln!(out, "  {:>2}. {} [{}] {}", s.display_index + 1, s.name, s.code, s.color()).unwrap();
    }
    out
}

/// Year column followed by one right-aligned column per series.
pub fn table_text(series: &[ChartSeries], rows: &[MergedRow]) -> String {
    let widths: Vec<usize> = series
        .iter()
        .map(|s| display_width(&s.name).max(MIN_COLUMN_WIDTH))
        .collect();

    let mut out = String::new();
    write!(out, "{:<width$}", "Year", width = YEAR_WIDTH).unwrap();
    for (s, &width) in series.iter().zip(&widths) {
        let pad = width.saturating_sub(display_width(&s.name));
        write!(out, " {}{}", " ".repeat(pad), s.name).unwrap();
    }
    out.push('\n');

    for row in rows {
        write!(out, "{:<width$}", row.year, width = YEAR_WIDTH).unwrap();
        for (s, &width) in series.iter().zip(&widths) {
            let cell = row.value(s.code).map_or_else(|| "-".to_string(), format_value);
            write!(out, " {cell:>width$}").unwrap();
        }
        out.push('\n');
    }
    out
}

/// Tooltip for one year, largest value first, with each series' color.
pub fn tooltip_text(row: &MergedRow, series: &[ChartSeries]) -> String {
    let mut out = String::new();
    writeln!(out, "Year: {}", row.year).unwrap();
    for entry in tooltip(row, series) {
        let value = entry.value.map_or_else(|| "-".to_string(), format_value);
        writeln!(out, "  {} [{}]: {value}", entry.name, entry.color()).unwrap();
    }
    out
}

/// Prefectures grouped under their region headings.
pub fn directory(groups: &[RegionGroup]) -> String {
    let mut out = String::new();
    for group in groups {
        writeln!(out, "{} ({})", group.name, group.english_name).unwrap();
        for p in &group.prefectures {
            writeln!(out, "  {:>2} {}", p.code, p.name).unwrap();
        }
    }
    out
}

/// Terminal column width, counting CJK characters as two columns.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| if c.is_ascii() { 1 } else { 2 })
        .sum()
}
