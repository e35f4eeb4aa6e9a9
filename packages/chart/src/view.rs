//! Chart-ready view derived from selection, stored series, and directory.

use std::collections::BTreeSet;

use resas_chart_population_models::{Prefecture, SeriesStore};
use resas_chart_region_models::{PrefCode, RegionIndex};
use serde::Serialize;

use crate::merge::{MergedRow, MergedTable, build_display_order, merge_series};

/// Hue step between consecutive series, in degrees.
const HUE_STEP: usize = 50;

/// Hue for the series at `display_index`: `(index × 50) mod 360`.
#[must_use]
pub const fn hue(display_index: usize) -> u16 {
    #[allow(clippy::cast_possible_truncation)]
    let h = ((display_index % 360) * HUE_STEP % 360) as u16;
    h
}

/// One rendered line, also used as a legend entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    /// Column key in [`MergedRow::values`].
    pub code: PrefCode,
    /// Prefecture display name.
    pub name: String,
    /// Slot in the ordered selection (drives the color).
    pub display_index: usize,
    /// Line hue in degrees.
    pub hue: u16,
}

impl ChartSeries {
    /// CSS color string for this series.
    #[must_use]
    pub fn color(&self) -> String {
        hsl(self.hue)
    }
}

/// CSS color string for a line hue.
#[must_use]
pub fn hsl(hue: u16) -> String {
    format!("hsl({hue}, 70%, 50%)")
}

/// Builds series for `ordered`, skipping codes missing from `prefectures`.
///
/// Skipped codes still consume a display index, so colors stay tied to the
/// ordered selection rather than to the rendered subset.
#[must_use]
pub fn build_series(ordered: &[PrefCode], prefectures: &[Prefecture]) -> Vec<ChartSeries> {
    ordered
        .iter()
        .enumerate()
        .filter_map(|(display_index, &code)| {
            let Some(prefecture) = prefectures.iter().find(|p| p.code == code) else {
                log::debug!("Selected prefCode={code} is not in the directory; skipping series");
                return None;
            };
            Some(ChartSeries {
                code,
                name: prefecture.name.clone(),
                display_index,
                hue: hue(display_index),
            })
        })
        .collect()
}

/// One line of a hover tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipEntry {
    /// Prefecture code.
    pub code: PrefCode,
    /// Prefecture display name.
    pub name: String,
    /// Line hue in degrees.
    pub hue: u16,
    /// Value for the hovered year, if the prefecture has one.
    pub value: Option<i64>,
}

impl TooltipEntry {
    /// Swatch color, matching the series' legend entry.
    #[must_use]
    pub fn color(&self) -> String {
        hsl(self.hue)
    }
}

/// Tooltip contents for `row`, largest value first.
///
/// Missing values rank as zero. Ties keep legend order.
#[must_use]
pub fn tooltip(row: &MergedRow, series: &[ChartSeries]) -> Vec<TooltipEntry> {
    let mut entries: Vec<TooltipEntry> = series
        .iter()
        .map(|s| TooltipEntry {
            code: s.code,
            name: s.name.clone(),
            hue: s.hue,
            value: row.value(s.code),
        })
        .collect();
    entries.sort_by_key(|e| std::cmp::Reverse(e.value.unwrap_or(0)));
    entries
}

/// What the chart area should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum ChartView {
    /// Nothing selected; prompt the user to pick a prefecture.
    NoSelection,
    /// Selection exists but no selected prefecture has data yet.
    NoData,
    /// Lines to draw, in display order, over the merged table.
    Chart {
        /// Series and legend entries.
        series: Vec<ChartSeries>,
        /// Year-aligned rows.
        table: MergedTable,
    },
}

impl ChartView {
    /// Derives the view for the current state.
    ///
    /// The merge engine is not invoked for an empty selection.
    #[must_use]
    pub fn build(
        selection: &BTreeSet<PrefCode>,
        store: &SeriesStore,
        prefectures: &[Prefecture],
        index: &RegionIndex,
    ) -> Self {
        if selection.is_empty() {
            return Self::NoSelection;
        }

        let ordered = build_display_order(selection.iter().copied(), index);
        let table = merge_series(&ordered, store);
        if table.is_empty() {
            return Self::NoData;
        }

        Self::Chart {
            series: build_series(&ordered, prefectures),
            table,
        }
    }

    /// Rendered series, empty unless this is [`ChartView::Chart`].
    #[must_use]
    pub fn series(&self) -> &[ChartSeries] {
        match self {
            Self::Chart { series, .. } => series,
            Self::NoSelection | Self::NoData => &[],
        }
    }
}

/// Formats `value` with comma thousands separators.
#[must_use]
pub fn format_value(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
