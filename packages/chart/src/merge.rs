//! Display ordering and year-aligned merging of per-prefecture series.
//!
//! ## Merge shape
//!
//! Each selected prefecture contributes one column. Rows are keyed by year
//! and hold only the columns that have an observation for that year, so an
//! absent key means "no data" rather than zero:
//!
//! | year | 13 | 27 |
//! |------|----|----|
//! | 2000 | v  |    |
//! | 2005 | v  | v  |
//! | 2010 |    | v  |

use std::collections::BTreeMap;

use resas_chart_population_models::{SeriesPoint, SeriesStore};
use resas_chart_region_models::{PrefCode, RegionIndex};
use serde::Serialize;

/// Orders `selection` by canonical region position.
///
/// The result holds exactly the input codes, reordered. Codes absent from
/// `index` have no position; they sort ahead of every known code and keep
/// their relative input order.
#[must_use]
pub fn build_display_order(
    selection: impl IntoIterator<Item = PrefCode>,
    index: &RegionIndex,
) -> Vec<PrefCode> {
    let mut ordered: Vec<PrefCode> = selection.into_iter().collect();
    ordered.sort_by_key(|&code| index.position(code));
    ordered
}

/// One year of the merged table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRow {
    /// Calendar year.
    pub year: i32,
    /// Value per prefecture code. Missing codes have no observation for
    /// this year.
    #[serde(flatten)]
    pub values: BTreeMap<PrefCode, i64>,
}

impl MergedRow {
    /// Value for `code` in this row.
    #[must_use]
    pub fn value(&self, code: PrefCode) -> Option<i64> {
        self.values.get(&code).copied()
    }
}

/// Year-aligned pivot of several prefectures' series, sorted by year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MergedTable {
    rows: Vec<MergedRow>,
}

impl MergedTable {
    /// Rows in ascending year order.
    #[must_use]
    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    /// Returns `true` if no prefecture contributed any observation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct years.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Projects one prefecture's column back into a series, skipping years
    /// where it has no value.
    #[must_use]
    pub fn column(&self, code: PrefCode) -> Vec<SeriesPoint> {
        self.rows
            .iter()
            .filter_map(|row| row.value(code).map(|value| SeriesPoint { year: row.year, value }))
            .collect()
    }
}

/// Folds the stored series of every code in `ordered` into one table.
///
/// Codes without a stored series contribute nothing. If a series repeats a
/// year, the later point wins. Output is empty when `ordered` is empty or
/// none of its codes has data yet.
#[must_use]
pub fn merge_series(ordered: &[PrefCode], store: &SeriesStore) -> MergedTable {
    let mut by_year: BTreeMap<i32, MergedRow> = BTreeMap::new();

    for &code in ordered {
        let Some(series) = store.get(code) else {
            continue;
        };
        for point in series {
            by_year
                .entry(point.year)
                .or_insert_with(|| MergedRow {
                    year: point.year,
                    values: BTreeMap::new(),
                })
                .values
                .insert(code, point.value);
        }
    }

    log::trace!(
        "Merged {} prefectures into {} year rows",
        ordered.len(),
        by_year.len()
    );

    MergedTable {
        rows: by_year.into_values().collect(),
    }
}
