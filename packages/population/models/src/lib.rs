#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Prefecture, population category, and series types.
//!
//! Also holds the serde payload shapes returned by the RESAS provider for
//! the prefecture list and the per-year population composition endpoints.

use std::collections::BTreeMap;

use resas_chart_region_models::PrefCode;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A prefecture as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefecture {
    /// Stable numeric identifier (`1..=47`).
    #[serde(rename = "prefCode")]
    pub code: PrefCode,
    /// Display label (e.g. "東京都").
    #[serde(rename = "prefName")]
    pub name: String,
}

/// One of the four demographic buckets the provider returns per prefecture.
///
/// Exactly one category is active per session; it is never tracked per
/// prefecture.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PopulationCategory {
    /// 総人口
    #[default]
    Total,
    /// 年少人口 (0-14)
    Youth,
    /// 生産年齢人口 (15-64)
    WorkingAge,
    /// 老年人口 (65+)
    Elderly,
}

impl PopulationCategory {
    /// All categories in provider bucket order.
    pub const ALL: &[Self] = &[Self::Total, Self::Youth, Self::WorkingAge, Self::Elderly];

    /// Offset of this category in the provider's `result.data` array.
    #[must_use]
    pub const fn bucket_index(self) -> usize {
        match self {
            Self::Total => 0,
            Self::Youth => 1,
            Self::WorkingAge => 2,
            Self::Elderly => 3,
        }
    }

    /// Japanese label, matching the provider's bucket labels.
    #[must_use]
    pub const fn label_ja(self) -> &'static str {
        match self {
            Self::Total => "総人口",
            Self::Youth => "年少人口",
            Self::WorkingAge => "生産年齢人口",
            Self::Elderly => "老年人口",
        }
    }

    /// English label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Total => "Total population",
            Self::Youth => "Youth population",
            Self::WorkingAge => "Working-age population",
            Self::Elderly => "Elderly population",
        }
    }
}

/// A single `(year, value)` observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Calendar year.
    pub year: i32,
    /// Population count.
    pub value: i64,
}

/// Most recently fetched series per prefecture.
///
/// Entries are overwritten by each successful fetch and only removed by
/// [`SeriesStore::clear`]. Deselecting a prefecture does not evict its
/// entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesStore {
    entries: BTreeMap<PrefCode, Vec<SeriesPoint>>,
}

impl SeriesStore {
    /// Creates an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Replaces the series for `code`, returning the previous one.
    pub fn insert(&mut self, code: PrefCode, series: Vec<SeriesPoint>) -> Option<Vec<SeriesPoint>> {
        self.entries.insert(code, series)
    }

    /// Series for `code`, if one has been fetched.
    #[must_use]
    pub fn get(&self, code: PrefCode) -> Option<&[SeriesPoint]> {
        self.entries.get(&code).map(Vec::as_slice)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of prefectures with a stored series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(PrefCode, Vec<SeriesPoint>)> for SeriesStore {
    fn from_iter<T: IntoIterator<Item = (PrefCode, Vec<SeriesPoint>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Payload of `GET /api/v1/prefectures`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefecturesResponse {
    /// Every prefecture known to the provider.
    pub result: Vec<Prefecture>,
}

/// Payload of `GET /api/v1/population/composition/perYear`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionResponse {
    /// Wrapped composition result.
    pub result: CompositionResult,
}

/// Body of a composition response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionResult {
    /// Last year of measured (non-projected) data, when the provider
    /// includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary_year: Option<i32>,
    /// Category buckets in provider order (total, youth, working-age,
    /// elderly).
    pub data: Vec<CompositionBucket>,
}

/// One category bucket of a composition response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionBucket {
    /// Provider label (e.g. "総人口").
    pub label: String,
    /// Observations for this category.
    pub data: Vec<SeriesPoint>,
}

impl CompositionResponse {
    /// Consumes the response and returns the series for `category`.
    #[must_use]
    pub fn into_series(mut self, category: PopulationCategory) -> Option<Vec<SeriesPoint>> {
        let idx = category.bucket_index();
        if idx < self.result.data.len() {
            Some(self.result.data.swap_remove(idx).data)
        } else {
            None
        }
    }
}
