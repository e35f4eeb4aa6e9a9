#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Series merge engine and chart model.
//!
//! [`merge`] turns independent per-prefecture `(year, value)` series into a
//! single year-aligned table and orders selections by region. [`view`]
//! derives what a renderer needs from that table: line colors, legend
//! entries, tooltip ordering, and the empty/no-data states. [`checklist`]
//! groups the prefecture directory by region for selection lists.

pub mod checklist;
pub mod merge;
pub mod view;

pub use checklist::{RegionGroup, group_by_region};
pub use merge::{MergedRow, MergedTable, build_display_order, merge_series};
pub use view::{
    ChartSeries, ChartView, TooltipEntry, build_series, format_value, hsl, hue, tooltip,
};
