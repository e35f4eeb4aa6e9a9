#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Japanese region table and canonical prefecture ordering.
//!
//! The eight regions below group all 47 prefectures. Concatenating every
//! region's member codes, in region order then member order, yields the
//! canonical total ordering over prefecture codes. Legends and chart series
//! are always ordered by this sequence, never by selection order.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Numeric prefecture code as issued by the RESAS API (`1..=47`).
pub type PrefCode = u32;

/// Number of prefectures in Japan.
pub const PREFECTURE_COUNT: usize = 47;

/// A fixed grouping of contiguous prefectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Japanese display name (e.g. "関東").
    pub name: &'static str,
    /// Romanized name (e.g. "Kanto").
    pub english_name: &'static str,
    /// Member prefecture codes in display order.
    pub member_codes: &'static [PrefCode],
}

/// All regions in canonical order.
pub const REGIONS: &[Region] = &[
    Region {
        name: "北海道",
        english_name: "Hokkaido",
        member_codes: &[1],
    },
    Region {
        name: "東北",
        english_name: "Tohoku",
        member_codes: &[2, 3, 4, 5, 6, 7],
    },
    Region {
        name: "関東",
        english_name: "Kanto",
        member_codes: &[8, 9, 10, 11, 12, 13, 14],
    },
    Region {
        name: "中部",
        english_name: "Chubu",
        member_codes: &[15, 16, 17, 18, 19, 20, 21, 22, 23],
    },
    Region {
        name: "近畿",
        english_name: "Kinki",
        member_codes: &[24, 25, 26, 27, 28, 29, 30],
    },
    Region {
        name: "中国",
        english_name: "Chugoku",
        member_codes: &[31, 32, 33, 34, 35],
    },
    Region {
        name: "四国",
        english_name: "Shikoku",
        member_codes: &[36, 37, 38, 39],
    },
    Region {
        name: "九州",
        english_name: "Kyushu",
        member_codes: &[40, 41, 42, 43, 44, 45, 46, 47],
    },
];

/// Code → canonical position lookup, built once from a region table.
///
/// Reordering a selection through this index is `O(n log n)` instead of a
/// linear scan of the region table per comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionIndex {
    positions: BTreeMap<PrefCode, usize>,
    regions: BTreeMap<PrefCode, usize>,
}

impl RegionIndex {
    /// Builds an index over an arbitrary region table.
    ///
    /// If a code appears in more than one region, its first occurrence
    /// wins.
    #[must_use]
    pub fn new(regions: &[Region]) -> Self {
        let mut positions = BTreeMap::new();
        let mut owners = BTreeMap::new();
        let mut next = 0;

        for (region_idx, region) in regions.iter().enumerate() {
            for &code in region.member_codes {
                if positions.contains_key(&code) {
                    continue;
                }
                positions.insert(code, next);
                owners.insert(code, region_idx);
                next += 1;
            }
        }

        Self {
            positions,
            regions: owners,
        }
    }

    /// Returns the shared index over [`REGIONS`].
    #[must_use]
    pub fn canonical() -> &'static Self {
        static INDEX: LazyLock<RegionIndex> = LazyLock::new(|| RegionIndex::new(REGIONS));
        &INDEX
    }

    /// Position of `code` in the canonical ordering, or `None` if no region
    /// lists it.
    #[must_use]
    pub fn position(&self, code: PrefCode) -> Option<usize> {
        self.positions.get(&code).copied()
    }

    /// Index into the region table of the region that owns `code`.
    #[must_use]
    pub fn region_index(&self, code: PrefCode) -> Option<usize> {
        self.regions.get(&code).copied()
    }

    /// Number of distinct codes covered by the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the index covers no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Iterates every prefecture code in canonical order.
pub fn canonical_codes() -> impl Iterator<Item = PrefCode> {
    REGIONS
        .iter()
        .flat_map(|region| region.member_codes.iter().copied())
}
