//! Selected prefectures and the active population category.
//!
//! Pure state: every mutation returns the prefecture codes that now need a
//! fetch, and the caller dispatches them.

use std::collections::BTreeSet;

use resas_chart_population_models::PopulationCategory;
use resas_chart_region_models::PrefCode;

/// The user's current selection and the session-wide category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<PrefCode>,
    category: PopulationCategory,
}

impl SelectionState {
    /// Empty selection, [`PopulationCategory::Total`] active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected codes.
    #[must_use]
    pub const fn selected(&self) -> &BTreeSet<PrefCode> {
        &self.selected
    }

    /// Active category.
    #[must_use]
    pub const fn category(&self) -> PopulationCategory {
        self.category
    }

    /// Returns `true` if `code` is selected.
    #[must_use]
    pub fn is_selected(&self, code: PrefCode) -> bool {
        self.selected.contains(&code)
    }

    /// Removes `code` if selected, adds it otherwise.
    ///
    /// Returns `true` when `code` was added and needs a fetch.
    pub fn toggle(&mut self, code: PrefCode) -> bool {
        if self.selected.remove(&code) {
            false
        } else {
            self.selected.insert(code);
            true
        }
    }

    /// Replaces the selection with `codes`. Every code needs a fetch.
    pub fn select_all(&mut self, codes: impl IntoIterator<Item = PrefCode>) -> Vec<PrefCode> {
        self.selected = codes.into_iter().collect();
        self.selected.iter().copied().collect()
    }

    /// Clears the selection. The category is kept.
    pub fn reset(&mut self) {
        self.selected.clear();
    }

    /// Switches category. Every selected code needs a re-fetch, even when
    /// `category` equals the current one.
    pub fn change_category(&mut self, category: PopulationCategory) -> Vec<PrefCode> {
        self.category = category;
        self.selected.iter().copied().collect()
    }
}
