//! Row selection state.
//!
//! # Responsibility
//! - Track which artwork ids are selected for the current session.
//! - Provide the grow-only `select` used by bulk walks and the flipping
//!   `toggle` used by per-row checkboxes.
//!
//! # Invariants
//! - An id missing from the map is unselected.
//! - `select` never turns a `true` entry into `false`.

use crate::model::artwork::ArtworkId;
use std::collections::BTreeMap;

/// Mapping from artwork id to selected flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    entries: BTreeMap<ArtworkId, bool>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set with every given id selected.
    pub fn from_selected(ids: impl IntoIterator<Item = ArtworkId>) -> Self {
        Self {
            entries: ids.into_iter().map(|id| (id, true)).collect(),
        }
    }

    pub fn is_selected(&self, id: ArtworkId) -> bool {
        self.entries.get(&id).copied().unwrap_or(false)
    }

    /// Marks `id` selected.
    ///
    /// Returns `true` only when the id was not selected before.
    pub fn select(&mut self, id: ArtworkId) -> bool {
        let slot = self.entries.entry(id).or_insert(false);
        if *slot {
            return false;
        }
        *slot = true;
        true
    }

    /// Flips the selected flag for `id` and returns the new value.
    pub fn toggle(&mut self, id: ArtworkId) -> bool {
        let slot = self.entries.entry(id).or_insert(false);
        *slot = !*slot;
        *slot
    }

    /// Number of ids currently flagged `true`.
    pub fn selected_count(&self) -> usize {
        self.entries.values().filter(|selected| **selected).count()
    }

    /// Selected ids in ascending order.
    pub fn selected_ids(&self) -> Vec<ArtworkId> {
        self.entries
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns whether every id selected in `other` is selected here.
    pub fn is_superset_of(&self, other: &SelectionSet) -> bool {
        other
            .entries
            .iter()
            .filter(|(_, selected)| **selected)
            .all(|(id, _)| self.is_selected(*id))
    }

    pub fn contains_all(&self, ids: &[ArtworkId]) -> bool {
        ids.iter().all(|id| self.is_selected(*id))
    }

    pub fn is_empty(&self) -> bool {
        self.selected_count() == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
