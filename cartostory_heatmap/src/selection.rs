// Copyright 2026 the Cartostory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use cartostory_topology::RegionId;

/// The regions a user has selected, in the order they were picked.
///
/// Keys are unique. A revision counter bumps whenever the contents change, so
/// observers can detect changes without comparing contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionSelection {
    items: Vec<RegionId>,
    revision: u64,
}

impl RegionSelection {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            revision: 0,
        }
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of selected regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns the selected regions in pick order.
    #[must_use]
    pub fn items(&self) -> &[RegionId] {
        &self.items
    }

    /// Returns `true` if `id` is selected.
    #[must_use]
    pub fn contains(&self, id: &RegionId) -> bool {
        self.items.contains(id)
    }

    /// Returns the revision counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Adds `id` if absent, removes it otherwise.
    ///
    /// Returns `true` if `id` is selected afterwards.
    pub fn toggle(&mut self, id: RegionId) -> bool {
        let selected = match self.items.iter().position(|item| *item == id) {
            Some(idx) => {
                self.items.remove(idx);
                false
            }
            None => {
                self.items.push(id);
                true
            }
        };
        self.bump_revision();
        selected
    }

    /// Deselects everything.
    pub fn clear(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.items.clear();
        self.bump_revision();
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_the_original_state() {
        let mut selection = RegionSelection::new();
        assert!(selection.toggle("A".into()));
        let before = selection.items().to_vec();

        assert!(selection.toggle("B".into()));
        assert_eq!(selection.items(), &[RegionId::from("A"), RegionId::from("B")]);
        assert!(!selection.toggle("B".into()));
        assert_eq!(selection.items(), before.as_slice());
        assert_eq!(selection.revision(), 3);
    }

    #[test]
    fn removal_keeps_pick_order() {
        let mut selection = RegionSelection::new();
        for id in ["A", "B", "C"] {
            selection.toggle(id.into());
        }
        selection.toggle("B".into());
        assert_eq!(selection.items(), &[RegionId::from("A"), RegionId::from("C")]);
        assert!(selection.contains(&"C".into()));
        assert!(!selection.contains(&"B".into()));
    }

    #[test]
    fn clear_bumps_revision_only_on_change() {
        let mut selection = RegionSelection::new();
        selection.clear();
        assert_eq!(selection.revision(), 0);
        selection.toggle("A".into());
        selection.clear();
        assert!(selection.is_empty());
        assert_eq!(selection.revision(), 2);
    }
}
