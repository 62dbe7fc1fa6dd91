//! Client mirror of the vessel list stored on the device.
//!
//! DESIGN
//! ======
//! The device is authoritative. The mirror is replaced wholesale on every
//! snapshot and never edited locally, so an index is only meaningful until
//! the next snapshot lands. `rev` lets observers notice a fresh snapshot even
//! when its contents are unchanged.

#[cfg(test)]
#[path = "vessels_test.rs"]
mod vessels_test;

use filascale_frames::Vessel;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VesselRegistry {
    items: Vec<Vessel>,
    /// Bumped on every snapshot.
    pub rev: u64,
}

impl VesselRegistry {
    /// Replace the whole list with a server snapshot.
    pub fn replace(&mut self, snapshot: Vec<Vessel>) {
        self.items = snapshot;
        self.rev += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Vessel> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vessel> {
        self.items.iter()
    }

    /// True when `index` addresses a vessel in the current snapshot.
    #[must_use]
    pub fn contains_index(&self, index: usize) -> bool {
        index < self.items.len()
    }

    /// Index to highlight for a device selection, if it falls inside the list.
    #[must_use]
    pub fn highlighted(&self, selected: Option<usize>) -> Option<usize> {
        selected.filter(|index| self.contains_index(*index))
    }
}
