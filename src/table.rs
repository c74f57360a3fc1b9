//! Structural layer: a fixed-capacity open-addressing table with quadratic
//! probing and tombstone deletion. Policy (growth triggers, migration) lives
//! in `store`; this layer only knows how to place, find, and tombstone
//! records given a precomputed home slot.

use crate::record::Record;

/// One cell of the table. A tagged enum rather than sentinel record values,
/// so probe code matches on state instead of comparing against magic
/// "empty"/"deleted" records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Never occupied, or cleared by a migration drain.
    Empty,
    /// Logically removed. Not a stop for search probes, but a valid
    /// insertion target.
    Tombstone,
    Occupied(Record),
}

/// A single probing table. `size` counts occupied-or-tombstoned slots (the
/// load-factor numerator), `tombstones` counts the tombstoned subset.
#[derive(Debug)]
pub(crate) struct Table {
    slots: Box<[Slot]>,
    size: usize,
    tombstones: usize,
}

impl Table {
    /// `capacity` must already be a normalized prime.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Table {
            slots: vec![Slot::Empty; capacity].into_boxed_slice(),
            size: 0,
            tombstones: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Home slot for a hash value under this table's capacity.
    pub(crate) fn home(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    /// The i-th quadratic probe position: `(home + i^2) mod capacity`.
    /// Squares are taken in u64 so the math holds for any capacity.
    fn probe(&self, home: usize, i: usize) -> usize {
        let cap = self.slots.len() as u64;
        ((home as u64 + (i as u64 * i as u64) % cap) % cap) as usize
    }

    /// Place a record in the first free (empty or tombstoned) slot of the
    /// probe sequence. Returns the slot index, or `None` after a full cycle
    /// of `capacity` probes found no free slot.
    pub(crate) fn place(&mut self, home: usize, record: Record) -> Option<usize> {
        for i in 0..self.slots.len() {
            let idx = self.probe(home, i);
            match self.slots[idx] {
                Slot::Empty => {
                    self.slots[idx] = Slot::Occupied(record);
                    self.size += 1;
                    return Some(idx);
                }
                Slot::Tombstone => {
                    // Reclaim: the slot stays counted in `size`.
                    self.slots[idx] = Slot::Occupied(record);
                    self.tombstones -= 1;
                    return Some(idx);
                }
                Slot::Occupied(_) => {}
            }
        }
        None
    }

    /// Search probe matching on the numeric id alone, bounded by `capacity`
    /// attempts. Empty and tombstoned slots do not stop the probe.
    pub(crate) fn probe_id(&self, home: usize, id: u32) -> Option<&Record> {
        for i in 0..self.slots.len() {
            if let Slot::Occupied(record) = &self.slots[self.probe(home, i)] {
                if record.id() == id {
                    return Some(record);
                }
            }
        }
        None
    }

    /// Search probe matching on full identity; tombstones the first match.
    /// Same bound and no-stop behavior as `probe_id`.
    pub(crate) fn tombstone_match(&mut self, home: usize, target: &Record) -> bool {
        for i in 0..self.slots.len() {
            let idx = self.probe(home, i);
            if matches!(&self.slots[idx], Slot::Occupied(record) if record == target) {
                self.slots[idx] = Slot::Tombstone;
                self.tombstones += 1;
                return true;
            }
        }
        false
    }

    /// Clear a slot during a migration drain, returning its prior contents.
    /// Counters are deliberately untouched: a migrating table keeps its
    /// frozen counts until it is dropped.
    pub(crate) fn take_for_drain(&mut self, idx: usize) -> Slot {
        core::mem::replace(&mut self.slots[idx], Slot::Empty)
    }

    /// Occupied-or-tombstoned slots over capacity.
    pub(crate) fn load_factor(&self) -> f64 {
        self.size as f64 / self.slots.len() as f64
    }

    /// Tombstoned slots over occupied-or-tombstoned slots; 0.0 for an empty
    /// table rather than a division by zero.
    pub(crate) fn tombstone_ratio(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            self.tombstones as f64 / self.size as f64
        }
    }

    /// Live records currently stored (occupied slots).
    pub(crate) fn occupied(&self) -> usize {
        self.size - self.tombstones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(key: &str, id: u32) -> Record {
        Record::new(key, id)
    }

    /// Invariant: a free home slot is taken directly, and collisions follow
    /// the quadratic sequence home, home+1, home+4, home+9, ...
    #[test]
    fn placement_follows_quadratic_sequence() {
        let mut t = Table::with_capacity(101);
        assert_eq!(t.place(0, rec("a", 100_001)), Some(0));
        assert_eq!(t.place(0, rec("b", 100_002)), Some(1));
        assert_eq!(t.place(0, rec("c", 100_003)), Some(4));
        assert_eq!(t.place(0, rec("d", 100_004)), Some(9));
        assert_eq!(t.size(), 4);
    }

    /// Invariant: a tombstone is a valid placement target and is reclaimed
    /// from the tombstone count without growing `size`.
    #[test]
    fn tombstone_is_reclaimed_by_placement() {
        let mut t = Table::with_capacity(101);
        let r = rec("a", 100_001);
        t.place(5, r.clone()).unwrap();
        assert!(t.tombstone_match(5, &r));
        assert_eq!(t.size(), 1);
        assert_eq!(t.occupied(), 0);

        assert_eq!(t.place(5, rec("b", 100_002)), Some(5));
        assert_eq!(t.size(), 1);
        assert_eq!(t.occupied(), 1);
        assert!((t.tombstone_ratio() - 0.0).abs() < f64::EPSILON);
    }

    /// Invariant: search probes pass over empty and tombstoned slots instead
    /// of stopping, so entries placed past a later-deleted slot stay findable.
    #[test]
    fn probe_passes_over_tombstones_and_empties() {
        let mut t = Table::with_capacity(101);
        let a = rec("a", 100_001);
        let b = rec("b", 100_002);
        t.place(7, a.clone()).unwrap(); // slot 7
        t.place(7, b.clone()).unwrap(); // slot 8
        assert!(t.tombstone_match(7, &a));

        // b sits behind a tombstone in its probe chain.
        assert_eq!(t.probe_id(7, 100_002), Some(&b));
        // A home slot that is empty does not end the search either.
        assert_eq!(t.probe_id(7, 100_001), None);
    }

    /// Invariant: the id-only match ignores the key entirely once probing.
    #[test]
    fn probe_matches_by_id_alone() {
        let mut t = Table::with_capacity(101);
        let a = rec("alpha", 100_009);
        t.place(3, a.clone()).unwrap();
        assert_eq!(t.probe_id(3, 100_009), Some(&a));
    }

    /// Invariant: placement terminates after a full probe cycle even when the
    /// reachable slots are all occupied.
    #[test]
    fn placement_is_bounded_when_probe_cycle_is_full() {
        // Capacity 5: the quadratic residues of 5 are {0, 1, 4}, so from
        // home 0 only slots 0, 1, 4 are reachable.
        let mut t = Table::with_capacity(5);
        assert_eq!(t.place(0, rec("a", 100_001)), Some(0));
        assert_eq!(t.place(0, rec("b", 100_002)), Some(1));
        assert_eq!(t.place(0, rec("c", 100_003)), Some(4));
        assert_eq!(t.place(0, rec("d", 100_004)), None);
        assert_eq!(t.size(), 3);
    }

    /// Invariant: removal of an absent identity leaves the table unchanged,
    /// even when a same-id record with a different key is present.
    #[test]
    fn tombstone_requires_full_identity() {
        let mut t = Table::with_capacity(101);
        t.place(2, rec("a", 100_001)).unwrap();
        assert!(!t.tombstone_match(2, &rec("z", 100_001)));
        assert!(!t.tombstone_match(2, &rec("a", 100_002)));
        assert_eq!(t.occupied(), 1);
    }
}
