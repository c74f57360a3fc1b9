//! HashStore: the policy layer over `Table`. Owns the primary table, an
//! optional in-progress migrating table, and the injected hash function;
//! decides when a capacity transition starts and advances it one bounded
//! step per triggering operation.

use crate::prime::{next_prime, normalize_capacity};
use crate::record::Record;
use crate::reentrancy::ReentryCheck;
use crate::table::{Slot, Table};
use core::fmt::Write as _;
use log::{debug, error, trace};

/// Load factor (occupied-or-tombstoned slots / capacity) above which an
/// insert starts a migration to a larger table.
pub const MAX_LOAD_FACTOR: f64 = 0.5;

/// Tombstone ratio (tombstoned / occupied-or-tombstoned slots) above which a
/// removal starts a compacting migration.
pub const MAX_TOMBSTONE_RATIO: f64 = 0.8;

/// Capacity multiplier for the replacement table; the actual new capacity is
/// the next prime at or above `old_capacity * GROWTH_FACTOR`.
const GROWTH_FACTOR: usize = 4;

/// Insertion rejection causes. Lookup and removal misses are not errors;
/// they surface as `None`/`false`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InsertError {
    /// The record's id lies outside `[MIN_ID, MAX_ID]`.
    IdOutOfRange,
    /// An equal record already occupies the home slot. Only the home slot is
    /// inspected; an equal record that landed elsewhere in the probe chain
    /// is not detected (see `HashStore::insert`).
    Duplicate,
    /// A full probe cycle found no free slot. Unreachable while the load
    /// trigger keeps tables sparse; guarded so probing always terminates.
    TableFull,
}

/// An outgoing table being drained into the primary, with a forward cursor
/// marking how far the drain has progressed.
struct Migration {
    table: Table,
    cursor: usize,
}

impl Migration {
    /// Slots moved per drain step: a quarter of the table, so a drain
    /// finishes within four triggering operations.
    fn batch(&self) -> usize {
        self.table.capacity().div_ceil(4)
    }
}

/// An open-addressing cache of `Record`s with incremental rehashing.
///
/// All growth happens as a side effect of `insert`/`remove`: crossing the
/// load-factor or tombstone-ratio threshold swaps the primary table out for
/// a freshly allocated larger one and drains the old table back in, a
/// bounded batch at a time. There is no background worker; while a drain is
/// in progress, lookups and removals consult the outgoing table first.
///
/// `H` is the caller-supplied hash function over record keys. It must be
/// deterministic and pure; distribution quality only affects probe lengths.
pub struct HashStore<H> {
    primary: Table,
    migrating: Option<Migration>,
    hash: H,
    live: usize,
    reentrancy: ReentryCheck,
}

impl<H> HashStore<H>
where
    H: Fn(&str) -> u64,
{
    /// Create a store with a requested capacity and a key hash function.
    /// The capacity is normalized to a prime in `[MIN_PRIME, MAX_PRIME]`:
    /// an in-range prime is kept, anything else is bumped to the next prime,
    /// degrading to the ceiling for oversized requests.
    pub fn new(capacity: usize, hash: H) -> Self {
        HashStore {
            primary: Table::with_capacity(normalize_capacity(capacity)),
            migrating: None,
            hash,
            live: 0,
            reentrancy: ReentryCheck::new(),
        }
    }

    /// Insert a record into the primary table.
    ///
    /// The duplicate check inspects only the computed home slot, so an equal
    /// record displaced by earlier collisions is not rejected; this
    /// reproduces the behavior callers of the original implementation
    /// depend on. Uniqueness beyond the home slot is the caller's business.
    pub fn insert(&mut self, record: Record) -> Result<(), InsertError> {
        let _g = self.reentrancy.enter();
        if !record.id_in_range() {
            return Err(InsertError::IdOutOfRange);
        }
        let home = self.primary.home((self.hash)(record.key()));
        if matches!(&self.primary.slots()[home], Slot::Occupied(existing) if *existing == record)
        {
            return Err(InsertError::Duplicate);
        }
        if self.primary.place(home, record).is_none() {
            return Err(InsertError::TableFull);
        }
        self.live += 1;
        // The policy phase below takes `&mut self`; the entry guard's borrow
        // must end first.
        drop(_g);

        if self.primary.load_factor() > MAX_LOAD_FACTOR {
            self.begin_migration();
        } else if self.migrating.is_some() {
            self.drain_step();
        }
        Ok(())
    }

    /// Remove a record by full identity, tombstoning it where found.
    ///
    /// Both tables are searched unconditionally, the migrating one first;
    /// the removal succeeds if either table held a match. A miss returns
    /// `false` without advancing the migration.
    pub fn remove(&mut self, record: &Record) -> bool {
        let _g = self.reentrancy.enter();
        let mut hits = 0;
        if let Some(mig) = self.migrating.as_mut() {
            let home = mig.table.home((self.hash)(record.key()));
            if mig.table.tombstone_match(home, record) {
                hits += 1;
            }
        }
        let home = self.primary.home((self.hash)(record.key()));
        if self.primary.tombstone_match(home, record) {
            hits += 1;
        }
        if hits == 0 {
            return false;
        }
        self.live -= hits;
        drop(_g);

        if self.primary.tombstone_ratio() > MAX_TOMBSTONE_RATIO {
            self.begin_migration();
        } else if self.migrating.is_some() {
            self.drain_step();
        }
        true
    }

    /// Point lookup by key and id, migrating table first.
    ///
    /// Probing matches on the numeric id alone: a key that hashes to a chain
    /// containing some record with the requested id will return that record
    /// even if its key differs. This reproduces the original lookup
    /// semantics; callers keep ids unique when they need exact identity.
    pub fn find(&self, key: &str, id: u32) -> Option<&Record> {
        let _g = self.reentrancy.enter();
        if let Some(mig) = &self.migrating {
            let home = mig.table.home((self.hash)(key));
            if let Some(found) = mig.table.probe_id(home, id) {
                return Some(found);
            }
        }
        let home = self.primary.home((self.hash)(key));
        self.primary.probe_id(home, id)
    }

    /// Live (inserted and not removed) records across both tables.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Capacity of the primary table.
    pub fn capacity(&self) -> usize {
        self.primary.capacity()
    }

    /// Whether a capacity transition is currently in progress.
    pub fn is_migrating(&self) -> bool {
        self.migrating.is_some()
    }

    /// Load factor of the primary table.
    pub fn load_factor(&self) -> f64 {
        self.primary.load_factor()
    }

    /// Tombstone ratio of the primary table.
    pub fn tombstone_ratio(&self) -> f64 {
        self.primary.tombstone_ratio()
    }

    /// Render every slot of both tables, one line per slot.
    pub fn dump(&self) -> String {
        let _g = self.reentrancy.enter();
        let mut out = String::new();
        let _ = writeln!(out, "primary table ({} slots):", self.primary.capacity());
        dump_table(&mut out, &self.primary);
        if let Some(mig) = &self.migrating {
            let _ = writeln!(
                out,
                "migrating table ({} slots, cursor {}):",
                mig.table.capacity(),
                mig.cursor
            );
            dump_table(&mut out, &mig.table);
        }
        out
    }

    /// Swap the primary out for a larger fresh table and begin draining it.
    ///
    /// If a previous migration is still in flight its remaining records are
    /// flushed into the current primary first, so a restart never loses
    /// entries. The outgoing table keeps its counters frozen for the rest of
    /// its drain.
    fn begin_migration(&mut self) {
        if self.migrating.is_some() {
            self.flush_migration();
        }
        let old_capacity = self.primary.capacity();
        let new_capacity = next_prime(old_capacity.saturating_mul(GROWTH_FACTOR));
        debug!(
            "starting migration: {old_capacity} -> {new_capacity} slots \
             ({} used, {} live, tombstone ratio {:.3})",
            self.primary.size(),
            self.primary.occupied(),
            self.primary.tombstone_ratio()
        );
        let outgoing = core::mem::replace(&mut self.primary, Table::with_capacity(new_capacity));
        self.migrating = Some(Migration {
            table: outgoing,
            cursor: 0,
        });
    }

    /// Move one batch of slots out of the migrating table. Occupied slots are
    /// re-placed into the primary through the normal placement probe, without
    /// re-evaluating migration policy; tombstones are simply cleared. Once
    /// the cursor passes the end, the outgoing table is dropped.
    fn drain_step(&mut self) {
        let Some(mig) = self.migrating.as_mut() else {
            return;
        };
        let hash = &self.hash;
        let primary = &mut self.primary;
        let live = &mut self.live;
        let end = (mig.cursor + mig.batch()).min(mig.table.capacity());
        trace!("drain step: slots {}..{}", mig.cursor, end);
        while mig.cursor < end {
            if let Slot::Occupied(record) = mig.table.take_for_drain(mig.cursor) {
                let home = primary.home(hash(record.key()));
                if primary.place(home, record).is_none() {
                    // Guarded but unreachable: the primary is at least four
                    // times the outgoing table and below the load limit.
                    error!("drain found no free primary slot; record dropped");
                    *live -= 1;
                }
            }
            mig.cursor += 1;
        }
        if mig.cursor >= mig.table.capacity() {
            debug!(
                "migration complete: {} slots drained",
                mig.table.capacity()
            );
            self.migrating = None;
        }
    }

    /// Exhaustively drain the in-flight migrating table before a restart
    /// replaces it. Runs at most once per `begin_migration`.
    fn flush_migration(&mut self) {
        let Some(mut mig) = self.migrating.take() else {
            return;
        };
        let hash = &self.hash;
        let primary = &mut self.primary;
        let live = &mut self.live;
        trace!(
            "flushing in-flight migration: {} slots left",
            mig.table.capacity() - mig.cursor
        );
        while mig.cursor < mig.table.capacity() {
            if let Slot::Occupied(record) = mig.table.take_for_drain(mig.cursor) {
                let home = primary.home(hash(record.key()));
                if primary.place(home, record).is_none() {
                    error!("flush found no free primary slot; record dropped");
                    *live -= 1;
                }
            }
            mig.cursor += 1;
        }
    }
}

fn dump_table(out: &mut String, table: &Table) {
    for (i, slot) in table.slots().iter().enumerate() {
        match slot {
            Slot::Empty => {
                let _ = writeln!(out, "[{i}] :");
            }
            Slot::Tombstone => {
                let _ = writeln!(out, "[{i}] : <deleted>");
            }
            Slot::Occupied(record) => {
                let _ = writeln!(out, "[{i}] : {record}");
            }
        }
    }
}
