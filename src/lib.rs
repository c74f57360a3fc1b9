//! rehash-cache: a single-threaded, open-addressing cache of fixed-identity
//! records that resizes itself incrementally instead of stopping the world.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep every insert/remove/find cheap and bounded by spreading the
//!   cost of a table resize across the operations that follow it, in safe,
//!   separately-testable layers.
//! - Layers:
//!   - Table (`table`): structural layer; a prime-capacity slot array with
//!     quadratic probing, tombstone deletion, and transition-exact
//!     size/tombstone counters. Knows nothing about policy.
//!   - HashStore (`store`): policy layer; owns the primary table plus an
//!     optional outgoing (migrating) table, applies the load-factor and
//!     tombstone-ratio triggers, and advances the drain cursor one bounded
//!     batch per triggering operation.
//!
//! Constraints
//! - Single-threaded, synchronous: every operation runs to completion; there
//!   is no background migration worker. A lookup always observes all prior
//!   completed mutations.
//! - The key hash function is injected at construction (`Fn(&str) -> u64`),
//!   deterministic and pure; no global hash state.
//! - Probe loops are bounded by a full cycle of `capacity` attempts, so they
//!   terminate even under degenerate hash functions.
//! - Capacities are always primes within `[MIN_PRIME, MAX_PRIME]`; sizing
//!   degrades to the ceiling prime rather than failing.
//!
//! Migration protocol
//! - An insert that pushes the load factor past 0.5, or a removal that
//!   pushes the tombstone ratio past 0.8, swaps the primary out for a fresh
//!   table of the next prime at or above four times the old capacity. The
//!   old table becomes the migrating table, consulted first by lookups and
//!   removals and drained a quarter at a time by subsequent operations.
//! - Restarting while a drain is in flight flushes the outgoing table first;
//!   a migration never discards undrained records.
//!
//! Inherited probe semantics (deliberate, see the method docs)
//! - Insert checks for duplicates at the home slot only.
//! - Find matches on the numeric id alone while probing.
//!
//! Reentrancy
//! - The hash function is user code that runs inside probe loops. In debug
//!   builds a per-store flag panics on reentrant calls into the store; in
//!   release builds the check is a no-op.

mod prime;
mod record;
mod reentrancy;
mod store;
mod store_proptest;
mod table;

// Public surface
pub use prime::{MAX_PRIME, MIN_PRIME};
pub use record::{Record, MAX_ID, MIN_ID};
pub use store::{HashStore, InsertError, MAX_LOAD_FACTOR, MAX_TOMBSTONE_RATIO};
