// HashStore integration test suite.
//
// Each test documents what behavior is being verified. The core invariants
// exercised:
// - Round-trip: a successfully inserted record is findable until removed.
// - Rejection: out-of-range ids and home-slot duplicates fail without
//   mutating the store.
// - Growth: crossing load factor 0.5 on insert starts a migration at exactly
//   that insertion; crossing tombstone ratio 0.8 on removal does the same.
// - Amortization: a started migration completes within a bounded number of
//   subsequent operations, with every live record still findable during and
//   after the drain.
// - Inherited probe semantics: lookup matches on id alone while probing.
use rehash_cache::{HashStore, InsertError, Record, MIN_ID};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// The textbook multiply-by-33 string hash used by the original drivers.
fn poly_hash(key: &str) -> u64 {
    key.bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(33).wrapping_add(u64::from(b)))
}

fn std_hash(key: &str) -> u64 {
    let mut h = DefaultHasher::new();
    key.hash(&mut h);
    h.finish()
}

// Test: the canonical small scenario. Capacity request 101 (already prime)
// is kept; three language records round-trip exactly.
#[test]
fn language_records_round_trip() {
    let mut store = HashStore::new(101, poly_hash);
    assert_eq!(store.capacity(), 101);

    store.insert(Record::new("c", 100_001)).unwrap();
    store.insert(Record::new("c++", 200_002)).unwrap();
    store.insert(Record::new("c#", 300_003)).unwrap();

    let found = store.find("c++", 200_002).expect("record present");
    assert_eq!(found, &Record::new("c++", 200_002));
    assert_eq!(store.len(), 3);
}

// Test: round-trip across a load-triggered migration, then removal finality
// for half of the records.
#[test]
fn round_trip_until_removed() {
    let mut store = HashStore::new(101, std_hash);
    let records: Vec<Record> = (0..200)
        .map(|i| Record::new(format!("r{i}"), MIN_ID + i))
        .collect();
    for r in &records {
        store.insert(r.clone()).unwrap();
    }
    for r in &records {
        assert_eq!(store.find(r.key(), r.id()), Some(r));
    }

    for r in &records[..100] {
        assert!(store.remove(r));
    }
    for r in &records[..100] {
        assert!(store.find(r.key(), r.id()).is_none());
    }
    for r in &records[100..] {
        assert_eq!(store.find(r.key(), r.id()), Some(r));
    }
    assert_eq!(store.len(), 100);
}

// Test: inserting the same identity twice fails the second time (the record
// occupies its own home slot) and leaves the size unchanged.
#[test]
fn duplicate_identity_rejected_at_home_slot() {
    let mut store = HashStore::new(101, poly_hash);
    let r = Record::new("prolog", 400_004);
    store.insert(r.clone()).unwrap();
    assert_eq!(store.insert(r), Err(InsertError::Duplicate));
    assert_eq!(store.len(), 1);
}

// Test: ids outside [MIN_ID, MAX_ID] are rejected and the table stays
// untouched.
#[test]
fn out_of_range_ids_rejected() {
    let mut store = HashStore::new(101, poly_hash);
    assert_eq!(
        store.insert(Record::new("below", MIN_ID - 1)),
        Err(InsertError::IdOutOfRange)
    );
    assert_eq!(
        store.insert(Record::new("above", 1_000_000)),
        Err(InsertError::IdOutOfRange)
    );
    assert!(store.is_empty());
    assert!(store.find("below", MIN_ID - 1).is_none());
}

// Test: the migrating table appears at exactly the insertion that pushes the
// load factor past 0.5.
#[test]
fn migration_starts_at_load_threshold() {
    let mut store = HashStore::new(101, std_hash);
    for i in 0..50 {
        store
            .insert(Record::new(format!("k{i}"), MIN_ID + i))
            .unwrap();
        assert!(!store.is_migrating(), "premature migration at record {i}");
    }
    assert!(store.load_factor() < 0.5);

    // 51/101 crosses the threshold.
    store.insert(Record::new("k50", MIN_ID + 50)).unwrap();
    assert!(store.is_migrating());
    assert_eq!(store.capacity(), 409); // next prime >= 4 * 101
}

// Test: the drain is bounded per operation (a quarter of the outgoing table
// per step), so four further inserts finish a minimum-capacity migration.
// Every record stays findable throughout.
#[test]
fn migration_completes_within_four_draining_operations() {
    let mut store = HashStore::new(101, std_hash);
    for i in 0..51 {
        store
            .insert(Record::new(format!("k{i}"), MIN_ID + i))
            .unwrap();
    }
    assert!(store.is_migrating());

    for i in 51..55 {
        store
            .insert(Record::new(format!("k{i}"), MIN_ID + i))
            .unwrap();
        // Mid-drain lookups consult both tables.
        assert!(store.find("k0", MIN_ID).is_some());
    }
    assert!(!store.is_migrating());

    for i in 0..55 {
        let key = format!("k{i}");
        assert_eq!(
            store.find(&key, MIN_ID + i),
            Some(&Record::new(key.clone(), MIN_ID + i))
        );
    }
    assert_eq!(store.len(), 55);
}

// Test: the migrating table appears at exactly the removal that pushes the
// tombstone ratio past 0.8.
#[test]
fn migration_starts_at_tombstone_threshold() {
    let mut store = HashStore::new(101, poly_hash);
    let records: Vec<Record> = (0..6)
        .map(|i| Record::new(format!("t{i}"), MIN_ID + i))
        .collect();
    for r in &records {
        store.insert(r.clone()).unwrap();
    }

    // 4/6 = 0.67 stays under the threshold; 5/6 = 0.83 crosses it.
    for r in &records[..4] {
        assert!(store.remove(r));
        assert!(!store.is_migrating());
    }
    assert!(store.remove(&records[4]));
    assert!(store.is_migrating());

    // The survivor is still reachable mid-migration.
    assert_eq!(store.find("t5", MIN_ID + 5), Some(&records[5]));
    assert_eq!(store.len(), 1);
}

// Test: a successful removal is final; the identity is gone from both
// tables and a repeated removal misses.
#[test]
fn removal_is_final() {
    let mut store = HashStore::new(101, poly_hash);
    let r = Record::new("js", 500_005);
    store.insert(r.clone()).unwrap();
    assert!(store.remove(&r));
    assert!(store.find("js", 500_005).is_none());
    assert!(!store.remove(&r));
    assert!(store.is_empty());
}

// Test: once probing, lookup matches the numeric id alone; a mismatched key
// that lands on the same probe chain still finds the record.
#[test]
fn lookup_matches_by_id_alone() {
    let mut store = HashStore::new(101, |_: &str| 0);
    store.insert(Record::new("abc", 111_111)).unwrap();

    let found = store.find("zzz", 111_111).expect("id matched on the chain");
    assert_eq!(found.key(), "abc");
}
