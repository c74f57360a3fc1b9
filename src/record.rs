//! Record: the fixed cached value type with a (key, id) composite identity.

use core::fmt;

/// Smallest id a record may carry.
pub const MIN_ID: u32 = 100_001;
/// Largest id a record may carry.
pub const MAX_ID: u32 = 999_999;

/// A cached entry. Identity is the pair of `key` and `id`; two records are
/// equal iff both fields match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    key: String,
    id: u32,
}

impl Record {
    pub fn new(key: impl Into<String>, id: u32) -> Self {
        Record {
            key: key.into(),
            id,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Whether the id lies within `[MIN_ID, MAX_ID]`. Insertion rejects
    /// records for which this is false.
    pub fn id_in_range(&self) -> bool {
        (MIN_ID..=MAX_ID).contains(&self.id)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (ID {})", self.key, self.id)
    }
}
