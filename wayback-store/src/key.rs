//! Lookup keys.
//!
//! Key format: `<id decimal>!<version decimal>`, e.g. `4212!3`.
//!
//! `!` never occurs in a decimal integer, so the key is unique per
//! `(id, version)` pair. Lexicographic key order does NOT follow numeric
//! order (`"10!1" < "9!1"`), so the keys only support exact point lookups,
//! never range scans over a version chain.

use std::fmt;

const SEPARATOR: char = '!';

/// Composite key for one entity version within a partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    /// Build the key for `(id, version)`.
    pub fn encode(id: i64, version: i32) -> Self {
        LookupKey(format!("{id}{SEPARATOR}{version}"))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_bytes()
    }
}

impl AsRef<[u8]> for LookupKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
