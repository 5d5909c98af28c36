//! xxHash-based row content hashing.
//!
//! Content hashes are deterministic 64-bit identities computed from a
//! record's column names and values. [`Records::drop_duplicates`] uses
//! them to prefilter candidate duplicates before confirming with an
//! exact comparison.
//!
//! [`Records::drop_duplicates`]: crate::Records::drop_duplicates

use xxhash_rust::xxh64::xxh64;

use crate::record::Record;

// Fixed seed for deterministic hashing across processes.
const SEED: u64 = 0x517cc1b727220a95;

/// Compute a 64-bit content hash of a record.
///
/// Column name and value pairs are fed in map order with separator
/// bytes, so records with the same content hash identically regardless
/// of insertion order. Equal hashes do not imply equal records; callers
/// confirm with `==`.
pub fn record_hash(record: &Record) -> u64 {
    let mut buf = Vec::with_capacity(record.len() * 16);
    for (column, value) in record.values() {
        buf.extend_from_slice(column.as_bytes());
        buf.push(0x1F); // unit separator between name and value
        buf.extend_from_slice(&value.to_le_bytes());
        buf.push(0x1E); // record separator between pairs
    }
    xxh64(&buf, SEED)
}
