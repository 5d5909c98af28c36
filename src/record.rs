//! A single trace row: an ordered mapping from column name to a signed
//! 64-bit value.
//!
//! Values carry timestamps, addresses, or identifiers from the
//! instrumented middleware; all are `i64`. Column membership is per-row:
//! a column declared on the owning table may be unset for this row. The
//! set of present columns is always exactly the key set of the value map,
//! so the two can never disagree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One row of a [`Records`](crate::Records) table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, i64>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `column`.
    ///
    /// # Panics
    ///
    /// Panics when the column is unset. Use [`Record::try_get`] when
    /// absence is an expected data shape rather than a caller bug.
    pub fn get(&self, column: &str) -> i64 {
        match self.values.get(column) {
            Some(&value) => value,
            None => panic!("column not present on record: {column}"),
        }
    }

    /// Value of `column`, or `None` when unset.
    pub fn try_get(&self, column: &str) -> Option<i64> {
        self.values.get(column).copied()
    }

    /// Whether `column` is set on this record.
    pub fn has_column(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Insert or overwrite a column value.
    pub fn add(&mut self, column: impl Into<String>, value: i64) {
        self.values.insert(column.into(), value);
    }

    /// Remove the listed columns. Names that are unset are ignored.
    pub fn drop_columns(&mut self, columns: &[&str]) {
        for column in columns {
            self.values.remove(*column);
        }
    }

    /// Rename `old` to `new`, preserving the value.
    ///
    /// No-op when `old` is unset; an existing value under `new` is
    /// overwritten.
    pub fn rename_column(&mut self, old: &str, new: &str) {
        if let Some(value) = self.values.remove(old) {
            self.values.insert(new.to_string(), value);
        }
    }

    /// Union `other`'s values into this record.
    ///
    /// On a column collision `other`'s value wins.
    pub fn merge(&mut self, other: &Record) {
        for (column, value) in &other.values {
            self.values.insert(column.clone(), *value);
        }
    }

    /// Present column names, in map order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// The underlying column → value mapping.
    pub fn values(&self) -> &BTreeMap<String, i64> {
        &self.values
    }

    /// Number of set columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no column is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<const N: usize> From<[(&str, i64); N]> for Record {
    fn from(pairs: [(&str, i64); N]) -> Self {
        let mut record = Record::new();
        for (column, value) in pairs {
            record.add(column, value);
        }
        record
    }
}

impl FromIterator<(String, i64)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Record {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Accessors ───────────────────────────────────────────────────

    #[test]
    fn test_get_and_try_get() {
        let record = Record::from([("stamp", 42)]);
        assert_eq!(record.get("stamp"), 42);
        assert_eq!(record.try_get("stamp"), Some(42));
        assert_eq!(record.try_get("other"), None);
    }

    #[test]
    #[should_panic(expected = "column not present on record: missing")]
    fn test_get_absent_panics() {
        Record::new().get("missing");
    }

    #[test]
    fn test_add_overwrites() {
        let mut record = Record::from([("a", 1)]);
        record.add("a", 2);
        assert_eq!(record.get("a"), 2);
        assert_eq!(record.len(), 1);
    }

    // ── Column mutation ─────────────────────────────────────────────

    #[test]
    fn test_drop_columns_ignores_absent() {
        let mut record = Record::from([("a", 1), ("b", 2)]);
        record.drop_columns(&["b", "no_such"]);
        assert!(record.has_column("a"));
        assert!(!record.has_column("b"));
    }

    #[test]
    fn test_rename_column_preserves_value() {
        let mut record = Record::from([("old", 7)]);
        record.rename_column("old", "new");
        assert_eq!(record.try_get("old"), None);
        assert_eq!(record.get("new"), 7);
    }

    #[test]
    fn test_rename_absent_is_noop() {
        let mut record = Record::from([("a", 1)]);
        record.rename_column("ghost", "b");
        assert_eq!(record, Record::from([("a", 1)]));
    }

    // ── Merge ───────────────────────────────────────────────────────

    #[test]
    fn test_merge_other_wins_on_collision() {
        let mut left = Record::from([("shared", 1), ("left_only", 2)]);
        let right = Record::from([("shared", 9), ("right_only", 3)]);
        left.merge(&right);
        assert_eq!(left.get("shared"), 9);
        assert_eq!(left.get("left_only"), 2);
        assert_eq!(left.get("right_only"), 3);
    }

    // ── Equality ────────────────────────────────────────────────────

    #[test]
    fn test_equality_requires_same_columns_and_values() {
        let a = Record::from([("x", 1), ("y", 2)]);
        let b = Record::from([("y", 2), ("x", 1)]);
        assert_eq!(a, b);

        let c = Record::from([("x", 1)]);
        assert_ne!(a, c);

        let d = Record::from([("x", 1), ("y", 3)]);
        assert_ne!(a, d);
    }

    // ── Serde ───────────────────────────────────────────────────────

    #[test]
    fn test_serializes_as_flat_map() {
        let record = Record::from([("stamp", 5), ("addr", 11)]);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"addr":11,"stamp":5}"#);

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
