//! An ordered, column-aware collection of [`Record`] rows.
//!
//! `Records` behaves like a small in-memory table. The declared column
//! list is ordered and observable: consumers such as
//! [`ResponseTime`](crate::ResponseTime) read the first and last declared
//! columns as the ends of a causal stage chain. Every column present on a
//! row is declared on the table; the reverse need not hold, so a declared
//! column may be unset for some rows (a "dropped" sample).
//!
//! Row order is meaningful. Sorts are stable, and the merge algorithms
//! in [`merge`](crate::merge) rely on that stability for deterministic
//! tie-breaks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::TraceStitchError;
use crate::frame::Frame;
use crate::hash::record_hash;
use crate::merge::{self, MergeHow};
use crate::record::Record;

/// An ordered sequence of [`Record`] rows with a shared declared column
/// list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Records {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Records {
    /// Create an empty table with no declared columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with the given declared columns, in order.
    ///
    /// # Panics
    ///
    /// Panics when a column name is empty or duplicated.
    pub fn with_columns(columns: &[&str]) -> Self {
        let mut records = Records::new();
        for column in columns {
            assert!(
                !records.is_declared(column),
                "duplicate declared column: {column}"
            );
            records.declare(column);
        }
        records
    }

    /// Build a table from rows; declared columns are the union of the
    /// rows' columns in first-appearance order.
    pub fn from_rows(rows: Vec<Record>) -> Self {
        let mut records = Records::new();
        for row in rows {
            records.append(row);
        }
        records
    }

    /// Declared column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The rows, in order.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn is_declared(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    fn declare(&mut self, column: &str) {
        assert!(!column.is_empty(), "column name must be non-empty");
        if !self.is_declared(column) {
            self.columns.push(column.to_string());
        }
    }

    /// Append a row, declaring any columns it introduces.
    pub fn append(&mut self, row: Record) {
        let introduced: Vec<String> = row
            .columns()
            .filter(|c| !self.is_declared(c))
            .map(str::to_string)
            .collect();
        for column in introduced {
            self.declare(&column);
        }
        self.rows.push(row);
    }

    /// Append clones of `other`'s rows after this table's rows; declared
    /// columns become the union, keeping this table's order first.
    pub fn concat(&mut self, other: &Records) {
        let introduced: Vec<String> = other
            .columns
            .iter()
            .filter(|c| !self.is_declared(c))
            .cloned()
            .collect();
        for column in introduced {
            self.declare(&column);
        }
        self.rows.extend(other.rows.iter().cloned());
    }

    /// Stable-sort rows by `key`, then by `sub_key` when given.
    /// `ascending = false` flips the comparison; ties keep their original
    /// relative order either way.
    ///
    /// # Panics
    ///
    /// Panics when any row lacks `key` (or `sub_key` when given). Callers
    /// that tolerate missing stamps inject a substitute before sorting.
    pub fn sort(&mut self, key: &str, sub_key: Option<&str>, ascending: bool) {
        self.rows.sort_by(|a, b| {
            let ka = (a.get(key), sub_key.map(|s| a.get(s)));
            let kb = (b.get(key), sub_key.map(|s| b.get(s)));
            if ascending { ka.cmp(&kb) } else { kb.cmp(&ka) }
        });
    }

    /// Keep only rows for which the predicate holds. Declared columns are
    /// preserved even when no surviving row carries them.
    pub fn retain(&mut self, f: impl FnMut(&Record) -> bool) {
        self.rows.retain(f);
    }

    /// Remove the listed columns from the declaration and from every row.
    pub fn drop_columns(&mut self, columns: &[&str]) {
        self.columns.retain(|c| !columns.contains(&c.as_str()));
        for row in &mut self.rows {
            row.drop_columns(columns);
        }
    }

    /// Rename columns, preserving each column's declared position. Pairs
    /// whose old name is not declared are skipped.
    ///
    /// # Panics
    ///
    /// Panics when a new name collides with a column that remains
    /// declared.
    pub fn rename_columns(&mut self, renames: &[(&str, &str)]) {
        for (old, new) in renames {
            let Some(position) = self.columns.iter().position(|c| c == old) else {
                continue;
            };
            assert!(
                !self.is_declared(new),
                "rename target already declared: {new}"
            );
            assert!(!new.is_empty(), "column name must be non-empty");
            self.columns[position] = new.to_string();
            for row in &mut self.rows {
                row.rename_column(old, new);
            }
        }
    }

    /// Remove duplicate rows, keeping the first occurrence.
    ///
    /// Rows are prefiltered by content hash and confirmed with an exact
    /// comparison, so hash collisions cannot drop distinct rows.
    pub fn drop_duplicates(&mut self) {
        let mut seen: HashMap<u64, Vec<usize>> = HashMap::new();
        let mut kept: Vec<Record> = Vec::with_capacity(self.rows.len());
        for row in self.rows.drain(..) {
            let bucket = seen.entry(record_hash(&row)).or_default();
            if bucket.iter().any(|&i| kept[i] == row) {
                continue;
            }
            bucket.push(kept.len());
            kept.push(row);
        }
        self.rows = kept;
    }

    /// Convert dropped samples to last-known values.
    ///
    /// Sorts descending by `sort_key`, fills each declared-but-unset
    /// column from the most recently observed value among already-walked
    /// (that is, later-stamped) rows, then re-sorts ascending. A column
    /// missing from every later row stays unset.
    ///
    /// # Panics
    ///
    /// Panics when any row lacks `sort_key`.
    pub fn bind_drop_as_delay(&mut self, sort_key: &str) {
        self.sort(sort_key, None, false);

        let columns = self.columns.clone();
        let mut last_seen: HashMap<&str, i64> = HashMap::new();
        for row in &mut self.rows {
            for column in &columns {
                if !row.has_column(column) {
                    if let Some(&value) = last_seen.get(column.as_str()) {
                        row.add(column.clone(), value);
                    }
                }
                if let Some(value) = row.try_get(column) {
                    last_seen.insert(column.as_str(), value);
                }
            }
        }

        self.sort(sort_key, None, true);
    }

    /// Export as a [`Frame`]: one cell per declared column per row, with
    /// declared-but-unset cells empty.
    pub fn to_frame(&self) -> Frame {
        Frame::from_records(self)
    }

    /// Serialize to JSON (declared columns plus rows as flat maps).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON produced by [`Records::to_json`].
    ///
    /// Columns present on rows but missing from the declared list are
    /// declared; empty or duplicate declared names are rejected.
    pub fn from_json(json: &str) -> Result<Self, TraceStitchError> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default)]
            columns: Vec<String>,
            #[serde(default)]
            rows: Vec<Record>,
        }

        let raw: Raw =
            serde_json::from_str(json).map_err(|e| TraceStitchError::Deserialize(e.to_string()))?;

        let mut records = Records::new();
        for column in &raw.columns {
            if column.is_empty() {
                return Err(TraceStitchError::Deserialize(
                    "empty column name".to_string(),
                ));
            }
            if records.is_declared(column) {
                return Err(TraceStitchError::Deserialize(format!(
                    "duplicate declared column: {column}"
                )));
            }
            records.declare(column);
        }
        for row in raw.rows {
            records.append(row);
        }
        Ok(records)
    }

    /// Equality join with `right` on `join_key`. See [`merge::merge`].
    pub fn merge(&self, right: &Records, join_key: &str, how: MergeHow) -> Records {
        merge::equality::merge_by_key(self, right, join_key, how)
    }

    /// Chronological next-after join with `right`. See
    /// [`merge::merge_sequential`].
    pub fn merge_sequential(
        &self,
        right: &Records,
        left_stamp_key: &str,
        right_stamp_key: &str,
        join_key: Option<&str>,
        how: MergeHow,
    ) -> Records {
        merge::sequential::merge_next_after(
            self,
            right,
            left_stamp_key,
            right_stamp_key,
            join_key,
            how,
        )
    }

    /// Address-tracking join: pair each source row (self) with every sink
    /// row its identifier reached through copy renames. See
    /// [`merge::merge_sequential_for_addr_track`].
    #[allow(clippy::too_many_arguments)]
    pub fn merge_sequential_for_addr_track(
        &self,
        source_stamp_key: &str,
        source_key: &str,
        copy_records: &Records,
        copy_stamp_key: &str,
        copy_from_key: &str,
        copy_to_key: &str,
        sink_records: &Records,
        sink_stamp_key: &str,
        sink_from_key: &str,
    ) -> Records {
        merge::addr_track::merge_addr_track(
            self,
            source_stamp_key,
            source_key,
            copy_records,
            copy_stamp_key,
            copy_from_key,
            copy_to_key,
            sink_records,
            sink_stamp_key,
            sink_from_key,
        )
    }
}

/// Row-wise equality in order, plus declared-column equality as a set
/// (declaration order does not participate).
impl PartialEq for Records {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.columns.len() == other.columns.len()
            && self.columns.iter().all(|c| other.is_declared(c))
    }
}

impl Eq for Records {}

impl FromIterator<Record> for Records {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut records = Records::new();
        for row in iter {
            records.append(row);
        }
        records
    }
}

impl<'a> IntoIterator for &'a Records {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
