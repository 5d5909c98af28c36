//! Join and merge algorithms over [`Records`].
//!
//! Three primitives reconstruct causal chains from trace tables:
//!
//! - [`merge`] — equality join on a key, with inner/left/right/outer
//!   outer policies (`equality`).
//! - [`merge_sequential`] — chronological next-after join: each left row
//!   pairs with the first right row that follows it in time, optionally
//!   constrained to an equal join key (`sequential`).
//! - [`merge_sequential_for_addr_track`] — address-tracking join: follows
//!   a `source → copy* → sink` chain through identifier renames
//!   (`addr_track`).
//!
//! All three sweep a stamp-sorted concatenation of their inputs. Sweep
//! state (side, stamp, pairing, consumption) lives in arrays parallel to
//! the working rows, never in the rows themselves, so inputs are left
//! untouched and bookkeeping can never leak into results. Sorts are
//! stable; ties break on original (left-before-right) insertion order.

pub(crate) mod addr_track;
pub(crate) mod equality;
pub(crate) mod sequential;

use std::fmt;
use std::str::FromStr;

use crate::error::TraceStitchError;
use crate::record::Record;
use crate::records::Records;

/// Which unmatched rows survive a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeHow {
    /// Matched pairs only.
    Inner,
    /// Matched pairs plus unmatched left rows.
    Left,
    /// Matched pairs plus unmatched right rows.
    Right,
    /// Matched pairs plus unmatched rows from both sides.
    Outer,
}

impl MergeHow {
    /// Whether unmatched left rows survive.
    pub fn keeps_left(self) -> bool {
        matches!(self, MergeHow::Left | MergeHow::Outer)
    }

    /// Whether unmatched right rows survive.
    pub fn keeps_right(self) -> bool {
        matches!(self, MergeHow::Right | MergeHow::Outer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MergeHow::Inner => "inner",
            MergeHow::Left => "left",
            MergeHow::Right => "right",
            MergeHow::Outer => "outer",
        }
    }
}

impl fmt::Display for MergeHow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeHow {
    type Err = TraceStitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inner" => Ok(MergeHow::Inner),
            "left" => Ok(MergeHow::Left),
            "right" => Ok(MergeHow::Right),
            "outer" => Ok(MergeHow::Outer),
            other => Err(TraceStitchError::UnknownMergeHow(other.to_string())),
        }
    }
}

/// Which input a working row came from. `Left` orders before `Right`, so
/// a stable sort on `(stamp, side)` walks left rows first at equal
/// stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum MergeSide {
    Left,
    Right,
}

/// A sort stamp with tagged absence. `Missing` orders after every
/// present stamp, replacing the max-int sentinel the sweep would
/// otherwise need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Stamp {
    Present(i64),
    Missing,
}

impl Stamp {
    pub(crate) fn of(row: &Record, key: &str) -> Stamp {
        match row.try_get(key) {
            Some(value) => Stamp::Present(value),
            None => Stamp::Missing,
        }
    }

    pub(crate) fn is_missing(self) -> bool {
        matches!(self, Stamp::Missing)
    }
}

/// Equality join of `left` and `right` on `join_key`.
///
/// Rows lacking `join_key` are never paired; they survive only under the
/// outer policy of their side. See [`Records::merge`].
pub fn merge(left: &Records, right: &Records, join_key: &str, how: MergeHow) -> Records {
    left.merge(right, join_key, how)
}

/// Chronological next-after join: pair each left row with the first
/// not-yet-claimed right row at or after it in stamp order, constrained
/// to an equal `join_key` when one is given. See
/// [`Records::merge_sequential`].
pub fn merge_sequential(
    left: &Records,
    right: &Records,
    left_stamp_key: &str,
    right_stamp_key: &str,
    join_key: Option<&str>,
    how: MergeHow,
) -> Records {
    left.merge_sequential(right, left_stamp_key, right_stamp_key, join_key, how)
}

/// Address-tracking join: pair each source row with every sink row its
/// identifier reached through copy renames. See
/// [`Records::merge_sequential_for_addr_track`].
#[allow(clippy::too_many_arguments)]
pub fn merge_sequential_for_addr_track(
    source_records: &Records,
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
    source_records.merge_sequential_for_addr_track(
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

#[cfg(test)]
mod tests {
    use super::*;

    // ── MergeHow parsing and policy ─────────────────────────────────

    #[test]
    fn test_how_roundtrips_through_str() {
        for how in [MergeHow::Inner, MergeHow::Left, MergeHow::Right, MergeHow::Outer] {
            assert_eq!(how.as_str().parse::<MergeHow>().unwrap(), how);
            assert_eq!(format!("{how}"), how.as_str());
        }
    }

    #[test]
    fn test_how_rejects_unknown() {
        let err = "cross".parse::<MergeHow>().unwrap_err();
        assert!(err.to_string().contains("cross"));
    }

    #[test]
    fn test_outer_policy_matrix() {
        assert!(!MergeHow::Inner.keeps_left() && !MergeHow::Inner.keeps_right());
        assert!(MergeHow::Left.keeps_left() && !MergeHow::Left.keeps_right());
        assert!(!MergeHow::Right.keeps_left() && MergeHow::Right.keeps_right());
        assert!(MergeHow::Outer.keeps_left() && MergeHow::Outer.keeps_right());
    }

    // ── Stamp ordering ──────────────────────────────────────────────

    #[test]
    fn test_missing_stamp_orders_last() {
        assert!(Stamp::Present(i64::MAX) < Stamp::Missing);
        assert!(Stamp::Present(-5) < Stamp::Present(0));
    }

    #[test]
    fn test_left_side_orders_before_right() {
        assert!(MergeSide::Left < MergeSide::Right);
        assert!(
            (Stamp::Present(3), MergeSide::Left) < (Stamp::Present(3), MergeSide::Right)
        );
    }
}
