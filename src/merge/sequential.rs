//! Chronological next-after join.
//!
//! Two passes over the stamp-sorted concatenation of both sides. The
//! first pass computes pairings: a map from join value to the most
//! recent unpaired left row; a right row claims (and erases) the map
//! entry for its join value. The second pass emits in sorted order,
//! merging each paired left row with its partner and applying the outer
//! policy to everything else.
//!
//! When two left rows with the same join value arrive before any right
//! row, the earlier one is silently displaced from pairing and survives
//! only as an outer row. Callers that need every left row paired must
//! deduplicate upstream.

use std::collections::HashMap;

use crate::merge::{MergeHow, MergeSide, Stamp};
use crate::record::Record;
use crate::records::Records;

struct WorkRow<'a> {
    side: MergeSide,
    stamp: Stamp,
    row: &'a Record,
}

/// Join value of a row: `0` when no join key is in play, the row's value
/// when present, `None` when the row lacks the key (never pairable).
fn join_value(row: &Record, join_key: Option<&str>) -> Option<i64> {
    match join_key {
        None => Some(0),
        Some(key) => row.try_get(key),
    }
}

pub(crate) fn merge_next_after(
    left: &Records,
    right: &Records,
    left_stamp_key: &str,
    right_stamp_key: &str,
    join_key: Option<&str>,
    how: MergeHow,
) -> Records {
    log::debug!(
        "merge_sequential: {} x {} rows on {left_stamp_key:?}/{right_stamp_key:?}, join {join_key:?} ({how})",
        left.len(),
        right.len()
    );

    let mut work: Vec<WorkRow<'_>> = Vec::with_capacity(left.len() + right.len());
    for row in left.rows() {
        work.push(WorkRow {
            side: MergeSide::Left,
            stamp: Stamp::of(row, left_stamp_key),
            row,
        });
    }
    for row in right.rows() {
        work.push(WorkRow {
            side: MergeSide::Right,
            stamp: Stamp::of(row, right_stamp_key),
            row,
        });
    }
    // Stable: at equal stamps left rows keep their place before right rows.
    work.sort_by_key(|w| w.stamp);

    // First pass: pairing. partner[i] is the working index of the right
    // row claimed by left row i.
    let mut partner: Vec<Option<usize>> = vec![None; work.len()];
    let mut pending: HashMap<i64, usize> = HashMap::new();
    for (i, w) in work.iter().enumerate() {
        if w.stamp.is_missing() {
            continue;
        }
        let Some(value) = join_value(w.row, join_key) else {
            continue;
        };
        match w.side {
            MergeSide::Left => {
                pending.insert(value, i);
            }
            MergeSide::Right => {
                if let Some(left_index) = pending.remove(&value) {
                    partner[left_index] = Some(i);
                }
            }
        }
    }

    // Second pass: emission in sorted order.
    let mut merged = Records::new();
    let mut consumed = vec![false; work.len()];
    for i in 0..work.len() {
        if consumed[i] {
            continue;
        }
        let w = &work[i];

        let pairable = !w.stamp.is_missing() && join_value(w.row, join_key).is_some();
        if !pairable {
            emit_outer(&mut merged, &mut consumed, i, w, how);
            continue;
        }

        if w.side == MergeSide::Right {
            // Pairing always happens from the left side; an unconsumed
            // right row here was never claimed.
            emit_outer(&mut merged, &mut consumed, i, w, how);
            continue;
        }

        match partner[i] {
            Some(right_index) if !consumed[right_index] => {
                let mut out = w.row.clone();
                out.merge(work[right_index].row);
                merged.append(out);
                consumed[i] = true;
                consumed[right_index] = true;
            }
            _ => emit_outer(&mut merged, &mut consumed, i, w, how),
        }
    }

    merged
}

fn emit_outer(
    merged: &mut Records,
    consumed: &mut [bool],
    index: usize,
    w: &WorkRow<'_>,
    how: MergeHow,
) {
    let keep = match w.side {
        MergeSide::Left => how.keeps_left(),
        MergeSide::Right => how.keeps_right(),
    };
    if keep {
        merged.append(w.row.clone());
        consumed[index] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Keyed pairing ───────────────────────────────────────────────

    #[test]
    fn test_pairs_nearest_later_right_with_equal_key() {
        let left = Records::from_rows(vec![
            Record::from([("key", 1), ("left_stamp", 0)]),
            Record::from([("key", 2), ("left_stamp", 3)]),
        ]);
        let right = Records::from_rows(vec![
            Record::from([("key", 2), ("right_stamp", 5)]),
            Record::from([("key", 1), ("right_stamp", 6)]),
        ]);

        let merged =
            left.merge_sequential(&right, "left_stamp", "right_stamp", Some("key"), MergeHow::Inner);
        let expected = Records::from_rows(vec![
            Record::from([("key", 1), ("left_stamp", 0), ("right_stamp", 6)]),
            Record::from([("key", 2), ("left_stamp", 3), ("right_stamp", 5)]),
        ]);
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_unkeyed_pairing_matches_in_stamp_order() {
        let left = Records::from_rows(vec![
            Record::from([("left_stamp", 0)]),
            Record::from([("left_stamp", 10)]),
        ]);
        let right = Records::from_rows(vec![
            Record::from([("right_stamp", 5)]),
            Record::from([("right_stamp", 15)]),
        ]);

        let merged =
            left.merge_sequential(&right, "left_stamp", "right_stamp", None, MergeHow::Inner);
        let expected = Records::from_rows(vec![
            Record::from([("left_stamp", 0), ("right_stamp", 5)]),
            Record::from([("left_stamp", 10), ("right_stamp", 15)]),
        ]);
        assert_eq!(merged, expected);
    }

    #[test]
    fn test_unkeyed_consecutive_lefts_displace_earlier() {
        // With no join key there is a single pending slot: the second
        // left row displaces the first before any right row arrives.
        let left = Records::from_rows(vec![
            Record::from([("left_stamp", 0), ("tag", 1)]),
            Record::from([("left_stamp", 1), ("tag", 2)]),
        ]);
        let right = Records::from_rows(vec![Record::from([("right_stamp", 5)])]);

        let merged =
            left.merge_sequential(&right, "left_stamp", "right_stamp", None, MergeHow::Outer);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.rows()[0].get("tag"), 1);
        assert!(!merged.rows()[0].has_column("right_stamp"));
        assert_eq!(merged.rows()[1].get("tag"), 2);
        assert_eq!(merged.rows()[1].get("right_stamp"), 5);
    }

    #[test]
    fn test_right_claimed_at_most_once() {
        let left = Records::from_rows(vec![
            Record::from([("key", 1), ("left_stamp", 0), ("tag", 1)]),
            Record::from([("key", 1), ("left_stamp", 2), ("tag", 2)]),
        ]);
        let right = Records::from_rows(vec![Record::from([("key", 1), ("right_stamp", 5)])]);

        let merged =
            left.merge_sequential(&right, "left_stamp", "right_stamp", Some("key"), MergeHow::Inner);
        // Only the most recent left row claims the right row.
        assert_eq!(merged.len(), 1);
        assert_eq!(merged.rows()[0].get("tag"), 2);
    }

    #[test]
    fn test_right_before_left_does_not_pair() {
        let left = Records::from_rows(vec![Record::from([("key", 1), ("left_stamp", 10)])]);
        let right = Records::from_rows(vec![Record::from([("key", 1), ("right_stamp", 5)])]);

        let merged =
            left.merge_sequential(&right, "left_stamp", "right_stamp", Some("key"), MergeHow::Inner);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_equal_stamps_pair() {
        // At equal stamps the left row sorts first and still claims the
        // right row.
        let left = Records::from_rows(vec![Record::from([("key", 1), ("left_stamp", 5)])]);
        let right = Records::from_rows(vec![Record::from([("key", 1), ("right_stamp", 5)])]);

        let merged =
            left.merge_sequential(&right, "left_stamp", "right_stamp", Some("key"), MergeHow::Inner);
        assert_eq!(merged.len(), 1);
    }

    // ── Outer policy and shape tolerance ────────────────────────────

    #[test]
    fn test_outer_emits_in_stamp_order() {
        let left = Records::from_rows(vec![
            Record::from([("key", 1), ("left_stamp", 0)]),
            Record::from([("key", 7), ("left_stamp", 8)]),
        ]);
        let right = Records::from_rows(vec![
            Record::from([("key", 9), ("right_stamp", 4)]),
            Record::from([("key", 1), ("right_stamp", 6)]),
        ]);

        let merged =
            left.merge_sequential(&right, "left_stamp", "right_stamp", Some("key"), MergeHow::Outer);
        assert_eq!(merged.len(), 3);
        // Paired left emits at its own stamp position (0), the stray
        // right at 4, the unmatched left at 8.
        assert_eq!(merged.rows()[0].get("right_stamp"), 6);
        assert_eq!(merged.rows()[1].get("key"), 9);
        assert_eq!(merged.rows()[2].get("key"), 7);
    }

    #[test]
    fn test_missing_stamp_rows_follow_outer_policy() {
        let left = Records::from_rows(vec![
            Record::from([("key", 1)]),
            Record::from([("key", 2), ("left_stamp", 1)]),
        ]);
        let right = Records::from_rows(vec![
            Record::from([("key", 2), ("right_stamp", 3)]),
            Record::from([("key", 1), ("right_stamp", 4)]),
        ]);

        let inner =
            left.merge_sequential(&right, "left_stamp", "right_stamp", Some("key"), MergeHow::Inner);
        // The stampless left row cannot pair; its right counterpart stays
        // unmatched too.
        assert_eq!(inner.len(), 1);
        assert_eq!(inner.rows()[0].get("key"), 2);

        let outer =
            left.merge_sequential(&right, "left_stamp", "right_stamp", Some("key"), MergeHow::Outer);
        assert_eq!(outer.len(), 3);
    }

    #[test]
    fn test_missing_join_key_rows_follow_outer_policy() {
        let left = Records::from_rows(vec![Record::from([("left_stamp", 0)])]);
        let right = Records::from_rows(vec![Record::from([("key", 1), ("right_stamp", 2)])]);

        let inner =
            left.merge_sequential(&right, "left_stamp", "right_stamp", Some("key"), MergeHow::Inner);
        assert!(inner.is_empty());

        let lefty =
            left.merge_sequential(&right, "left_stamp", "right_stamp", Some("key"), MergeHow::Left);
        assert_eq!(lefty.len(), 1);
        assert!(lefty.rows()[0].has_column("left_stamp"));
    }

    #[test]
    fn test_inputs_are_unchanged() {
        let left = Records::from_rows(vec![Record::from([("key", 1), ("left_stamp", 0)])]);
        let right = Records::from_rows(vec![Record::from([("key", 1), ("right_stamp", 2)])]);
        let left_before = left.clone();
        let right_before = right.clone();

        let _ =
            left.merge_sequential(&right, "left_stamp", "right_stamp", Some("key"), MergeHow::Outer);
        assert_eq!(left, left_before);
        assert_eq!(right, right_before);
    }
}
