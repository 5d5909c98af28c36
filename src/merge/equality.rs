//! Equality join on a single key.
//!
//! Both sides are concatenated and stable-sorted by `(join value, side)`;
//! a single forward walk then pairs each right row with the pending left
//! row holding the same join value. The engine assumes join keys are
//! near-unique: when several left rows share a key, only the last one
//! before the first right row stays pairable, and every right row with
//! that key pairs against it. Callers deduplicate upstream when this is
//! undesired.

use crate::merge::{MergeHow, MergeSide, Stamp};
use crate::record::Record;
use crate::records::Records;

struct WorkRow<'a> {
    side: MergeSide,
    stamp: Stamp,
    row: &'a Record,
}

pub(crate) fn merge_by_key(
    left: &Records,
    right: &Records,
    join_key: &str,
    how: MergeHow,
) -> Records {
    log::debug!(
        "merge: {} x {} rows on {join_key:?} ({how})",
        left.len(),
        right.len()
    );

    let mut work: Vec<WorkRow<'_>> = Vec::with_capacity(left.len() + right.len());
    for row in left.rows() {
        work.push(WorkRow {
            side: MergeSide::Left,
            stamp: Stamp::of(row, join_key),
            row,
        });
    }
    for row in right.rows() {
        work.push(WorkRow {
            side: MergeSide::Right,
            stamp: Stamp::of(row, join_key),
            row,
        });
    }
    work.sort_by_key(|w| (w.stamp, w.side));

    let mut merged = Records::new();
    let mut unmatched: Vec<(MergeSide, &Record)> = Vec::new();
    let mut pending: Option<(&Record, i64)> = None;
    let mut pending_found = false;

    for w in &work {
        let Stamp::Present(join_value) = w.stamp else {
            // No join key: never pairable, survives only as an outer row.
            emit_outer(&mut merged, w.side, w.row, how);
            continue;
        };
        match w.side {
            MergeSide::Left => {
                if let Some((prev, _)) = pending {
                    if !pending_found {
                        unmatched.push((MergeSide::Left, prev));
                    }
                }
                pending = Some((w.row, join_value));
                pending_found = false;
            }
            MergeSide::Right => match pending {
                Some((left_row, left_value)) if left_value == join_value => {
                    pending_found = true;
                    let mut out = left_row.clone();
                    out.merge(w.row);
                    merged.append(out);
                }
                _ => unmatched.push((MergeSide::Right, w.row)),
            },
        }
    }
    if let Some((left_row, _)) = pending {
        if !pending_found {
            unmatched.push((MergeSide::Left, left_row));
        }
    }

    for (side, row) in unmatched {
        emit_outer(&mut merged, side, row, how);
    }

    merged
}

fn emit_outer(merged: &mut Records, side: MergeSide, row: &Record, how: MergeHow) {
    let keep = match side {
        MergeSide::Left => how.keeps_left(),
        MergeSide::Right => how.keeps_right(),
    };
    if keep {
        merged.append(row.clone());
    }
}
