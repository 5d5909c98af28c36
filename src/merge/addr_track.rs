//! Address-tracking sequential join.
//!
//! Stitches a source row to every sink row its identifier ultimately
//! reached, through zero or more copy operations that renamed the
//! tracked identifier. The sweep runs in reverse chronological order:
//! walking forward, a chain that never terminates would sit in the
//! processing set forever, while walking backward it simply ages out.
//!
//! Each processing entry (a sink awaiting its source) carries a set of
//! identifiers known to alias the same logical object. Alias sets live
//! in a disjoint-set arena: when a copy links two sets, they are unified
//! to closure, so any two entries whose sets overlap share one set
//! afterwards.
//!
//! Every input row must carry its stamp and identifier columns; absence
//! is a caller bug (the sweep panics), unlike the shape-tolerant keyed
//! merges.

use std::collections::BTreeSet;

use crate::record::Record;
use crate::records::Records;

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Source,
    Copy,
    Sink,
}

struct WorkRow<'a> {
    kind: RowKind,
    timestamp: i64,
    row: &'a Record,
}

/// Disjoint-set arena of identifier sets. Handles stay valid across
/// unions; `find` resolves a handle to its current root set.
#[derive(Default)]
struct AliasArena {
    parent: Vec<usize>,
    sets: Vec<BTreeSet<i64>>,
}

impl AliasArena {
    fn singleton(&mut self, value: i64) -> usize {
        let index = self.parent.len();
        self.parent.push(index);
        self.sets.push(BTreeSet::from([value]));
        index
    }

    fn find(&self, mut index: usize) -> usize {
        while self.parent[index] != index {
            index = self.parent[index];
        }
        index
    }

    fn contains(&self, handle: usize, value: i64) -> bool {
        self.sets[self.find(handle)].contains(&value)
    }

    fn insert(&mut self, handle: usize, value: i64) {
        let root = self.find(handle);
        self.sets[root].insert(value);
    }

    /// Merge the sets behind `a` and `b`; returns the surviving root.
    fn union(&mut self, a: usize, b: usize) -> usize {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return root_a;
        }
        let (keep, absorb) = if self.sets[root_a].len() >= self.sets[root_b].len() {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        let moved = std::mem::take(&mut self.sets[absorb]);
        self.sets[keep].extend(moved);
        self.parent[absorb] = keep;
        keep
    }

    fn overlaps(&self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return true;
        }
        let (small, large) = if self.sets[root_a].len() <= self.sets[root_b].len() {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.sets[small]
            .iter()
            .any(|v| self.sets[large].contains(v))
    }
}

/// A sink row awaiting its source, with a handle to its alias set.
struct Pending {
    row: Record,
    aliases: usize,
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn merge_addr_track(
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
    log::debug!(
        "merge_sequential_for_addr_track: {} sources, {} copies, {} sinks",
        source_records.len(),
        copy_records.len(),
        sink_records.len()
    );

    let mut work: Vec<WorkRow<'_>> = Vec::with_capacity(
        source_records.len() + copy_records.len() + sink_records.len(),
    );
    for row in source_records.rows() {
        work.push(WorkRow {
            kind: RowKind::Source,
            timestamp: row.get(source_stamp_key),
            row,
        });
    }
    for row in copy_records.rows() {
        work.push(WorkRow {
            kind: RowKind::Copy,
            timestamp: row.get(copy_stamp_key),
            row,
        });
    }
    for row in sink_records.rows() {
        work.push(WorkRow {
            kind: RowKind::Sink,
            timestamp: row.get(sink_stamp_key),
            row,
        });
    }
    // Reverse chronological; stable, so equal stamps keep
    // source-copy-sink insertion order.
    work.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut arena = AliasArena::default();
    let mut processing: Vec<Pending> = Vec::new();
    let mut merged = Records::new();

    for w in &work {
        match w.kind {
            RowKind::Sink => {
                let identifier = w.row.get(sink_from_key);
                let mut row = w.row.clone();
                row.drop_columns(&[sink_from_key]);
                let aliases = arena.singleton(identifier);
                processing.push(Pending { row, aliases });
            }
            RowKind::Copy => {
                let to = w.row.get(copy_to_key);
                let from = w.row.get(copy_from_key);
                // Only the first entry aliasing the destination absorbs
                // the source identifier; unification folds the rest in.
                let Some(position) = processing
                    .iter()
                    .position(|p| arena.contains(p.aliases, to))
                else {
                    continue;
                };
                arena.insert(processing[position].aliases, from);
                unify_to_closure(&mut arena, &processing, processing[position].aliases);
            }
            RowKind::Source => {
                let key = w.row.get(source_key);
                let drained = std::mem::take(&mut processing);
                for pending in drained {
                    if arena.contains(pending.aliases, key) {
                        let mut out = pending.row;
                        out.merge(w.row);
                        merged.append(out);
                    } else {
                        processing.push(pending);
                    }
                }
            }
        }
    }

    // A source column named like the sink identifier would reintroduce
    // it; the output never carries the tracked identifier.
    merged.drop_columns(&[sink_from_key]);
    merged
}

/// Union every processing set overlapping `handle`'s set, repeating
/// until no overlap remains (a grown set can overlap entries that were
/// disjoint before).
fn unify_to_closure(arena: &mut AliasArena, processing: &[Pending], handle: usize) {
    let mut root = arena.find(handle);
    loop {
        let mut changed = false;
        for pending in processing {
            let other = arena.find(pending.aliases);
            if other != root && arena.overlaps(other, root) {
                root = arena.union(other, root);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}
