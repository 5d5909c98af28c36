//! trace_stitch — record-set engine for trace analysis.
//!
//! Reconstructs end-to-end causal chains (latencies, response times,
//! message flows) from time-stamped event records emitted by an
//! instrumented real-time middleware, by joining in-memory record
//! tables on keys and time windows.
//!
//! # Data model
//!
//! - [`Record`] — one row: an ordered column → `i64` mapping. A column
//!   may be declared on the table but unset on a given row.
//! - [`Records`] — an ordered, column-aware sequence of rows with deep
//!   value semantics: `clone` is independent, sorts are stable, and row
//!   order is meaningful.
//!
//! # Merge primitives
//!
//! - [`Records::merge`] — equality join on a key with
//!   inner/left/right/outer policies.
//! - [`Records::merge_sequential`] — chronological next-after join:
//!   each left row pairs with the first right row that follows it in
//!   time, optionally constrained to an equal join key.
//! - [`Records::merge_sequential_for_addr_track`] — follows a
//!   `source → copy* → sink` chain through identifier renames, pairing
//!   each source with every sink it reached.
//!
//! Free-function forms live in the [`merge`](self::merge) module.
//!
//! # Consumers
//!
//! [`ResponseTime`] derives best-case/worst-case/per-activation latency
//! tables from a stage-chain table; [`Frame`] is the rectangular export
//! handed to plotting and CSV layers.
//!
//! # Submodules
//! - `record`, `records` — the data model
//! - `merge` — the join algorithms
//! - `response_time` — the latency facade
//! - `frame` — tabular export
//! - `hash` — row content hashing
//! - `error` — the crate error type

pub mod error;
pub mod frame;
pub mod hash;
pub mod merge;
pub mod record;
pub mod records;
pub mod response_time;

pub use error::TraceStitchError;
pub use frame::Frame;
pub use merge::{MergeHow, merge, merge_sequential, merge_sequential_for_addr_track};
pub use record::Record;
pub use records::Records;
pub use response_time::{RESPONSE_TIME_COLUMN, ResponseCase, ResponseTime};
