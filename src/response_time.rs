//! Best-case / worst-case / per-activation response-time tables.
//!
//! The input table's declared columns form a causal stage chain in
//! order; response time is measured from the first declared column (the
//! activation stamp) to the last (the completion stamp). Output tables
//! carry the activation column plus [`RESPONSE_TIME_COLUMN`].
//!
//! The "all" case walks the input backward carrying the last seen
//! completion stamp, so a row whose completion was dropped inherits the
//! stamp of the activation that completed after it — the same view
//! [`Records::bind_drop_as_delay`] produces as a preprocessing step.
//! Within an activation cohort (rows sharing a start stamp) the minimum
//! completion wins, collapsing fan-out to the earliest completion.

use std::fmt;
use std::str::FromStr;

use crate::error::TraceStitchError;
use crate::record::Record;
use crate::records::Records;

/// Column name carrying the computed response time.
pub const RESPONSE_TIME_COLUMN: &str = "response_time";

/// Which latency table to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCase {
    /// Minimum response time per activation.
    Best,
    /// Maximum response time per activation.
    Worst,
    /// One row per activation, earliest completion.
    All,
}

impl ResponseCase {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseCase::Best => "best",
            ResponseCase::Worst => "worst",
            ResponseCase::All => "all",
        }
    }
}

impl fmt::Display for ResponseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseCase {
    type Err = TraceStitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best" => Ok(ResponseCase::Best),
            "worst" => Ok(ResponseCase::Worst),
            "all" => Ok(ResponseCase::All),
            other => Err(TraceStitchError::UnknownResponseCase(other.to_string())),
        }
    }
}

/// Response-time calculator over a stage-chain table.
#[derive(Debug)]
pub struct ResponseTime {
    records: Records,
    start_column: String,
    end_column: String,
}

impl ResponseTime {
    /// Wrap a stage-chain table. The first and last declared columns
    /// become the activation and completion stamps.
    ///
    /// # Errors
    ///
    /// [`TraceStitchError::TooFewColumns`] when fewer than two columns
    /// are declared.
    pub fn new(records: &Records) -> Result<Self, TraceStitchError> {
        let columns = records.columns();
        if columns.len() < 2 {
            return Err(TraceStitchError::TooFewColumns(columns.len()));
        }
        Ok(ResponseTime {
            records: records.clone(),
            start_column: columns[0].clone(),
            end_column: columns[columns.len() - 1].clone(),
        })
    }

    /// Dispatch on a [`ResponseCase`].
    pub fn to_records(&self, case: ResponseCase) -> Records {
        match case {
            ResponseCase::Best => self.to_best_case_records(),
            ResponseCase::Worst => self.to_worst_case_records(),
            ResponseCase::All => self.to_all_records(),
        }
    }

    /// Minimum `end - start` per unique activation stamp. Rows missing
    /// either stamp are skipped.
    pub fn to_best_case_records(&self) -> Records {
        self.extreme_case(false)
    }

    /// Maximum `end - start` per unique activation stamp. Rows missing
    /// either stamp are skipped.
    pub fn to_worst_case_records(&self) -> Records {
        self.extreme_case(true)
    }

    /// One row per activation cohort with the earliest completion.
    ///
    /// Rows are walked in reverse input order carrying the last seen
    /// completion stamp: a row without one inherits it, and rows before
    /// any completion has been seen are skipped, as are rows without an
    /// activation stamp. Within a cohort the minimum completion wins.
    pub fn to_all_records(&self) -> Records {
        let mut starts: Vec<i64> = Vec::new();
        let mut ends: Vec<i64> = Vec::new();
        let mut carried_end: Option<i64> = None;

        for row in self.records.rows().iter().rev() {
            if let Some(end) = row.try_get(&self.end_column) {
                carried_end = Some(end);
            }
            let Some(end) = carried_end else {
                continue;
            };
            let Some(start) = row.try_get(&self.start_column) else {
                continue;
            };
            match starts.iter().position(|&s| s == start) {
                None => {
                    starts.insert(0, start);
                    ends.insert(0, end);
                }
                Some(i) if end < ends[i] => ends[i] = end,
                Some(_) => {}
            }
        }

        self.output(starts.iter().zip(&ends).map(|(&s, &e)| (s, e - s)))
    }

    fn extreme_case(&self, pick_max: bool) -> Records {
        let mut order: Vec<i64> = Vec::new();
        let mut extremes: Vec<i64> = Vec::new();

        for row in self.records.rows() {
            let (Some(start), Some(end)) = (
                row.try_get(&self.start_column),
                row.try_get(&self.end_column),
            ) else {
                continue;
            };
            let response = end - start;
            match order.iter().position(|&s| s == start) {
                None => {
                    order.push(start);
                    extremes.push(response);
                }
                Some(i) => {
                    if (pick_max && response > extremes[i])
                        || (!pick_max && response < extremes[i])
                    {
                        extremes[i] = response;
                    }
                }
            }
        }

        self.output(order.iter().zip(&extremes).map(|(&s, &r)| (s, r)))
    }

    fn output(&self, pairs: impl Iterator<Item = (i64, i64)>) -> Records {
        let mut out = Records::with_columns(&[self.start_column.as_str(), RESPONSE_TIME_COLUMN]);
        for (start, response) in pairs {
            out.append(Record::from([
                (self.start_column.as_str(), start),
                (RESPONSE_TIME_COLUMN, response),
            ]));
        }
        out
    }
}
