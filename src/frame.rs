//! Tabular export of a [`Records`] table.
//!
//! A [`Frame`] is the rectangular view handed to plotting and export
//! layers: one cell per (row, column), with declared-but-unset cells
//! empty. Column order follows the declared order; columns present on a
//! row but never declared (which the table invariant rules out, but the
//! export does not rely on) are appended after the declared ones.

use std::fmt;

use serde::Serialize;

use crate::records::Records;

/// A rectangular snapshot of a [`Records`] table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    columns: Vec<String>,
    cells: Vec<Vec<Option<i64>>>,
}

impl Frame {
    pub(crate) fn from_records(records: &Records) -> Frame {
        let mut columns: Vec<String> = records.columns().to_vec();
        for row in records.rows() {
            for column in row.columns() {
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }
        }

        let cells = records
            .rows()
            .iter()
            .map(|row| columns.iter().map(|c| row.try_get(c)).collect())
            .collect();

        Frame { columns, cells }
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Cell matrix, row-major. `None` renders empty.
    pub fn cells(&self) -> &[Vec<Option<i64>>] {
        &self.cells
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Render as CSV with a header line. Unset cells are empty fields.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.columns.join(","));
        out.push('\n');
        for row in &self.cells {
            let fields: Vec<String> = row
                .iter()
                .map(|cell| cell.map(|v| v.to_string()).unwrap_or_default())
                .collect();
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Frame {
    /// Aligned text table, header first; values right-aligned.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(String::len).collect();
        let rendered: Vec<Vec<String>> = self
            .cells
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        let text = cell.map(|v| v.to_string()).unwrap_or_default();
                        widths[i] = widths[i].max(text.len());
                        text
                    })
                    .collect()
            })
            .collect();

        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, "  ")?;
            }
            write!(f, "{column:>width$}", width = widths[i])?;
        }
        for row in &rendered {
            writeln!(f)?;
            for (i, text) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{text:>width$}", width = widths[i])?;
            }
        }
        Ok(())
    }
}
