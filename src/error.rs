//! Error types for trace_stitch.
//!
//! Recoverable failures are represented by [`TraceStitchError`] and
//! propagated via `Result`. Precondition violations — reading an absent
//! column, sorting on a key some row lacks — are programming errors and
//! panic; each panicking call site documents its preconditions under
//! `# Panics`. Data-shape conditions (missing join keys, missing stamps,
//! empty inputs) are never errors: the merge algorithms absorb them
//! according to their outer policy.

/// Primary error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum TraceStitchError {
    /// A merge strategy string could not be parsed.
    #[error("unknown merge strategy: {0} (expected inner, left, right or outer)")]
    UnknownMergeHow(String),

    /// A response-time case string could not be parsed.
    #[error("unknown response-time case: {0} (expected best, worst or all)")]
    UnknownResponseCase(String),

    /// A response-time table needs at least a start and an end column.
    #[error("response time needs at least two declared columns, got {0}")]
    TooFewColumns(usize),

    /// A records JSON payload was malformed or violated the column rules.
    #[error("records deserialization failed: {0}")]
    Deserialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = TraceStitchError::UnknownMergeHow("sideways".into());
        assert_eq!(
            err.to_string(),
            "unknown merge strategy: sideways (expected inner, left, right or outer)"
        );

        let err = TraceStitchError::TooFewColumns(1);
        assert_eq!(
            err.to_string(),
            "response time needs at least two declared columns, got 1"
        );
    }
}
