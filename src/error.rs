use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Caller-supplied data does not cover the tableau it is meant for.
    #[error("expected at least {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    DimensionMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("pivot entry at row {row}, column {col} is zero")]
    DegeneratePivot {
        row: usize,
        col: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
