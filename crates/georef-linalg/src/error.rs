use thiserror::Error;

/// Error type for dense matrix operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// The operand shapes are incompatible for the requested operation.
    #[error("Shape mismatch in {op}: lhs shape {lhs:?}, rhs shape {rhs:?}")]
    ShapeMismatch {
        /// Name of the operation that failed.
        op: &'static str,
        /// Shape of the left operand as (rows, cols).
        lhs: (usize, usize),
        /// Shape of the right operand as (rows, cols).
        rhs: (usize, usize),
    },

    /// The data length does not match the requested shape.
    #[error("Invalid shape: expected {expected} elements, got {actual}")]
    InvalidShape {
        /// Number of elements implied by the shape.
        expected: usize,
        /// Number of elements provided.
        actual: usize,
    },

    /// The operation requires a square matrix.
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// The matrix is not invertible.
    #[error("Singular matrix")]
    SingularMatrix,

    /// Nested rows have different lengths.
    #[error("Nested rows have different lengths")]
    RaggedRows,

    /// A matrix needs at least one row and one column.
    #[error("Matrix has no elements")]
    Empty,
}
