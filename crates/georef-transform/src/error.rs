use georef_linalg::LinalgError;
use georef_optim::OptimizerError;
use georef_proj::ProjError;
use thiserror::Error;

use crate::record::TransformKind;

/// Error types for transform fitting and deserialization.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Not enough tie points for the requested model
    #[error("Transform requires at least {required} tie points, got {actual}")]
    InsufficientTiePoints {
        /// Minimum number of tie points for the model
        required: usize,
        /// Number of tie points provided
        actual: usize,
    },

    /// The serialized kind tag is not one of the known models
    #[error("Unknown transform kind: {0:?}")]
    UnknownTransformKind(String),

    /// The nonlinear solver stopped before converging
    #[error("Solver did not converge after {iterations} iterations (cost {cost:e})")]
    SolverDidNotConverge {
        /// Iterations performed
        iterations: usize,
        /// Sum of squared residuals at the returned parameters
        cost: f64,
    },

    /// Parameter vector with the wrong length for the model
    #[error("Invalid parameter count for {kind} transform: expected {expected}, got {actual}")]
    InvalidParameterCount {
        /// Model the parameters were meant for
        kind: TransformKind,
        /// Expected number of parameters
        expected: usize,
        /// Number of parameters provided
        actual: usize,
    },

    /// Serialized matrix with the wrong shape for the model
    #[error("Invalid matrix shape for {kind} transform: expected {expected:?}, got {actual:?}")]
    InvalidMatrixShape {
        /// Model the matrix was meant for
        kind: TransformKind,
        /// Expected (rows, cols)
        expected: (usize, usize),
        /// Provided (rows, cols)
        actual: (usize, usize),
    },

    /// A quadratic2 record without its correction coefficients
    #[error("quadratic2 transform record has no extra coefficients")]
    MissingCoefficients,

    /// Extra coefficients on a record whose model takes none
    #[error("{0} transform record must not carry extra coefficients")]
    UnexpectedCoefficients(TransformKind),

    /// The first two tie points coincide in the source space
    #[error("Tie points are degenerate: the first two source points coincide")]
    DegenerateTiePoints,

    /// Linear algebra error
    #[error(transparent)]
    Linalg(#[from] LinalgError),

    /// Nonlinear solver error
    #[error(transparent)]
    Optimizer(#[from] OptimizerError),

    /// Projection error
    #[error(transparent)]
    Proj(#[from] ProjError),

    /// JSON encoding or decoding error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
