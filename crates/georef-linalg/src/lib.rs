#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for matrix operations.
pub mod error;

/// Linear least squares via the normal equations.
pub mod lstsq;

/// Dense row-major matrix.
pub mod matrix;

/// 2D point type shared by pixel and map spaces.
pub mod point;

pub use error::LinalgError;
pub use lstsq::least_squares;
pub use matrix::DenseMatrix;
pub use point::Point2D;
