use thiserror::Error;

/// Error types for the coordinate projector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjError {
    /// The image dimension cannot define a zoom level
    #[error("Invalid image size: maximum dimension must be positive and finite, got {0}")]
    InvalidImageSize(f64),

    /// A pixel conversion was requested before an image was loaded
    #[error("Projector is not initialized: load an image size first")]
    Uninitialized,
}
