#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Tie points map an uncalibrated image onto Web-Mercator meters. The
//! [`TransformSelector`] picks a model from the number of tie points, fits
//! it, and returns a [`Transform`] that can be evaluated, serialized to a
//! [`TransformRecord`] and composed with the projection in [`geo`].

mod error;
mod record;
mod selector;
mod tie_point;
mod transform;

pub mod geo;
pub mod models;

pub use error::TransformError;
pub use models::{
    Affine, FitParams, Projective, Quadratic, QuadraticV2, Similarity, TransformModel, SCALE,
};
pub use record::{TransformKind, TransformRecord};
pub use selector::{FitOutcome, TransformSelector};
pub use tie_point::{split_points, TiePoint};
pub use transform::Transform;
