use georef_linalg::Point2D;

use crate::error::TransformError;
use crate::models::{Affine, Projective, Quadratic, QuadraticV2, Similarity, TransformModel};
use crate::record::{TransformKind, TransformRecord};
use crate::tie_point::TiePoint;

/// A fitted transform of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// See [`Similarity`].
    Similarity(Similarity),
    /// See [`Affine`].
    Affine(Affine),
    /// See [`Projective`].
    Projective(Projective),
    /// See [`Quadratic`].
    Quadratic(Quadratic),
    /// See [`QuadraticV2`].
    QuadraticV2(QuadraticV2),
}

macro_rules! impl_from_model {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Transform {
                fn from(model: $variant) -> Self {
                    Transform::$variant(model)
                }
            }
        )*
    };
}

impl_from_model!(Similarity, Affine, Projective, Quadratic, QuadraticV2);

impl Transform {
    /// The model kind.
    pub fn kind(&self) -> TransformKind {
        match self {
            Transform::Similarity(_) => TransformKind::Similarity,
            Transform::Affine(_) => TransformKind::Affine,
            Transform::Projective(_) => TransformKind::Projective,
            Transform::Quadratic(_) => TransformKind::Quadratic,
            Transform::QuadraticV2(_) => TransformKind::QuadraticV2,
        }
    }

    /// Map a source point to the target space.
    pub fn forward(&self, point: Point2D) -> Point2D {
        match self {
            Transform::Similarity(t) => t.forward(point),
            Transform::Affine(t) => t.forward(point),
            Transform::Projective(t) => t.forward(point),
            Transform::Quadratic(t) => t.forward(point),
            Transform::QuadraticV2(t) => t.forward(point),
        }
    }

    /// Map every point of a slice.
    pub fn forward_points(&self, points: &[Point2D]) -> Vec<Point2D> {
        points.iter().map(|p| self.forward(*p)).collect()
    }

    /// Distance between the mapped source and the target of each tie point.
    pub fn residuals(&self, points: &[TiePoint]) -> Vec<f64> {
        points
            .iter()
            .map(|p| self.forward(p.source()).distance(&p.target()))
            .collect()
    }

    /// Root mean square of [`Transform::residuals`], zero without tie points.
    pub fn rmse(&self, points: &[TiePoint]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.residuals(points).iter().map(|r| r * r).sum();
        (sum / points.len() as f64).sqrt()
    }

    /// Serialize to a record.
    pub fn to_record(&self) -> TransformRecord {
        match self {
            Transform::Similarity(t) => t.to_record(),
            Transform::Affine(t) => t.to_record(),
            Transform::Projective(t) => t.to_record(),
            Transform::Quadratic(t) => t.to_record(),
            Transform::QuadraticV2(t) => t.to_record(),
        }
    }

    /// Rebuild a transform from a record.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::UnknownTransformKind`] for an unrecognized
    /// tag, or the model's error for a malformed matrix or coefficients.
    pub fn from_record(record: &TransformRecord) -> Result<Self, TransformError> {
        Ok(match record.kind()? {
            TransformKind::Similarity => Similarity::from_record(record)?.into(),
            TransformKind::Affine => Affine::from_record(record)?.into(),
            TransformKind::Projective => Projective::from_record(record)?.into(),
            TransformKind::Quadratic => Quadratic::from_record(record)?.into(),
            TransformKind::QuadraticV2 => QuadraticV2::from_record(record)?.into(),
        })
    }

    /// Rebuild a transform from its JSON record.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Json`] for malformed JSON, otherwise see
    /// [`Transform::from_record`].
    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        let record: TransformRecord = serde_json::from_str(json)?;
        Self::from_record(&record)
    }

    /// Serialize to a JSON record.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Json`] if encoding fails.
    pub fn to_json(&self) -> Result<String, TransformError> {
        Ok(serde_json::to_string(&self.to_record())?)
    }
}
