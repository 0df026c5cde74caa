use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// The transform models, identified by their serialized tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Rotation, uniform scale with a y-flip, and translation.
    Similarity,
    /// General affine map.
    Affine,
    /// Planar homography.
    Projective,
    /// Second order polynomial with a projective denominator.
    Quadratic,
    /// Homography followed by invertible quadratic corrections.
    QuadraticV2,
}

impl TransformKind {
    /// All kinds, in order of increasing flexibility.
    pub const ALL: [TransformKind; 5] = [
        TransformKind::Similarity,
        TransformKind::Affine,
        TransformKind::Projective,
        TransformKind::Quadratic,
        TransformKind::QuadraticV2,
    ];

    /// The serialized tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformKind::Similarity => "similarity",
            TransformKind::Affine => "affine",
            TransformKind::Projective => "projective",
            TransformKind::Quadratic => "quadratic",
            TransformKind::QuadraticV2 => "quadratic2",
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformKind {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransformKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TransformError::UnknownTransformKind(s.to_string()))
    }
}

/// Serialized form of a fitted transform.
///
/// ```json
/// { "kind": "quadratic2", "matrix": [[..], [..], [..]], "extraCoefficients": [a, b, c, d] }
/// ```
///
/// The legacy keys `type` and `quadraticTerms` are accepted when reading.
/// The kind stays a plain string here so that an unknown tag is reported by
/// [`crate::Transform::from_record`] rather than by the JSON decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformRecord {
    /// Model tag, see [`TransformKind::as_str`].
    #[serde(alias = "type")]
    pub kind: String,
    /// Nested rows of the model matrix.
    pub matrix: Vec<Vec<f64>>,
    /// Correction coefficients `[a, b, c, d]`, only for `quadratic2`.
    #[serde(
        rename = "extraCoefficients",
        alias = "quadraticTerms",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub extra_coefficients: Option<Vec<f64>>,
}

impl TransformRecord {
    /// Create a record for `kind`.
    pub fn new(
        kind: TransformKind,
        matrix: Vec<Vec<f64>>,
        extra_coefficients: Option<Vec<f64>>,
    ) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            matrix,
            extra_coefficients,
        }
    }

    /// Parse the kind tag.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::UnknownTransformKind`] for an unrecognized tag.
    pub fn kind(&self) -> Result<TransformKind, TransformError> {
        self.kind.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() -> Result<(), TransformError> {
        for kind in TransformKind::ALL {
            assert_eq!(kind.as_str().parse::<TransformKind>()?, kind);
        }
        assert_eq!(TransformKind::QuadraticV2.to_string(), "quadratic2");
        assert!(matches!(
            "CameraModelTransform".parse::<TransformKind>(),
            Err(TransformError::UnknownTransformKind(s)) if s == "CameraModelTransform"
        ));
        Ok(())
    }

    #[test]
    fn test_record_keys() -> Result<(), serde_json::Error> {
        let record = TransformRecord::new(
            TransformKind::Affine,
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]],
            None,
        );
        let json = serde_json::to_value(&record)?;
        assert_eq!(json["kind"], "affine");
        assert!(json.get("extraCoefficients").is_none());

        let legacy: TransformRecord = serde_json::from_str(
            r#"{"type": "quadratic2",
                "matrix": [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
                "quadraticTerms": [0.1, 0.2, 0.3, 0.4]}"#,
        )?;
        assert_eq!(legacy.kind, "quadratic2");
        assert_eq!(legacy.extra_coefficients, Some(vec![0.1, 0.2, 0.3, 0.4]));
        Ok(())
    }
}
