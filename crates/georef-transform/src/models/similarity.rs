use georef_linalg::{DenseMatrix, Point2D};

use super::{check_params, project, record_matrix, TransformModel};
use crate::error::TransformError;
use crate::record::{TransformKind, TransformRecord};

/// Rotation, uniform scale and translation, with the y axis flipped.
///
/// Parameters `[tx, ty, scale, theta]` build `T(tx, ty) * S(scale, -scale) * R(theta)`.
/// The flip maps image rows, which grow downwards, onto northings.
#[derive(Debug, Clone, PartialEq)]
pub struct Similarity {
    matrix: DenseMatrix,
}

impl Similarity {
    /// The 3x3 homogeneous matrix.
    pub fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }
}

impl TransformModel for Similarity {
    const KIND: TransformKind = TransformKind::Similarity;
    const NUM_PARAMS: usize = 4;
    const MIN_POINTS: usize = 2;

    fn from_params(params: &[f64]) -> Result<Self, TransformError> {
        check_params(Self::KIND, params, Self::NUM_PARAMS)?;
        let (tx, ty, scale, theta) = (params[0], params[1], params[2], params[3]);
        let (sin, cos) = theta.sin_cos();
        // T * diag(s, -s, 1) * R, expanded
        let matrix = DenseMatrix::from_row_slice(
            3,
            3,
            &[
                scale * cos,
                -scale * sin,
                tx,
                -scale * sin,
                -scale * cos,
                ty,
                0.0,
                0.0,
                1.0,
            ],
        )?;
        Ok(Self { matrix })
    }

    fn forward(&self, point: Point2D) -> Point2D {
        project(&self.matrix, point)
    }

    /// Closed-form estimate from the first two tie points.
    ///
    /// This differs on purpose from the plain angle and centroid differences,
    /// which are wrong under the y flip. The target vector's y is negated
    /// before comparing angles so both vectors share the handedness of the
    /// flipped scale. The translation maps the source centroid onto the
    /// target centroid through the rotated and scaled linear part.
    fn initial_params(to: &DenseMatrix, from: &DenseMatrix) -> Result<Vec<f64>, TransformError> {
        if from.cols() < Self::MIN_POINTS {
            return Err(TransformError::InsufficientTiePoints {
                required: Self::MIN_POINTS,
                actual: from.cols(),
            });
        }
        let (tvx, tvy) = (to[(0, 1)] - to[(0, 0)], to[(1, 1)] - to[(1, 0)]);
        let (fvx, fvy) = (from[(0, 1)] - from[(0, 0)], from[(1, 1)] - from[(1, 0)]);
        let from_norm = fvx.hypot(fvy);
        if from_norm == 0.0 {
            return Err(TransformError::DegenerateTiePoints);
        }

        let scale = tvx.hypot(tvy) / from_norm;
        let theta = (-tvy).atan2(tvx) - fvy.atan2(fvx);

        let linear = Self::from_params(&[0.0, 0.0, scale, theta])?;
        let from_centroid = from.mean_column();
        let to_centroid = to.mean_column();
        let moved = linear.forward(Point2D::new(from_centroid[(0, 0)], from_centroid[(1, 0)]));

        Ok(vec![
            to_centroid[(0, 0)] - moved.x,
            to_centroid[(1, 0)] - moved.y,
            scale,
            theta,
        ])
    }

    fn to_record(&self) -> TransformRecord {
        TransformRecord::new(Self::KIND, self.matrix.to_nested(), None)
    }

    fn from_record(record: &TransformRecord) -> Result<Self, TransformError> {
        let matrix = record_matrix(Self::KIND, record, (3, 3))?;
        Ok(Self { matrix })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tie_point::{split_points, TiePoint};
    use approx::assert_relative_eq;

    #[test]
    fn test_from_params_flips_y() -> Result<(), TransformError> {
        let t = Similarity::from_params(&[10.0, 20.0, 2.0, 0.0])?;
        let p = t.forward(Point2D::new(1.0, 1.0));
        assert_relative_eq!(p.x, 12.0);
        assert_relative_eq!(p.y, 18.0);
        Ok(())
    }

    #[test]
    fn test_initial_params_exact_for_two_points() -> Result<(), TransformError> {
        let truth = Similarity::from_params(&[-500.0, 1200.0, 3.5, 0.7])?;
        let sources = [Point2D::new(10.0, 40.0), Point2D::new(250.0, -30.0)];
        let points: Vec<TiePoint> = sources
            .iter()
            .map(|&p| TiePoint::new(truth.forward(p), p))
            .collect();
        let (to, from) = split_points(&points);

        let seed = Similarity::initial_params(&to, &from)?;
        assert_relative_eq!(seed[0], -500.0, epsilon = 1e-9);
        assert_relative_eq!(seed[1], 1200.0, epsilon = 1e-9);
        assert_relative_eq!(seed[2], 3.5, epsilon = 1e-12);
        assert_relative_eq!(seed[3], 0.7, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_initial_params_degenerate() {
        let points = [
            TiePoint::from([0.0, 0.0, 5.0, 5.0]),
            TiePoint::from([1.0, 1.0, 5.0, 5.0]),
        ];
        let (to, from) = split_points(&points);
        assert!(matches!(
            Similarity::initial_params(&to, &from),
            Err(TransformError::DegenerateTiePoints)
        ));
    }

    #[test]
    fn test_wrong_param_count() {
        assert!(matches!(
            Similarity::from_params(&[1.0, 2.0, 3.0]),
            Err(TransformError::InvalidParameterCount {
                kind: TransformKind::Similarity,
                expected: 4,
                actual: 3
            })
        ));
    }
}
