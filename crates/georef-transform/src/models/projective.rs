use georef_linalg::{DenseMatrix, Point2D};

use super::{
    affine_params, check_params, homography_from_params, project, record_matrix, TransformModel,
};
use crate::error::TransformError;
use crate::record::{TransformKind, TransformRecord};

/// Planar homography `[[p0, p1, p2], [p3, p4, p5], [p6, p7, 1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Projective {
    matrix: DenseMatrix,
}

impl Projective {
    /// Wrap a 3x3 homogeneous matrix.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidMatrixShape`] unless the matrix is 3x3.
    pub fn from_matrix(matrix: DenseMatrix) -> Result<Self, TransformError> {
        if matrix.shape() != (3, 3) {
            return Err(TransformError::InvalidMatrixShape {
                kind: Self::KIND,
                expected: (3, 3),
                actual: matrix.shape(),
            });
        }
        Ok(Self { matrix })
    }

    /// The 3x3 homogeneous matrix.
    pub fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }
}

impl TransformModel for Projective {
    const KIND: TransformKind = TransformKind::Projective;
    const NUM_PARAMS: usize = 8;
    const MIN_POINTS: usize = 4;

    fn from_params(params: &[f64]) -> Result<Self, TransformError> {
        check_params(Self::KIND, params, Self::NUM_PARAMS)?;
        Ok(Self {
            matrix: homography_from_params(params)?,
        })
    }

    fn forward(&self, point: Point2D) -> Point2D {
        project(&self.matrix, point)
    }

    /// Affine fit with zero perspective terms.
    fn initial_params(to: &DenseMatrix, from: &DenseMatrix) -> Result<Vec<f64>, TransformError> {
        let mut params = affine_params(to, from)?;
        params.extend([0.0, 0.0]);
        Ok(params)
    }

    fn to_record(&self) -> TransformRecord {
        TransformRecord::new(Self::KIND, self.matrix.to_nested(), None)
    }

    fn from_record(record: &TransformRecord) -> Result<Self, TransformError> {
        Self::from_matrix(record_matrix(Self::KIND, record, (3, 3))?)
    }
}
