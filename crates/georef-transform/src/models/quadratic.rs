use georef_linalg::{DenseMatrix, Point2D};

use super::{affine_params, check_params, record_matrix, TransformModel};
use crate::error::TransformError;
use crate::record::{TransformKind, TransformRecord};

/// Second order polynomial map over `[x^2, y^2, x, y, 1]`.
///
/// The 3x5 matrix is
///
/// ```text
/// [[p0, p1, p2,  p3,  p4],
///  [p5, p6, p7,  p8,  p9],
///  [0,  0,  p10, p11, 1 ]]
/// ```
///
/// and the third row normalizes the result like a homography.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadratic {
    matrix: DenseMatrix,
}

impl Quadratic {
    /// The 3x5 matrix.
    pub fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }
}

impl TransformModel for Quadratic {
    const KIND: TransformKind = TransformKind::Quadratic;
    const NUM_PARAMS: usize = 12;
    const MIN_POINTS: usize = 6;

    fn from_params(params: &[f64]) -> Result<Self, TransformError> {
        check_params(Self::KIND, params, Self::NUM_PARAMS)?;
        let mut data = [0.0; 15];
        data[..10].copy_from_slice(&params[..10]);
        data[12] = params[10];
        data[13] = params[11];
        data[14] = 1.0;
        let matrix = DenseMatrix::from_row_slice(3, 5, &data)?;
        Ok(Self { matrix })
    }

    fn forward(&self, point: Point2D) -> Point2D {
        let m = &self.matrix;
        let u = [point.x * point.x, point.y * point.y, point.x, point.y, 1.0];
        let row = |r: usize| (0..5).map(|c| m[(r, c)] * u[c]).sum::<f64>();
        let z = row(2);
        Point2D::new(row(0) / z, row(1) / z)
    }

    /// Affine fit interleaved with zero quadratic and perspective terms.
    fn initial_params(to: &DenseMatrix, from: &DenseMatrix) -> Result<Vec<f64>, TransformError> {
        let a = affine_params(to, from)?;
        Ok(vec![
            0.0, 0.0, a[0], a[1], a[2], //
            0.0, 0.0, a[3], a[4], a[5], //
            0.0, 0.0,
        ])
    }

    fn to_record(&self) -> TransformRecord {
        TransformRecord::new(Self::KIND, self.matrix.to_nested(), None)
    }

    fn from_record(record: &TransformRecord) -> Result<Self, TransformError> {
        let matrix = record_matrix(Self::KIND, record, (3, 5))?;
        Ok(Self { matrix })
    }
}
