use georef_linalg::{DenseMatrix, Point2D};

use super::{
    affine_params, check_params, homography_from_params, project, record_matrix, TransformModel,
};
use crate::error::TransformError;
use crate::record::{TransformKind, TransformRecord};

/// Output scale of [`QuadraticV2`].
///
/// The fit works on targets divided by this factor, which keeps the
/// matrix entries and the corrections at comparable magnitudes.
pub const SCALE: f64 = 1e7;

/// Homography followed by quadratic corrections that can be inverted in
/// closed form.
///
/// With `(x, y)` the projected point and `[a, b, c, d]` the corrections:
///
/// ```text
/// p = x + a x^2
/// q = y + b y^2
/// r = p + c q^2
/// s = q + d r^2
/// ```
///
/// and the output is `(r, s) * SCALE`. Parameters are the eight homography
/// entries followed by `a, b, c, d`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticV2 {
    matrix: DenseMatrix,
    coefficients: [f64; 4],
}

impl QuadraticV2 {
    /// Create the model from its 3x3 matrix and corrections `[a, b, c, d]`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidMatrixShape`] unless the matrix is 3x3.
    pub fn new(matrix: DenseMatrix, coefficients: [f64; 4]) -> Result<Self, TransformError> {
        if matrix.shape() != (3, 3) {
            return Err(TransformError::InvalidMatrixShape {
                kind: Self::KIND,
                expected: (3, 3),
                actual: matrix.shape(),
            });
        }
        Ok(Self {
            matrix,
            coefficients,
        })
    }

    /// The 3x3 matrix, in units of [`SCALE`].
    pub fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }

    /// The corrections `[a, b, c, d]`.
    pub fn coefficients(&self) -> [f64; 4] {
        self.coefficients
    }
}

impl TransformModel for QuadraticV2 {
    const KIND: TransformKind = TransformKind::QuadraticV2;
    const NUM_PARAMS: usize = 12;
    const MIN_POINTS: usize = 6;

    fn from_params(params: &[f64]) -> Result<Self, TransformError> {
        check_params(Self::KIND, params, Self::NUM_PARAMS)?;
        Ok(Self {
            matrix: homography_from_params(&params[..8])?,
            coefficients: [params[8], params[9], params[10], params[11]],
        })
    }

    fn forward(&self, point: Point2D) -> Point2D {
        let Point2D { x, y } = project(&self.matrix, point);
        let [a, b, c, d] = self.coefficients;

        let p = x + a * x * x;
        let q = y + b * y * y;
        let r = p + c * q * q;
        let s = q + d * r * r;

        Point2D::new(r * SCALE, s * SCALE)
    }

    /// Affine fit of the scaled-down targets, zero perspective terms and
    /// zero corrections.
    fn initial_params(to: &DenseMatrix, from: &DenseMatrix) -> Result<Vec<f64>, TransformError> {
        let mut params = affine_params(&to.scale(1.0 / SCALE), from)?;
        params.extend([0.0; 6]);
        Ok(params)
    }

    fn to_record(&self) -> TransformRecord {
        TransformRecord::new(
            Self::KIND,
            self.matrix.to_nested(),
            Some(self.coefficients.to_vec()),
        )
    }

    fn from_record(record: &TransformRecord) -> Result<Self, TransformError> {
        let matrix = record_matrix(Self::KIND, record, (3, 3))?;
        let extra = record
            .extra_coefficients
            .as_deref()
            .ok_or(TransformError::MissingCoefficients)?;
        let coefficients: [f64; 4] =
            extra.try_into().map_err(|_| TransformError::InvalidParameterCount {
                kind: Self::KIND,
                expected: 4,
                actual: extra.len(),
            })?;
        Self::new(matrix, coefficients)
    }
}
