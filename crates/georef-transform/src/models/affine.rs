use georef_linalg::{DenseMatrix, Point2D};
use georef_optim::NonlinearSolver;

use super::{affine_params, check_params, project, record_matrix, FitParams, TransformModel};
use crate::error::TransformError;
use crate::record::{TransformKind, TransformRecord};
use crate::tie_point::{flatten_points, matrix_points};

/// General affine map with matrix `[[a, b, c], [d, e, f], [0, 0, 1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Affine {
    matrix: DenseMatrix,
}

impl Affine {
    /// The 3x3 homogeneous matrix.
    pub fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }
}

impl TransformModel for Affine {
    const KIND: TransformKind = TransformKind::Affine;
    const NUM_PARAMS: usize = 6;
    const MIN_POINTS: usize = 3;

    fn from_params(params: &[f64]) -> Result<Self, TransformError> {
        check_params(Self::KIND, params, Self::NUM_PARAMS)?;
        let mut data = [0.0; 9];
        data[..6].copy_from_slice(params);
        data[8] = 1.0;
        let matrix = DenseMatrix::from_row_slice(3, 3, &data)?;
        Ok(Self { matrix })
    }

    fn forward(&self, point: Point2D) -> Point2D {
        project(&self.matrix, point)
    }

    fn initial_params(to: &DenseMatrix, from: &DenseMatrix) -> Result<Vec<f64>, TransformError> {
        affine_params(to, from)
    }

    /// Linear least squares, exact for three non-collinear points.
    fn fit(
        to: &DenseMatrix,
        from: &DenseMatrix,
        _solver: &dyn NonlinearSolver,
    ) -> Result<FitParams, TransformError> {
        let params = affine_params(to, from)?;
        let transform = Self::from_params(&params)?;
        let mapped: Vec<Point2D> = matrix_points(from)
            .into_iter()
            .map(|p| transform.forward(p))
            .collect();
        let cost: f64 = flatten_points(&mapped)
            .iter()
            .zip(to.flatten().as_slice())
            .map(|(p, t)| (p - t).powi(2))
            .sum();
        Ok(FitParams {
            params,
            cost,
            iterations: 0,
            converged: true,
        })
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
    use georef_optim::LevenbergMarquardt;

    #[test]
    fn test_fit_three_points_exact() -> Result<(), TransformError> {
        let points = [
            TiePoint::from([-8_240_000.0, 4_970_000.0, 0.0, 0.0]),
            TiePoint::from([-8_230_000.0, 4_969_000.0, 1000.0, 0.0]),
            TiePoint::from([-8_241_000.0, 4_960_000.0, 0.0, 800.0]),
        ];
        let (to, from) = split_points(&points);
        let fit = Affine::fit(&to, &from, &LevenbergMarquardt::default())?;
        assert!(fit.converged);
        assert_eq!(fit.iterations, 0);

        let transform = Affine::from_params(&fit.params)?;
        for p in &points {
            let mapped = transform.forward(p.source());
            assert_relative_eq!(mapped.x, p.target().x, max_relative = 1e-9);
            assert_relative_eq!(mapped.y, p.target().y, max_relative = 1e-9);
        }
        assert_eq!(transform.matrix().get(2, 0), Some(0.0));
        assert_eq!(transform.matrix().get(2, 2), Some(1.0));
        Ok(())
    }

    #[test]
    fn test_record_rejects_coefficients() -> Result<(), TransformError> {
        let mut record = Affine::from_params(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0])?.to_record();
        record.extra_coefficients = Some(vec![0.0; 4]);
        assert!(matches!(
            Affine::from_record(&record),
            Err(TransformError::UnexpectedCoefficients(TransformKind::Affine))
        ));
        Ok(())
    }
}
