//! Transform models fitted from tie points.
//!
//! Every model is described by a fixed-length parameter vector. Models with
//! a closed-form solution override [`TransformModel::fit`]; the others are
//! refined by a [`NonlinearSolver`] starting from [`TransformModel::initial_params`].

mod affine;
mod projective;
mod quadratic;
mod quadratic2;
mod similarity;

pub use affine::Affine;
pub use projective::Projective;
pub use quadratic::Quadratic;
pub use quadratic2::{QuadraticV2, SCALE};
pub use similarity::Similarity;

use std::cell::RefCell;

use georef_linalg::{least_squares, DenseMatrix, Point2D};
use georef_optim::NonlinearSolver;

use crate::error::TransformError;
use crate::record::{TransformKind, TransformRecord};
use crate::tie_point::{flatten_points, matrix_points};

/// Parameters produced by a fit, with the solver diagnostics.
#[derive(Debug, Clone)]
pub struct FitParams {
    /// Model parameters, see [`TransformModel::from_params`].
    pub params: Vec<f64>,
    /// Sum of squared residuals over the flattened target coordinates.
    pub cost: f64,
    /// Solver iterations, zero for closed-form fits.
    pub iterations: usize,
    /// Whether the fit converged.
    pub converged: bool,
}

/// A parametric mapping from source points to target points.
///
/// Target and source points are passed as (2, N) matrices as produced by
/// [`crate::split_points`].
pub trait TransformModel: Sized {
    /// Serialized tag of the model.
    const KIND: TransformKind;

    /// Length of the parameter vector.
    const NUM_PARAMS: usize;

    /// Minimum number of tie points to determine the parameters.
    const MIN_POINTS: usize;

    /// Build the model from its parameter vector.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidParameterCount`] if `params.len() != NUM_PARAMS`.
    fn from_params(params: &[f64]) -> Result<Self, TransformError>;

    /// Map a source point to the target space.
    fn forward(&self, point: Point2D) -> Point2D;

    /// Starting parameters for the iterative fit.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed cannot be computed from the points.
    fn initial_params(to: &DenseMatrix, from: &DenseMatrix) -> Result<Vec<f64>, TransformError>;

    /// Fit the parameters to the tie points.
    ///
    /// Defaults to refining [`TransformModel::initial_params`] with `solver`.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed or the solver fails.
    fn fit(
        to: &DenseMatrix,
        from: &DenseMatrix,
        solver: &dyn NonlinearSolver,
    ) -> Result<FitParams, TransformError> {
        fit_nonlinear::<Self>(to, from, solver)
    }

    /// Serialize the model.
    fn to_record(&self) -> TransformRecord;

    /// Rebuild the model from a record of the same kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrix shape or the coefficients do not fit the model.
    fn from_record(record: &TransformRecord) -> Result<Self, TransformError>;
}

/// Generic fit: minimize the distance between the mapped source points and
/// the target points, both flattened to `[x0..xn, y0..yn]`.
pub(crate) fn fit_nonlinear<M: TransformModel>(
    to: &DenseMatrix,
    from: &DenseMatrix,
    solver: &dyn NonlinearSolver,
) -> Result<FitParams, TransformError> {
    let initial = M::initial_params(to, from)?;
    log::debug!("{} seed parameters: {:?}", M::KIND, initial);

    let target = to.flatten();
    let sources = matrix_points(from);
    // the solver only sees predictions, so a rejected parameter vector is kept here
    let rejected = RefCell::new(None);
    let model = |params: &[f64]| -> Vec<f64> {
        match M::from_params(params) {
            Ok(transform) => {
                let mapped: Vec<Point2D> = sources.iter().map(|p| transform.forward(*p)).collect();
                flatten_points(&mapped)
            }
            Err(e) => {
                rejected.borrow_mut().get_or_insert(e);
                Vec::new()
            }
        }
    };

    let report = solver.minimize(target.as_slice(), &model, &initial);
    if let Some(e) = rejected.into_inner() {
        return Err(e);
    }
    let report = report?;
    Ok(FitParams {
        converged: report.converged(),
        params: report.params,
        cost: report.cost,
        iterations: report.iterations,
    })
}

/// Least squares affine parameters `[a, b, c, d, e, f]` with
/// `to = [[a, b, c], [d, e, f]] * [x, y, 1]`.
///
/// Every tie point contributes one row for x and one for y.
pub(crate) fn affine_params(
    to: &DenseMatrix,
    from: &DenseMatrix,
) -> Result<Vec<f64>, TransformError> {
    let n = from.cols();
    let mut v = DenseMatrix::zeros(2 * n, 1);
    let mut u = DenseMatrix::zeros(2 * n, 6);
    for i in 0..n {
        let (x, y) = (from[(0, i)], from[(1, i)]);
        v[(2 * i, 0)] = to[(0, i)];
        v[(2 * i + 1, 0)] = to[(1, i)];

        u[(2 * i, 0)] = x;
        u[(2 * i, 1)] = y;
        u[(2 * i, 2)] = 1.0;
        u[(2 * i + 1, 3)] = x;
        u[(2 * i + 1, 4)] = y;
        u[(2 * i + 1, 5)] = 1.0;
    }
    let p = least_squares(&v, &u)?;
    Ok(p.as_slice().to_vec())
}

/// Check the parameter count of a model.
pub(crate) fn check_params(
    kind: TransformKind,
    params: &[f64],
    expected: usize,
) -> Result<(), TransformError> {
    if params.len() != expected {
        return Err(TransformError::InvalidParameterCount {
            kind,
            expected,
            actual: params.len(),
        });
    }
    Ok(())
}

/// Parse the matrix of a record and check its shape and extra coefficients.
pub(crate) fn record_matrix(
    kind: TransformKind,
    record: &TransformRecord,
    shape: (usize, usize),
) -> Result<DenseMatrix, TransformError> {
    if kind != TransformKind::QuadraticV2 && record.extra_coefficients.is_some() {
        return Err(TransformError::UnexpectedCoefficients(kind));
    }
    let matrix = DenseMatrix::from_nested(&record.matrix)?;
    if matrix.shape() != shape {
        return Err(TransformError::InvalidMatrixShape {
            kind,
            expected: shape,
            actual: matrix.shape(),
        });
    }
    Ok(matrix)
}

/// Apply a 3x3 matrix to `[x, y, 1]` and normalize by the third coordinate.
pub(crate) fn project(m: &DenseMatrix, p: Point2D) -> Point2D {
    let x = m[(0, 0)] * p.x + m[(0, 1)] * p.y + m[(0, 2)];
    let y = m[(1, 0)] * p.x + m[(1, 1)] * p.y + m[(1, 2)];
    let z = m[(2, 0)] * p.x + m[(2, 1)] * p.y + m[(2, 2)];
    Point2D::new(x / z, y / z)
}

/// The 3x3 matrix `[[p0, p1, p2], [p3, p4, p5], [p6, p7, 1]]`.
pub(crate) fn homography_from_params(p: &[f64]) -> Result<DenseMatrix, TransformError> {
    Ok(DenseMatrix::from_row_slice(
        3,
        3,
        &[p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], 1.0],
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tie_point::{split_points, TiePoint};
    use approx::assert_relative_eq;
    use georef_optim::{OptimizerError, SolverReport, TerminationReason};

    #[test]
    fn test_affine_params_exact() -> Result<(), TransformError> {
        // to = [[2, 1, 10], [-1, 3, 20]] * [x, y, 1]
        let points: Vec<TiePoint> = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [5.0, 7.0]]
            .iter()
            .map(|&[x, y]| TiePoint::from([2.0 * x + y + 10.0, -x + 3.0 * y + 20.0, x, y]))
            .collect();
        let (to, from) = split_points(&points);
        let p = affine_params(&to, &from)?;
        let expected = [2.0, 1.0, 10.0, -1.0, 3.0, 20.0];
        for (a, b) in p.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_affine_params_collinear() {
        let points = [
            TiePoint::from([0.0, 0.0, 0.0, 0.0]),
            TiePoint::from([1.0, 1.0, 1.0, 1.0]),
            TiePoint::from([2.0, 2.0, 2.0, 2.0]),
        ];
        let (to, from) = split_points(&points);
        assert!(matches!(
            affine_params(&to, &from),
            Err(TransformError::Linalg(_))
        ));
    }

    /// Evaluates the model once with the last parameter dropped.
    struct TruncatingSolver;

    impl NonlinearSolver for TruncatingSolver {
        fn minimize(
            &self,
            _target: &[f64],
            model: &dyn Fn(&[f64]) -> Vec<f64>,
            initial: &[f64],
        ) -> Result<SolverReport, OptimizerError> {
            let prediction = model(&initial[..initial.len() - 1]);
            Ok(SolverReport {
                params: initial.to_vec(),
                cost: prediction.len() as f64,
                iterations: 1,
                termination: TerminationReason::MaxIterations,
            })
        }
    }

    #[test]
    fn test_fit_reports_rejected_params() {
        let points: Vec<TiePoint> = [[0.0, 0.0], [100.0, 0.0], [0.0, 100.0], [100.0, 100.0]]
            .iter()
            .map(|&[x, y]| TiePoint::from([2.0 * x + 5.0, 3.0 * y - 1.0, x, y]))
            .collect();
        let (to, from) = split_points(&points);
        assert!(matches!(
            fit_nonlinear::<Projective>(&to, &from, &TruncatingSolver),
            Err(TransformError::InvalidParameterCount {
                kind: TransformKind::Projective,
                expected: 8,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_project_normalizes() -> Result<(), TransformError> {
        let m = DenseMatrix::from_nested(&[[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]])?;
        let p = project(&m, Point2D::new(3.0, -4.0));
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, -4.0);
        Ok(())
    }
}
