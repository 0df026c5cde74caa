use georef_linalg::DenseMatrix;
use georef_optim::{LevenbergMarquardt, NonlinearSolver};

use crate::error::TransformError;
use crate::models::{
    Affine, FitParams, Projective, Quadratic, QuadraticV2, Similarity, TransformModel,
};
use crate::record::TransformKind;
use crate::tie_point::{split_points, TiePoint};
use crate::transform::Transform;

/// A fitted transform with the fit diagnostics.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    /// The fitted transform.
    pub transform: Transform,
    /// Whether the solver converged. Closed-form fits always do.
    pub converged: bool,
    /// Solver iterations.
    pub iterations: usize,
    /// Sum of squared coordinate residuals.
    pub cost: f64,
    /// Root mean square distance between mapped sources and targets.
    pub rmse: f64,
}

impl FitOutcome {
    /// Return the transform, or an error if the solver did not converge.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::SolverDidNotConverge`] for a non-converged fit.
    pub fn into_converged(self) -> Result<Transform, TransformError> {
        if self.converged {
            Ok(self.transform)
        } else {
            Err(TransformError::SolverDidNotConverge {
                iterations: self.iterations,
                cost: self.cost,
            })
        }
    }
}

/// Picks a transform model from the number of tie points and fits it.
///
/// | tie points | model |
/// |------------|-------|
/// | 2          | [`Similarity`] |
/// | 3          | [`Affine`] |
/// | 4 to 6     | [`Projective`] |
/// | 7 or more  | [`QuadraticV2`] |
///
/// Example:
///
/// ```
/// use georef_transform::{TiePoint, TransformKind, TransformSelector};
///
/// let points = [
///     TiePoint::from([100.0, 200.0, 0.0, 0.0]),
///     TiePoint::from([300.0, 200.0, 10.0, 0.0]),
///     TiePoint::from([100.0, 100.0, 0.0, 5.0]),
/// ];
/// let outcome = TransformSelector::new().fit(&points).unwrap();
/// assert_eq!(outcome.transform.kind(), TransformKind::Affine);
/// assert!(outcome.rmse < 1e-9);
/// ```
pub struct TransformSelector {
    solver: Box<dyn NonlinearSolver>,
}

impl Default for TransformSelector {
    fn default() -> Self {
        Self {
            solver: Box::new(LevenbergMarquardt::default()),
        }
    }
}

impl TransformSelector {
    /// Create a selector using [`LevenbergMarquardt`] with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another nonlinear solver for the iterative models.
    pub fn with_solver(mut self, solver: impl NonlinearSolver + 'static) -> Self {
        self.solver = Box::new(solver);
        self
    }

    /// The model used for `n` tie points.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InsufficientTiePoints`] for fewer than two points.
    pub fn kind_for_count(n: usize) -> Result<TransformKind, TransformError> {
        match n {
            0 | 1 => Err(TransformError::InsufficientTiePoints {
                required: 2,
                actual: n,
            }),
            2 => Ok(TransformKind::Similarity),
            3 => Ok(TransformKind::Affine),
            4..=6 => Ok(TransformKind::Projective),
            _ => Ok(TransformKind::QuadraticV2),
        }
    }

    /// Minimum number of tie points for a model.
    pub fn min_points(kind: TransformKind) -> usize {
        match kind {
            TransformKind::Similarity => Similarity::MIN_POINTS,
            TransformKind::Affine => Affine::MIN_POINTS,
            TransformKind::Projective => Projective::MIN_POINTS,
            TransformKind::Quadratic => Quadratic::MIN_POINTS,
            TransformKind::QuadraticV2 => QuadraticV2::MIN_POINTS,
        }
    }

    /// Fit the model picked by [`TransformSelector::kind_for_count`].
    ///
    /// A solver that stops without converging is not an error; check
    /// [`FitOutcome::converged`] or use [`FitOutcome::into_converged`].
    ///
    /// # Errors
    ///
    /// Returns an error for too few or degenerate tie points, or a solver failure.
    pub fn fit(&self, points: &[TiePoint]) -> Result<FitOutcome, TransformError> {
        let kind = Self::kind_for_count(points.len())?;
        self.fit_kind(kind, points)
    }

    /// Fit a caller-chosen model.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InsufficientTiePoints`] below the model's
    /// minimum, or an error for degenerate tie points or a solver failure.
    pub fn fit_kind(
        &self,
        kind: TransformKind,
        points: &[TiePoint],
    ) -> Result<FitOutcome, TransformError> {
        let required = Self::min_points(kind);
        if points.len() < required {
            return Err(TransformError::InsufficientTiePoints {
                required,
                actual: points.len(),
            });
        }
        log::info!("fitting {} transform to {} tie points", kind, points.len());

        let (to, from) = split_points(points);
        let solver = self.solver.as_ref();
        let (transform, fit) = match kind {
            TransformKind::Similarity => fit_model::<Similarity>(&to, &from, solver)?,
            TransformKind::Affine => fit_model::<Affine>(&to, &from, solver)?,
            TransformKind::Projective => fit_model::<Projective>(&to, &from, solver)?,
            TransformKind::Quadratic => fit_model::<Quadratic>(&to, &from, solver)?,
            TransformKind::QuadraticV2 => fit_model::<QuadraticV2>(&to, &from, solver)?,
        };

        let rmse = transform.rmse(points);
        if fit.converged {
            log::info!(
                "{} fit converged after {} iterations, rms residual {:.6}",
                kind,
                fit.iterations,
                rmse
            );
        } else {
            log::warn!(
                "{} fit stopped without converging after {} iterations, cost {:.6e}, rms residual {:.6}",
                kind,
                fit.iterations,
                fit.cost,
                rmse
            );
        }

        Ok(FitOutcome {
            transform,
            converged: fit.converged,
            iterations: fit.iterations,
            cost: fit.cost,
            rmse,
        })
    }
}

fn fit_model<M>(
    to: &DenseMatrix,
    from: &DenseMatrix,
    solver: &dyn NonlinearSolver,
) -> Result<(Transform, FitParams), TransformError>
where
    M: TransformModel + Into<Transform>,
{
    let fit = M::fit(to, from, solver)?;
    let model = M::from_params(&fit.params)?;
    Ok((model.into(), fit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_count() -> Result<(), TransformError> {
        assert_eq!(TransformSelector::kind_for_count(2)?, TransformKind::Similarity);
        assert_eq!(TransformSelector::kind_for_count(3)?, TransformKind::Affine);
        for n in 4..=6 {
            assert_eq!(TransformSelector::kind_for_count(n)?, TransformKind::Projective);
        }
        for n in [7, 8, 50] {
            assert_eq!(TransformSelector::kind_for_count(n)?, TransformKind::QuadraticV2);
        }
        for n in [0, 1] {
            assert!(matches!(
                TransformSelector::kind_for_count(n),
                Err(TransformError::InsufficientTiePoints { required: 2, actual }) if actual == n
            ));
        }
        Ok(())
    }

    #[test]
    fn test_fit_kind_minimum_points() {
        let points = [
            TiePoint::from([0.0, 0.0, 0.0, 0.0]),
            TiePoint::from([1.0, 0.0, 1.0, 0.0]),
            TiePoint::from([0.0, 1.0, 0.0, 1.0]),
            TiePoint::from([1.0, 1.0, 1.0, 1.0]),
            TiePoint::from([2.0, 1.0, 2.0, 1.0]),
        ];
        let selector = TransformSelector::new();
        for kind in [TransformKind::Quadratic, TransformKind::QuadraticV2] {
            assert!(matches!(
                selector.fit_kind(kind, &points),
                Err(TransformError::InsufficientTiePoints {
                    required: 6,
                    actual: 5
                })
            ));
        }
    }
}
