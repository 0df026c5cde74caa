//! Contract shared by the nonlinear least squares solvers.

use thiserror::Error;

/// Errors that can occur during optimization.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptimizerError {
    /// No parameters or no observations
    #[error("Optimization problem has no parameters or no observations")]
    EmptyProblem,

    /// The model prediction does not have the same length as the target
    #[error("Dimension mismatch: expected {expected} predictions, got {actual}")]
    DimensionMismatch {
        /// Length of the target vector
        expected: usize,
        /// Length returned by the model
        actual: usize,
    },

    /// The cost at the initial guess is NaN or infinite
    #[error("Cost at the initial parameters is not finite")]
    NonFiniteCost,

    /// Linear system solve failed
    #[error("Linear system solve failed: {0}")]
    SolveFailed(String),
}

/// Reason why the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Converged: relative cost change below tolerance
    CostConverged,
    /// Converged: gradient norm below tolerance
    GradientConverged,
    /// Converged: relative step size below tolerance
    StepConverged,
    /// Maximum iterations reached
    MaxIterations,
    /// Damping exceeded its maximum without finding a better step
    LambdaMaxExceeded,
}

impl TerminationReason {
    /// Whether this termination counts as convergence.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            TerminationReason::CostConverged
                | TerminationReason::GradientConverged
                | TerminationReason::StepConverged
        )
    }
}

/// Result of a solver run.
///
/// `params` always holds the best parameters found, also when the solver
/// stopped without converging.
#[derive(Debug, Clone)]
pub struct SolverReport {
    /// Best parameters found
    pub params: Vec<f64>,
    /// Sum of squared residuals at `params`
    pub cost: f64,
    /// Number of iterations performed
    pub iterations: usize,
    /// Reason for termination
    pub termination: TerminationReason,
}

impl SolverReport {
    /// Whether the solver reported convergence.
    pub fn converged(&self) -> bool {
        self.termination.is_converged()
    }
}

/// A minimizer of the sum of squared residuals `sum_i (model(p)_i - target_i)^2`.
///
/// Implementations must terminate: they enforce an iteration cap and return
/// the best parameters found together with a [`TerminationReason`].
pub trait NonlinearSolver: Send + Sync {
    /// Minimize the squared distance between `model(params)` and `target`.
    ///
    /// # Arguments
    ///
    /// * `target` - The observed values.
    /// * `model` - Maps a parameter vector to a prediction with the length of `target`.
    /// * `initial` - The initial guess.
    ///
    /// # Errors
    ///
    /// Returns an error if the problem is empty, the prediction length is
    /// wrong, or the initial cost is not finite.
    fn minimize(
        &self,
        target: &[f64],
        model: &dyn Fn(&[f64]) -> Vec<f64>,
        initial: &[f64],
    ) -> Result<SolverReport, OptimizerError>;
}
