//! Levenberg-Marquardt optimizer for non-linear least squares optimization
//!
//! The Levenberg-Marquardt algorithm is a trust-region method that combines
//! the advantages of gradient descent and Gauss-Newton methods. This version
//! uses Marquardt's scaling of the damping term, which keeps the step
//! invariant to the units of each parameter:
//! (J^T J + λ diag(J^T J)) δ = -J^T r
//!
//! The Jacobian is estimated with central differences, so the model is only
//! required to be evaluable. Each step is solved through the SVD of the
//! column-scaled Jacobian; singular directions below
//! [`LevenbergMarquardt::singular_value_tolerance`] are left out, so
//! parameters the data cannot determine keep their current value.

use crate::solver::{NonlinearSolver, OptimizerError, SolverReport, TerminationReason};

/// Levenberg-Marquardt optimizer configuration.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardt {
    /// Initial damping parameter
    pub lambda_init: f64,
    /// Maximum damping parameter
    pub lambda_max: f64,
    /// Factor for lambda adaptation
    pub lambda_factor: f64,
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Convergence threshold for the relative cost decrease
    pub cost_tolerance: f64,
    /// Convergence threshold for the infinity norm of J^T r
    pub gradient_tolerance: f64,
    /// Convergence threshold for the step norm relative to the parameter norm
    pub step_tolerance: f64,
    /// Singular values of the scaled Jacobian below this fraction of the largest are dropped
    pub singular_value_tolerance: f64,
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self {
            lambda_init: 1e-3,
            lambda_max: 1e16,
            lambda_factor: 10.0,
            max_iterations: 100,
            cost_tolerance: 1e-12,
            gradient_tolerance: 1e-12,
            step_tolerance: 1e-12,
            singular_value_tolerance: 1e-6,
        }
    }
}

impl LevenbergMarquardt {
    /// Lower bound for the damping parameter.
    const LAMBDA_MIN: f64 = 1e-15;

    /// Relative step used for the central-difference Jacobian.
    const JACOBIAN_STEP: f64 = 1e-6;

    /// Create a new optimizer with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the relative cost tolerance.
    pub fn with_cost_tolerance(mut self, tol: f64) -> Self {
        self.cost_tolerance = tol;
        self
    }

    /// Set the gradient tolerance.
    pub fn with_gradient_tolerance(mut self, tol: f64) -> Self {
        self.gradient_tolerance = tol;
        self
    }

    /// Set the relative step tolerance.
    pub fn with_step_tolerance(mut self, tol: f64) -> Self {
        self.step_tolerance = tol;
        self
    }

    /// Set the relative cutoff for singular values of the scaled Jacobian.
    pub fn with_singular_value_tolerance(mut self, tol: f64) -> Self {
        self.singular_value_tolerance = tol;
        self
    }

    /// Set initial lambda.
    pub fn with_initial_lambda(mut self, lambda: f64) -> Self {
        self.lambda_init = lambda;
        self
    }

    /// Evaluate `model(params) - target`.
    fn residual(
        target: &[f64],
        model: &dyn Fn(&[f64]) -> Vec<f64>,
        params: &[f64],
    ) -> Result<Vec<f64>, OptimizerError> {
        let prediction = model(params);
        if prediction.len() != target.len() {
            return Err(OptimizerError::DimensionMismatch {
                expected: target.len(),
                actual: prediction.len(),
            });
        }
        Ok(prediction
            .iter()
            .zip(target.iter())
            .map(|(p, t)| p - t)
            .collect())
    }

    /// Central-difference Jacobian of the model, row-major with shape (m, n).
    fn numerical_jacobian(
        model: &dyn Fn(&[f64]) -> Vec<f64>,
        params: &[f64],
        m: usize,
    ) -> Result<Vec<f64>, OptimizerError> {
        let n = params.len();
        let mut jacobian = vec![0.0; m * n];
        let mut perturbed = params.to_vec();

        for j in 0..n {
            let original = perturbed[j];
            let h = Self::JACOBIAN_STEP * original.abs().max(1.0);

            perturbed[j] = original + h;
            let f_plus = model(&perturbed);
            perturbed[j] = original - h;
            let f_minus = model(&perturbed);
            perturbed[j] = original;

            for f in [&f_plus, &f_minus] {
                if f.len() != m {
                    return Err(OptimizerError::DimensionMismatch {
                        expected: m,
                        actual: f.len(),
                    });
                }
            }

            for i in 0..m {
                jacobian[i * n + j] = (f_plus[i] - f_minus[i]) / (2.0 * h);
            }
        }

        Ok(jacobian)
    }

    /// Gradient J^T r.
    fn gradient(jacobian: &[f64], residual: &[f64], n: usize) -> Vec<f64> {
        let mut jtr = vec![0.0; n];
        for (row, r) in jacobian.chunks(n).zip(residual.iter()) {
            for (g, j) in jtr.iter_mut().zip(row) {
                *g += j * r;
            }
        }
        jtr
    }
}

/// SVD of the Jacobian with unit-norm columns, shared by every damping
/// value tried within one iteration.
///
/// With unit columns `diag(J^T J) = I`, so Marquardt's damping becomes
/// `s / (s^2 + λ)` on each singular triplet.
struct ScaledJacobian {
    column_norms: Vec<f64>,
    singular_values: Vec<f64>,
    /// `u_k^T r` for each left singular vector.
    projected_residual: Vec<f64>,
    v: faer::Mat<f64>,
}

impl ScaledJacobian {
    fn new(jacobian: &[f64], residual: &[f64], n: usize) -> Self {
        let m = residual.len();
        let mut column_norms: Vec<f64> = (0..n)
            .map(|j| {
                jacobian
                    .iter()
                    .skip(j)
                    .step_by(n)
                    .map(|v| v * v)
                    .sum::<f64>()
                    .sqrt()
            })
            .collect();
        // columns that barely move the model are scaled as if they were small, not zero
        let max_norm = column_norms.iter().fold(0.0f64, |acc, c| acc.max(*c));
        let floor = (max_norm * 1e-6).max(f64::MIN_POSITIVE);
        for c in column_norms.iter_mut() {
            *c = c.max(floor);
        }

        let scaled = faer::Mat::<f64>::from_fn(m, n, |i, j| jacobian[i * n + j] / column_norms[j]);
        let svd = scaled.svd();
        let s = svd.s_diagonal();
        let u = svd.u();

        let rank = s.nrows();
        let singular_values = (0..rank).map(|k| s.read(k)).collect();
        let projected_residual = (0..rank)
            .map(|k| (0..m).map(|i| u.read(i, k) * residual[i]).sum::<f64>())
            .collect();

        Self {
            column_norms,
            singular_values,
            projected_residual,
            v: svd.v().to_owned(),
        }
    }

    /// Damped step for `lambda`, or `None` if it is not finite.
    fn step(&self, lambda: f64, tolerance: f64) -> Option<Vec<f64>> {
        let n = self.column_norms.len();
        let s_max = self.singular_values.iter().fold(0.0f64, |acc, s| acc.max(*s));
        let cutoff = s_max * tolerance;

        let mut delta = vec![0.0; n];
        for (k, (s, ur)) in self
            .singular_values
            .iter()
            .zip(&self.projected_residual)
            .enumerate()
        {
            if *s <= cutoff {
                continue;
            }
            let coef = -s * ur / (s * s + lambda);
            for (j, d) in delta.iter_mut().enumerate() {
                *d += self.v.read(j, k) * coef;
            }
        }
        for (d, c) in delta.iter_mut().zip(&self.column_norms) {
            *d /= c;
        }

        if delta.iter().all(|v| v.is_finite()) {
            Some(delta)
        } else {
            None
        }
    }
}

fn sum_of_squares(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

fn norm(v: &[f64]) -> f64 {
    sum_of_squares(v).sqrt()
}

impl NonlinearSolver for LevenbergMarquardt {
    fn minimize(
        &self,
        target: &[f64],
        model: &dyn Fn(&[f64]) -> Vec<f64>,
        initial: &[f64],
    ) -> Result<SolverReport, OptimizerError> {
        let n = initial.len();
        let m = target.len();
        if n == 0 || m == 0 {
            return Err(OptimizerError::EmptyProblem);
        }

        let mut params = initial.to_vec();
        let mut residual = Self::residual(target, model, &params)?;
        let mut cost = sum_of_squares(&residual);
        if !cost.is_finite() {
            return Err(OptimizerError::NonFiniteCost);
        }

        let mut lambda = self.lambda_init;
        let mut iterations = 0;

        let termination = 'outer: loop {
            if cost == 0.0 {
                break TerminationReason::CostConverged;
            }
            if iterations >= self.max_iterations {
                break TerminationReason::MaxIterations;
            }

            let jacobian = Self::numerical_jacobian(model, &params, m)?;
            let jtr = Self::gradient(&jacobian, &residual, n);

            let gradient_norm = jtr.iter().fold(0.0f64, |acc, g| acc.max(g.abs()));
            if gradient_norm <= self.gradient_tolerance {
                break TerminationReason::GradientConverged;
            }

            let system = ScaledJacobian::new(&jacobian, &residual, n);
            iterations += 1;

            // increase the damping until a step lowers the cost
            let (candidate, candidate_residual, candidate_cost) = loop {
                if lambda > self.lambda_max {
                    break 'outer TerminationReason::LambdaMaxExceeded;
                }

                let Some(delta) = system.step(lambda, self.singular_value_tolerance) else {
                    lambda *= self.lambda_factor;
                    continue;
                };

                if norm(&delta) <= self.step_tolerance * (norm(&params) + self.step_tolerance) {
                    break 'outer TerminationReason::StepConverged;
                }

                let candidate: Vec<f64> = params.iter().zip(delta.iter()).map(|(p, d)| p + d).collect();
                let candidate_residual = Self::residual(target, model, &candidate)?;
                let candidate_cost = sum_of_squares(&candidate_residual);

                if candidate_cost.is_finite() && candidate_cost < cost {
                    lambda = (lambda / self.lambda_factor).max(Self::LAMBDA_MIN);
                    break (candidate, candidate_residual, candidate_cost);
                }
                lambda *= self.lambda_factor;
            };

            let relative_cost_change = (cost - candidate_cost) / cost;

            params = candidate;
            residual = candidate_residual;
            cost = candidate_cost;

            log::debug!(
                "LM iteration {}: cost {:.6e}, lambda {:.1e}",
                iterations,
                cost,
                lambda
            );

            if relative_cost_change <= self.cost_tolerance {
                break TerminationReason::CostConverged;
            }
        };

        Ok(SolverReport {
            params,
            cost,
            iterations,
            termination,
        })
    }
}
