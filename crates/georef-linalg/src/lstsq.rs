use crate::{error::LinalgError, matrix::DenseMatrix};

/// Solve the linear least squares problem `min ||U p - V||^2` with the normal equations.
///
/// Returns `p = (U^T U)^-1 U^T V`. When `U` is square and invertible this is the
/// exact solution of `U p = V`.
///
/// # Arguments
///
/// * `v` - The observations with shape (m, k), usually a column vector.
/// * `u` - The design matrix with shape (m, n).
///
/// # Returns
///
/// The parameters with shape (n, k).
///
/// # Errors
///
/// Returns [`LinalgError::ShapeMismatch`] if `u` and `v` have a different
/// number of rows and [`LinalgError::SingularMatrix`] if `U^T U` is not invertible.
///
/// Example:
///
/// ```
/// use georef_linalg::{least_squares, DenseMatrix};
///
/// // fit y = 2x + 1
/// let u = DenseMatrix::from_nested(&[[0.0, 1.0], [1.0, 1.0], [2.0, 1.0]]).unwrap();
/// let v = DenseMatrix::column(&[1.0, 3.0, 5.0]);
/// let p = least_squares(&v, &u).unwrap();
/// assert!((p[(0, 0)] - 2.0).abs() < 1e-12);
/// assert!((p[(1, 0)] - 1.0).abs() < 1e-12);
/// ```
pub fn least_squares(v: &DenseMatrix, u: &DenseMatrix) -> Result<DenseMatrix, LinalgError> {
    if u.rows() != v.rows() {
        return Err(LinalgError::ShapeMismatch {
            op: "least_squares",
            lhs: u.shape(),
            rhs: v.shape(),
        });
    }
    let ut = u.transpose();
    let utv = ut.multiply(v)?;
    ut.multiply(u)?.invert()?.multiply(&utv)
}
