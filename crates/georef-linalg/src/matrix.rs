use std::ops::{Index, IndexMut};

use faer::prelude::SolverCore;

use crate::error::LinalgError;

/// A dense, row-major matrix of `f64` values.
///
/// The shape is fixed at construction. Every operation returns a new matrix,
/// so values never alias each other.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Create a zero-filled matrix with the given number of rows and columns.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Create an `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Create a matrix from a row-major slice.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::InvalidShape`] if `data.len() != rows * cols`.
    pub fn from_row_slice(rows: usize, cols: usize, data: &[f64]) -> Result<Self, LinalgError> {
        if data.len() != rows * cols {
            return Err(LinalgError::InvalidShape {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            data: data.to_vec(),
        })
    }

    /// Create a matrix from nested rows, e.g. `[[1, 2, 3], [4, 5, 6]]`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::Empty`] when there are no elements and
    /// [`LinalgError::RaggedRows`] when rows have different lengths.
    pub fn from_nested<R: AsRef<[f64]>>(nested: &[R]) -> Result<Self, LinalgError> {
        let rows = nested.len();
        let cols = nested.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(LinalgError::Empty);
        }
        let mut data = Vec::with_capacity(rows * cols);
        for row in nested {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(LinalgError::RaggedRows);
            }
            data.extend_from_slice(row);
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a column vector (`n x 1`).
    pub fn column(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Element at `(row, col)`, or `None` if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// The underlying row-major data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Copy into nested rows.
    pub fn to_nested(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols.max(1)).map(|r| r.to_vec()).collect()
    }

    /// Matrix product `self * other`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::ShapeMismatch`] if `self.cols() != other.rows()`.
    pub fn multiply(&self, other: &DenseMatrix) -> Result<DenseMatrix, LinalgError> {
        if self.cols != other.rows {
            return Err(LinalgError::ShapeMismatch {
                op: "multiply",
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }
        let mut out = faer::Mat::<f64>::zeros(self.rows, other.cols);
        faer::linalg::matmul::matmul(
            out.as_mut(),
            self.as_faer(),
            other.as_faer(),
            None,
            1.0,
            faer::Parallelism::None,
        );
        Ok(Self::from_faer(out.as_ref()))
    }

    /// Transposed copy.
    pub fn transpose(&self) -> DenseMatrix {
        Self::from_faer(self.as_faer().transpose())
    }

    /// Inverse of a square matrix from its LU decomposition with partial pivoting.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::NotSquare`] for non-square input and
    /// [`LinalgError::SingularMatrix`] when a pivot of `U` vanishes relative to
    /// the largest magnitude in the matrix.
    pub fn invert(&self) -> Result<DenseMatrix, LinalgError> {
        if self.rows != self.cols {
            return Err(LinalgError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let n = self.rows;
        if n == 0 {
            return Err(LinalgError::Empty);
        }

        let max_abs = self.data.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if max_abs == 0.0 || !max_abs.is_finite() {
            return Err(LinalgError::SingularMatrix);
        }
        let tol = max_abs * f64::EPSILON * n as f64;

        let lu = self.as_faer().partial_piv_lu();
        let u = lu.compute_u();
        if (0..n).any(|i| u.read(i, i).abs() <= tol) {
            return Err(LinalgError::SingularMatrix);
        }

        let inv = Self::from_faer(lu.inverse().as_ref());
        if inv.data.iter().any(|v| !v.is_finite()) {
            return Err(LinalgError::SingularMatrix);
        }
        Ok(inv)
    }

    /// Column vector holding the average of each row.
    ///
    /// For a `2 x N` matrix of points this is the centroid.
    pub fn mean_column(&self) -> DenseMatrix {
        let mut out = DenseMatrix::zeros(self.rows, 1);
        if self.cols == 0 {
            return out;
        }
        for i in 0..self.rows {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            out[(i, 0)] = row.iter().sum::<f64>() / self.cols as f64;
        }
        out
    }

    /// Element-wise sum.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::ShapeMismatch`] if the shapes differ.
    pub fn add(&self, other: &DenseMatrix) -> Result<DenseMatrix, LinalgError> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    /// Element-wise difference `self - other`.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::ShapeMismatch`] if the shapes differ.
    pub fn subtract(&self, other: &DenseMatrix) -> Result<DenseMatrix, LinalgError> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    /// Multiply every element by `factor`.
    pub fn scale(&self, factor: f64) -> DenseMatrix {
        DenseMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }

    /// Linearize into a single column in row-major order.
    ///
    /// A `2 x N` point matrix flattens to `[x0, .., xN-1, y0, .., yN-1]`;
    /// [`DenseMatrix::reshape`] restores it.
    pub fn flatten(&self) -> DenseMatrix {
        DenseMatrix::column(&self.data)
    }

    /// Reinterpret the row-major data with a new shape.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::InvalidShape`] if the element count changes.
    pub fn reshape(&self, rows: usize, cols: usize) -> Result<DenseMatrix, LinalgError> {
        DenseMatrix::from_row_slice(rows, cols, &self.data)
    }

    fn zip_with(
        &self,
        other: &DenseMatrix,
        op: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<DenseMatrix, LinalgError> {
        if self.shape() != other.shape() {
            return Err(LinalgError::ShapeMismatch {
                op,
                lhs: self.shape(),
                rhs: other.shape(),
            });
        }
        Ok(DenseMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
        })
    }

    /// Borrow as a faer view.
    fn as_faer(&self) -> faer::MatRef<'_, f64> {
        faer::mat::from_row_major_slice(&self.data, self.rows, self.cols)
    }

    /// Copy a faer matrix into row-major storage.
    fn from_faer(m: faer::MatRef<'_, f64>) -> Self {
        let (rows, cols) = (m.nrows(), m.ncols());
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            data.extend((0..cols).map(|j| m.read(i, j)));
        }
        Self { rows, cols, data }
    }
}

impl Index<(usize, usize)> for DenseMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for DenseMatrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        &mut self.data[row * self.cols + col]
    }
}
