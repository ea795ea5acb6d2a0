use std::ops::{Index, IndexMut};

use num_traits::Float;

use crate::error::LinalgError;

/// A dense row-major matrix of floating point elements.
///
/// Small and allocation-backed on purpose: the warp pipeline only ever
/// handles 3x3 homogeneous transforms and 1x3 coordinate rows.
///
/// # Example
///
/// ```
/// use pixwarp_linalg::Matrix;
///
/// let m = Matrix::<f64>::identity(3);
///
/// assert_eq!(m.rows(), 3);
/// assert_eq!(m[(1, 1)], 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Float> Matrix<T> {
    /// Create a matrix from a row-major element buffer.
    ///
    /// # Errors
    ///
    /// If the buffer length does not match `rows * cols`, an error is
    /// returned.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, LinalgError> {
        if data.len() != rows * cols {
            return Err(LinalgError::InvalidShape(data.len(), rows, cols));
        }

        Ok(Self { rows, cols, data })
    }

    /// Create a matrix with every element set to zero.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The elements in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Standard matrix product `self * rhs`.
    ///
    /// # Errors
    ///
    /// The operand shapes must satisfy `self.cols() == rhs.rows()`.
    pub fn matmul(&self, rhs: &Self) -> Result<Self, LinalgError> {
        if self.cols != rhs.rows {
            return Err(LinalgError::DimensionMismatch(
                self.rows, self.cols, rhs.rows, rhs.cols,
            ));
        }

        let mut out = Self::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut acc = T::zero();
                for k in 0..self.cols {
                    acc = acc + self[(i, k)] * rhs[(k, j)];
                }
                out[(i, j)] = acc;
            }
        }

        Ok(out)
    }

    /// Invert the matrix by Gauss-Jordan elimination with an identity
    /// augmentation.
    ///
    /// Elimination runs without row pivoting; a pivot that is exactly zero
    /// reports the matrix as singular. The transforms this pipeline builds
    /// carry trigonometric pivots that are never exactly zero in floating
    /// point (`cos(pi/2)` is ~6.1e-17), so right-angle rotations invert fine.
    ///
    /// # Errors
    ///
    /// `NotSquare` for rectangular input, `SingularMatrix` on a zero pivot.
    pub fn inverse(&self) -> Result<Self, LinalgError> {
        if self.rows != self.cols {
            return Err(LinalgError::NotSquare(self.rows, self.cols));
        }

        let n = self.rows;
        let mut tmp = self.clone();
        let mut inv = Self::identity(n);

        for i in 0..n {
            let pivot = tmp[(i, i)];
            if pivot == T::zero() {
                return Err(LinalgError::SingularMatrix);
            }

            for j in 0..n {
                if i == j {
                    continue;
                }
                let ratio = tmp[(j, i)] / pivot;
                for k in 0..n {
                    let t = tmp[(i, k)];
                    tmp[(j, k)] = tmp[(j, k)] - ratio * t;
                    let t = inv[(i, k)];
                    inv[(j, k)] = inv[(j, k)] - ratio * t;
                }
            }
        }

        for i in 0..n {
            let divisor = tmp[(i, i)];
            if divisor == T::zero() {
                return Err(LinalgError::SingularMatrix);
            }
            for j in 0..n {
                tmp[(i, j)] = tmp[(i, j)] / divisor;
                inv[(i, j)] = inv[(i, j)] / divisor;
            }
        }

        Ok(inv)
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row * self.cols + col]
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for row in self.data.chunks(self.cols) {
            for element in row {
                write!(f, "{element} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
