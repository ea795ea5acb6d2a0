use pixwarp_linalg::LinalgError;

/// An error type for transform construction.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WarpError {
    /// The tangent of the skew angle is undefined.
    #[error("skew angle {0} degrees has no defined tangent")]
    InvalidSkewAngle(f64),

    /// A literal matrix needs exactly four coefficients.
    #[error("literal matrix needs exactly 4 coefficients, got {0}")]
    InvalidMatrixArity(usize),

    /// Error from the underlying matrix operations.
    #[error(transparent)]
    Linalg(#[from] LinalgError),
}
