/// An error type for the linalg module.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LinalgError {
    /// The element buffer does not match the requested shape.
    #[error("data length ({0}) does not match the {1}x{2} shape")]
    InvalidShape(usize, usize, usize),

    /// The operand shapes are incompatible for a product.
    #[error("cannot multiply a {0}x{1} matrix by a {2}x{3} matrix")]
    DimensionMismatch(usize, usize, usize, usize),

    /// Inversion is only defined for square matrices.
    #[error("cannot invert a non-square {0}x{1} matrix")]
    NotSquare(usize, usize),

    /// A zero pivot was hit during elimination, so no inverse exists.
    #[error("matrix is singular")]
    SingularMatrix,
}
