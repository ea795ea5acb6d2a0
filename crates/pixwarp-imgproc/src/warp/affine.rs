use pixwarp_linalg::Matrix;

use crate::error::WarpError;

/// Human-level parameters describing a 2D affine transform.
///
/// All angular values are in degrees. The default value is the identity
/// transform: zero rotation and skew, unit scales, no flips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineParams {
    /// Rotation angle in degrees.
    pub angle: f64,
    /// Horizontal scale factor.
    pub horizontal_scale: f64,
    /// Vertical scale factor.
    pub vertical_scale: f64,
    /// Uniform scale that overrides both axis scales when set.
    pub scale: Option<f64>,
    /// Horizontal skew angle in degrees.
    pub horizontal_skew: f64,
    /// Vertical skew angle in degrees.
    pub vertical_skew: f64,
    /// Mirror the image horizontally.
    pub horizontal_flip: bool,
    /// Mirror the image vertically.
    pub vertical_flip: bool,
}

impl Default for AffineParams {
    fn default() -> Self {
        Self {
            angle: 0.0,
            horizontal_scale: 1.0,
            vertical_scale: 1.0,
            scale: None,
            horizontal_skew: 0.0,
            vertical_skew: 0.0,
            horizontal_flip: false,
            vertical_flip: false,
        }
    }
}

/// A skew congruent to 90 degrees mod 180 has no tangent.
fn is_degenerate_skew(degrees: f64) -> bool {
    degrees.rem_euclid(180.0) == 90.0
}

/// Build the forward 3x3 homogeneous transform from affine parameters.
///
/// The 2x2 linear part sits at the top-left with the last row and column
/// fixed to `[0, 0, 1]`. Points map as row vectors, `p' = p * M`.
///
/// # Errors
///
/// Skew angles congruent to 90 degrees mod 180 are rejected before any
/// matrix math runs.
///
/// # Example
///
/// ```
/// use pixwarp_imgproc::warp::{affine_matrix, AffineParams};
///
/// let m = affine_matrix(&AffineParams {
///     angle: 90.0,
///     ..Default::default()
/// }).unwrap();
///
/// assert_eq!(m.rows(), 3);
/// ```
pub fn affine_matrix(params: &AffineParams) -> Result<Matrix<f64>, WarpError> {
    if is_degenerate_skew(params.horizontal_skew) {
        return Err(WarpError::InvalidSkewAngle(params.horizontal_skew));
    }
    if is_degenerate_skew(params.vertical_skew) {
        return Err(WarpError::InvalidSkewAngle(params.vertical_skew));
    }

    let (mut hscale, mut vscale) = match params.scale {
        Some(s) => (s, s),
        None => (params.horizontal_scale, params.vertical_scale),
    };
    if params.horizontal_flip {
        hscale = -hscale;
    }
    if params.vertical_flip {
        vscale = -vscale;
    }

    let angle = params.angle.to_radians();
    let hskew = params.horizontal_skew.to_radians();
    let vskew = params.vertical_skew.to_radians();

    let a = hscale * angle.cos();
    let b = -hscale * (angle.sin() + hskew.tan());
    let c = vscale * (angle.sin() + vskew.tan());
    let d = vscale * angle.cos();

    Ok(Matrix::new(
        3,
        3,
        vec![a, b, 0.0, c, d, 0.0, 0.0, 0.0, 1.0],
    )?)
}

/// Build the forward 3x3 homogeneous transform from a literal 2x2 matrix,
/// bypassing the parameter formula.
///
/// # Errors
///
/// Exactly four coefficients (row-major `a1 a2 b1 b2`) are required.
pub fn matrix_from_coeffs(coeffs: &[f64]) -> Result<Matrix<f64>, WarpError> {
    let [a, b, c, d] = match coeffs {
        [a, b, c, d] => [*a, *b, *c, *d],
        _ => return Err(WarpError::InvalidMatrixArity(coeffs.len())),
    };

    Ok(Matrix::new(
        3,
        3,
        vec![a, b, 0.0, c, d, 0.0, 0.0, 0.0, 1.0],
    )?)
}

/// Map a point through a 3x3 homogeneous transform as a row vector.
pub fn transform_point(m: &Matrix<f64>, x: f64, y: f64) -> (f64, f64) {
    debug_assert_eq!((m.rows(), m.cols()), (3, 3));
    let u = x * m[(0, 0)] + y * m[(1, 0)] + m[(2, 0)];
    let v = x * m[(0, 1)] + y * m[(1, 1)] + m[(2, 1)];
    (u, v)
}
