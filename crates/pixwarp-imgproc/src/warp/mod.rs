mod affine;
mod extent;

pub use affine::{affine_matrix, matrix_from_coeffs, transform_point, AffineParams};
pub use extent::{output_extent, OutputExtent};
