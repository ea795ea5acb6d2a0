#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// dense row-major matrices and the operations the warp pipeline needs.
pub mod matrix;

mod error;

pub use crate::error::LinalgError;
pub use crate::matrix::Matrix;
