//! Pixel interpolation methods for image transformations.
//!
//! Kernels used when resampling images during geometric transformations.
//!
//! # Interpolation Modes
//!
//! - **Nearest**: Fastest, uses the nearest pixel value (no interpolation)
//! - **Bilinear**: Smooth linear interpolation between adjacent pixels

mod bilinear;
mod interpolate;
mod nearest;

pub use interpolate::interpolate_pixel;
pub use interpolate::InterpolationMode;
