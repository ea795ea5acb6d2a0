#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// GPU device and queue acquisition.
pub mod context;

/// buffer readback layout helpers.
pub mod readback;

mod error;
mod shader;
mod warp;

pub use crate::context::GpuContext;
pub use crate::error::GpuError;
pub use crate::warp::{warp_gpu, warp_gpu_with_context};
