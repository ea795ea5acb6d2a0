#![doc = env!("CARGO_PKG_DESCRIPTION")]

pub use pixwarp_gpu as gpu;
pub use pixwarp_image as image;
pub use pixwarp_imgproc as imgproc;
pub use pixwarp_io as io;
pub use pixwarp_linalg as linalg;
