#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// high-level image read/write dispatching on the file extension.
pub mod functional;

/// JPEG image encoding and decoding.
pub mod jpeg;

/// PNG image encoding and decoding.
pub mod png;

mod error;

pub use crate::error::IoError;
