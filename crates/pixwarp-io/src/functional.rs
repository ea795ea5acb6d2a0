use std::path::Path;

use pixwarp_image::Image;

use crate::error::IoError;
use crate::jpeg::{read_image_jpeg_rgb8, write_image_jpeg_rgb8};
use crate::png::{read_image_png_rgb8, write_image_png_rgb8};

const JPEG_QUALITY: u8 = 95;

/// Reads a rgb8 image from the given file path, dispatching on the file
/// extension (png, jpg or jpeg).
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the image data.
pub fn read_image_auto(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref();

    match extension_of(file_path)?.as_str() {
        "png" => read_image_png_rgb8(file_path),
        "jpg" | "jpeg" => read_image_jpeg_rgb8(file_path),
        _ => Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }
}

/// Writes a rgb8 image to the given file path, dispatching on the file
/// extension (png, jpg or jpeg).
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `image` - The image to save.
pub fn write_image_auto(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    match extension_of(file_path)?.as_str() {
        "png" => write_image_png_rgb8(file_path, image),
        "jpg" | "jpeg" => write_image_jpeg_rgb8(file_path, image, JPEG_QUALITY),
        _ => Err(IoError::InvalidFileExtension(file_path.to_path_buf())),
    }
}

fn extension_of(file_path: &Path) -> Result<String, IoError> {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| IoError::InvalidFileExtension(file_path.to_path_buf()))
}
