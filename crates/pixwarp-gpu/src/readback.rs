//! Copying a texture into a mappable buffer requires every row to start at
//! a 256-byte boundary; the helpers here compute the padded layout and strip
//! it from the mapped bytes again.

/// Bytes per rgba8 texel.
pub const BYTES_PER_PIXEL: u32 = 4;

/// The padded row stride for a rgba8 texture of the given width.
///
/// Returns the smallest multiple of `wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`
/// that holds a full row.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(alignment) * alignment
}

/// Drop the per-row alignment padding from mapped readback bytes.
pub fn strip_row_padding(mapped: &[u8], width: u32, height: u32) -> Vec<u8> {
    let unpadded = (width * BYTES_PER_PIXEL) as usize;
    let padded = padded_bytes_per_row(width) as usize;

    let mut out = vec![0u8; unpadded * height as usize];
    for row in 0..height as usize {
        let src = row * padded;
        let dst = row * unpadded;
        out[dst..dst + unpadded].copy_from_slice(&mapped[src..src + unpadded]);
    }
    out
}

/// Widen a rgb8 buffer to rgba8 with an opaque alpha channel.
pub fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for pixel in rgb.chunks_exact(3) {
        rgba.extend_from_slice(pixel);
        rgba.push(u8::MAX);
    }
    rgba
}

/// Narrow a rgba8 buffer to rgb8, dropping the alpha channel.
pub fn rgba_to_rgb(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for pixel in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
    }
    rgb
}
