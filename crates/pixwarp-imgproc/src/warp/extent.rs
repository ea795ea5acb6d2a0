use pixwarp_image::ImageSize;
use pixwarp_linalg::Matrix;

use super::affine::transform_point;

/// Placement of the output canvas for a forward transform.
///
/// The offsets anchor the canvas so that inverse-mapping
/// `(new_x + x_offset, new_y + y_offset)` lands back in source space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputExtent {
    /// Output canvas size.
    pub size: ImageSize,
    /// Destination-to-source offset along x.
    pub x_offset: i64,
    /// Destination-to-source offset along y.
    pub y_offset: i64,
}

/// Compute the minimal output canvas bounding the transformed source.
///
/// The four source corners map through the forward matrix; each transformed
/// coordinate is rounded up, and the canvas spans their min/max per axis.
///
/// A transform that collapses the corners (e.g. a zero scale) yields a
/// zero-area extent; this is not an error, the render of such an extent is
/// simply an empty image.
///
/// # Example
///
/// ```
/// use pixwarp_image::ImageSize;
/// use pixwarp_linalg::Matrix;
/// use pixwarp_imgproc::warp::output_extent;
///
/// let identity = Matrix::<f64>::identity(3);
/// let extent = output_extent(&identity, ImageSize { width: 4, height: 3 });
///
/// assert_eq!(extent.size, ImageSize { width: 4, height: 3 });
/// assert_eq!((extent.x_offset, extent.y_offset), (0, 0));
/// ```
pub fn output_extent(m: &Matrix<f64>, src_size: ImageSize) -> OutputExtent {
    let (w, h) = (src_size.width as f64, src_size.height as f64);
    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];

    let mut xs = [0i64; 4];
    let mut ys = [0i64; 4];
    for (i, (cx, cy)) in corners.iter().enumerate() {
        let (tx, ty) = transform_point(m, *cx, *cy);
        xs[i] = tx.ceil() as i64;
        ys[i] = ty.ceil() as i64;
    }

    let (min_x, max_x) = min_max(&xs);
    let (min_y, max_y) = min_max(&ys);

    let size = ImageSize {
        width: (max_x - min_x) as usize,
        height: (max_y - min_y) as usize,
    };
    if size.width == 0 || size.height == 0 {
        log::warn!("transform collapses the source to a zero-area output");
    }

    OutputExtent {
        size,
        x_offset: min_x,
        y_offset: min_y,
    }
}

fn min_max(values: &[i64; 4]) -> (i64, i64) {
    let mut min = values[0];
    let mut max = values[0];
    for &v in &values[1..] {
        min = min.min(v);
        max = max.max(v);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warp::{affine_matrix, AffineParams};

    const SRC: ImageSize = ImageSize {
        width: 64,
        height: 48,
    };

    #[test]
    fn identity_extent_matches_the_source() {
        let extent = output_extent(&Matrix::identity(3), SRC);

        assert_eq!(extent.size, SRC);
        assert_eq!((extent.x_offset, extent.y_offset), (0, 0));
    }

    #[test]
    fn quarter_turn_swaps_the_extent() {
        let m = affine_matrix(&AffineParams {
            angle: 90.0,
            ..Default::default()
        })
        .expect("params are valid");

        let extent = output_extent(&m, SRC);

        assert!((extent.size.width as i64 - SRC.height as i64).abs() <= 1);
        assert!((extent.size.height as i64 - SRC.width as i64).abs() <= 1);
    }

    #[test]
    fn doubling_scale_doubles_the_extent() {
        let m = affine_matrix(&AffineParams {
            scale: Some(2.0),
            ..Default::default()
        })
        .expect("params are valid");

        let extent = output_extent(&m, SRC);

        assert_eq!(extent.size.width, 2 * SRC.width);
        assert_eq!(extent.size.height, 2 * SRC.height);
    }

    #[test]
    fn flip_offsets_anchor_the_canvas() {
        let m = affine_matrix(&AffineParams {
            horizontal_flip: true,
            ..Default::default()
        })
        .expect("params are valid");

        let extent = output_extent(&m, SRC);

        assert_eq!(extent.size, SRC);
        assert_eq!(extent.x_offset, -(SRC.width as i64));
        assert_eq!(extent.y_offset, 0);
    }

    #[test]
    fn zero_scale_collapses_to_an_empty_extent() {
        let m = affine_matrix(&AffineParams {
            scale: Some(0.0),
            ..Default::default()
        })
        .expect("params are valid");

        let extent = output_extent(&m, SRC);

        assert_eq!(
            extent.size,
            ImageSize {
                width: 0,
                height: 0
            }
        );
    }
}
