use std::sync::Mutex;

use pixwarp_image::{Image, ImageSize};
use pixwarp_imgproc::interpolation::InterpolationMode;
use pixwarp_imgproc::progress::{NoProgress, ProgressReporter};
use pixwarp_imgproc::render::{render_cpu, Backend, RenderJob};
use pixwarp_imgproc::warp::{affine_matrix, output_extent, AffineParams};

fn checkerboard(width: usize, height: usize) -> Image<u8, 3> {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let value = if (x + y) % 2 == 0 { 255u8 } else { 0u8 };
            data.extend_from_slice(&[value, value, value]);
        }
    }
    Image::new(ImageSize { width, height }, data).expect("buffer matches size")
}

struct CollectingReporter {
    fractions: Mutex<Vec<f64>>,
}

impl ProgressReporter for CollectingReporter {
    fn report(&self, fraction: f64) {
        if let Ok(mut fractions) = self.fractions.lock() {
            fractions.push(fraction);
        }
    }
}

#[test]
fn full_pipeline_identity_is_lossless() {
    let src = checkerboard(20, 14);

    let matrix = affine_matrix(&AffineParams::default()).expect("identity params");
    let inverse = matrix.inverse().expect("identity is invertible");
    let extent = output_extent(&matrix, src.size());

    assert_eq!(extent.size, src.size());
    assert_eq!((extent.x_offset, extent.y_offset), (0, 0));

    let job = RenderJob::new(&src, extent, &inverse, Backend::Cpu { threads: 3 });
    let (out, failures) =
        render_cpu(&job, InterpolationMode::Bilinear, &NoProgress).expect("render succeeds");

    assert!(failures.is_empty());
    assert_eq!(out.as_slice(), src.as_slice());
}

#[test]
fn full_pipeline_quarter_turn_swaps_dimensions() {
    let src = checkerboard(30, 12);

    let matrix = affine_matrix(&AffineParams {
        angle: 90.0,
        ..Default::default()
    })
    .expect("rotation params");
    let inverse = matrix.inverse().expect("rotation is invertible");
    let extent = output_extent(&matrix, src.size());

    assert!((extent.size.width as i64 - 12).abs() <= 1);
    assert!((extent.size.height as i64 - 30).abs() <= 1);

    let job = RenderJob::new(&src, extent, &inverse, Backend::Cpu { threads: 2 });
    let (out, failures) =
        render_cpu(&job, InterpolationMode::Bilinear, &NoProgress).expect("render succeeds");

    assert!(failures.is_empty());
    assert_eq!(out.size(), extent.size);
}

#[test]
fn progress_reaches_completion_exactly_once_per_column() {
    let src = checkerboard(16, 8);

    let matrix = affine_matrix(&AffineParams::default()).expect("identity params");
    let inverse = matrix.inverse().expect("identity is invertible");
    let extent = output_extent(&matrix, src.size());

    let reporter = CollectingReporter {
        fractions: Mutex::new(Vec::new()),
    };

    let job = RenderJob::new(&src, extent, &inverse, Backend::Cpu { threads: 4 });
    let (_, failures) =
        render_cpu(&job, InterpolationMode::Bilinear, &reporter).expect("render succeeds");
    assert!(failures.is_empty());

    let fractions = reporter.fractions.into_inner().expect("reporter lock intact");

    // one report per column plus the final completion report
    assert_eq!(fractions.len(), 16 + 1);
    assert_eq!(fractions.last(), Some(&1.0));
    assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
}

#[test]
fn reporter_choice_does_not_change_the_output() {
    let src = checkerboard(15, 9);

    let matrix = affine_matrix(&AffineParams {
        angle: 20.0,
        ..Default::default()
    })
    .expect("rotation params");
    let inverse = matrix.inverse().expect("rotation is invertible");
    let extent = output_extent(&matrix, src.size());

    let reporter = CollectingReporter {
        fractions: Mutex::new(Vec::new()),
    };

    let job = RenderJob::new(&src, extent, &inverse, Backend::Cpu { threads: 2 });
    let (with_reporter, _) =
        render_cpu(&job, InterpolationMode::Bilinear, &reporter).expect("render succeeds");
    let (without_reporter, _) =
        render_cpu(&job, InterpolationMode::Bilinear, &NoProgress).expect("render succeeds");

    assert_eq!(with_reporter.as_slice(), without_reporter.as_slice());
}

#[test]
fn nearest_and_bilinear_agree_on_integer_grids() {
    // an identity transform samples at exact integer coordinates, where
    // both kernels must return the source pixel untouched
    let src = checkerboard(9, 7);

    let matrix = affine_matrix(&AffineParams::default()).expect("identity params");
    let inverse = matrix.inverse().expect("identity is invertible");
    let extent = output_extent(&matrix, src.size());

    let job = RenderJob::new(&src, extent, &inverse, Backend::Cpu { threads: 1 });
    let (bilinear, _) =
        render_cpu(&job, InterpolationMode::Bilinear, &NoProgress).expect("render succeeds");
    let (nearest, _) =
        render_cpu(&job, InterpolationMode::Nearest, &NoProgress).expect("render succeeds");

    assert_eq!(bilinear.as_slice(), src.as_slice());
    assert_eq!(nearest.as_slice(), src.as_slice());
}
